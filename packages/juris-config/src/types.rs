use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	#[serde(default)]
	pub api_key: Option<String>,
	#[serde(default = "default_collection")]
	pub collection: String,
	/// Optional. Set when the opinion collection stores its dense vector under a name.
	#[serde(default)]
	pub vector_name: Option<String>,
	pub vector_dim: u32,
	#[serde(default = "default_qdrant_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	/// Hits requested from the opinion index when a request does not override it.
	pub top_k: u32,
	/// Upper bound for per-request overrides.
	pub max_top_k: u32,
	pub embedding_timeout_ms: u64,
	pub search_timeout_ms: u64,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self {
			top_k: 5,
			max_top_k: 50,
			embedding_timeout_ms: 15_000,
			search_timeout_ms: 10_000,
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_collection() -> String {
	"opinions".to_string()
}

fn default_qdrant_timeout_ms() -> u64 {
	10_000
}
