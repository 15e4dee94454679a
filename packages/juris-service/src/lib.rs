pub mod retrieve;

mod error;

pub use error::{Error, Result, Stage};
pub use retrieve::{CaseSummary, ChatContent, ChatRequest, ChatResponse, OpinionResult};

use std::{future::Future, pin::Pin, sync::Arc};

use juris_config::{Config, EmbeddingProviderConfig};
use juris_providers::embedding;
use juris_storage::{
	db::Db,
	models::{CaseRecord, OpinionHit},
	qdrant::QdrantStore,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

/// Nearest-neighbor search over opinion chunks. Hits come back most similar first.
pub trait OpinionIndex
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		vector: Vec<f32>,
		limit: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<OpinionHit>>>;
}

/// Point lookup of case metadata. A missing case is `Ok(None)`, not an error.
pub trait CaseStore
where
	Self: Send + Sync,
{
	fn fetch_case<'a>(
		&'a self,
		case_id: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Option<CaseRecord>>>;
}

#[derive(Clone)]
pub struct Collaborators {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub opinions: Arc<dyn OpinionIndex>,
	pub cases: Arc<dyn CaseStore>,
}
impl Collaborators {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		opinions: Arc<dyn OpinionIndex>,
		cases: Arc<dyn CaseStore>,
	) -> Self {
		Self { embedding, opinions, cases }
	}
}

pub struct JurisService {
	pub cfg: Config,
	pub collaborators: Collaborators,
}
impl JurisService {
	pub fn new(cfg: Config, db: Db, qdrant: QdrantStore) -> Self {
		let collaborators =
			Collaborators::new(Arc::new(HttpEmbedding), Arc::new(qdrant), Arc::new(db));

		Self { cfg, collaborators }
	}

	pub fn with_collaborators(cfg: Config, collaborators: Collaborators) -> Self {
		Self { cfg, collaborators }
	}
}

struct HttpEmbedding;
impl EmbeddingProvider for HttpEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, texts).await?) })
	}
}

impl OpinionIndex for QdrantStore {
	fn search<'a>(
		&'a self,
		vector: Vec<f32>,
		limit: u32,
	) -> BoxFuture<'a, color_eyre::Result<Vec<OpinionHit>>> {
		Box::pin(async move { Ok(self.search_opinions(vector, u64::from(limit)).await?) })
	}
}

impl CaseStore for Db {
	fn fetch_case<'a>(
		&'a self,
		case_id: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Option<CaseRecord>>> {
		Box::pin(async move { Ok(Db::fetch_case(self, case_id).await?) })
	}
}
