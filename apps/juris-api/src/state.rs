use std::sync::Arc;

use juris_service::JurisService;
use juris_storage::{db::Db, qdrant::QdrantStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<JurisService>,
}
impl AppState {
	pub async fn new(config: juris_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let qdrant = QdrantStore::new(&config.storage.qdrant)?;

		tracing::info!(
			collection = %qdrant.collection,
			vector_dim = qdrant.vector_dim,
			model = %config.providers.embedding.model,
			"Retrieval collaborators ready."
		);

		Ok(Self::from_service(JurisService::new(config, db, qdrant)))
	}

	pub fn from_service(service: JurisService) -> Self {
		Self { service: Arc::new(service) }
	}
}
