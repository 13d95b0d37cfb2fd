use std::sync::Arc;

use tarot_service::TarotService;
use tarot_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<TarotService>,
}
impl AppState {
	/// Connects to Postgres, applies the schema and wires the HTTP providers.
	pub async fn new(config: tarot_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(config.storage.postgres.vector_dim).await?;

		let service = TarotService::new(config, db)?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: TarotService) -> Self {
		Self { service: Arc::new(service) }
	}
}
