pub mod fallback;
pub mod guided;
pub mod personas;
pub mod reading;

mod error;

pub use error::{Error, Result};
pub use fallback::{APOLOGY, is_degraded};
pub use guided::{GuidedRequest, GuidedResponse};
pub use personas::PersonaListResponse;
pub use reading::{ReadingRequest, ReadingResponse};

use std::{future::Future, pin::Pin, sync::Arc};

use reqwest::Client;
use uuid::Uuid;

use tarot_config::{CompletionProviderConfig, Config, EmbeddingProviderConfig, ProviderConfig};
use tarot_domain::{
	astrology::{AstrologyFacts, BirthMoment},
	prompt::Prompt,
};
use tarot_providers::{astrology, completion, embedding};
use tarot_storage::{db::Db, memory};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

pub trait CompletionProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a CompletionProviderConfig,
		prompt: &'a Prompt,
	) -> BoxFuture<'a, Result<String>>;
}

pub trait AstrologyProvider
where
	Self: Send + Sync,
{
	fn chart<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		moment: &'a BirthMoment,
	) -> BoxFuture<'a, Result<AstrologyFacts>>;
}

/// Per-user consultation log with similarity recall.
pub trait MemoryStore
where
	Self: Send + Sync,
{
	fn save<'a>(
		&'a self,
		user_id: &'a str,
		consultation_text: &'a str,
		embedding: &'a [f32],
	) -> BoxFuture<'a, Result<Uuid>>;

	/// Texts of the closest past consultations, most similar first.
	fn retrieve<'a>(
		&'a self,
		user_id: &'a str,
		embedding: &'a [f32],
		top_k: u32,
		threshold: f32,
	) -> BoxFuture<'a, Result<Vec<String>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub completion: Arc<dyn CompletionProvider>,
	pub astrology: Arc<dyn AstrologyProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		completion: Arc<dyn CompletionProvider>,
		astrology: Arc<dyn AstrologyProvider>,
	) -> Self {
		Self { embedding, completion, astrology }
	}

	/// HTTP-backed providers sharing one connection pool.
	pub fn from_client(client: Client) -> Self {
		let provider = Arc::new(DefaultProviders { client });

		Self { embedding: provider.clone(), completion: provider.clone(), astrology: provider }
	}
}

pub struct TarotService {
	pub cfg: Config,
	pub providers: Providers,
	pub memory: Arc<dyn MemoryStore>,
}
impl TarotService {
	pub fn new(cfg: Config, db: Db) -> Result<Self> {
		let client = tarot_providers::http_client()?;

		Ok(Self { cfg, providers: Providers::from_client(client), memory: Arc::new(db) })
	}

	pub fn with_providers(cfg: Config, providers: Providers, memory: Arc<dyn MemoryStore>) -> Self {
		Self { cfg, providers, memory }
	}
}

struct DefaultProviders {
	client: Client,
}
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			embedding::embed(&self.client, cfg, texts)
				.await
				.map_err(|err| Error::from_provider(&cfg.provider_id, err))
		})
	}
}

impl CompletionProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a CompletionProviderConfig,
		prompt: &'a Prompt,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move {
			completion::complete(&self.client, cfg, prompt)
				.await
				.map_err(|err| Error::from_provider(&cfg.provider_id, err))
		})
	}
}

impl AstrologyProvider for DefaultProviders {
	fn chart<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		moment: &'a BirthMoment,
	) -> BoxFuture<'a, Result<AstrologyFacts>> {
		Box::pin(async move {
			astrology::chart(&self.client, cfg, moment)
				.await
				.map_err(|err| Error::from_provider(&cfg.provider_id, err))
		})
	}
}

impl MemoryStore for Db {
	fn save<'a>(
		&'a self,
		user_id: &'a str,
		consultation_text: &'a str,
		embedding: &'a [f32],
	) -> BoxFuture<'a, Result<Uuid>> {
		Box::pin(async move {
			let memory_id =
				memory::insert_memory(self, user_id, consultation_text, embedding).await?;

			Ok::<_, Error>(memory_id)
		})
	}

	fn retrieve<'a>(
		&'a self,
		user_id: &'a str,
		embedding: &'a [f32],
		top_k: u32,
		threshold: f32,
	) -> BoxFuture<'a, Result<Vec<String>>> {
		Box::pin(async move {
			let matches =
				memory::match_memories(self, user_id, embedding, threshold, top_k).await?;
			let texts = matches.into_iter().map(|item| item.consultation_text).collect();

			Ok::<Vec<String>, Error>(texts)
		})
	}
}
