//! Wrappers that turn external-service failures into safe defaults.
//!
//! None of these return errors. Each failure is logged with the raw cause and replaced by a value
//! the reading can still be built from: a zero vector, an empty history, no astrology, or the
//! fixed apology text.

use uuid::Uuid;

use tarot_domain::{
	astrology::{AstrologyFacts, BirthMoment, BirthRecord},
	prompt::Prompt,
};

use crate::TarotService;

/// Shown to the consulente whenever the completion provider fails.
pub const APOLOGY: &str =
	"Desculpe, não foi possível gerar a interpretação no momento. Tente novamente.";

/// True for the all-zero vector produced when embedding fails.
pub fn is_degraded(vector: &[f32]) -> bool {
	vector.iter().all(|value| *value == 0.0)
}

impl TarotService {
	/// Embeds one text, falling back to `vec![0.0; dimensions]`.
	pub async fn embed_or_zero(&self, text: &str) -> Vec<f32> {
		let cfg = &self.cfg.providers.embedding;
		let dim = cfg.dimensions as usize;
		let texts = [text.to_string()];
		let vector = match self.providers.embedding.embed(cfg, &texts).await {
			Ok(vectors) => vectors.into_iter().next(),
			Err(err) => {
				tracing::warn!(
					error = %err,
					provider = %cfg.provider_id,
					"Embedding failed. Using a zero vector."
				);

				return vec![0.0; dim];
			},
		};

		match vector {
			Some(vector) if vector.len() == dim => vector,
			Some(vector) => {
				tracing::warn!(
					provider = %cfg.provider_id,
					expected = dim,
					actual = vector.len(),
					"Embedding dimension mismatch. Using a zero vector."
				);

				vec![0.0; dim]
			},
			None => {
				tracing::warn!(
					provider = %cfg.provider_id,
					"Embedding provider returned no vectors. Using a zero vector."
				);

				vec![0.0; dim]
			},
		}
	}

	pub async fn recall_memory(&self, user_id: &str, embedding: &[f32]) -> Vec<String> {
		let cfg = &self.cfg.memory;

		if cfg.skip_degraded_embeddings && is_degraded(embedding) {
			tracing::debug!(user_id, "Degraded query embedding. Skipping memory recall.");

			return Vec::new();
		}

		match self.memory.retrieve(user_id, embedding, cfg.top_k, cfg.match_threshold).await {
			Ok(texts) => texts,
			Err(err) => {
				tracing::warn!(
					error = %err,
					user_id,
					"Memory recall failed. Continuing without history."
				);

				Vec::new()
			},
		}
	}

	/// Appends one consultation. Failures are logged at error level and never retried.
	pub async fn save_memory(
		&self,
		user_id: &str,
		consultation_text: &str,
		embedding: &[f32],
	) -> Option<Uuid> {
		if self.cfg.memory.skip_degraded_embeddings && is_degraded(embedding) {
			tracing::warn!(user_id, "Degraded record embedding. Consultation not saved.");

			return None;
		}

		match self.memory.save(user_id, consultation_text, embedding).await {
			Ok(memory_id) => {
				tracing::info!(user_id, %memory_id, "Consultation saved.");

				Some(memory_id)
			},
			Err(err) => {
				tracing::error!(error = %err, user_id, "Failed to save consultation.");

				None
			},
		}
	}

	pub async fn astrology_for(&self, record: &BirthRecord) -> Option<AstrologyFacts> {
		let moment = match BirthMoment::from_record(record) {
			Ok(moment) => moment,
			Err(err) => {
				tracing::warn!(error = %err, "Unusable birth record. Reading without astrology.");

				return None;
			},
		};

		let cfg = &self.cfg.providers.astrology;

		match self.providers.astrology.chart(cfg, &moment).await {
			Ok(facts) => Some(facts),
			Err(err) => {
				tracing::warn!(
					error = %err,
					provider = %cfg.provider_id,
					city = %moment.city,
					"Chart lookup failed. Reading without astrology."
				);

				None
			},
		}
	}

	/// The generated text, or `None` after logging the provider error.
	pub async fn try_complete(&self, prompt: &Prompt) -> Option<String> {
		let cfg = &self.cfg.providers.completion;

		match self.providers.completion.complete(cfg, prompt).await {
			Ok(text) => Some(text),
			Err(err) => {
				tracing::error!(error = %err, provider = %cfg.provider_id, "Completion failed.");

				None
			},
		}
	}

	pub async fn complete_or_apologize(&self, prompt: &Prompt) -> String {
		self.try_complete(prompt).await.unwrap_or_else(|| APOLOGY.to_string())
	}
}
