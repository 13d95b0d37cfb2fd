//! Memory-guided consultation: recall similar past consultations, answer, then remember this one.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use tarot_domain::{
	persona,
	prompt::{self, AstrologyContext, CardSpread, PromptInput},
};

use crate::{APOLOGY, Error, Result, TarotService};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GuidedRequest {
	pub user_id: String,
	pub pergunta: String,
	/// Labels chosen by the caller, e.g. `"O Mago (Direita)"`.
	#[serde(default)]
	pub cartas: Vec<String>,
	#[serde(default)]
	pub astrologia: Map<String, Value>,
	#[serde(default)]
	pub voz_guru: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GuidedResponse {
	pub resposta_guru: String,
}

impl TarotService {
	pub async fn guided(&self, req: GuidedRequest) -> Result<GuidedResponse> {
		let user_id = req.user_id.trim();
		let question = req.pergunta.trim();

		if user_id.is_empty() {
			return Err(Error::InvalidRequest { message: "user_id must be non-empty.".to_string() });
		}
		if question.is_empty() {
			return Err(Error::InvalidRequest {
				message: "pergunta must be non-empty.".to_string(),
			});
		}

		let query_vector = self.embed_or_zero(question).await;
		let recalled = self.recall_memory(user_id, &query_vector).await;
		let history = prompt::fit_history(&recalled, self.cfg.memory.max_history_chars as usize);
		let prompt = prompt::build_prompt(&PromptInput {
			persona: persona::resolve(req.voz_guru.as_deref(), &self.cfg.reading.default_persona),
			question,
			cards: CardSpread::Labels(&req.cartas),
			astrology: AstrologyContext::Raw(&req.astrologia),
			history: Some(&history),
		});
		let Some(resposta_guru) = self.try_complete(&prompt).await else {
			return Ok(GuidedResponse { resposta_guru: APOLOGY.to_string() });
		};
		let consultation = prompt::consultation_text(question, &req.cartas, &req.astrologia);
		let record_vector = self.embed_or_zero(&consultation).await;
		let saved = self.save_memory(user_id, &consultation, &record_vector).await;

		tracing::info!(
			user_id,
			recalled = recalled.len(),
			history = history.len(),
			saved = saved.is_some(),
			"Guided consultation answered."
		);

		Ok(GuidedResponse { resposta_guru })
	}
}
