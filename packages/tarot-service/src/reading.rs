use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use tarot_domain::{
	astrology::{AstrologyFacts, BirthRecord},
	cards::{self, DrawnCard},
	persona::{self, DEFAULT_PERSONA},
	prompt::{self, AstrologyContext, CardSpread, PromptInput},
};

use crate::{Error, Result, TarotService};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReadingRequest {
	pub pergunta: String,
	#[serde(default)]
	pub dados_nascimento: Option<BirthRecord>,
	#[serde(default = "default_voz_guru")]
	pub voz_guru: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReadingResponse {
	pub cartas: Vec<DrawnCard>,
	pub interpretacao: String,
	pub elementos_astrologicos: Option<AstrologyFacts>,
	#[serde(with = "time::serde::rfc3339")]
	pub timestamp: OffsetDateTime,
}

impl TarotService {
	/// Draws a fresh spread and interprets it. Memory is not consulted.
	pub async fn reading(&self, req: ReadingRequest) -> Result<ReadingResponse> {
		let question = req.pergunta.trim();

		if question.is_empty() {
			return Err(Error::InvalidRequest {
				message: "pergunta must be non-empty.".to_string(),
			});
		}

		let cartas = cards::draw(self.cfg.reading.draw_count as usize, &mut rand::thread_rng())?;
		let elementos_astrologicos = match req.dados_nascimento.as_ref() {
			Some(record) => self.astrology_for(record).await,
			None => None,
		};
		let astrology = match elementos_astrologicos.as_ref() {
			Some(facts) => AstrologyContext::Facts(facts),
			None => AstrologyContext::None,
		};
		let persona =
			persona::resolve(Some(req.voz_guru.as_str()), &self.cfg.reading.default_persona);
		let prompt = prompt::build_prompt(&PromptInput {
			persona,
			question,
			cards: CardSpread::Drawn(&cartas),
			astrology,
			history: None,
		});
		let interpretacao = self.complete_or_apologize(&prompt).await;

		tracing::info!(
			cards = cartas.len(),
			astrology = elementos_astrologicos.is_some(),
			voz_guru = %req.voz_guru,
			"Reading generated."
		);

		Ok(ReadingResponse {
			cartas,
			interpretacao,
			elementos_astrologicos,
			timestamp: OffsetDateTime::now_utc(),
		})
	}
}

fn default_voz_guru() -> String {
	DEFAULT_PERSONA.to_string()
}
