//! Prompt assembly for readings.
//!
//! Everything here is pure: the same input always renders the same [`Prompt`]. Card names,
//! positions, meanings, astrology facts and retrieved history are embedded verbatim.

use serde_json::{Map, Value};

use crate::{astrology::AstrologyFacts, cards::DrawnCard, persona::Persona};

pub const NO_HISTORY_INSTRUCTION: &str = "O consulente não possui histórico relevante ou é a \
	primeira consulta. Responda de forma completa e genérica.";
pub const HISTORY_HEADER: &str = "--- CONTEXTO HISTÓRICO RECUPERADO (MEMÓRIA) ---";
pub const HISTORY_FOOTER: &str = "--- FIM CONTEXTO HISTÓRICO ---";
pub const HISTORY_BULLET: &str = "- ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
	pub system: String,
	pub user: String,
}

#[derive(Debug, Clone, Copy)]
pub enum CardSpread<'a> {
	/// Cards drawn by this service, with positions and meanings.
	Drawn(&'a [DrawnCard]),
	/// Caller-supplied labels such as `"O Mago (Direita)"`.
	Labels(&'a [String]),
}

#[derive(Debug, Clone, Copy)]
pub enum AstrologyContext<'a> {
	None,
	Facts(&'a AstrologyFacts),
	/// Caller-supplied facts, rendered as JSON.
	Raw(&'a Map<String, Value>),
}

#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
	pub persona: &'a Persona,
	pub question: &'a str,
	pub cards: CardSpread<'a>,
	pub astrology: AstrologyContext<'a>,
	/// `None` when memory is not consulted; `Some(&[])` when it was and found nothing.
	pub history: Option<&'a [String]>,
}

pub fn build_prompt(input: &PromptInput<'_>) -> Prompt {
	Prompt { system: system_prompt(input.persona), user: user_prompt(input) }
}

pub fn system_prompt(persona: &Persona) -> String {
	format!(
		"Você é a {nome}, uma Guru especializada em Tarot e Astrologia, com personalidade {tom}. \
		 Seu estilo é: {estilo}. Sua linguagem é {linguagem}.\n\n\
		 Sua missão é fornecer uma interpretação profunda e personalizada das cartas, sempre \
		 focando no autoconhecimento e no empoderamento do consulente.\n\n\
		 Regras de Interpretação:\n\
		 1. Baseie a interpretação na combinação das cartas e no contexto \
		 astrológico fornecido.\n\
		 2. Se houver um 'Contexto Histórico' fornecido, use-o para dar uma resposta mais \
		 consistente e com memória.\n\
		 3. Mantenha a resposta estruturada em parágrafos, com um tom de conselho e \
		 reflexão.\n\
		 4. Não mencione explicitamente que você é uma IA, a menos que seja perguntado \
		 diretamente.",
		nome = persona.nome,
		tom = persona.tom,
		estilo = persona.estilo,
		linguagem = persona.linguagem,
	)
}

fn user_prompt(input: &PromptInput<'_>) -> String {
	let mut out = String::new();

	if let Some(history) = input.history {
		out.push_str(&history_block(history));
		out.push_str("\n\n");
	}

	out.push_str("--- DADOS DA CONSULTA ATUAL ---\n\n");
	out.push_str(&format!("Pergunta do consulente: \"{}\"\n\n", input.question));

	match input.cards {
		CardSpread::Drawn(cards) => {
			out.push_str("Cartas sorteadas:\n");

			for card in cards {
				out.push_str(&format!(
					"- {}: {} - {}\n",
					card.posicao, card.nome, card.significado_geral
				));
			}
		},
		CardSpread::Labels(labels) => {
			out.push_str(&format!("Cartas Sorteadas (e Posição): {}\n", labels.join(", ")));
		},
	}

	match input.astrology {
		AstrologyContext::None => {},
		AstrologyContext::Facts(facts) => {
			out.push_str("\nElementos Astrológicos:\n");
			out.push_str(&format!("- Sol em {} (Casa {})\n", facts.sol.signo, facts.sol.casa));
			out.push_str(&format!("- Lua em {} (Casa {})\n", facts.lua.signo, facts.lua.casa));
			out.push_str(&format!("- Ascendente em {}\n", facts.ascendente));
		},
		AstrologyContext::Raw(raw) => {
			out.push_str(&format!(
				"\nContexto Astrológico do Consulente: {}\n",
				Value::Object(raw.clone())
			));
		},
	}

	out.push_str(&format!(
		"\nForneça uma interpretação profunda e personalizada, conectando as cartas com a \
		 pergunta e, se disponível, com os elementos astrológicos. Ofereça insights práticos \
		 para a vida da pessoa. Use uma linguagem {}.\n\
		 Estruture sua resposta de forma fluida e natural, como uma conversa íntima.",
		input.persona.linguagem
	));

	out
}

/// Renders retrieved consultations as bullets, or the fixed no-history instruction.
pub fn history_block(history: &[String]) -> String {
	if history.is_empty() {
		return NO_HISTORY_INSTRUCTION.to_string();
	}

	let mut out = String::new();

	out.push_str(HISTORY_HEADER);
	out.push_str(
		"\nO consulente já fez as seguintes consultas ou recebeu os seguintes conselhos:\n",
	);

	for text in history {
		out.push_str(HISTORY_BULLET);
		out.push_str(text);
		out.push('\n');
	}

	out.push_str(HISTORY_FOOTER);
	out.push_str("\nUse este contexto para dar uma resposta mais profunda e consistente.");

	out
}

/// Keeps history entries in order until `max_chars` is spent.
///
/// The entry that crosses the budget is cut at a char boundary; later entries are dropped.
pub fn fit_history(history: &[String], max_chars: usize) -> Vec<String> {
	let mut remaining = max_chars;
	let mut kept = Vec::new();

	for text in history {
		if remaining == 0 {
			break;
		}

		let len = text.chars().count();

		if len <= remaining {
			kept.push(text.clone());

			remaining -= len;
		} else {
			kept.push(text.chars().take(remaining).collect());

			break;
		}
	}

	kept
}

/// The text stored for a consultation: question, card labels and astrology JSON.
pub fn consultation_text(
	question: &str,
	cards: &[String],
	astrology: &Map<String, Value>,
) -> String {
	format!(
		"Pergunta: {question}. Cartas: {}. Astrologia: {}",
		cards.join(", "),
		Value::Object(astrology.clone())
	)
}
