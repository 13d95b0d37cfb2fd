use std::collections::HashSet;

use rand::{SeedableRng, rngs::StdRng};
use serde_json::{Map, Value};

use tarot_domain::{
	astrology::{AstrologyFacts, Placement, normalize_locality},
	cards::{self, DrawError, MAJOR_ARCANA},
	persona,
	prompt::{
		self, AstrologyContext, CardSpread, HISTORY_BULLET, NO_HISTORY_INSTRUCTION, PromptInput,
	},
};

fn sample_facts() -> AstrologyFacts {
	AstrologyFacts {
		sol: Placement { signo: "Gem".to_string(), casa: "10".to_string() },
		lua: Placement { signo: "Lib".to_string(), casa: "2".to_string() },
		ascendente: "Leo".to_string(),
	}
}

fn raw_astrology() -> Map<String, Value> {
	let mut map = Map::new();

	map.insert("sol".to_string(), Value::String("Gêmeos".to_string()));
	map.insert("lua".to_string(), Value::String("Libra".to_string()));
	map.insert("ascendente".to_string(), Value::String("Leão".to_string()));

	map
}

#[test]
fn draws_distinct_cards_for_every_valid_count() {
	let mut rng = StdRng::seed_from_u64(42);

	for count in 1..=MAJOR_ARCANA.len() {
		let drawn = cards::draw(count, &mut rng).expect("draw failed");
		let names: HashSet<_> = drawn.iter().map(|card| card.nome.clone()).collect();
		let positions: HashSet<_> = drawn.iter().map(|card| card.posicao.clone()).collect();

		assert_eq!(drawn.len(), count);
		assert_eq!(names.len(), count);
		assert_eq!(positions.len(), count);
		assert!(drawn.iter().all(|card| card.arcano == "Maior"));
	}
}

#[test]
fn three_card_draw_uses_past_present_future() {
	let mut rng = StdRng::seed_from_u64(1);
	let drawn = cards::draw(3, &mut rng).expect("draw failed");
	let positions: Vec<_> = drawn.iter().map(|card| card.posicao.as_str()).collect();

	assert_eq!(positions, vec!["Passado", "Presente", "Futuro"]);
}

#[test]
fn other_draw_sizes_number_their_positions() {
	let mut rng = StdRng::seed_from_u64(2);
	let drawn = cards::draw(5, &mut rng).expect("draw failed");
	let positions: Vec<_> = drawn.iter().map(|card| card.posicao.as_str()).collect();

	assert_eq!(positions, vec!["Carta 1", "Carta 2", "Carta 3", "Carta 4", "Carta 5"]);
}

#[test]
fn drawn_meanings_come_from_the_catalog() {
	let mut rng = StdRng::seed_from_u64(3);

	for card in cards::draw(3, &mut rng).expect("draw failed") {
		let entry = MAJOR_ARCANA
			.iter()
			.find(|entry| entry.name == card.nome)
			.expect("Drawn card must be in the catalog.");

		assert_eq!(entry.meaning, card.significado_geral);
	}
}

#[test]
fn rejects_draws_outside_the_catalog() {
	let mut rng = StdRng::seed_from_u64(4);

	assert_eq!(
		cards::draw(23, &mut rng),
		Err(DrawError::InvalidCount { requested: 23, available: 22 })
	);
	assert_eq!(
		cards::draw(0, &mut rng),
		Err(DrawError::InvalidCount { requested: 0, available: 22 })
	);
}

#[test]
fn unknown_persona_falls_back_to_default() {
	let fallback = persona::resolve(Some("desconhecida"), persona::DEFAULT_PERSONA);

	assert_eq!(fallback, persona::find("companheira").expect("default persona exists"));
	assert_eq!(persona::resolve(Some(" mistica "), "companheira").nome, "Guru Mística");
	assert_eq!(persona::resolve(None, "sábia").nome, "Guru Sábia");
	assert_eq!(persona::resolve(None, "nope").nome, "Guru Companheira");
	assert_eq!(persona::keys(), vec!["companheira", "mistica", "sábia"]);
}

#[test]
fn normalizes_known_brazilian_localities() {
	assert_eq!(normalize_locality("São Paulo, SP"), "Sao Paulo, Brazil");
	assert_eq!(normalize_locality("Sao Paulo"), "Sao Paulo, Brazil");
	assert_eq!(normalize_locality("Rio de Janeiro, RJ"), "Rio de Janeiro, Brazil");
	assert_eq!(normalize_locality("Curitiba, Brasil"), "Curitiba, Brazil");
	assert_eq!(normalize_locality("Recife, Brazil"), "Recife, Brazil");
	assert_eq!(normalize_locality("Lisboa, Portugal"), "Lisboa, Portugal");
}

#[test]
fn reading_prompt_embeds_cards_and_astrology_verbatim() {
	let mut rng = StdRng::seed_from_u64(5);
	let drawn = cards::draw(3, &mut rng).expect("draw failed");
	let facts = sample_facts();
	let built = prompt::build_prompt(&PromptInput {
		persona: persona::resolve(Some("mistica"), "companheira"),
		question: "Vou mudar de cidade?",
		cards: CardSpread::Drawn(&drawn),
		astrology: AstrologyContext::Facts(&facts),
		history: None,
	});

	assert!(built.system.contains("Guru Mística"));
	assert!(built.system.contains("misteriosa e profunda"));
	assert!(built.user.contains("Vou mudar de cidade?"));

	for card in &drawn {
		assert!(built.user.contains(&format!(
			"- {}: {} - {}",
			card.posicao, card.nome, card.significado_geral
		)));
	}

	assert!(built.user.contains("Sol em Gem (Casa 10)"));
	assert!(built.user.contains("Lua em Lib (Casa 2)"));
	assert!(built.user.contains("Ascendente em Leo"));
	assert!(!built.user.contains(NO_HISTORY_INSTRUCTION));
}

#[test]
fn reading_prompt_omits_astrology_when_absent() {
	let mut rng = StdRng::seed_from_u64(6);
	let drawn = cards::draw(3, &mut rng).expect("draw failed");
	let built = prompt::build_prompt(&PromptInput {
		persona: persona::resolve(None, "companheira"),
		question: "Q",
		cards: CardSpread::Drawn(&drawn),
		astrology: AstrologyContext::None,
		history: None,
	});

	assert!(!built.user.contains("Elementos Astrológicos"));
}

#[test]
fn empty_history_uses_the_fixed_instruction() {
	let labels = vec!["O Mago (Direita)".to_string()];
	let raw = raw_astrology();
	let built = prompt::build_prompt(&PromptInput {
		persona: persona::resolve(None, "companheira"),
		question: "Devo aceitar a proposta?",
		cards: CardSpread::Labels(&labels),
		astrology: AstrologyContext::Raw(&raw),
		history: Some(&[]),
	});

	assert!(built.user.contains(NO_HISTORY_INSTRUCTION));
	assert!(built.user.contains("Cartas Sorteadas (e Posição): O Mago (Direita)"));
	assert!(built.user.contains("Gêmeos"));
}

#[test]
fn history_is_bulleted_in_the_given_order() {
	let history = vec!["primeira consulta".to_string(), "segunda consulta".to_string()];
	let block = prompt::history_block(&history);
	let bullets: Vec<_> = block.lines().filter(|line| line.starts_with(HISTORY_BULLET)).collect();

	assert_eq!(bullets, vec!["- primeira consulta", "- segunda consulta"]);
	assert!(!block.contains(NO_HISTORY_INSTRUCTION));
}

#[test]
fn history_budget_keeps_leading_entries() {
	let history = vec!["abcde".to_string(), "fghij".to_string(), "klmno".to_string()];

	assert_eq!(prompt::fit_history(&history, 100), history);
	assert_eq!(prompt::fit_history(&history, 7), vec!["abcde".to_string(), "fg".to_string()]);
	assert_eq!(prompt::fit_history(&history, 5), vec!["abcde".to_string()]);
	assert!(prompt::fit_history(&history, 0).is_empty());
}

#[test]
fn history_budget_counts_chars_not_bytes() {
	let history = vec!["ção".to_string()];

	assert_eq!(prompt::fit_history(&history, 2), vec!["çã".to_string()]);
}

#[test]
fn consultation_text_joins_question_cards_and_astrology() {
	let labels = vec!["A Roda da Fortuna (Invertida)".to_string(), "O Mago (Direita)".to_string()];
	let text = prompt::consultation_text("Devo aceitar?", &labels, &raw_astrology());

	assert!(text.starts_with(
		"Pergunta: Devo aceitar?. Cartas: A Roda da Fortuna (Invertida), O Mago (Direita). \
		 Astrologia: {"
	));
	assert!(text.contains("\"sol\":\"Gêmeos\""));
}

#[test]
fn catalog_keeps_the_reference_wording() {
	let justica = MAJOR_ARCANA
		.iter()
		.find(|card| card.name == "A Justiça")
		.expect("A Justiça must be in the catalog.");

	assert_eq!(justica.meaning, "Justiça, fairness, verdade, causa e efeito");
}

#[test]
fn caller_astrology_keeps_its_key_order() {
	let labels = vec!["O Mago (Direita)".to_string()];
	let raw = raw_astrology();
	let expected = r#"{"sol":"Gêmeos","lua":"Libra","ascendente":"Leão"}"#;
	let text = prompt::consultation_text("Q", &labels, &raw);
	let built = prompt::build_prompt(&PromptInput {
		persona: persona::resolve(None, "companheira"),
		question: "Q",
		cards: CardSpread::Labels(&labels),
		astrology: AstrologyContext::Raw(&raw),
		history: None,
	});

	assert!(text.ends_with(&format!("Astrologia: {expected}")), "Unexpected text: {text}");
	assert!(built.user.contains(expected));
}
