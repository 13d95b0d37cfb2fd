use rand::{Rng, seq::index};
use serde::{Deserialize, Serialize};

pub const ARCANA_TIER: &str = "Maior";
pub const THREE_CARD_POSITIONS: [&str; 3] = ["Passado", "Presente", "Futuro"];

pub struct Card {
	pub name: &'static str,
	pub meaning: &'static str,
}

pub static MAJOR_ARCANA: [Card; 22] = [
	Card { name: "O Louco", meaning: "Novos começos, espontaneidade, fé no desconhecido" },
	Card { name: "O Mago", meaning: "Manifestação, recursos, poder pessoal" },
	Card { name: "A Sacerdotisa", meaning: "Intuição, sabedoria interior, mistério" },
	Card { name: "A Imperatriz", meaning: "Fertilidade, feminilidade, abundância" },
	Card { name: "O Imperador", meaning: "Autoridade, estrutura, controle" },
	Card { name: "O Hierofante", meaning: "Tradição, conformidade, moralidade" },
	Card { name: "Os Amantes", meaning: "Amor, harmonia, relacionamentos, escolhas" },
	Card { name: "A Carruagem", meaning: "Controle, determinação, direção" },
	Card { name: "A Força", meaning: "Força interior, bravura, compaixão" },
	Card { name: "O Eremita", meaning: "Busca interior, introspecção, orientação" },
	Card { name: "A Roda da Fortuna", meaning: "Boa sorte, karma, ciclos de vida" },
	Card { name: "A Justiça", meaning: "Justiça, fairness, verdade, causa e efeito" },
	Card { name: "O Enforcado", meaning: "Suspensão, restrição, sacrifício" },
	Card { name: "A Morte", meaning: "Fim, transformação, transição" },
	Card { name: "A Temperança", meaning: "Equilíbrio, moderação, paciência" },
	Card { name: "O Diabo", meaning: "Escravidão, materialismo, ignorância" },
	Card { name: "A Torre", meaning: "Mudança súbita, revelação, despertar" },
	Card { name: "A Estrela", meaning: "Esperança, espiritualidade, renovação" },
	Card { name: "A Lua", meaning: "Ilusão, medo, ansiedade, subconsciente" },
	Card { name: "O Sol", meaning: "Alegria, sucesso, vitalidade, iluminação" },
	Card { name: "O Julgamento", meaning: "Julgamento, renascimento, despertar interior" },
	Card { name: "O Mundo", meaning: "Conclusão, realização, viagem" },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawnCard {
	pub nome: String,
	pub arcano: String,
	pub posicao: String,
	pub significado_geral: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
	#[error("Cannot draw {requested} cards from a catalog of {available}.")]
	InvalidCount { requested: usize, available: usize },
}

/// Draws `count` distinct cards in random order and labels their positions.
pub fn draw<R>(count: usize, rng: &mut R) -> Result<Vec<DrawnCard>, DrawError>
where
	R: Rng + ?Sized,
{
	let available = MAJOR_ARCANA.len();

	if count == 0 || count > available {
		return Err(DrawError::InvalidCount { requested: count, available });
	}

	let picks = index::sample(rng, available, count);
	let cards = picks
		.into_iter()
		.enumerate()
		.map(|(slot, catalog_index)| {
			let card = &MAJOR_ARCANA[catalog_index];

			DrawnCard {
				nome: card.name.to_string(),
				arcano: ARCANA_TIER.to_string(),
				posicao: position_label(slot, count),
				significado_geral: card.meaning.to_string(),
			}
		})
		.collect();

	Ok(cards)
}

pub fn position_label(slot: usize, count: usize) -> String {
	if count == THREE_CARD_POSITIONS.len() {
		THREE_CARD_POSITIONS[slot].to_string()
	} else {
		format!("Carta {}", slot + 1)
	}
}
