use serde::Serialize;

pub const DEFAULT_PERSONA: &str = "companheira";

/// Voice the guru speaks with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Persona {
	pub nome: &'static str,
	pub tom: &'static str,
	pub estilo: &'static str,
	pub linguagem: &'static str,
}

pub static PERSONAS: [(&str, Persona); 3] = [
	(
		"companheira",
		Persona {
			nome: "Guru Companheira",
			tom: "acolhedora e empática",
			estilo: "Como uma amiga sábia que te conhece há anos",
			linguagem: "calorosa, próxima e reconfortante",
		},
	),
	(
		"mistica",
		Persona {
			nome: "Guru Mística",
			tom: "misteriosa e profunda",
			estilo: "Como uma antiga sacerdotisa com conhecimento ancestral",
			linguagem: "poética, simbólica e transcendente",
		},
	),
	(
		"sábia",
		Persona {
			nome: "Guru Sábia",
			tom: "sábia e reflexiva",
			estilo: "Como uma mentora experiente que guia com sabedoria",
			linguagem: "clara, profunda e inspiradora",
		},
	),
];

pub fn find(key: &str) -> Option<&'static Persona> {
	PERSONAS.iter().find(|(candidate, _)| *candidate == key).map(|(_, persona)| persona)
}

/// Looks up `key`, falling back to `default_key` and then to [`DEFAULT_PERSONA`].
pub fn resolve(key: Option<&str>, default_key: &str) -> &'static Persona {
	key.map(str::trim)
		.and_then(find)
		.or_else(|| find(default_key))
		.unwrap_or(&PERSONAS[0].1)
}

pub fn keys() -> Vec<&'static str> {
	PERSONAS.iter().map(|(key, _)| *key).collect()
}
