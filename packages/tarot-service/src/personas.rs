use std::collections::BTreeMap;

use serde::Serialize;

use tarot_domain::persona::{self, PERSONAS, Persona};

#[derive(Clone, Debug, Serialize)]
pub struct PersonaListResponse {
	pub vozes: Vec<&'static str>,
	pub detalhes: BTreeMap<&'static str, Persona>,
}

pub fn list_personas() -> PersonaListResponse {
	PersonaListResponse {
		vozes: persona::keys(),
		detalhes: PERSONAS.iter().map(|(key, persona)| (*key, *persona)).collect(),
	}
}
