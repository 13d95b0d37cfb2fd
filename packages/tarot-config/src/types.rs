use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub reading: Reading,
	#[serde(default)]
	pub memory: Memory,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// Origins allowed by CORS. `FRONTEND_URL` is appended at load time when set.
	#[serde(default)]
	pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	/// Left blank to read `DATABASE_URL` from the environment.
	#[serde(default)]
	pub dsn: String,
	pub pool_max_conns: u32,
	#[serde(default = "default_acquire_timeout_ms")]
	pub acquire_timeout_ms: u64,
	#[serde(default = "default_statement_timeout_ms")]
	pub statement_timeout_ms: u64,
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub completion: CompletionProviderConfig,
	pub astrology: ProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub max_tokens: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Ephemeris service. An empty `api_key` sends no authorization header.
#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Reading {
	pub draw_count: u32,
	pub default_persona: String,
}
impl Default for Reading {
	fn default() -> Self {
		Self { draw_count: 3, default_persona: "companheira".to_string() }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Memory {
	pub top_k: u32,
	pub match_threshold: f32,
	/// Character budget for the historical-context block of a prompt.
	pub max_history_chars: u32,
	/// Skip retrieval and saving when an embedding degraded to the zero vector.
	pub skip_degraded_embeddings: bool,
}
impl Default for Memory {
	fn default() -> Self {
		Self {
			top_k: 3,
			match_threshold: 0.5,
			max_history_chars: 4_000,
			skip_degraded_embeddings: true,
		}
	}
}

fn default_acquire_timeout_ms() -> u64 {
	5_000
}

fn default_statement_timeout_ms() -> u64 {
	10_000
}
