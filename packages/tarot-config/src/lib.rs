mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	CompletionProviderConfig, Config, EmbeddingProviderConfig, Memory, Postgres, ProviderConfig,
	Providers, Reading, Service, Storage,
};

use std::{env, fs, path::Path};

/// Cards in the static catalog. A draw can never ask for more.
pub const MAX_DRAW_COUNT: u32 = 22;

pub fn load(path: &Path) -> Result<Config> {
	load_with_env(path, |key| env::var(key).ok())
}

pub fn load_with_env<F>(path: &Path, lookup: F) -> Result<Config>
where
	F: Fn(&str) -> Option<String>,
{
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	apply_env_overrides(&mut cfg, lookup);
	normalize(&mut cfg);
	validate(&cfg)?;

	Ok(cfg)
}

/// Fills secrets left blank in the file from the process environment.
pub fn apply_env_overrides<F>(cfg: &mut Config, lookup: F)
where
	F: Fn(&str) -> Option<String>,
{
	let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

	if let Some(key) = non_blank("OPENAI_API_KEY") {
		if cfg.providers.embedding.api_key.trim().is_empty() {
			cfg.providers.embedding.api_key = key.clone();
		}
		if cfg.providers.completion.api_key.trim().is_empty() {
			cfg.providers.completion.api_key = key;
		}
	}
	if let Some(dsn) = non_blank("DATABASE_URL")
		&& cfg.storage.postgres.dsn.trim().is_empty()
	{
		cfg.storage.postgres.dsn = dsn;
	}
	if let Some(origin) = non_blank("FRONTEND_URL") {
		cfg.service.cors_allowed_origins.push(origin);
	}
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty (or set DATABASE_URL).".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.postgres.acquire_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.acquire_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.postgres.statement_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.statement_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.postgres.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.postgres.vector_dim."
				.to_string(),
		});
	}
	if !cfg.providers.completion.temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.completion.temperature must be a finite number.".to_string(),
		});
	}
	if !(0.0..=2.0).contains(&cfg.providers.completion.temperature) {
		return Err(Error::Validation {
			message: "providers.completion.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}
	if cfg.providers.completion.max_tokens == 0 {
		return Err(Error::Validation {
			message: "providers.completion.max_tokens must be greater than zero.".to_string(),
		});
	}

	for (label, timeout_ms) in [
		("embedding", cfg.providers.embedding.timeout_ms),
		("completion", cfg.providers.completion.timeout_ms),
		("astrology", cfg.providers.astrology.timeout_ms),
	] {
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("providers.{label}.timeout_ms must be greater than zero."),
			});
		}
	}
	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("completion", &cfg.providers.completion.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!(
					"Provider {label} api_key must be non-empty (or set OPENAI_API_KEY)."
				),
			});
		}
	}

	if cfg.reading.draw_count == 0 || cfg.reading.draw_count > MAX_DRAW_COUNT {
		return Err(Error::Validation {
			message: format!("reading.draw_count must be in the range 1-{MAX_DRAW_COUNT}."),
		});
	}
	if cfg.reading.default_persona.trim().is_empty() {
		return Err(Error::Validation {
			message: "reading.default_persona must be non-empty.".to_string(),
		});
	}
	if cfg.memory.top_k == 0 {
		return Err(Error::Validation {
			message: "memory.top_k must be greater than zero.".to_string(),
		});
	}
	if !cfg.memory.match_threshold.is_finite() {
		return Err(Error::Validation {
			message: "memory.match_threshold must be a finite number.".to_string(),
		});
	}
	if !(-1.0..=1.0).contains(&cfg.memory.match_threshold) {
		return Err(Error::Validation {
			message: "memory.match_threshold must be in the range -1.0-1.0.".to_string(),
		});
	}
	if cfg.memory.max_history_chars == 0 {
		return Err(Error::Validation {
			message: "memory.max_history_chars must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let mut origins = Vec::with_capacity(cfg.service.cors_allowed_origins.len());

	for origin in cfg.service.cors_allowed_origins.drain(..) {
		let trimmed = origin.trim().trim_end_matches('/').to_string();

		if !trimmed.is_empty() && !origins.contains(&trimmed) {
			origins.push(trimmed);
		}
	}

	cfg.service.cors_allowed_origins = origins;
	cfg.reading.default_persona = cfg.reading.default_persona.trim().to_string();
}
