use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use tarot_domain::prompt::Prompt;

use crate::{Error, Result};

/// Sends a system + user chat request and returns the first choice's text.
pub async fn complete(
	client: &Client,
	cfg: &tarot_config::CompletionProviderConfig,
	prompt: &Prompt,
) -> Result<String> {
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
		"messages": [
			{ "role": "system", "content": prompt.system },
			{ "role": "user", "content": prompt.user },
		],
	});
	let res = client
		.post(crate::endpoint(&cfg.api_base, &cfg.path))
		.timeout(Duration::from_millis(cfg.timeout_ms))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_completion_response(&json)
}

fn parse_completion_response(json: &Value) -> Result<String> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| Error::invalid_response("Completion response is missing choice content."))?;
	let trimmed = content.trim();

	if trimmed.is_empty() {
		return Err(Error::invalid_response("Completion content is empty."));
	}

	Ok(trimmed.to_string())
}
