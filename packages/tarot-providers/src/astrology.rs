use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use tarot_domain::astrology::{AstrologyFacts, BirthMoment, Placement};

use crate::{Error, Result};

/// Asks the ephemeris service for the natal sun, moon and ascendant.
pub async fn chart(
	client: &Client,
	cfg: &tarot_config::ProviderConfig,
	moment: &BirthMoment,
) -> Result<AstrologyFacts> {
	let res = client
		.post(crate::endpoint(&cfg.api_base, &cfg.path))
		.timeout(Duration::from_millis(cfg.timeout_ms))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(moment)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_chart_response(&json)
}

fn parse_chart_response(json: &Value) -> Result<AstrologyFacts> {
	let sol = placement(json, "sun")?;
	let lua = placement(json, "moon")?;
	let ascendente = json
		.get("ascendant")
		.or_else(|| json.get("first_house"))
		.and_then(|value| match value {
			Value::String(sign) => Some(sign.clone()),
			other => other.get("sign").and_then(scalar_text),
		})
		.ok_or_else(|| Error::invalid_response("Chart response is missing the ascendant sign."))?;

	Ok(AstrologyFacts { sol, lua, ascendente })
}

fn placement(json: &Value, body: &str) -> Result<Placement> {
	let entry = json
		.get(body)
		.ok_or_else(|| Error::invalid_response(format!("Chart response is missing {body}.")))?;
	let signo = entry
		.get("sign")
		.and_then(scalar_text)
		.ok_or_else(|| Error::invalid_response(format!("Chart {body} is missing its sign.")))?;
	let casa = entry
		.get("house")
		.and_then(scalar_text)
		.ok_or_else(|| Error::invalid_response(format!("Chart {body} is missing its house.")))?;

	Ok(Placement { signo, casa })
}

// Houses arrive either as labels ("Tenth_House") or as numbers.
fn scalar_text(value: &Value) -> Option<String> {
	match value {
		Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
		Value::Number(number) => Some(number.to_string()),
		_ => None,
	}
}
