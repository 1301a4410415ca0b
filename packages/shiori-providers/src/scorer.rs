use std::time::Duration;

use color_eyre::{Result, eyre};
use regex::Regex;
use reqwest::Client;
use serde_json::Value;

use shiori_domain::score::clamp_score;

/// Sends one chat-completion scoring request and returns the 0-100 answer.
/// Prompt construction lives with the caller; this adapter only moves bytes
/// and parses the reply.
pub async fn score(cfg: &shiori_config::ScorerProviderConfig, messages: &[Value]) -> Result<u8> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": messages,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_score_response(&json)
}

fn parse_score_response(json: &Value) -> Result<u8> {
	let content = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.ok_or_else(|| eyre::eyre!("Score response is missing message content."))?;

	parse_score_text(content)
}

fn parse_score_text(content: &str) -> Result<u8> {
	// Models pad the answer with prose; take the first integer they emit.
	let matched = Regex::new(r"-?\d+")?
		.find(content)
		.ok_or_else(|| eyre::eyre!("Score response contains no integer."))?;
	let value: i64 = matched.as_str().parse()?;

	Ok(clamp_score(value))
}

#[cfg(test)]
mod tests {
	use super::{parse_score_response, parse_score_text};

	#[test]
	fn parses_bare_integer_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": "87" } }
			]
		});

		assert_eq!(parse_score_response(&json).expect("parse failed"), 87);
	}

	#[test]
	fn parses_integer_out_of_surrounding_prose() {
		assert_eq!(parse_score_text("Score: 42 out of 100.").expect("parse failed"), 42);
		assert_eq!(parse_score_text("I'd say\n73").expect("parse failed"), 73);
	}

	#[test]
	fn clamps_out_of_range_answers() {
		assert_eq!(parse_score_text("150").expect("parse failed"), 100);
		assert_eq!(parse_score_text("-3").expect("parse failed"), 0);
	}

	#[test]
	fn rejects_content_without_an_integer() {
		assert!(parse_score_text("no idea").is_err());
	}

	#[test]
	fn rejects_response_without_content() {
		let json = serde_json::json!({ "choices": [] });

		assert!(parse_score_response(&json).is_err());
	}
}
