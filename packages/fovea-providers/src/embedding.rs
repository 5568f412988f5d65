use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Encodes a batch of texts against the configured encoder, trying each endpoint in
/// `api_bases` order. The first endpoint that answers wins; a non-success status or
/// transport error moves on to the next one.
pub async fn encode(
	cfg: &fovea_config::EmbeddingProviderConfig,
	texts: &[String],
	language: Option<&str>,
) -> Result<Vec<Vec<f32>>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let headers = crate::auth_headers(&cfg.api_key, &cfg.default_headers)?;
	let mut body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});

	if let Some(language) = language {
		body["language"] = Value::from(language);
	}

	let mut last_error = None;

	for api_base in &cfg.api_bases {
		let url = format!("{}{}", api_base, cfg.path);
		let response =
			client.post(&url).headers(headers.clone()).json(&body).send().await;
		let response = match response.and_then(|res| res.error_for_status()) {
			Ok(res) => res,
			Err(err) => {
				tracing::warn!(endpoint = api_base.as_str(), error = %err, "Encoder endpoint failed.");
				last_error = Some(err.to_string());

				continue;
			},
		};
		let json: Value = response.json().await?;

		return parse_embedding_response(json);
	}

	Err(Error::AllEndpointsFailed { last_error: last_error.unwrap_or_default() })
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json.get("data").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding response is missing data array.".to_string() }
	})?;
	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
			Error::InvalidResponse {
				message: "Embedding item is missing its embedding array.".to_string(),
			}
		})?;
		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
				message: "Embedding value must be numeric.".to_string(),
			})?;

			vec.push(number as f32);
		}

		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_embeddings_in_index_order() {
		let json = serde_json::json!({
			"data": [
				{ "index": 1, "embedding": [2.0, 3.0] },
				{ "index": 0, "embedding": [0.5, 1.5] }
			]
		});
		let parsed = parse_embedding_response(json).expect("Expected embeddings.");
		assert_eq!(parsed.len(), 2);
		assert_eq!(parsed[0], vec![0.5, 1.5]);
		assert_eq!(parsed[1], vec![2.0, 3.0]);
	}

	#[test]
	fn rejects_payload_without_data_array() {
		let json = serde_json::json!({ "embeddings": [] });
		assert!(matches!(
			parse_embedding_response(json),
			Err(Error::InvalidResponse { .. })
		));
	}

	#[test]
	fn rejects_non_numeric_embedding_values() {
		let json = serde_json::json!({
			"data": [{ "index": 0, "embedding": ["a"] }]
		});
		assert!(matches!(
			parse_embedding_response(json),
			Err(Error::InvalidResponse { .. })
		));
	}
}
