use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use juris_config::EmbeddingProviderConfig;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
	data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
	index: Option<usize>,
	embedding: Vec<f32>,
}

/// Embeds `texts` with an OpenAI-compatible `/embeddings` endpoint.
///
/// Vectors are returned in input order, using the response `index` when the provider sends one.
pub async fn embed(cfg: &EmbeddingProviderConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});

	tracing::debug!(
		provider_id = %cfg.provider_id,
		model = %cfg.model,
		inputs = texts.len(),
		"Requesting embeddings."
	);

	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let vectors = parse_embedding_response(json)?;

	if vectors.len() != texts.len() {
		return Err(Error::InvalidResponse {
			message: format!(
				"Embedding response returned {} vectors for {} inputs.",
				vectors.len(),
				texts.len()
			),
		});
	}

	Ok(vectors)
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let response: EmbeddingResponse = serde_json::from_value(json)?;
	let mut indexed = response
		.data
		.into_iter()
		.enumerate()
		.map(|(fallback_index, item)| (item.index.unwrap_or(fallback_index), item.embedding))
		.collect::<Vec<_>>();

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
		let parsed = parse_embedding_response(json).expect("parse failed");

		assert_eq!(parsed, vec![vec![0.5, 1.5], vec![2.0, 3.0]]);
	}

	#[test]
	fn falls_back_to_position_without_index() {
		let json = serde_json::json!({
			"data": [{ "embedding": [1.0] }, { "embedding": [2.0] }]
		});
		let parsed = parse_embedding_response(json).expect("parse failed");

		assert_eq!(parsed, vec![vec![1.0], vec![2.0]]);
	}

	#[test]
	fn rejects_response_without_data() {
		let json = serde_json::json!({ "error": { "message": "quota exceeded" } });

		assert!(matches!(parse_embedding_response(json), Err(Error::SerdeJson(_))));
	}

	#[test]
	fn rejects_non_numeric_embedding_values() {
		let json = serde_json::json!({ "data": [{ "index": 0, "embedding": ["x"] }] });

		assert!(parse_embedding_response(json).is_err());
	}
}
