use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

/// Calls an OpenAI-style embedding endpoint and returns one unit-norm vector
/// per input text, in input order.
///
/// Any shape mismatch (wrong count, wrong dimension, non-finite values) is an
/// error: a silently misaligned batch would corrupt every downstream score.
pub async fn embed(
	cfg: &strata_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	if texts.is_empty() {
		return Ok(Vec::new());
	}

	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let vectors = parse_embedding_response(json)?;

	validate_batch(vectors, texts.len(), cfg.dimensions as usize)
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json
		.get("data")
		.and_then(|v| v.as_array())
		.ok_or_else(|| eyre::eyre!("Embedding response is missing data array."))?;

	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());
	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item
			.get("embedding")
			.and_then(|v| v.as_array())
			.ok_or_else(|| eyre::eyre!("Embedding item missing embedding array."))?;
		let mut vec = Vec::with_capacity(embedding.len());
		for value in embedding {
			let number =
				value.as_f64().ok_or_else(|| eyre::eyre!("Embedding value must be numeric."))?;
			vec.push(number as f32);
		}
		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}

fn validate_batch(
	vectors: Vec<Vec<f32>>,
	expected_count: usize,
	dimensions: usize,
) -> Result<Vec<Vec<f32>>> {
	if vectors.len() != expected_count {
		return Err(eyre::eyre!(
			"Embedding provider returned {} vectors for {expected_count} inputs.",
			vectors.len()
		));
	}

	vectors
		.into_iter()
		.map(|vec| {
			if vec.len() != dimensions {
				return Err(eyre::eyre!(
					"Embedding vector has dimension {}, expected {dimensions}.",
					vec.len()
				));
			}

			l2_normalize(vec)
		})
		.collect()
}

/// Scales a vector to unit norm so cosine similarity reduces to dot product.
pub fn l2_normalize(mut vec: Vec<f32>) -> Result<Vec<f32>> {
	let norm_sq: f64 = vec.iter().map(|value| f64::from(*value) * f64::from(*value)).sum();

	if !norm_sq.is_finite() {
		return Err(eyre::eyre!("Embedding vector contains non-finite values."));
	}

	let norm = norm_sq.sqrt();

	if norm == 0.0 {
		return Err(eyre::eyre!("Embedding vector has zero norm."));
	}

	for value in &mut vec {
		*value = (f64::from(*value) / norm) as f32;
	}

	Ok(vec)
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
		assert_eq!(parsed.len(), 2);
		assert_eq!(parsed[0], vec![0.5, 1.5]);
		assert_eq!(parsed[1], vec![2.0, 3.0]);
	}

	#[test]
	fn rejects_mismatched_vector_count() {
		let vectors = vec![vec![1.0, 0.0]];
		let err = validate_batch(vectors, 2, 2).expect_err("count mismatch must fail");
		assert!(err.to_string().contains("1 vectors for 2 inputs"));
	}

	#[test]
	fn rejects_wrong_dimension() {
		let vectors = vec![vec![1.0, 0.0, 0.0]];
		let err = validate_batch(vectors, 1, 2).expect_err("dimension mismatch must fail");
		assert!(err.to_string().contains("dimension 3"));
	}

	#[test]
	fn rejects_non_finite_values() {
		assert!(l2_normalize(vec![f32::NAN, 0.0]).is_err());
		assert!(l2_normalize(vec![f32::INFINITY, 0.0]).is_err());
		assert!(l2_normalize(vec![0.0, 0.0]).is_err());
	}

	#[test]
	fn normalizes_to_unit_norm() {
		let vec = l2_normalize(vec![3.0, 4.0]).expect("normalize failed");
		let norm: f32 = vec.iter().map(|value| value * value).sum::<f32>().sqrt();
		assert!((norm - 1.0).abs() < 1e-6, "Unexpected norm: {norm}");
		assert!((vec[0] - 0.6).abs() < 1e-6);
		assert!((vec[1] - 0.8).abs() < 1e-6);
	}
}
