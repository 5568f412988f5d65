use std::collections::HashMap;

use uuid::Uuid;

use crate::{Error, Result, db::Db};

/// Fetches the stored embeddings for a batch of asset ids in one query.
///
/// Results come back in request order. Ids with no stored embedding are silently
/// absent; the caller decides whether that is an error. Duplicate ids yield the
/// vector once per occurrence.
pub async fn fetch_embeddings(db: &Db, asset_ids: &[Uuid]) -> Result<Vec<Vec<f32>>> {
	if asset_ids.is_empty() {
		return Ok(Vec::new());
	}

	let rows: Vec<(Uuid, String)> = sqlx::query_as(
		"\
SELECT asset_id, embedding::text
FROM asset_embeddings
WHERE asset_id = ANY($1)",
	)
	.bind(asset_ids)
	.fetch_all(&db.pool)
	.await?;
	let mut by_id = HashMap::with_capacity(rows.len());

	for (asset_id, raw) in rows {
		by_id.insert(asset_id, parse_pg_vector(&raw)?);
	}

	let mut out = Vec::with_capacity(asset_ids.len());

	for asset_id in asset_ids {
		if let Some(vector) = by_id.get(asset_id) {
			out.push(vector.clone());
		}
	}

	Ok(out)
}

/// Renders a vector in pgvector text form. The ingest pipeline that populates
/// `asset_embeddings` is the writer; this crate only reads, so the encoder is
/// kept here purely so it stays in sync with [`parse_pg_vector`].
pub fn vector_to_pg(vec: &[f32]) -> String {
	let mut out = String::with_capacity(vec.len() * 8);

	out.push('[');

	for (i, value) in vec.iter().enumerate() {
		if i > 0 {
			out.push(',');
		}

		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}

pub fn parse_pg_vector(text: &str) -> Result<Vec<f32>> {
	let trimmed = text.trim();
	let without_brackets = trimmed
		.strip_prefix('[')
		.and_then(|s| s.strip_suffix(']'))
		.ok_or_else(|| Error::Decode("Vector text is not bracketed.".to_string()))?;

	if without_brackets.trim().is_empty() {
		return Ok(Vec::new());
	}

	let mut vec = Vec::new();

	for part in without_brackets.split(',') {
		let value: f32 = part
			.trim()
			.parse()
			.map_err(|_| Error::Decode("Vector text contains a non-numeric value.".to_string()))?;

		vec.push(value);
	}

	Ok(vec)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pg_vector_text_round_trips() {
		let vector = vec![0.5, -1.0, 3.25];
		let text = vector_to_pg(&vector);
		assert_eq!(text, "[0.5,-1,3.25]");
		assert_eq!(parse_pg_vector(&text).expect("Expected vector."), vector);
	}

	#[test]
	fn empty_brackets_decode_to_empty_vector() {
		assert!(parse_pg_vector("[]").expect("Expected vector.").is_empty());
	}

	#[test]
	fn unbracketed_text_is_rejected() {
		assert!(matches!(parse_pg_vector("1,2,3"), Err(Error::Decode(_))));
	}

	#[test]
	fn non_numeric_component_is_rejected() {
		assert!(matches!(parse_pg_vector("[1,two,3]"), Err(Error::Decode(_))));
	}
}
