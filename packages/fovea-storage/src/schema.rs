/// Renders the bootstrap DDL for the tables this crate reads.
///
/// Asset embeddings are written by the external encoder pipeline; this service only
/// needs the tables to exist so a fresh deployment can answer (empty) queries.
pub fn render_schema(vector_dim: u32) -> String {
	format!(
		"\
CREATE EXTENSION IF NOT EXISTS vector;
CREATE TABLE IF NOT EXISTS asset_embeddings (
	asset_id uuid PRIMARY KEY,
	embedding vector({vector_dim}) NOT NULL,
	updated_at timestamptz NOT NULL DEFAULT now()
);
CREATE TABLE IF NOT EXISTS partners (
	shared_by_id uuid NOT NULL,
	shared_with_id uuid NOT NULL,
	in_timeline boolean NOT NULL DEFAULT false,
	created_at timestamptz NOT NULL DEFAULT now(),
	PRIMARY KEY (shared_by_id, shared_with_id)
);"
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn schema_embeds_vector_dimension() {
		let sql = render_schema(512);
		assert!(sql.contains("vector(512)"));
		assert!(sql.contains("asset_embeddings"));
		assert!(sql.contains("partners"));
	}
}
