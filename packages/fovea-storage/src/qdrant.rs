use std::collections::HashMap;

use qdrant_client::qdrant::{
	Condition, Filter, Query, QueryPointsBuilder, ScoredPoint, Value, value::Kind,
};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

use crate::{
	Error, Result,
	models::{Asset, AssetType, Visibility},
};

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &fovea_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Runs one paginated nearest-neighbor query. One extra point beyond `size` is
	/// requested so `has_next_page` needs no second round trip.
	pub async fn search_nearest(&self, query: NearestQuery) -> Result<NearestPage> {
		let NearestQuery { page, size, owner_ids, visibility, vector } = query;
		let owner_ids: Vec<String> = owner_ids.iter().map(Uuid::to_string).collect();
		let filter = Filter::all([
			Condition::matches("owner_id", owner_ids),
			Condition::matches("visibility", visibility.as_str().to_string()),
		]);
		let offset = u64::from(page.saturating_sub(1)) * u64::from(size);
		let search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector))
			.filter(filter)
			.with_payload(true)
			.offset(offset)
			.limit(u64::from(size) + 1);
		let response = self.client.query(search).await?;
		let mut points = response.result;
		let has_next_page = points.len() > size as usize;

		points.truncate(size as usize);

		let mut items = Vec::with_capacity(points.len());

		for point in &points {
			items.push(ScoredAsset { score: point.score, asset: parse_asset_payload(point)? });
		}

		Ok(NearestPage { items, has_next_page })
	}
}

#[derive(Clone, Debug)]
pub struct NearestQuery {
	pub page: u32,
	pub size: u32,
	pub owner_ids: Vec<Uuid>,
	pub visibility: Visibility,
	pub vector: Vec<f32>,
}

#[derive(Clone, Debug)]
pub struct ScoredAsset {
	pub asset: Asset,
	pub score: f32,
}

#[derive(Clone, Debug)]
pub struct NearestPage {
	pub items: Vec<ScoredAsset>,
	pub has_next_page: bool,
}

/// Builds the point payload the external encoder pipeline writes for an asset
/// when it upserts into the collection. This crate only reads points; the
/// builder lives next to [`parse_asset_payload`] so the two stay in sync.
pub fn asset_payload(asset: &Asset) -> Result<HashMap<String, Value>> {
	let mut payload = HashMap::new();

	payload.insert("asset_id".to_string(), Value::from(asset.asset_id.to_string()));
	payload.insert("owner_id".to_string(), Value::from(asset.owner_id.to_string()));
	payload.insert("asset_type".to_string(), Value::from(asset.asset_type.as_str()));
	payload
		.insert("original_file_name".to_string(), Value::from(asset.original_file_name.clone()));
	payload.insert("visibility".to_string(), Value::from(asset.visibility.as_str()));
	payload.insert("created_at".to_string(), Value::from(format_timestamp(asset.created_at)?));
	payload.insert("updated_at".to_string(), Value::from(format_timestamp(asset.updated_at)?));

	Ok(payload)
}

pub fn parse_asset_payload(point: &ScoredPoint) -> Result<Asset> {
	let asset_id = parse_uuid(&point.payload, "asset_id")?;
	let owner_id = parse_uuid(&point.payload, "owner_id")?;
	let asset_type_raw = payload_str(&point.payload, "asset_type")?;
	let asset_type = AssetType::parse(&asset_type_raw)
		.ok_or_else(|| Error::Decode(format!("Unknown asset type {asset_type_raw:?}.")))?;
	let visibility_raw = payload_str(&point.payload, "visibility")?;
	let visibility = Visibility::parse(&visibility_raw)
		.ok_or_else(|| Error::Decode(format!("Unknown visibility {visibility_raw:?}.")))?;

	Ok(Asset {
		asset_id,
		owner_id,
		asset_type,
		original_file_name: payload_str(&point.payload, "original_file_name")?,
		visibility,
		created_at: parse_timestamp(&point.payload, "created_at")?,
		updated_at: parse_timestamp(&point.payload, "updated_at")?,
	})
}

fn payload_str(payload: &HashMap<String, Value>, key: &str) -> Result<String> {
	match payload.get(key).and_then(|value| value.kind.as_ref()) {
		Some(Kind::StringValue(raw)) => Ok(raw.clone()),
		_ => Err(Error::Decode(format!("Point payload is missing string field {key:?}."))),
	}
}

fn parse_uuid(payload: &HashMap<String, Value>, key: &str) -> Result<Uuid> {
	let raw = payload_str(payload, key)?;

	Uuid::parse_str(&raw).map_err(|_| Error::Decode(format!("Field {key:?} is not a UUID.")))
}

fn parse_timestamp(payload: &HashMap<String, Value>, key: &str) -> Result<OffsetDateTime> {
	let raw = payload_str(payload, key)?;

	OffsetDateTime::parse(&raw, &Rfc3339)
		.map_err(|_| Error::Decode(format!("Field {key:?} is not an RFC 3339 timestamp.")))
}

fn format_timestamp(value: OffsetDateTime) -> Result<String> {
	value.format(&Rfc3339).map_err(|err| Error::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_asset() -> Asset {
		Asset {
			asset_id: Uuid::new_v4(),
			owner_id: Uuid::new_v4(),
			asset_type: AssetType::Image,
			original_file_name: "IMG_0001.jpg".to_string(),
			visibility: Visibility::Timeline,
			created_at: OffsetDateTime::from_unix_timestamp(1_700_000_000)
				.expect("Valid timestamp."),
			updated_at: OffsetDateTime::from_unix_timestamp(1_700_000_100)
				.expect("Valid timestamp."),
		}
	}

	#[test]
	fn payload_round_trips_to_asset() {
		let asset = sample_asset();
		let point = ScoredPoint {
			payload: asset_payload(&asset).expect("Expected payload."),
			score: 0.87,
			..Default::default()
		};
		let parsed = parse_asset_payload(&point).expect("Expected asset.");
		assert_eq!(parsed.asset_id, asset.asset_id);
		assert_eq!(parsed.owner_id, asset.owner_id);
		assert_eq!(parsed.asset_type, asset.asset_type);
		assert_eq!(parsed.original_file_name, asset.original_file_name);
		assert_eq!(parsed.visibility, asset.visibility);
		assert_eq!(parsed.created_at, asset.created_at);
		assert_eq!(parsed.updated_at, asset.updated_at);
	}

	#[test]
	fn missing_payload_field_is_a_decode_error() {
		let asset = sample_asset();
		let mut payload = asset_payload(&asset).expect("Expected payload.");
		payload.remove("owner_id");

		let point = ScoredPoint { payload, ..Default::default() };
		assert!(matches!(parse_asset_payload(&point), Err(Error::Decode(_))));
	}
}
