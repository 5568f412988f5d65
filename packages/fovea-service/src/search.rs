pub mod cache;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::{AuthContext, Error, FoveaService, Result};
use cache::CacheKey;
use fovea_domain::{
	query::{self, ParsedQuery},
	vector,
};
use fovea_storage::{
	models::{AssetType, Visibility},
	qdrant::{NearestQuery, ScoredAsset},
};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SmartSearchRequest {
	pub query: String,
	pub visibility: Visibility,
	pub language: Option<String>,
	pub page: Option<u32>,
	pub size: Option<u32>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SmartSearchResponse {
	pub assets: AssetFacet,
	pub albums: AlbumFacet,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AssetFacet {
	pub total: u64,
	pub count: u64,
	pub items: Vec<SearchAssetItem>,
	pub next_page: Option<String>,
}

/// Smart search answers asset-similarity queries only; the album facet of the
/// envelope is always empty.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct AlbumFacet {
	pub total: u64,
	pub count: u64,
	pub items: Vec<SearchAlbumItem>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SearchAlbumItem {
	pub album_id: Uuid,
	pub album_name: String,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SearchAssetItem {
	pub asset_id: Uuid,
	pub owner_id: Uuid,
	#[serde(rename = "type")]
	pub asset_type: AssetType,
	pub original_file_name: String,
	pub visibility: Visibility,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
	pub score: f32,
}

impl FoveaService {
	/// Resolves a mixed text/`similarTo:` query into one embedding vector and runs a
	/// paginated nearest-neighbor search over the requester's visible owner scope.
	pub async fn smart_search(
		&self,
		auth: &AuthContext,
		req: SmartSearchRequest,
	) -> Result<SmartSearchResponse> {
		// Locked assets are gated before any other work happens.
		if req.visibility == Visibility::Locked {
			self.collaborators.access.require_elevated(auth)?;
		}
		if !self.cfg.search.smart_enabled {
			return Err(Error::FeatureDisabled);
		}

		let parsed = query::parse(&req.query);

		if parsed.is_empty() {
			return Err(Error::QueryNotUnderstood);
		}

		let page = req.page.unwrap_or(1).max(1);
		let size = req.size.unwrap_or(self.cfg.search.default_page_size).max(1);
		// The scope lookup has no data dependency on embedding resolution.
		let (owner_ids, vectors) = tokio::try_join!(
			self.resolve_scope(auth.user_id),
			self.resolve_embeddings(&parsed, req.language.as_deref()),
		)?;
		let vector = vector::combine(vectors)?;
		let result = self
			.collaborators
			.index
			.search_nearest(NearestQuery {
				page,
				size,
				owner_ids,
				visibility: req.visibility,
				vector,
			})
			.await?;

		tracing::debug!(
			text_len = parsed.text.len(),
			reference_count = parsed.reference_ids.len(),
			page,
			size,
			result_count = result.items.len(),
			has_next_page = result.has_next_page,
			"Smart search completed."
		);

		let items: Vec<SearchAssetItem> = result.items.into_iter().map(map_asset).collect();
		let count = items.len() as u64;

		Ok(SmartSearchResponse {
			assets: AssetFacet {
				total: count,
				count,
				items,
				next_page: next_page_token(page, result.has_next_page),
			},
			albums: AlbumFacet::default(),
		})
	}

	async fn resolve_scope(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
		let mut owner_ids = vec![user_id];

		owner_ids.extend(self.collaborators.partners.sharing_partner_ids(user_id).await?);

		Ok(owner_ids)
	}

	/// Produces the embeddings to combine: one per resolvable `similarTo:` reference
	/// (single batch fetch of the tokens as written) plus at most one text embedding
	/// (cache or encoder). Reference vectors always precede the text vector.
	async fn resolve_embeddings(
		&self,
		parsed: &ParsedQuery,
		language: Option<&str>,
	) -> Result<Vec<Vec<f32>>> {
		let references = async {
			if parsed.reference_ids.is_empty() {
				return Ok(Vec::new());
			}

			let vectors =
				self.collaborators.embeddings.fetch_embeddings(&parsed.reference_ids).await?;

			if vectors.len() < parsed.reference_ids.len() {
				tracing::warn!(
					requested = parsed.reference_ids.len(),
					resolved = vectors.len(),
					"Some similarTo references could not be resolved."
				);
			}

			Ok(vectors)
		};
		let text = async {
			if parsed.text.is_empty() {
				Ok(None)
			} else {
				self.resolve_text_embedding(&parsed.text, language).await.map(Some)
			}
		};
		let (mut vectors, text_vector) = tokio::try_join!(references, text)?;

		if let Some(vector) = text_vector {
			vectors.push(vector);
		}
		if vectors.is_empty() {
			return Err(Error::InvalidRequest {
				message: "None of the similarTo references could be resolved.".to_string(),
			});
		}

		Ok(vectors)
	}

	async fn resolve_text_embedding(
		&self,
		text: &str,
		language: Option<&str>,
	) -> Result<Vec<f32>> {
		let cfg = &self.cfg.providers.embedding;
		let key = CacheKey::new(&cfg.model, text, language);

		if let Some(vector) = self.text_cache.get(&key) {
			tracing::debug!(model = cfg.model.as_str(), hit = true, "Text embedding lookup.");

			return Ok(vector);
		}

		tracing::debug!(model = cfg.model.as_str(), hit = false, "Text embedding lookup.");

		let vector = self.collaborators.encoder.encode_text(cfg, text, language).await?;

		if vector.len() != cfg.dimensions as usize {
			return Err(Error::Provider {
				message: format!(
					"Encoder returned a {}-dimensional vector; expected {}.",
					vector.len(),
					cfg.dimensions
				),
			});
		}

		self.text_cache.put(key, vector.clone());

		Ok(vector)
	}
}

fn map_asset(hit: ScoredAsset) -> SearchAssetItem {
	let ScoredAsset { asset, score } = hit;

	SearchAssetItem {
		asset_id: asset.asset_id,
		owner_id: asset.owner_id,
		asset_type: asset.asset_type,
		original_file_name: asset.original_file_name,
		visibility: asset.visibility,
		created_at: asset.created_at,
		updated_at: asset.updated_at,
		score,
	}
}

fn next_page_token(page: u32, has_next_page: bool) -> Option<String> {
	has_next_page.then(|| page.saturating_add(1).to_string())
}
