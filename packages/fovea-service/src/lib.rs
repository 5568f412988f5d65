pub mod search;

mod error;

use std::{future::Future, pin::Pin, sync::Arc};

use uuid::Uuid;

pub use error::{Error, Result};
pub use fovea_storage::models::{Asset, AssetType, Visibility};
pub use search::{
	AlbumFacet, AssetFacet, SearchAlbumItem, SearchAssetItem, SmartSearchRequest,
	SmartSearchResponse,
	cache::{CacheKey, TextEmbeddingCache},
};

use fovea_config::{Config, EmbeddingProviderConfig};
use fovea_storage::{
	db::Db,
	embeddings, partners,
	qdrant::{NearestPage, NearestQuery, QdrantStore},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait TextEncoder
where
	Self: Send + Sync,
{
	fn encode_text<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
		language: Option<&'a str>,
	) -> BoxFuture<'a, Result<Vec<f32>>>;
}

/// Batch lookup of stored reference embeddings. Ids are opaque tokens as the
/// user wrote them; each backend decides what an id means and skips the ones it
/// cannot interpret.
pub trait EmbeddingStore
where
	Self: Send + Sync,
{
	fn fetch_embeddings<'a>(
		&'a self,
		asset_ids: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

pub trait PartnerDirectory
where
	Self: Send + Sync,
{
	fn sharing_partner_ids<'a>(&'a self, user_id: Uuid) -> BoxFuture<'a, Result<Vec<Uuid>>>;
}

pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn search_nearest<'a>(&'a self, query: NearestQuery) -> BoxFuture<'a, Result<NearestPage>>;
}

pub trait AccessControl
where
	Self: Send + Sync,
{
	fn require_elevated(&self, auth: &AuthContext) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct AuthContext {
	pub user_id: Uuid,
	/// Whether the session has already passed the elevated-permission check.
	pub elevated: bool,
}

#[derive(Clone)]
pub struct Collaborators {
	pub encoder: Arc<dyn TextEncoder>,
	pub embeddings: Arc<dyn EmbeddingStore>,
	pub partners: Arc<dyn PartnerDirectory>,
	pub index: Arc<dyn VectorIndex>,
	pub access: Arc<dyn AccessControl>,
}

pub struct FoveaService {
	pub cfg: Config,
	pub collaborators: Collaborators,
	text_cache: TextEmbeddingCache,
}

struct HttpEncoder;
impl TextEncoder for HttpEncoder {
	fn encode_text<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
		language: Option<&'a str>,
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(async move {
			let texts = vec![text.to_string()];
			let vectors = fovea_providers::embedding::encode(cfg, &texts, language).await?;
			let Some(vector) = vectors.into_iter().next() else {
				return Err(Error::Provider {
					message: "Encoder returned no vectors.".to_string(),
				});
			};

			Ok(vector)
		})
	}
}

struct PgEmbeddingStore {
	db: Arc<Db>,
}
impl EmbeddingStore for PgEmbeddingStore {
	fn fetch_embeddings<'a>(
		&'a self,
		asset_ids: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			// Asset ids are UUIDs in Postgres. Tokens that do not parse cannot match a
			// row, so they are skipped the same way ids with no stored embedding are.
			let mut ids = Vec::with_capacity(asset_ids.len());

			for raw in asset_ids {
				match Uuid::parse_str(raw) {
					Ok(id) => ids.push(id),
					Err(_) => {
						tracing::warn!(id = raw.as_str(), "Reference id is not an asset id.")
					},
				}
			}

			Ok(embeddings::fetch_embeddings(&self.db, &ids).await?)
		})
	}
}

struct PgPartnerDirectory {
	db: Arc<Db>,
}
impl PartnerDirectory for PgPartnerDirectory {
	fn sharing_partner_ids<'a>(&'a self, user_id: Uuid) -> BoxFuture<'a, Result<Vec<Uuid>>> {
		Box::pin(async move { Ok(partners::sharing_partner_ids(&self.db, user_id).await?) })
	}
}

struct QdrantIndex {
	store: Arc<QdrantStore>,
}
impl VectorIndex for QdrantIndex {
	fn search_nearest<'a>(&'a self, query: NearestQuery) -> BoxFuture<'a, Result<NearestPage>> {
		Box::pin(async move { Ok(self.store.search_nearest(query).await?) })
	}
}

/// Grants elevated access when the session has already been unlocked. The unlock
/// flow itself (PIN verification) lives outside this service.
pub struct SessionAccessControl;
impl AccessControl for SessionAccessControl {
	fn require_elevated(&self, auth: &AuthContext) -> Result<()> {
		if auth.elevated {
			Ok(())
		} else {
			Err(Error::InsufficientPermission {
				message: "An elevated session is required to search locked assets.".to_string(),
			})
		}
	}
}

impl Collaborators {
	pub fn postgres_qdrant(db: Db, qdrant: QdrantStore) -> Self {
		let db = Arc::new(db);

		Self {
			encoder: Arc::new(HttpEncoder),
			embeddings: Arc::new(PgEmbeddingStore { db: db.clone() }),
			partners: Arc::new(PgPartnerDirectory { db }),
			index: Arc::new(QdrantIndex { store: Arc::new(qdrant) }),
			access: Arc::new(SessionAccessControl),
		}
	}
}

impl FoveaService {
	pub fn new(cfg: Config, db: Db, qdrant: QdrantStore) -> Self {
		let collaborators = Collaborators::postgres_qdrant(db, qdrant);

		Self::with_collaborators(cfg, collaborators)
	}

	pub fn with_collaborators(cfg: Config, collaborators: Collaborators) -> Self {
		let text_cache = TextEmbeddingCache::new(cfg.search.text_cache_capacity);

		Self { cfg, collaborators, text_cache }
	}
}
