use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct Asset {
	pub asset_id: Uuid,
	pub owner_id: Uuid,
	pub asset_type: AssetType,
	pub original_file_name: String,
	pub visibility: Visibility,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
	Image,
	Video,
}
impl AssetType {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Image => "image",
			Self::Video => "video",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"image" => Some(Self::Image),
			"video" => Some(Self::Video),
			_ => None,
		}
	}
}

/// Where an asset lives in its owner's library. `Locked` assets are only reachable
/// through an elevated session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
	Timeline,
	Hidden,
	Archive,
	Locked,
}
impl Visibility {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Timeline => "timeline",
			Self::Hidden => "hidden",
			Self::Archive => "archive",
			Self::Locked => "locked",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"timeline" => Some(Self::Timeline),
			"hidden" => Some(Self::Hidden),
			"archive" => Some(Self::Archive),
			"locked" => Some(Self::Locked),
			_ => None,
		}
	}
}
