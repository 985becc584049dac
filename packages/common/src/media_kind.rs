#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a media attachment on a post.
///
/// The kind is decided once, at upload time, from the declared MIME type and
/// stored alongside the URL. Read paths never guess from file extensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "PascalCase")]
pub enum MediaKind {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Image"))]
    Image,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Video"))]
    Video,
}

impl MediaKind {
    /// Classify a MIME type. Returns `None` for anything that is neither
    /// an image nor a video.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let top = mime.split('/').next().unwrap_or("");
        match top {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Video => "Video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
