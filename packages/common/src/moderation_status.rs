#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Review state of a forum post.
///
/// Every post is created `Pending` and passes through the moderation queue
/// before it can appear in the public feed. When the `sea-orm` feature is
/// enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "PascalCase")]
pub enum ModerationStatus {
    /// Waiting for a moderator's decision.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Pending"))]
    Pending,
    /// Visible in the public feed.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Approved"))]
    Approved,
    /// Declined by a moderator. The post is kept but only its author can see it.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Rejected"))]
    Rejected,
}

impl ModerationStatus {
    /// Returns true if posts with this status belong in the public feed.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Approved)
    }

    /// Returns the string representation (PascalCase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ModerationStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl FromStr for ModerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Approved" => Ok(Self::Approved),
            "Rejected" => Ok(Self::Rejected),
            other => Err(format!(
                "Invalid moderation status '{other}'. Valid values: Pending, Approved, Rejected"
            )),
        }
    }
}
