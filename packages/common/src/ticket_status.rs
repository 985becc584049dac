#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a support ticket.
///
/// Legal transitions: `Pending -> Answered -> Closed` and `Pending -> Closed`
/// (the user withdraws). `Closed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "PascalCase")]
pub enum TicketStatus {
    /// Submitted, waiting for a support answer.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Pending"))]
    Pending,
    /// Answered by support; the user has a reply to read.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Answered"))]
    Answered,
    /// Finished. No further transitions.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Closed"))]
    Closed,
}

impl TicketStatus {
    /// Returns true if the ticket still counts toward open-ticket badges.
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Returns the string representation (PascalCase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Answered => "Answered",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for TicketStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Answered" => Ok(Self::Answered),
            "Closed" => Ok(Self::Closed),
            other => Err(format!(
                "Invalid ticket status '{other}'. Valid values: Pending, Answered, Closed"
            )),
        }
    }
}
