use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::shared::double_option;

/// Public profile fields, safe to show to any visitor.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PublicUserResponse {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub region: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::user::Model> for PublicUserResponse {
    fn from(u: crate::entity::user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            display_name: u.display_name,
            avatar_url: u.avatar_url,
            bio: u.bio,
            region: u.region,
            created_at: u.created_at,
        }
    }
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub region: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub avatar_url: Option<Option<String>>,
}

pub fn validate_update_profile(req: &UpdateProfileRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.display_name
        && (name.trim().is_empty() || name.chars().count() > 64)
    {
        return Err(AppError::Validation(
            "Display name must be 1-64 characters".into(),
        ));
    }
    if let Some(Some(ref bio)) = req.bio
        && bio.chars().count() > 1000
    {
        return Err(AppError::Validation(
            "Bio must be at most 1000 characters".into(),
        ));
    }
    if let Some(Some(ref region)) = req.region
        && region.chars().count() > 128
    {
        return Err(AppError::Validation(
            "Region must be at most 128 characters".into(),
        ));
    }
    if let Some(Some(ref url)) = req.avatar_url
        && url.len() > 2048
    {
        return Err(AppError::Validation("Avatar URL is too long".into()));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SetRoleRequest {
    /// One of the seeded roles: `user` or `admin`.
    #[schema(example = "admin")]
    pub role: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminUserListItem {
    pub id: i32,
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::user::Model> for AdminUserListItem {
    fn from(u: crate::entity::user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            display_name: u.display_name,
            email: u.email,
            role: u.role,
            created_at: u.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminUserListResponse {
    pub data: Vec<AdminUserListItem>,
    pub pagination: super::shared::Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct AdminUserListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub search: Option<String>,
}
