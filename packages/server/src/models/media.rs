use common::MediaKind;
use serde::Serialize;

/// Result of a media upload. `url` is what post authors put into their
/// media lists; `kind` is the stored classification.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MediaUploadResponse {
    /// Public URL serving the uploaded blob.
    #[schema(example = "/api/v1/media/9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08")]
    pub url: String,
    pub hash: String,
    pub kind: MediaKind,
    pub content_type: String,
    pub size: i64,
}
