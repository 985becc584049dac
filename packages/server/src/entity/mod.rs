pub mod comment;
pub mod media_asset;
pub mod music_track;
pub mod music_track_like;
pub mod post;
pub mod post_like;
pub mod post_media;
pub mod quiz_attempt;
pub mod role;
pub mod role_permission;
pub mod support_ticket;
pub mod user;
