pub mod auth;
pub mod media;
pub mod music;
pub mod post;
pub mod quiz;
pub mod shared;
pub mod support;
pub mod user;
