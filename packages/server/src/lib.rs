pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod mail;
pub mod models;
pub mod music;
pub mod routes;
pub mod seed;
pub mod state;
pub mod utils;

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Сокровища Народов API",
        version = "1.0.0",
        description = "API for the community site about the cultures of the peoples of Russia"
    ),
    tags(
        (name = "Auth", description = "Registration, login and session claims"),
        (name = "Users", description = "Profiles and account lifecycle"),
        (name = "Posts", description = "The moderated community feed"),
        (name = "Comments", description = "Comments on posts"),
        (name = "Support", description = "Support tickets and the contact form"),
        (name = "Music", description = "The imported music catalog"),
        (name = "Ethnic Groups", description = "Static catalog of the peoples"),
        (name = "Quizzes", description = "Per-group quizzes and results"),
        (name = "Media", description = "Media upload and serving"),
        (name = "Admin", description = "Moderation, support and user management"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes())
        .split_for_parts();

    router
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
}
