use axum::{
    Router,
    routing::{get, patch, post},
};
use utoipa_axum::router::OpenApiRouter;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::from(plain_routes())
}

fn plain_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/posts", post_routes())
        .nest("/comments", comment_routes())
        .nest("/support", support_routes())
        .nest("/music", music_routes())
        .nest("/groups", group_routes())
        .nest("/quiz", quiz_routes())
        .nest("/media", media_routes())
        .nest("/admin", admin_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/me", get(handlers::auth::me))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/me",
            patch(handlers::user::update_profile).delete(handlers::user::delete_account),
        )
        .route("/{id}", get(handlers::user::get_user))
}

fn post_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::post::list_posts).post(handlers::post::create_post),
        )
        .route("/mine", get(handlers::post::list_my_posts))
        .route(
            "/{id}",
            get(handlers::post::get_post)
                .patch(handlers::post::update_post)
                .delete(handlers::post::delete_post),
        )
        .route("/{id}/like", post(handlers::post::toggle_like))
        .route(
            "/{id}/comments",
            get(handlers::post::list_comments).post(handlers::post::create_comment),
        )
}

fn comment_routes() -> Router<AppState> {
    Router::new().route(
        "/{id}",
        patch(handlers::post::update_comment).delete(handlers::post::delete_comment),
    )
}

fn support_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tickets",
            get(handlers::support::list_my_tickets).post(handlers::support::create_ticket),
        )
        .route("/tickets/{id}", get(handlers::support::get_ticket))
        .route("/tickets/{id}/close", post(handlers::support::close_ticket))
        .route("/tickets/{id}/read", post(handlers::support::mark_ticket_read))
        .route("/unread-count", get(handlers::support::unread_count))
        .route("/contact", post(handlers::support::contact))
}

fn music_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(handlers::music::search_music))
        .route(
            "/tracks",
            get(handlers::music::list_tracks).post(handlers::music::import_track),
        )
        .route("/tracks/{id}/like", post(handlers::music::toggle_track_like))
        .route("/tracks/{id}/play", post(handlers::music::register_playback))
}

fn group_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::quiz::list_groups))
        .route("/{id}", get(handlers::quiz::get_group))
        .route(
            "/{id}/quiz",
            get(handlers::quiz::get_quiz).post(handlers::quiz::submit_quiz),
        )
}

fn quiz_routes() -> Router<AppState> {
    Router::new().route("/results", get(handlers::quiz::my_results))
}

fn media_routes() -> Router<AppState> {
    let upload = Router::new()
        .route("/", post(handlers::media::upload_media))
        .layer(handlers::media::upload_body_limit());

    Router::new()
        .route("/{hash}", get(handlers::media::serve_media))
        .merge(upload)
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(handlers::admin::list_pending_posts))
        .route("/posts/{id}/moderate", post(handlers::admin::moderate_post))
        .route(
            "/support/tickets",
            get(handlers::support::list_all_tickets),
        )
        .route(
            "/support/tickets/{id}/answer",
            post(handlers::support::answer_ticket),
        )
        .route("/users", get(handlers::admin::list_users))
        .route("/users/{id}/role", patch(handlers::admin::set_user_role))
}
