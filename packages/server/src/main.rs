use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use common::storage::filesystem::FilesystemMediaStore;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{Level, info};

use server::config::AppConfig;
use server::mail::{LogMailer, Mailer, SmtpMailer};
use server::music::HttpMusicProvider;
use server::state::AppState;
use server::{database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = database::init_db(&config.database.url).await?;
    seed::seed_role_permissions(&db).await?;
    seed::ensure_indexes(&db).await?;

    let media = Arc::new(
        FilesystemMediaStore::new(
            config.storage.media_dir.clone().into(),
            config.storage.max_upload_size,
        )
        .await?,
    );
    let music = Arc::new(HttpMusicProvider::new(
        &config.music.api_base,
        &config.music.client_id,
    ));
    let mailer: Arc<dyn Mailer> = if config.mail.enabled {
        Arc::new(SmtpMailer::new(&config.mail)?)
    } else {
        Arc::new(LogMailer)
    };

    let cors = build_cors(&config);
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        db,
        config,
        media,
        music,
        mailer,
    };

    let app = server::build_router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_cors(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors
        .allow_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() {
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.server.cors.max_age))
}
