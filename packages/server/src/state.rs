use std::sync::Arc;

use common::storage::MediaStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::mail::Mailer;
use crate::music::MusicProvider;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub media: Arc<dyn MediaStore>,
    pub music: Arc<dyn MusicProvider>,
    pub mailer: Arc<dyn Mailer>,
}
