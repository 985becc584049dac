use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

/// Track metadata as returned by the external music service.
#[derive(Clone, Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RemoteTrack {
    /// Track id at the external service.
    pub source_id: String,
    pub title: String,
    pub artist: String,
    pub artwork_url: Option<String>,
    pub permalink_url: Option<String>,
    pub duration_ms: i64,
}

#[derive(Debug, Error)]
pub enum MusicError {
    #[error("music service request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("music service returned unexpected data: {0}")]
    Unexpected(String),
}

/// Search client for the external music service. The application only ever
/// reads metadata; audio itself stays with the service.
#[async_trait]
pub trait MusicProvider: Send + Sync {
    async fn search(&self, query: &str, limit: u64) -> Result<Vec<RemoteTrack>, MusicError>;

    /// Fetch one track by its id at the service. `None` if it does not exist.
    async fn resolve(&self, source_id: &str) -> Result<Option<RemoteTrack>, MusicError>;
}

/// Wire format of the service's track objects.
#[derive(Deserialize)]
struct ApiTrack {
    id: serde_json::Value,
    title: String,
    user: ApiUser,
    artwork_url: Option<String>,
    permalink_url: Option<String>,
    #[serde(default)]
    duration: i64,
}

#[derive(Deserialize)]
struct ApiUser {
    username: String,
}

#[derive(Deserialize)]
struct SearchPage {
    collection: Vec<ApiTrack>,
}

impl From<ApiTrack> for RemoteTrack {
    fn from(t: ApiTrack) -> Self {
        // The service serializes ids as numbers; tolerate strings too.
        let source_id = match &t.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        RemoteTrack {
            source_id,
            title: t.title,
            artist: t.user.username,
            artwork_url: t.artwork_url,
            permalink_url: t.permalink_url,
            duration_ms: t.duration,
        }
    }
}

/// HTTP implementation over the public search API.
pub struct HttpMusicProvider {
    http: reqwest::Client,
    api_base: String,
    client_id: String,
}

impl HttpMusicProvider {
    pub fn new(api_base: &str, client_id: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
        }
    }
}

#[async_trait]
impl MusicProvider for HttpMusicProvider {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: u64) -> Result<Vec<RemoteTrack>, MusicError> {
        let url = format!("{}/search/tracks", self.api_base);
        let page: SearchPage = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("limit", &limit.to_string()),
                ("client_id", &self.client_id),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(page.collection.into_iter().map(RemoteTrack::from).collect())
    }

    #[instrument(skip(self))]
    async fn resolve(&self, source_id: &str) -> Result<Option<RemoteTrack>, MusicError> {
        let url = format!("{}/tracks/{}", self.api_base, source_id);
        let response = self
            .http
            .get(&url)
            .query(&[("client_id", self.client_id.as_str())])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let track: ApiTrack = response.error_for_status()?.json().await?;
        Ok(Some(track.into()))
    }
}
