//! Client catalogue passant par le proxy
//!
//! C'est le client utilisé par les vues : chaque appel construit un chemin
//! d'endpoint Deezer, l'encode dans le paramètre `endpoint` et interroge le
//! proxy same-origin. Aucun retry : une erreur remonte telle quelle et la vue
//! affiche un état "introuvable" ou "aucun résultat".

use crate::error::{DeezerError, Result};
use crate::models::{Album, Artist, SearchResult, Track, TrackData};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Timeout côté client
pub const DEFAULT_CLIENT_TIMEOUT_SECS: u64 = 15;

pub const DEFAULT_SEARCH_LIMIT: u32 = 20;
pub const DEFAULT_TOP_TRACKS_LIMIT: u32 = 10;
pub const DEFAULT_CHART_LIMIT: u32 = 20;

/// Client du catalogue via `GET <proxy_url>?endpoint=...`
#[derive(Debug, Clone)]
pub struct DeezerClient {
    client: Client,
    proxy_url: String,
}

impl DeezerClient {
    /// `proxy_url` est l'URL complète du proxy, ex: `http://localhost:8080/api/deezer`
    pub fn new(proxy_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_CLIENT_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_client(client, proxy_url))
    }

    /// Crée un client avec un `reqwest::Client` existant (pool partagé)
    pub fn with_client(client: Client, proxy_url: impl Into<String>) -> Self {
        Self {
            client,
            proxy_url: proxy_url.into(),
        }
    }

    pub fn proxy_url(&self) -> &str {
        &self.proxy_url
    }

    /// Recherche de pistes
    pub async fn search(&self, query: &str, limit: Option<u32>) -> Result<SearchResult> {
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        self.request(&format!(
            "/search?q={}&limit={}",
            urlencoding::encode(query),
            limit
        ))
        .await
    }

    pub async fn get_track(&self, id: u64) -> Result<Track> {
        self.request(&format!("/track/{}", id)).await
    }

    pub async fn get_artist(&self, id: u64) -> Result<Artist> {
        self.request(&format!("/artist/{}", id)).await
    }

    /// Pistes les plus écoutées d'un artiste
    pub async fn get_artist_top_tracks(
        &self,
        id: u64,
        limit: Option<u32>,
    ) -> Result<TrackData<Track>> {
        let limit = limit.unwrap_or(DEFAULT_TOP_TRACKS_LIMIT);
        self.request(&format!("/artist/{}/top?limit={}", id, limit))
            .await
    }

    pub async fn get_album(&self, id: u64) -> Result<Album> {
        self.request(&format!("/album/{}", id)).await
    }

    /// Classement général des pistes
    pub async fn get_chart(&self, limit: Option<u32>) -> Result<TrackData<Track>> {
        let limit = limit.unwrap_or(DEFAULT_CHART_LIMIT);
        self.request(&format!("/chart/0/tracks?limit={}", limit))
            .await
    }

    /// Interroge le proxy et décode la réponse
    async fn request<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        debug!("Requesting {} via {}", endpoint, self.proxy_url);

        let response = self
            .client
            .get(&self.proxy_url)
            .query(&[("endpoint", endpoint)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Request failed for {}: {} {}", endpoint, status, message);
            return Err(match status.as_u16() {
                400 => DeezerError::BadRequest(error_message(&message)),
                500 => DeezerError::Internal(error_message(&message)),
                code => DeezerError::Upstream { status: code },
            });
        }

        let value: Value = response.json().await?;
        check_api_error(&value)?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Extrait `error` d'un corps `{"error": "..."}` renvoyé par le proxy
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// Deezer signale certaines erreurs dans un corps 200 : `{"error": {"code": 800, ...}}`
fn check_api_error(value: &Value) -> Result<()> {
    let Some(error) = value.get("error").filter(|e| e.is_object()) else {
        return Ok(());
    };

    let code = error.get("code").and_then(Value::as_u64).unwrap_or(0) as u32;
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();

    warn!("Deezer API error (code {}): {}", code, message);
    Err(DeezerError::Api { code, message })
}
