//! Relais vers l'API Deezer
//!
//! Le [`DeezerProxy`] reçoit un chemin d'endpoint logique (`/track/3135556`,
//! `/search?q=...`), le transmet tel quel à l'API Deezer avec un user-agent de
//! navigateur (l'API rejette les requêtes qui n'en ont pas) et renvoie le corps
//! JSON sans le modifier.
//!
//! Les réponses réussies sont gardées dans un cache mémoire pendant la fenêtre
//! de revalidation (300 s par défaut). Pas de retry, pas de coalescence : deux
//! requêtes simultanées identiques interrogent toutes les deux l'API.

use crate::error::{DeezerError, ENDPOINT_REQUIRED, FETCH_FAILED, Result};
use bytes::Bytes;
use moka::future::Cache as MokaCache;
use reqwest::Client;
use serde::de::IgnoredAny;
use std::time::Duration;
use tracing::{debug, error, warn};

/// URL de base de l'API Deezer
pub const DEFAULT_API_BASE: &str = "https://api.deezer.com";

/// User-agent de navigateur envoyé à l'API
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Fenêtre de revalidation des réponses
pub const DEFAULT_REVALIDATE_SECS: u64 = 300;

/// Directive `Cache-Control` posée sur les réponses réussies
pub const CACHE_CONTROL: &str = "public, s-maxage=300, stale-while-revalidate=600";

pub const DEFAULT_CACHE_CAPACITY: u64 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Relais sans état partagé (hors cache) vers l'API Deezer
#[derive(Clone)]
pub struct DeezerProxy {
    client: Client,
    api_base: String,
    cache: Option<MokaCache<String, Bytes>>,
}

impl DeezerProxy {
    /// Crée un proxy avec les réglages par défaut
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> ProxyBuilder {
        ProxyBuilder::default()
    }

    /// Crée un proxy depuis la section `deezer` de la configuration
    #[cfg(feature = "pmoconfig")]
    pub fn from_config(config: &pmoconfig::Config) -> Result<Self> {
        use crate::config_ext::DeezerConfigExt;

        Self::builder()
            .api_base(config.deezer_api_base())
            .user_agent(config.deezer_user_agent())
            .revalidate(config.deezer_revalidate())
            .cache_capacity(config.deezer_cache_capacity())
            .timeout(config.deezer_timeout())
            .build()
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Relaie `endpoint` vers l'API et renvoie le corps JSON brut
    ///
    /// # Erreurs
    ///
    /// - [`DeezerError::BadRequest`] si `endpoint` est absent ou vide
    /// - [`DeezerError::Upstream`] si l'API répond avec un statut non-succès
    /// - [`DeezerError::Internal`] sur échec réseau ou corps non JSON
    pub async fn relay(&self, endpoint: Option<&str>) -> Result<Bytes> {
        let endpoint = endpoint
            .filter(|e| !e.is_empty())
            .ok_or_else(|| DeezerError::BadRequest(ENDPOINT_REQUIRED.to_string()))?;

        if let Some(cache) = &self.cache {
            if let Some(body) = cache.get(endpoint).await {
                debug!("Endpoint {} served from cache", endpoint);
                return Ok(body);
            }
        }

        let url = format!("{}{}", self.api_base, endpoint);
        debug!("Fetching from Deezer API: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!("Deezer API request failed for {}: {}", url, e);
            DeezerError::Internal(FETCH_FAILED.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Deezer API error for {}: {}", url, status);
            return Err(DeezerError::Upstream {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            error!("Failed to read Deezer API body for {}: {}", url, e);
            DeezerError::Internal(FETCH_FAILED.to_string())
        })?;

        // Le corps est relayé tel quel mais doit être du JSON
        if let Err(e) = serde_json::from_slice::<IgnoredAny>(&body) {
            error!("Deezer API returned invalid JSON for {}: {}", url, e);
            return Err(DeezerError::Internal(FETCH_FAILED.to_string()));
        }

        if let Some(cache) = &self.cache {
            cache.insert(endpoint.to_string(), body.clone()).await;
        }

        Ok(body)
    }

    /// Vide le cache de revalidation
    pub fn invalidate_all(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
    }
}

/// Builder du [`DeezerProxy`]
pub struct ProxyBuilder {
    api_base: String,
    user_agent: String,
    revalidate: Duration,
    cache_capacity: u64,
    timeout: Duration,
}

impl Default for ProxyBuilder {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            revalidate: Duration::from_secs(DEFAULT_REVALIDATE_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ProxyBuilder {
    /// URL de base de l'API (sans `/` final)
    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Durée de vie des réponses en cache ; zéro désactive le cache
    pub fn revalidate(mut self, revalidate: Duration) -> Self {
        self.revalidate = revalidate;
        self
    }

    pub fn cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<DeezerProxy> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .build()?;

        let cache = (!self.revalidate.is_zero()).then(|| {
            MokaCache::builder()
                .max_capacity(self.cache_capacity)
                .time_to_live(self.revalidate)
                .build()
        });

        Ok(DeezerProxy {
            client,
            api_base: self.api_base,
            cache,
        })
    }
}
