//! Extension de pmoconfig pour la section `deezer`

use crate::proxy::{
    DEFAULT_API_BASE, DEFAULT_CACHE_CAPACITY, DEFAULT_REVALIDATE_SECS, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};
use std::time::Duration;

/// Trait d'extension pour pmoconfig::Config
pub trait DeezerConfigExt {
    /// URL de base de l'API Deezer (`deezer.api_base`)
    fn deezer_api_base(&self) -> String;
    /// User-agent envoyé à l'API (`deezer.user_agent`)
    fn deezer_user_agent(&self) -> String;
    /// Fenêtre de revalidation du cache (`deezer.revalidate_secs`)
    fn deezer_revalidate(&self) -> Duration;
    /// Nombre maximal de réponses en cache (`deezer.cache_capacity`)
    fn deezer_cache_capacity(&self) -> u64;
    /// Timeout des requêtes vers l'API (`deezer.timeout_secs`)
    fn deezer_timeout(&self) -> Duration;
}

impl DeezerConfigExt for pmoconfig::Config {
    fn deezer_api_base(&self) -> String {
        self.get_string(&["deezer", "api_base"])
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
    }

    fn deezer_user_agent(&self) -> String {
        self.get_string(&["deezer", "user_agent"])
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }

    fn deezer_revalidate(&self) -> Duration {
        Duration::from_secs(
            self.get_u64(&["deezer", "revalidate_secs"])
                .unwrap_or(DEFAULT_REVALIDATE_SECS),
        )
    }

    fn deezer_cache_capacity(&self) -> u64 {
        self.get_u64(&["deezer", "cache_capacity"])
            .unwrap_or(DEFAULT_CACHE_CAPACITY)
    }

    fn deezer_timeout(&self) -> Duration {
        Duration::from_secs(
            self.get_u64(&["deezer", "timeout_secs"])
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
    }
}
