//! Types d'erreurs pour pmoplayer
//!
//! Les opérations du store ne peuvent pas échouer ; seules la persistance et
//! la lecture audio produisent des erreurs.

/// Erreurs de persistance de l'état du lecteur
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error("Invalid persisted state: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Type Result spécialisé pour pmoplayer
pub type Result<T> = std::result::Result<T, Error>;
