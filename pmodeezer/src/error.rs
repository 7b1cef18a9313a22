//! Gestion des erreurs pour le proxy et le client Deezer

use thiserror::Error;

/// Type Result personnalisé pour pmodeezer
pub type Result<T> = std::result::Result<T, DeezerError>;

/// Message renvoyé quand le paramètre `endpoint` manque
pub const ENDPOINT_REQUIRED: &str = "Endpoint parameter is required";

/// Message générique renvoyé sur une erreur de transport
pub const FETCH_FAILED: &str = "Failed to fetch from Deezer API";

/// Code d'erreur Deezer "no data" (ressource inexistante, réponse 200)
const DEEZER_NO_DATA: u32 = 800;

/// Erreurs possibles côté proxy et côté client catalogue
#[derive(Error, Debug)]
pub enum DeezerError {
    /// L'appelant a omis une entrée obligatoire
    #[error("{0}")]
    BadRequest(String),

    /// L'API Deezer a répondu avec un statut non-succès
    #[error("Deezer API returned {status}")]
    Upstream { status: u16 },

    /// Échec réseau/transport ; la cause est journalisée, pas exposée
    #[error("{0}")]
    Internal(String),

    /// Erreur HTTP côté client
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Erreur de parsing JSON
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Erreur renvoyée dans le corps d'une réponse 200 (`{"error": {...}}`)
    #[error("Deezer API error (code {code}): {message}")]
    Api { code: u32, message: String },
}

impl DeezerError {
    /// Statut HTTP correspondant à l'erreur
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Upstream { status } => *status,
            Self::Api { code, .. } if *code == DEEZER_NO_DATA => 404,
            Self::Api { .. } => 502,
            Self::Internal(_) | Self::Http(_) | Self::JsonParse(_) => 500,
        }
    }

    /// Vrai si la ressource demandée n'existe pas (vue "not found")
    pub fn is_not_found(&self) -> bool {
        self.status_code() == 404
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_wire_format() {
        assert_eq!(
            DeezerError::BadRequest(ENDPOINT_REQUIRED.into()).to_string(),
            "Endpoint parameter is required"
        );
        assert_eq!(
            DeezerError::Upstream { status: 404 }.to_string(),
            "Deezer API returned 404"
        );
        assert_eq!(
            DeezerError::Internal(FETCH_FAILED.into()).to_string(),
            "Failed to fetch from Deezer API"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(DeezerError::BadRequest(String::new()).status_code(), 400);
        assert_eq!(DeezerError::Upstream { status: 503 }.status_code(), 503);
        assert_eq!(DeezerError::Internal(String::new()).status_code(), 500);

        let no_data = DeezerError::Api {
            code: 800,
            message: "no data".into(),
        };
        assert!(no_data.is_not_found());
        assert!(DeezerError::Upstream { status: 404 }.is_not_found());
        assert!(!DeezerError::Upstream { status: 500 }.is_not_found());
    }
}
