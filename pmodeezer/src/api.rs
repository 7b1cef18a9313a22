//! Endpoint HTTP du proxy : `GET /api/deezer?endpoint=<chemin encodé>`
//!
//! | Cas                   | Statut            | Corps                                         |
//! |-----------------------|-------------------|-----------------------------------------------|
//! | `endpoint` absent     | 400               | `{"error":"Endpoint parameter is required"}`  |
//! | succès                | 200               | corps Deezer + `Cache-Control`                |
//! | statut Deezer non-2xx | statut Deezer     | `{"error":"Deezer API returned <statut>"}`    |
//! | échec réseau          | 500               | `{"error":"Failed to fetch from Deezer API"}` |

use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::DeezerError;
use crate::proxy::{CACHE_CONTROL, DeezerProxy};

/// Paramètres de la requête proxy
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ProxyParams {
    /// Chemin de l'endpoint Deezer (ex: `/track/3135556`)
    pub endpoint: Option<String>,
}

/// Corps d'erreur renvoyé par le proxy
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Router du proxy, à monter sous `/api/deezer`
pub fn proxy_router(proxy: Arc<DeezerProxy>) -> Router {
    Router::new()
        .route("/", get(relay_endpoint))
        .with_state(proxy)
}

#[utoipa::path(
    get,
    path = "/api/deezer",
    tag = "deezer",
    params(ProxyParams),
    responses(
        (status = 200, description = "Corps JSON relayé depuis l'API Deezer"),
        (status = 400, description = "Paramètre endpoint manquant", body = ErrorResponse),
        (status = 404, description = "Statut non-succès relayé depuis Deezer", body = ErrorResponse),
        (status = 500, description = "Échec de transport vers Deezer", body = ErrorResponse)
    )
)]
pub async fn relay_endpoint(
    State(proxy): State<Arc<DeezerProxy>>,
    Query(params): Query<ProxyParams>,
) -> Result<Response, AppError> {
    let body = proxy.relay(params.endpoint.as_deref()).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CACHE_CONTROL, CACHE_CONTROL),
        ],
        body,
    )
        .into_response())
}

// ============ Gestion des erreurs ============

/// Adaptateur [`DeezerError`] → réponse HTTP `{ "error": ... }`
pub struct AppError(DeezerError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<DeezerError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
