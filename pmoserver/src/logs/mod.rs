//! Journalisation : initialisation de `tracing`, tampon circulaire et routes HTTP
//!
//! Les évènements passent par un filtre de niveau rechargeable, puis par
//! [`BufferLayer`] qui les conserve dans un [`LogState`] et les diffuse aux
//! abonnés SSE. La sortie console est optionnelle.

mod layer;

pub use layer::BufferLayer;

use std::{
    collections::VecDeque,
    convert::Infallible,
    sync::{Arc, RwLock},
};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};
use tracing::Level;
use tracing_subscriber::{
    Registry, filter::LevelFilter, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

const LEVEL_NAMES: [&str; 5] = ["ERROR", "WARN", "INFO", "DEBUG", "TRACE"];

/// Une entrée du journal
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub target: String,
    pub message: String,
}

/// Tampon circulaire partagé et canal de diffusion
#[derive(Clone)]
pub struct LogState {
    buffer: Arc<RwLock<VecDeque<LogEntry>>>,
    capacity: usize,
    tx: broadcast::Sender<LogEntry>,
    max_level: Arc<RwLock<Level>>,
    reload_handle: Option<reload::Handle<LevelFilter, Registry>>,
}

impl LogState {
    /// Crée un état sans filtre rechargeable (tests, sous-systèmes isolés)
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
            tx: broadcast::channel(1024).0,
            max_level: Arc::new(RwLock::new(Level::TRACE)),
            reload_handle: None,
        }
    }

    fn with_reload(
        capacity: usize,
        level: Level,
        reload_handle: reload::Handle<LevelFilter, Registry>,
    ) -> Self {
        let mut state = Self::new(capacity);
        *state.max_level.write().unwrap() = level;
        state.reload_handle = Some(reload_handle);
        state
    }

    /// Change le niveau minimum, y compris pour le filtre actif
    pub fn set_max_level(&self, level: Level) {
        *self.max_level.write().unwrap() = level;

        if let Some(handle) = &self.reload_handle {
            if let Err(e) = handle.reload(LevelFilter::from_level(level)) {
                eprintln!("Failed to reload log level filter: {}", e);
            }
        }
    }

    pub fn get_max_level(&self) -> Level {
        *self.max_level.read().unwrap()
    }

    pub(crate) fn push(&self, entry: LogEntry) {
        let mut buf = self.buffer.write().unwrap();
        while buf.len() >= self.capacity {
            buf.pop_front();
        }
        buf.push_back(entry.clone());
        drop(buf);
        let _ = self.tx.send(entry);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.tx.subscribe()
    }

    pub fn dump(&self) -> Vec<LogEntry> {
        self.buffer.read().unwrap().iter().cloned().collect()
    }
}

/// Options d'initialisation du logging
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Nombre d'entrées conservées en mémoire
    pub buffer_capacity: usize,
    /// Sortie console en plus du tampon
    pub enable_console: bool,
    /// Niveau minimum initial
    pub min_level: Level,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            buffer_capacity: 1000,
            enable_console: true,
            min_level: Level::INFO,
        }
    }
}

impl LoggingOptions {
    /// Lit `host.logger.*` depuis la configuration globale
    pub fn from_config(config: &pmoconfig::Config) -> Self {
        Self {
            buffer_capacity: config.get_log_buffer_capacity() as usize,
            enable_console: config.get_log_enable_console(),
            min_level: string_to_level(&config.get_log_min_level()).unwrap_or(Level::INFO),
        }
    }
}

/// Installe le subscriber global et retourne le [`LogState`] associé
///
/// Si un subscriber global est déjà installé (tests), l'état est retourné
/// quand même mais ne reçoit rien de `tracing`.
pub fn init_logging(options: LoggingOptions) -> LogState {
    let (filter, reload_handle) = reload::Layer::new(LevelFilter::from_level(options.min_level));
    let log_state =
        LogState::with_reload(options.buffer_capacity, options.min_level, reload_handle);

    let console = options.enable_console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
    });

    // Le filtre doit précéder les autres couches
    let result = Registry::default()
        .with(filter)
        .with(BufferLayer::new(log_state.clone()))
        .with(console)
        .try_init();

    if let Err(e) = result {
        eprintln!("Global tracing subscriber already set: {}", e);
    }

    log_state
}

/// Paramètres de /log-sse
#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    #[serde(default)]
    pub error: Option<bool>,
    #[serde(default)]
    pub warn: Option<bool>,
    #[serde(default)]
    pub info: Option<bool>,
    #[serde(default)]
    pub debug: Option<bool>,
    #[serde(default)]
    pub trace: Option<bool>,
    #[serde(default)]
    pub search: Option<String>,
}

impl LogQuery {
    fn requested_levels(&self) -> Vec<&'static str> {
        [
            (self.error, "ERROR"),
            (self.warn, "WARN"),
            (self.info, "INFO"),
            (self.debug, "DEBUG"),
            (self.trace, "TRACE"),
        ]
        .into_iter()
        .filter_map(|(flag, name)| flag.unwrap_or(false).then_some(name))
        .collect()
    }

    /// Aucun drapeau de niveau = tous les niveaux
    fn matches(&self, entry: &LogEntry) -> bool {
        let levels = self.requested_levels();
        let level_ok = levels.is_empty() || levels.iter().any(|l| entry.level.eq_ignore_ascii_case(l));

        let search_ok = match &self.search {
            Some(s) => entry.message.contains(s.as_str()) || entry.target.contains(s.as_str()),
            None => true,
        };

        level_ok && search_ok
    }
}

/// GET /log-sse : historique puis flux temps réel
pub async fn log_sse(State(state): State<LogState>, Query(query): Query<LogQuery>) -> Response {
    let live = BroadcastStream::new(state.subscribe()).filter_map(|r| r.ok());
    let history = tokio_stream::iter(state.dump());

    let stream = history.chain(live).filter_map(move |entry| {
        if !query.matches(&entry) || !is_level_allowed(&entry.level, state.get_max_level()) {
            return None;
        }
        serde_json::to_string(&entry)
            .ok()
            .map(|json| Ok::<_, Infallible>(Event::default().data(json)))
    });

    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// GET /log-dump : contenu du tampon en JSON
pub async fn log_dump(State(state): State<LogState>) -> Json<Vec<LogEntry>> {
    Json(state.dump())
}

fn is_level_allowed(log_level: &str, max_level: Level) -> bool {
    // tracing ordonne TRACE > DEBUG > ... > ERROR
    string_to_level(log_level).is_some_and(|level| level <= max_level)
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LogSetupRequest {
    pub level: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LogSetupResponse {
    pub current_level: String,
    pub available_levels: Vec<String>,
}

impl LogSetupResponse {
    fn for_level(level: Level) -> Self {
        Self {
            current_level: level.as_str().to_string(),
            available_levels: LEVEL_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/log_setup",
    responses(
        (status = 200, description = "Current log level", body = LogSetupResponse)
    ),
    tag = "logs"
)]
pub async fn log_setup_get(State(state): State<LogState>) -> Json<LogSetupResponse> {
    Json(LogSetupResponse::for_level(state.get_max_level()))
}

#[utoipa::path(
    post,
    path = "/log_setup",
    request_body = LogSetupRequest,
    responses(
        (status = 200, description = "Log level updated", body = LogSetupResponse),
        (status = 400, description = "Unknown log level")
    ),
    tag = "logs"
)]
pub async fn log_setup_post(
    State(state): State<LogState>,
    Json(payload): Json<LogSetupRequest>,
) -> Response {
    let Some(level) = string_to_level(&payload.level) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": format!("Invalid log level. Must be one of: {}", LEVEL_NAMES.join(", "))
            })),
        )
            .into_response();
    };

    state.set_max_level(level);
    tracing::info!("Log level changed to {}", level);

    Json(LogSetupResponse::for_level(level)).into_response()
}

pub(crate) fn string_to_level(s: &str) -> Option<Level> {
    match s.to_uppercase().as_str() {
        "ERROR" => Some(Level::ERROR),
        "WARN" => Some(Level::WARN),
        "INFO" => Some(Level::INFO),
        "DEBUG" => Some(Level::DEBUG),
        "TRACE" => Some(Level::TRACE),
        _ => None,
    }
}

/// Router de l'API de niveau de log (monté sous `/api/logs`)
pub fn create_logs_router(log_state: LogState) -> Router {
    Router::new()
        .route("/log_setup", get(log_setup_get).post(log_setup_post))
        .with_state(log_state)
}

#[derive(utoipa::OpenApi)]
#[openapi(
    paths(log_setup_get, log_setup_post),
    components(schemas(LogSetupRequest, LogSetupResponse, LogEntry)),
    tags(
        (name = "logs", description = "Log level configuration endpoints")
    )
)]
pub struct LogsApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: &str, target: &str, message: &str) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            level: level.to_string(),
            target: target.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_buffer_is_bounded() {
        let state = LogState::new(3);
        for i in 0..5 {
            state.push(entry("INFO", "t", &format!("m{}", i)));
        }
        let dump = state.dump();
        assert_eq!(dump.len(), 3);
        assert_eq!(dump[0].message, "m2");
        assert_eq!(dump[2].message, "m4");
    }

    #[test]
    fn test_query_without_flags_accepts_everything() {
        let query = LogQuery::default();
        assert!(query.matches(&entry("TRACE", "pmodeezer", "x")));
        assert!(query.matches(&entry("ERROR", "pmoplayer", "y")));
    }

    #[test]
    fn test_query_filters_levels_and_search() {
        let query = LogQuery {
            warn: Some(true),
            search: Some("upstream".into()),
            ..Default::default()
        };
        assert!(query.matches(&entry("WARN", "pmodeezer::proxy", "upstream returned 404")));
        assert!(!query.matches(&entry("INFO", "pmodeezer::proxy", "upstream returned 404")));
        assert!(!query.matches(&entry("WARN", "pmoplayer", "save failed")));
    }

    #[test]
    fn test_level_ordering() {
        assert!(is_level_allowed("ERROR", Level::INFO));
        assert!(is_level_allowed("INFO", Level::INFO));
        assert!(!is_level_allowed("DEBUG", Level::INFO));
        assert!(!is_level_allowed("bogus", Level::TRACE));
    }

    #[test]
    fn test_set_max_level_without_reload_handle() {
        let state = LogState::new(10);
        state.set_max_level(Level::WARN);
        assert_eq!(state.get_max_level(), Level::WARN);
    }
}
