//! # pmodeezer - Catalogue Deezer pour PMODiscover
//!
//! Cette crate fournit tout ce qui touche au catalogue musical :
//!
//! - `models` : pistes, artistes, albums, résultats de recherche
//! - `proxy` : relais same-origin vers l'API Deezer avec cache de revalidation
//! - `api` : endpoint Axum `GET /api/deezer?endpoint=...` (feature `pmoserver`)
//! - `client` : client catalogue utilisé par les vues, qui passe par le proxy
//! - `format` : formatage des durées et compteurs pour l'affichage
//!
//! ## Structure des modules
//!
//! ```text
//! pmodeezer/
//! ├── src/
//! │   ├── lib.rs          # Module principal (ce fichier)
//! │   ├── proxy.rs        # Relais vers l'API Deezer
//! │   ├── api.rs          # Endpoint HTTP du proxy
//! │   ├── openapi.rs      # Documentation OpenAPI
//! │   ├── client.rs       # Client catalogue via le proxy
//! │   ├── models.rs       # Structures de données
//! │   ├── format.rs       # Formatage pour l'affichage
//! │   ├── config_ext.rs   # Extension pmoconfig
//! │   └── error.rs        # Gestion des erreurs
//! ```
//!
//! ## Exemple : monter le proxy
//!
//! ```rust,no_run
//! use pmodeezer::{DeezerProxy, api::proxy_router};
//! use std::sync::Arc;
//!
//! # fn example() -> pmodeezer::Result<()> {
//! let proxy = Arc::new(DeezerProxy::new()?);
//! let router = axum::Router::new().nest("/api/deezer", proxy_router(proxy));
//! # Ok(())
//! # }
//! ```
//!
//! ## Exemple : interroger le catalogue
//!
//! ```rust,no_run
//! use pmodeezer::DeezerClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = DeezerClient::new("http://localhost:8080/api/deezer")?;
//!     let results = client.search("daft punk", None).await?;
//!     for track in results.data {
//!         println!("{} - {}", track.artist.name, track.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod format;
pub mod models;
pub mod proxy;

#[cfg(feature = "pmoserver")]
pub mod api;
#[cfg(feature = "pmoserver")]
pub mod openapi;

#[cfg(feature = "pmoconfig")]
pub mod config_ext;

pub use client::DeezerClient;
pub use error::{DeezerError, Result};
pub use models::{Album, AlbumArtist, AlbumSummary, Artist, ArtistSummary, SearchResult, Track, TrackData};
pub use proxy::{DeezerProxy, ProxyBuilder};

#[cfg(feature = "pmoserver")]
pub use openapi::ApiDoc;

#[cfg(feature = "pmoconfig")]
pub use config_ext::DeezerConfigExt;
