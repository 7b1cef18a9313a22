//! # pmoserver - Serveur HTTP haut niveau basé sur Axum
//!
//! Cette crate regroupe ce dont toutes les briques PMODiscover ont besoin pour
//! exposer des routes : un [`Server`] qui accumule des routers Axum, une
//! documentation OpenAPI/Swagger par API, et le système de logs
//! ([`logs`]) branché sur `tracing`.
//!
//! ## Exemple
//!
//! ```rust,no_run
//! use pmoserver::{ServerBuilder, logs::LoggingOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut server = ServerBuilder::new("MyServer", "localhost", 8080).build();
//!     server.init_logging(LoggingOptions::default()).await;
//!
//!     server
//!         .add_route("/api/status", || async { serde_json::json!({"status": "ok"}) })
//!         .await;
//!
//!     server.start().await?;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{LogState, LoggingOptions};
pub use server::{Server, ServerBuilder, ServerInfo};
