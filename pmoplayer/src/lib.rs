//! # pmoplayer - État de lecture et playlist de PMODiscover
//!
//! Cette crate est la source unique de vérité pour la lecture :
//! - Piste courante, lecture/pause, position, durée et volume
//! - Playlist sans doublons et navigation circulaire
//! - Historique des 10 dernières pistes jouées
//! - Persistance de la playlist, de l'historique et du volume (SQLite)
//! - Pilotage d'une sortie audio via [`PlaybackDriver`]
//!
//! # Architecture
//!
//! - **PlayerStore** : handle clonable, injecté là où il est utilisé
//! - **PlayerState** : transitions pures, sans I/O
//! - **Persister** : sauvegardes sur un thread dédié, jamais bloquantes
//! - **PlaybackDriver** : suit les évènements du store et commande une [`AudioOutput`]
//!
//! Chaque client (interface, terminal, lecteur embarqué) crée et possède son
//! propre store, amorcé depuis son propre stockage. Le serveur PMODiscover ne
//! relaie que le catalogue et n'héberge aucun état de lecture.
//!
//! # Exemple d'utilisation
//!
//! ```no_run
//! use pmoplayer::{PlayerStore, SqliteStorage};
//! # use pmodeezer::Track;
//!
//! # fn example(album: Vec<Track>) -> pmoplayer::Result<()> {
//! let storage = SqliteStorage::new("player/player.db".as_ref())?;
//! let store = PlayerStore::with_persistence(storage)?;
//!
//! // Jouer tout un album
//! store.set_playlist(album.clone());
//! store.set_current_track(album[0].clone());
//!
//! store.play_next();
//! store.flush();
//! # Ok(())
//! # }
//! ```

mod error;

pub mod adapter;
pub mod persistence;
pub mod state;
pub mod store;

#[cfg(feature = "pmoconfig")]
mod config_ext;

// Réexports publics
pub use adapter::{AudioOutput, PlayOutcome, PlaybackDriver, PlaybackError, settle_play};
pub use error::{Error, Result};
pub use persistence::{MemoryStorage, Persister, SqliteStorage, StateStorage};
pub use state::{PersistedState, PlayerState};
pub use store::{PlayerEvent, PlayerStore};

#[cfg(feature = "pmoconfig")]
pub use config_ext::{PlayerConfigExt, open_player_store};
