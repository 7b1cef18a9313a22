//! Persistance de l'état du lecteur
//!
//! L'état persisté (`playlist`, `recentlyPlayed`, `volume`) est stocké sous
//! forme d'un document JSON unique, sous la clé `player-storage`.
//!
//! Les sauvegardes passent par un [`Persister`] : un thread dédié reçoit les
//! instantanés par un canal et n'écrit que le plus récent quand plusieurs sont
//! en attente. Une mutation du store ne bloque donc jamais sur l'écriture.

use crate::state::PersistedState;
use crate::{Error, Result};
use crossbeam_channel::{Receiver, Sender, unbounded};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{debug, error};

/// Clé de l'enregistrement persistant
pub const STORAGE_KEY: &str = "player-storage";

/// Stockage durable de l'état persisté
pub trait StateStorage: Send + 'static {
    /// Charge l'état, `None` si rien n'a encore été sauvegardé
    fn load(&self) -> Result<Option<PersistedState>>;

    fn save(&self, state: &PersistedState) -> Result<()>;
}

/// Stockage SQLite (table clé/valeur)
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn new(db_path: &Path) -> Result<Self> {
        // Créer le répertoire parent si nécessaire
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::PersistenceError(format!("Failed to create directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path)?;
        Self::with_connection(conn)
    }

    /// Base en mémoire, perdue à la fermeture
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| Error::PersistenceError(format!("Failed to create storage table: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl StateStorage for SqliteStorage {
    fn load(&self) -> Result<Option<PersistedState>> {
        let conn = self.conn.lock().unwrap();
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM storage WHERE key = ?1",
                params![STORAGE_KEY],
                |row| row.get(0),
            )
            .optional()?;

        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO storage (key, value) VALUES (?1, ?2)",
            params![STORAGE_KEY, json],
        )?;
        Ok(())
    }
}

/// Stockage en mémoire ; les clones partagent le même contenu
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    value: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document JSON brut actuellement stocké
    pub fn raw(&self) -> Option<String> {
        self.value.lock().unwrap().clone()
    }

    pub fn set_raw(&self, json: impl Into<String>) {
        *self.value.lock().unwrap() = Some(json.into());
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self) -> Result<Option<PersistedState>> {
        match self.raw() {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        self.set_raw(serde_json::to_string(state)?);
        Ok(())
    }
}

enum Command {
    Save(PersistedState),
    Flush(Sender<()>),
}

/// Sauvegarde asynchrone sur un thread dédié
#[derive(Debug, Clone)]
pub struct Persister {
    tx: Sender<Command>,
}

impl Persister {
    /// Démarre le thread de sauvegarde ; il s'arrête quand le dernier clone est libéré
    pub fn spawn<S: StateStorage>(storage: S) -> Result<Self> {
        let (tx, rx) = unbounded();
        thread::Builder::new()
            .name("pmoplayer-persist".into())
            .spawn(move || run(storage, rx))
            .map_err(|e| Error::PersistenceError(format!("Failed to spawn persister: {}", e)))?;
        Ok(Self { tx })
    }

    /// Planifie une sauvegarde sans attendre
    pub fn save(&self, state: PersistedState) {
        if self.tx.send(Command::Save(state)).is_err() {
            error!("Player persister stopped, state not saved");
        }
    }

    /// Attend que toutes les sauvegardes planifiées soient écrites
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        if self.tx.send(Command::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

fn run<S: StateStorage>(storage: S, rx: Receiver<Command>) {
    while let Ok(first) = rx.recv() {
        let mut latest = None;
        let mut acks = Vec::new();
        let mut coalesced = 0usize;

        let mut next = Some(first);
        while let Some(command) = next {
            match command {
                Command::Save(state) => {
                    if latest.replace(state).is_some() {
                        coalesced += 1;
                    }
                }
                Command::Flush(ack) => acks.push(ack),
            }
            next = rx.try_recv().ok();
        }

        if let Some(state) = latest {
            match storage.save(&state) {
                Ok(()) => debug!(
                    "Player state saved ({} tracks, {} coalesced)",
                    state.playlist.len(),
                    coalesced
                ),
                Err(e) => error!("Failed to save player state: {}", e),
            }
        }

        for ack in acks {
            let _ = ack.send(());
        }
    }
    debug!("Player persister stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::track;

    fn sample() -> PersistedState {
        PersistedState {
            playlist: vec![track(3), track(1), track(2)],
            recently_played: vec![track(2), track(7)],
            volume: 0.35,
        }
    }

    #[test]
    fn test_sqlite_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("player.db");

        let storage = SqliteStorage::new(&path).unwrap();
        assert_eq!(storage.load().unwrap(), None);
        storage.save(&sample()).unwrap();
        drop(storage);

        let reopened = SqliteStorage::new(&path).unwrap();
        assert_eq!(reopened.load().unwrap(), Some(sample()));
    }

    #[test]
    fn test_sqlite_overwrites_single_record() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.save(&sample()).unwrap();

        let mut updated = sample();
        updated.playlist.clear();
        storage.save(&updated).unwrap();

        assert_eq!(storage.load().unwrap(), Some(updated));
    }

    #[test]
    fn test_memory_storage_uses_camel_case_record() {
        let storage = MemoryStorage::new();
        storage.save(&sample()).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&storage.raw().unwrap()).unwrap();
        assert_eq!(raw["volume"], 0.35);
        assert_eq!(raw["recentlyPlayed"][0]["id"], 2);
        assert_eq!(raw["playlist"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_corrupt_record_is_an_error() {
        let storage = MemoryStorage::new();
        storage.set_raw("not json");
        assert!(matches!(storage.load(), Err(Error::Json(_))));
    }

    #[test]
    fn test_persister_keeps_latest_snapshot() {
        let storage = MemoryStorage::new();
        let persister = Persister::spawn(storage.clone()).unwrap();

        for volume in [0.1, 0.2, 0.3] {
            persister.save(PersistedState {
                volume,
                ..PersistedState::default()
            });
        }
        persister.flush();

        assert_eq!(storage.load().unwrap().map(|s| s.volume), Some(0.3));
    }

    #[test]
    fn test_flush_without_pending_saves() {
        let storage = MemoryStorage::new();
        let persister = Persister::spawn(storage.clone()).unwrap();
        persister.flush();
        assert_eq!(storage.raw(), None);
    }
}
