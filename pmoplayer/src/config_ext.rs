//! Extension de pmoconfig pour le lecteur

use std::path::PathBuf;

use tracing::{info, warn};

use crate::persistence::SqliteStorage;
use crate::store::PlayerStore;

/// Trait d'extension pour pmoconfig::Config
pub trait PlayerConfigExt {
    /// Chemin de la base SQLite de l'état du lecteur (`player.storage.directory`)
    fn player_db_path(&self) -> anyhow::Result<PathBuf>;
}

impl PlayerConfigExt for pmoconfig::Config {
    fn player_db_path(&self) -> anyhow::Result<PathBuf> {
        // Crée le répertoire s'il n'existe pas
        let dir = self.get_managed_dir(&["player", "storage", "directory"], "player")?;
        Ok(PathBuf::from(dir).join("player.db"))
    }
}

/// Ouvre le store local du client, amorcé depuis sa base SQLite
///
/// Si la base est inaccessible, la session continue sans sauvegarde.
pub fn open_player_store(config: &pmoconfig::Config) -> anyhow::Result<PlayerStore> {
    let db_path = config.player_db_path()?;
    let store = match SqliteStorage::new(&db_path) {
        Ok(storage) => PlayerStore::with_persistence(storage)?,
        Err(e) => {
            warn!(
                "Player state storage unavailable ({}), state will not be saved: {}",
                db_path.display(),
                e
            );
            PlayerStore::new()
        }
    };

    info!(
        "Player ready ({} tracks in playlist, {} recently played)",
        store.playlist().len(),
        store.recently_played().len()
    );
    Ok(store)
}
