//! État du lecteur et transitions pures
//!
//! [`PlayerState`] porte toute la logique de lecture/playlist sans I/O ni
//! notification ; chaque transition renvoie les [`Changes`] qu'elle a
//! produites, que le store traduit en évènements et en sauvegardes.

use pmodeezer::Track;
use serde::{Deserialize, Serialize};

/// Volume initial et volume restauré quand on coupe le mode muet
pub const DEFAULT_VOLUME: f64 = 0.7;

/// Nombre maximal d'entrées dans l'historique
pub const RECENTLY_PLAYED_LIMIT: usize = 10;

/// Index quand la piste courante n'est pas dans la playlist
pub const NO_INDEX: i64 = -1;

/// État complet du lecteur
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub current_track: Option<Track>,
    pub is_playing: bool,
    /// Position de lecture en secondes
    pub progress: f64,
    /// Volume dans [0, 1], non borné par le store
    pub volume: f64,
    /// Durée en secondes rapportée par la sortie audio, 0 avant chargement
    pub duration: f64,
    pub playlist: Vec<Track>,
    /// Position de `current_track` dans `playlist`, ou -1
    pub current_index: i64,
    /// Plus récente en tête, ids uniques
    pub recently_played: Vec<Track>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            current_track: None,
            is_playing: false,
            progress: 0.0,
            volume: DEFAULT_VOLUME,
            duration: 0.0,
            playlist: Vec::new(),
            current_index: NO_INDEX,
            recently_played: Vec::new(),
        }
    }
}

/// Sous-ensemble de l'état conservé entre deux sessions
///
/// Les champs absents prennent leur valeur par défaut, ce qui permet de relire
/// un enregistrement produit par une version antérieure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistedState {
    pub playlist: Vec<Track>,
    pub recently_played: Vec<Track>,
    pub volume: f64,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            playlist: Vec::new(),
            recently_played: Vec::new(),
            volume: DEFAULT_VOLUME,
        }
    }
}

/// Champs modifiés par une transition
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Changes {
    pub track: bool,
    pub playing: bool,
    pub progress: bool,
    pub volume: bool,
    pub duration: bool,
    pub playlist: bool,
    pub recently_played: bool,
}

impl Changes {
    /// Vrai si un champ persisté a changé
    pub fn touches_persisted(&self) -> bool {
        self.playlist || self.recently_played || self.volume
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl PlayerState {
    /// État de départ d'une session, amorcé depuis le stockage
    pub fn from_persisted(persisted: PersistedState) -> Self {
        Self {
            playlist: persisted.playlist,
            recently_played: persisted.recently_played,
            volume: persisted.volume,
            ..Self::default()
        }
    }

    pub fn persisted(&self) -> PersistedState {
        PersistedState {
            playlist: self.playlist.clone(),
            recently_played: self.recently_played.clone(),
            volume: self.volume,
        }
    }

    /// Lie `track` à la lecture, relance la lecture et l'ajoute à l'historique
    pub fn set_current_track(&mut self, track: Track) -> Changes {
        let mut changes = self.add_to_recently_played(track.clone());
        self.current_index = self.index_of(track.id);
        self.current_track = Some(track);
        changes.track = true;
        changes.playing = self.set_is_playing(true).playing;
        changes
    }

    pub fn set_is_playing(&mut self, playing: bool) -> Changes {
        let changed = self.is_playing != playing;
        self.is_playing = playing;
        Changes {
            playing: changed,
            ..Changes::default()
        }
    }

    pub fn set_progress(&mut self, seconds: f64) -> Changes {
        self.progress = seconds;
        Changes {
            progress: true,
            ..Changes::default()
        }
    }

    pub fn set_volume(&mut self, volume: f64) -> Changes {
        self.volume = volume;
        Changes {
            volume: true,
            ..Changes::default()
        }
    }

    pub fn set_duration(&mut self, seconds: f64) -> Changes {
        self.duration = seconds;
        Changes {
            duration: true,
            ..Changes::default()
        }
    }

    /// Ajoute en fin de playlist, sauf si l'id y est déjà
    pub fn add_to_playlist(&mut self, track: Track) -> Changes {
        if self.playlist.iter().any(|t| t.id == track.id) {
            return Changes::default();
        }
        self.playlist.push(track);
        self.sync_index();
        Changes {
            playlist: true,
            ..Changes::default()
        }
    }

    /// Retire l'entrée `id` ; la piste courante continue de jouer
    pub fn remove_from_playlist(&mut self, id: u64) -> Changes {
        let before = self.playlist.len();
        self.playlist.retain(|t| t.id != id);
        if self.playlist.len() == before {
            return Changes::default();
        }
        self.sync_index();
        Changes {
            playlist: true,
            ..Changes::default()
        }
    }

    /// Piste suivante, en revenant au début après la dernière
    pub fn play_next(&mut self) -> Changes {
        let len = self.playlist.len() as i64;
        if len == 0 {
            return Changes::default();
        }
        self.jump_to((self.current_index + 1).rem_euclid(len))
    }

    /// Piste précédente, en revenant à la fin avant la première
    pub fn play_previous(&mut self) -> Changes {
        let len = self.playlist.len() as i64;
        if len == 0 {
            return Changes::default();
        }
        let index = if self.current_index - 1 < 0 {
            len - 1
        } else {
            self.current_index - 1
        };
        self.jump_to(index)
    }

    pub fn add_to_recently_played(&mut self, track: Track) -> Changes {
        self.recently_played.retain(|t| t.id != track.id);
        self.recently_played.insert(0, track);
        self.recently_played.truncate(RECENTLY_PLAYED_LIMIT);
        Changes {
            recently_played: true,
            ..Changes::default()
        }
    }

    /// Vide la playlist sans toucher à la piste courante
    pub fn clear_playlist(&mut self) -> Changes {
        self.playlist.clear();
        self.current_index = NO_INDEX;
        Changes {
            playlist: true,
            ..Changes::default()
        }
    }

    /// Remplace la playlist telle quelle (pas de dédoublonnage)
    pub fn set_playlist(&mut self, tracks: Vec<Track>) -> Changes {
        self.playlist = tracks;
        self.sync_index();
        Changes {
            playlist: true,
            ..Changes::default()
        }
    }

    fn jump_to(&mut self, index: i64) -> Changes {
        self.current_index = index;
        self.current_track = Some(self.playlist[index as usize].clone());
        self.progress = 0.0;
        Changes {
            track: true,
            progress: true,
            playing: self.set_is_playing(true).playing,
            ..Changes::default()
        }
    }

    fn index_of(&self, id: u64) -> i64 {
        self.playlist
            .iter()
            .position(|t| t.id == id)
            .map_or(NO_INDEX, |i| i as i64)
    }

    fn sync_index(&mut self) {
        self.current_index = match &self.current_track {
            Some(track) => self.index_of(track.id),
            None => NO_INDEX,
        };
    }
}
