//! Store du lecteur : source unique de vérité pour la lecture et la playlist
//!
//! [`PlayerStore`] est un handle clonable ; tous les clones partagent le même
//! état. Chaque mutation s'applique immédiatement, puis :
//!
//! - les évènements correspondants sont diffusés aux abonnés ([`PlayerStore::subscribe`]) ;
//! - si un champ persisté a changé, un instantané est confié au [`Persister`].

use crate::persistence::{Persister, StateStorage};
use crate::state::{Changes, PersistedState, PlayerState};
use pmodeezer::Track;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, warn};

const EVENT_CAPACITY: usize = 256;

/// Évènements émis après chaque mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PlayerEvent {
    /// La piste courante a été (re)définie
    TrackChanged(Option<Track>),
    PlayingChanged(bool),
    VolumeChanged(f64),
    ProgressChanged(f64),
    DurationChanged(f64),
    /// Contenu de la playlist ou index courant modifié
    PlaylistChanged,
    RecentlyPlayedChanged,
}

struct StoreInner {
    state: RwLock<PlayerState>,
    event_tx: broadcast::Sender<PlayerEvent>,
    persister: Option<Persister>,
}

/// Handle partagé vers l'état du lecteur
#[derive(Clone)]
pub struct PlayerStore {
    inner: Arc<StoreInner>,
}

impl Default for PlayerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerStore {
    /// Store sans persistance, avec l'état par défaut
    pub fn new() -> Self {
        Self::build(PlayerState::default(), None)
    }

    /// Store amorcé depuis `storage`, qui reçoit ensuite les sauvegardes
    ///
    /// Un enregistrement illisible est ignoré : la session démarre avec les
    /// valeurs par défaut.
    pub fn with_persistence<S: StateStorage>(storage: S) -> crate::Result<Self> {
        let persisted = match storage.load() {
            Ok(Some(persisted)) => {
                debug!(
                    "Player state restored ({} tracks in playlist)",
                    persisted.playlist.len()
                );
                persisted
            }
            Ok(None) => PersistedState::default(),
            Err(e) => {
                warn!("Ignoring unreadable player state: {}", e);
                PersistedState::default()
            }
        };

        let persister = Persister::spawn(storage)?;
        Ok(Self::build(
            PlayerState::from_persisted(persisted),
            Some(persister),
        ))
    }

    fn build(state: PlayerState, persister: Option<Persister>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(state),
                event_tx: broadcast::channel(EVENT_CAPACITY).0,
                persister,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Attend l'écriture des sauvegardes en attente (arrêt, tests)
    pub fn flush(&self) {
        if let Some(persister) = &self.inner.persister {
            persister.flush();
        }
    }

    /// Copie de l'état courant
    pub fn state(&self) -> PlayerState {
        self.inner.state.read().unwrap().clone()
    }

    pub fn current_track(&self) -> Option<Track> {
        self.inner.state.read().unwrap().current_track.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.inner.state.read().unwrap().is_playing
    }

    pub fn progress(&self) -> f64 {
        self.inner.state.read().unwrap().progress
    }

    pub fn volume(&self) -> f64 {
        self.inner.state.read().unwrap().volume
    }

    pub fn duration(&self) -> f64 {
        self.inner.state.read().unwrap().duration
    }

    pub fn playlist(&self) -> Vec<Track> {
        self.inner.state.read().unwrap().playlist.clone()
    }

    pub fn current_index(&self) -> i64 {
        self.inner.state.read().unwrap().current_index
    }

    pub fn recently_played(&self) -> Vec<Track> {
        self.inner.state.read().unwrap().recently_played.clone()
    }

    pub fn set_current_track(&self, track: Track) {
        self.mutate(|s| s.set_current_track(track));
    }

    pub fn set_is_playing(&self, playing: bool) {
        self.mutate(|s| s.set_is_playing(playing));
    }

    pub fn set_progress(&self, seconds: f64) {
        self.mutate(|s| s.set_progress(seconds));
    }

    pub fn set_volume(&self, volume: f64) {
        self.mutate(|s| s.set_volume(volume));
    }

    pub fn set_duration(&self, seconds: f64) {
        self.mutate(|s| s.set_duration(seconds));
    }

    pub fn add_to_playlist(&self, track: Track) {
        self.mutate(|s| s.add_to_playlist(track));
    }

    pub fn remove_from_playlist(&self, id: u64) {
        self.mutate(|s| s.remove_from_playlist(id));
    }

    pub fn play_next(&self) {
        self.mutate(PlayerState::play_next);
    }

    pub fn play_previous(&self) {
        self.mutate(PlayerState::play_previous);
    }

    pub fn add_to_recently_played(&self, track: Track) {
        self.mutate(|s| s.add_to_recently_played(track));
    }

    pub fn clear_playlist(&self) {
        self.mutate(PlayerState::clear_playlist);
    }

    pub fn set_playlist(&self, tracks: Vec<Track>) {
        self.mutate(|s| s.set_playlist(tracks));
    }

    /// Applique une transition, planifie la sauvegarde et notifie sous le verrou
    ///
    /// Les envois ne bloquent pas : les abonnés reçoivent les évènements dans
    /// l'ordre des transitions, comme le persister reçoit les instantanés.
    fn mutate<F>(&self, f: F)
    where
        F: FnOnce(&mut PlayerState) -> Changes,
    {
        let mut state = self.inner.state.write().unwrap();
        let changes = f(&mut state);
        if changes.is_empty() {
            return;
        }

        if let Some(persister) = &self.inner.persister {
            if changes.touches_persisted() {
                persister.save(state.persisted());
            }
        }

        for event in events_for(&changes, &state) {
            // Ignoré si aucun abonné
            let _ = self.inner.event_tx.send(event);
        }
    }
}

fn events_for(changes: &Changes, state: &PlayerState) -> Vec<PlayerEvent> {
    let mut events = Vec::new();
    if changes.track {
        events.push(PlayerEvent::TrackChanged(state.current_track.clone()));
    }
    if changes.playing {
        events.push(PlayerEvent::PlayingChanged(state.is_playing));
    }
    if changes.progress {
        events.push(PlayerEvent::ProgressChanged(state.progress));
    }
    if changes.duration {
        events.push(PlayerEvent::DurationChanged(state.duration));
    }
    if changes.volume {
        events.push(PlayerEvent::VolumeChanged(state.volume));
    }
    if changes.playlist {
        events.push(PlayerEvent::PlaylistChanged);
    }
    if changes.recently_played {
        events.push(PlayerEvent::RecentlyPlayedChanged);
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use crate::state::tests::track;

    fn drain(rx: &mut broadcast::Receiver<PlayerEvent>) -> Vec<PlayerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_clones_share_state() {
        let store = PlayerStore::new();
        let other = store.clone();

        store.add_to_playlist(track(1));
        assert_eq!(other.playlist().len(), 1);
    }

    #[test]
    fn test_set_current_track_events() {
        let store = PlayerStore::new();
        let mut rx = store.subscribe();

        store.set_current_track(track(5));

        assert_eq!(
            drain(&mut rx),
            vec![
                PlayerEvent::TrackChanged(Some(track(5))),
                PlayerEvent::PlayingChanged(true),
                PlayerEvent::RecentlyPlayedChanged,
            ]
        );

        // Déjà en lecture : pas de nouveau PlayingChanged
        store.set_current_track(track(6));
        let events = drain(&mut rx);
        assert!(!events.iter().any(|e| matches!(e, PlayerEvent::PlayingChanged(_))));
    }

    #[test]
    fn test_noop_mutations_emit_nothing() {
        let store = PlayerStore::new();
        store.add_to_playlist(track(1));
        let mut rx = store.subscribe();

        store.add_to_playlist(track(1));
        store.remove_from_playlist(42);
        store.set_is_playing(false);
        PlayerStore::new().play_next();

        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_persisted_fields_are_saved() {
        let storage = MemoryStorage::new();
        let store = PlayerStore::with_persistence(storage.clone()).unwrap();

        store.set_playlist(vec![track(1), track(2)]);
        store.set_current_track(track(2));
        store.set_volume(0.4);
        store.set_progress(10.0);
        store.flush();

        let saved = storage.load().unwrap().unwrap();
        assert_eq!(saved.playlist, vec![track(1), track(2)]);
        assert_eq!(saved.recently_played, vec![track(2)]);
        assert_eq!(saved.volume, 0.4);
    }

    #[test]
    fn test_transient_fields_do_not_trigger_save() {
        let storage = MemoryStorage::new();
        let store = PlayerStore::with_persistence(storage.clone()).unwrap();

        store.set_progress(3.0);
        store.set_duration(30.0);
        store.set_is_playing(true);
        store.flush();

        assert_eq!(storage.raw(), None);
    }

    #[test]
    fn test_session_is_seeded_from_storage() {
        let storage = MemoryStorage::new();
        {
            let store = PlayerStore::with_persistence(storage.clone()).unwrap();
            store.add_to_playlist(track(1));
            store.add_to_playlist(track(2));
            store.set_current_track(track(2));
            store.set_volume(0.2);
            store.flush();
        }

        let store = PlayerStore::with_persistence(storage).unwrap();
        let state = store.state();
        assert_eq!(state.playlist, vec![track(1), track(2)]);
        assert_eq!(state.recently_played, vec![track(2)]);
        assert_eq!(state.volume, 0.2);
        assert_eq!(state.current_track, None);
        assert!(!state.is_playing);
        assert_eq!(state.current_index, -1);
    }

    #[test]
    fn test_unreadable_storage_falls_back_to_defaults() {
        let storage = MemoryStorage::new();
        storage.set_raw("{broken");

        let store = PlayerStore::with_persistence(storage).unwrap();
        assert_eq!(store.state(), PlayerState::default());
    }

    #[test]
    fn test_concurrent_writers_keep_event_order() {
        use std::sync::Barrier;
        use std::thread;

        for _ in 0..2000 {
            let store = PlayerStore::new();
            let mut rx = store.subscribe();
            let barrier = Barrier::new(2);

            thread::scope(|scope| {
                for id in [1, 2] {
                    let store = store.clone();
                    let barrier = &barrier;
                    scope.spawn(move || {
                        barrier.wait();
                        store.set_current_track(track(id));
                    });
                }
            });

            let last_track = drain(&mut rx)
                .into_iter()
                .filter_map(|event| match event {
                    PlayerEvent::TrackChanged(track) => Some(track),
                    _ => None,
                })
                .last()
                .flatten();
            assert_eq!(last_track, store.current_track());
        }
    }
}
