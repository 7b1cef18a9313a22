//! Pont entre le store et une sortie audio
//!
//! Le [`PlaybackDriver`] observe le store et pilote une [`AudioOutput`] :
//!
//! - changement de piste : charge l'extrait (rien si la piste n'en a pas) et
//!   relance la lecture si le store est en lecture ;
//! - changement de `is_playing` : `play` ou `pause` ;
//! - changement de volume : transmis tel quel.
//!
//! Dans l'autre sens, la sortie remonte la position, la durée et la fin de
//! média via [`PlaybackDriver::on_time_update`], [`PlaybackDriver::on_loaded_metadata`]
//! et [`PlaybackDriver::on_ended`].
//!
//! Un `play` peut être interrompu par une commande plus récente : cette
//! erreur est attendue et ignorée. Les autres échecs sont journalisés, sans
//! nouvelle tentative.

use crate::state::DEFAULT_VOLUME;
use crate::store::{PlayerEvent, PlayerStore};
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Échec d'une commande `play`
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaybackError {
    /// Remplacée par une commande plus récente
    #[error("playback aborted by a newer command")]
    Aborted,

    #[error("playback failed: {0}")]
    Failed(String),
}

/// Sortie audio pilotée par le driver
///
/// `play` doit être idempotent : il peut être appelé alors que la lecture a
/// déjà démarré.
pub trait AudioOutput: Send + Sync + 'static {
    /// Lie la sortie à une nouvelle source
    fn load(&self, url: &str);

    /// Démarre la lecture ; le futur se résout quand elle a effectivement commencé
    fn play(&self) -> BoxFuture<'static, Result<(), PlaybackError>>;

    fn pause(&self);

    fn set_volume(&self, volume: f64);

    /// Déplace la tête de lecture (secondes)
    fn seek(&self, position: f64);
}

/// Issue d'une commande `play`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Started,
    Superseded,
    Failed,
}

/// Attend le résultat d'un `play` en ignorant les interruptions
pub async fn settle_play(play: BoxFuture<'static, Result<(), PlaybackError>>) -> PlayOutcome {
    match play.await {
        Ok(()) => PlayOutcome::Started,
        Err(PlaybackError::Aborted) => PlayOutcome::Superseded,
        Err(e) => {
            warn!("Playback error: {}", e);
            PlayOutcome::Failed
        }
    }
}

/// Relie un [`PlayerStore`] à une [`AudioOutput`]
pub struct PlaybackDriver<O: AudioOutput> {
    store: PlayerStore,
    output: Arc<O>,
}

impl<O: AudioOutput> Clone for PlaybackDriver<O> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            output: self.output.clone(),
        }
    }
}

impl<O: AudioOutput> PlaybackDriver<O> {
    /// Crée le driver et applique le volume courant à la sortie
    pub fn new(store: PlayerStore, output: Arc<O>) -> Self {
        output.set_volume(store.volume());
        Self { store, output }
    }

    pub fn store(&self) -> &PlayerStore {
        &self.store
    }

    pub fn output(&self) -> &Arc<O> {
        &self.output
    }

    /// Lance la boucle d'évènements dans une tâche tokio
    ///
    /// La tâche garde un clone du store, donc le canal d'évènements ne se ferme
    /// jamais de lui-même : l'appelant arrête le driver avec
    /// [`JoinHandle::abort`] sur le handle renvoyé.
    pub fn spawn(self) -> JoinHandle<()> {
        let mut rx = self.store.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => self.handle_event(&event),
                    Err(RecvError::Lagged(n)) => {
                        warn!("Playback driver lagged, {} events skipped", n);
                        self.resync();
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Playback driver stopped");
        })
    }

    /// Réagit à un évènement du store
    pub fn handle_event(&self, event: &PlayerEvent) {
        match event {
            PlayerEvent::TrackChanged(track) => {
                let Some(url) = track.as_ref().and_then(|t| t.preview_url()) else {
                    return;
                };
                debug!("Loading preview {}", url);
                self.output.load(url);
                if self.store.is_playing() {
                    let _ = self.start_play();
                }
            }
            PlayerEvent::PlayingChanged(playing) => {
                if self.store.current_track().is_none() {
                    return;
                }
                if *playing {
                    let _ = self.start_play();
                } else {
                    self.output.pause();
                }
            }
            PlayerEvent::VolumeChanged(volume) => self.output.set_volume(*volume),
            _ => {}
        }
    }

    /// Réaligne la sortie sur l'état du store après des évènements perdus
    fn resync(&self) {
        self.output.set_volume(self.store.volume());
        self.handle_event(&PlayerEvent::TrackChanged(self.store.current_track()));
        if !self.store.is_playing() {
            self.output.pause();
        }
    }

    fn start_play(&self) -> JoinHandle<PlayOutcome> {
        tokio::spawn(settle_play(self.output.play()))
    }

    /// Position courante remontée par la sortie
    pub fn on_time_update(&self, position: f64) {
        self.store.set_progress(position);
    }

    /// Durée connue une fois les métadonnées chargées
    pub fn on_loaded_metadata(&self, duration: f64) {
        self.store.set_duration(duration);
    }

    /// Fin de média : piste suivante
    pub fn on_ended(&self) {
        self.store.play_next();
    }

    pub fn toggle_play(&self) {
        self.store.set_is_playing(!self.store.is_playing());
    }

    pub fn seek(&self, position: f64) {
        self.store.set_progress(position);
        self.output.seek(position);
    }

    /// Coupe le son, ou le rétablit au volume par défaut
    pub fn toggle_mute(&self) {
        if self.store.volume() == 0.0 {
            self.store.set_volume(DEFAULT_VOLUME);
        } else {
            self.store.set_volume(0.0);
        }
    }
}
