//! Structures de données pour représenter les objets du catalogue Deezer
//!
//! Les champs reprennent les noms JSON de l'API. Les champs que l'API peut
//! omettre sont des `Option` ; les vues doivent tester leur présence.

use serde::{Deserialize, Serialize};

/// Résumé d'artiste embarqué dans une piste
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistSummary {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub picture_medium: Option<String>,
}

/// Résumé d'album embarqué dans une piste
///
/// Les pistes listées dans un album n'embarquent pas toujours leur album,
/// d'où le `Default`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlbumSummary {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub cover_medium: Option<String>,
    #[serde(default)]
    pub cover_xl: Option<String>,
}

/// Une piste du catalogue ; l'identité est `id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: u64,
    pub title: String,
    /// Durée en secondes
    #[serde(default)]
    pub duration: u32,
    /// URL de l'extrait de 30 secondes
    #[serde(default)]
    pub preview: Option<String>,
    pub artist: ArtistSummary,
    #[serde(default)]
    pub album: AlbumSummary,
}

impl Track {
    /// URL de l'extrait, `None` si absente ou vide
    pub fn preview_url(&self) -> Option<&str> {
        self.preview.as_deref().filter(|url| !url.is_empty())
    }
}

/// Un artiste
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub picture_medium: Option<String>,
    #[serde(default)]
    pub picture_xl: Option<String>,
    /// Nombre de fans ; pas toujours fourni
    #[serde(default)]
    pub nb_fan: Option<u64>,
    #[serde(default)]
    pub nb_album: Option<u32>,
}

/// Artiste principal d'un album
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumArtist {
    pub id: u64,
    pub name: String,
}

/// Enveloppe `{ "data": [...], "total": n }` utilisée par l'API pour les listes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackData<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl<T> Default for TrackData<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            total: None,
        }
    }
}

/// Un album et ses pistes, dans l'ordre du catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub cover_medium: Option<String>,
    #[serde(default)]
    pub cover_xl: Option<String>,
    pub artist: AlbumArtist,
    #[serde(default)]
    pub tracks: TrackData<Track>,
}

impl Album {
    /// Résumé de l'album tel qu'embarqué dans une piste
    pub fn summary(&self) -> AlbumSummary {
        AlbumSummary {
            id: self.id,
            title: self.title.clone(),
            cover_medium: self.cover_medium.clone(),
            cover_xl: self.cover_xl.clone(),
        }
    }

    /// Pistes de l'album, complétées avec le résumé d'album quand il manque
    ///
    /// Utile pour alimenter une playlist depuis une page album.
    pub fn playable_tracks(&self) -> Vec<Track> {
        let summary = self.summary();
        self.tracks
            .data
            .iter()
            .cloned()
            .map(|mut track| {
                if track.album.id == 0 {
                    track.album = summary.clone();
                }
                track
            })
            .collect()
    }
}

/// Réponse d'une recherche : pistes trouvées et nombre total de résultats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub data: Vec<Track>,
    #[serde(default)]
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_track_from_api_payload() {
        let track: Track = serde_json::from_value(json!({
            "id": 3135556,
            "readable": true,
            "title": "Harder, Better, Faster, Stronger",
            "duration": 224,
            "preview": "https://cdns-preview-d.dzcdn.net/stream/c-d.mp3",
            "artist": {"id": 27, "name": "Daft Punk", "picture_medium": "https://e-cdns/27.jpg"},
            "album": {"id": 302127, "title": "Discovery", "cover_medium": "m.jpg", "cover_xl": "xl.jpg"}
        }))
        .unwrap();

        assert_eq!(track.id, 3135556);
        assert_eq!(track.artist.name, "Daft Punk");
        assert_eq!(track.album.cover_xl.as_deref(), Some("xl.jpg"));
        assert!(track.preview_url().is_some());
    }

    #[test]
    fn test_empty_preview_is_absent() {
        let track: Track = serde_json::from_value(json!({
            "id": 1,
            "title": "t",
            "duration": 30,
            "preview": "",
            "artist": {"id": 2, "name": "a"}
        }))
        .unwrap();

        assert_eq!(track.preview_url(), None);
        assert_eq!(track.album, AlbumSummary::default());
    }

    #[test]
    fn test_artist_without_fans() {
        let artist: Artist = serde_json::from_value(json!({
            "id": 27,
            "name": "Daft Punk",
            "picture_medium": "m.jpg",
            "picture_xl": "xl.jpg"
        }))
        .unwrap();
        assert_eq!(artist.nb_fan, None);
    }

    #[test]
    fn test_album_playable_tracks_fill_album_summary() {
        let album: Album = serde_json::from_value(json!({
            "id": 302127,
            "title": "Discovery",
            "cover_medium": "m.jpg",
            "cover_xl": "xl.jpg",
            "artist": {"id": 27, "name": "Daft Punk"},
            "tracks": {"data": [
                {"id": 1, "title": "One More Time", "duration": 320, "preview": "p1",
                 "artist": {"id": 27, "name": "Daft Punk"}},
                {"id": 2, "title": "Aerodynamic", "duration": 212, "preview": "p2",
                 "artist": {"id": 27, "name": "Daft Punk"}}
            ]}
        }))
        .unwrap();

        let tracks = album.playable_tracks();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].title, "One More Time");
        assert_eq!(tracks[1].album.id, 302127);
        assert_eq!(tracks[1].album.cover_medium.as_deref(), Some("m.jpg"));
    }

    #[test]
    fn test_search_result_defaults() {
        let result: SearchResult = serde_json::from_value(json!({"data": []})).unwrap();
        assert!(result.data.is_empty());
        assert_eq!(result.total, 0);
    }
}
