//! Aller-retour complet : store -> SQLite -> nouvelle session

use pmodeezer::{AlbumSummary, ArtistSummary, Track};
use pmoplayer::{PlayerStore, SqliteStorage, StateStorage};

fn track(id: u64, title: &str) -> Track {
    Track {
        id,
        title: title.to_string(),
        duration: 200,
        preview: Some(format!("https://cdn.example/{}.mp3", id)),
        artist: ArtistSummary {
            id: 27,
            name: "Daft Punk".into(),
            picture_medium: None,
        },
        album: AlbumSummary {
            id: 302127,
            title: "Discovery".into(),
            cover_medium: Some("m.jpg".into()),
            cover_xl: Some("xl.jpg".into()),
        },
    }
}

#[test]
fn test_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("player.db");

    let playlist = vec![
        track(3, "Digital Love"),
        track(1, "One More Time"),
        track(2, "Aerodynamic"),
    ];

    {
        let store = PlayerStore::with_persistence(SqliteStorage::new(&db_path).unwrap()).unwrap();
        store.set_playlist(playlist.clone());
        store.set_current_track(playlist[1].clone());
        store.set_current_track(playlist[0].clone());
        store.set_volume(0.45);
        store.set_progress(42.0);
        store.flush();
    }

    let storage = SqliteStorage::new(&db_path).unwrap();
    let persisted = storage.load().unwrap().unwrap();
    assert_eq!(persisted.playlist, playlist);
    assert_eq!(
        persisted.recently_played,
        vec![playlist[0].clone(), playlist[1].clone()]
    );
    assert_eq!(persisted.volume, 0.45);

    let store = PlayerStore::with_persistence(storage).unwrap();
    let state = store.state();
    assert_eq!(state.playlist, playlist);
    assert_eq!(state.volume, 0.45);
    assert_eq!(state.progress, 0.0);
    assert_eq!(state.current_track, None);
}

#[test]
fn test_clear_playlist_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("player.db");

    let store = PlayerStore::with_persistence(SqliteStorage::new(&db_path).unwrap()).unwrap();
    store.add_to_playlist(track(1, "One More Time"));
    store.clear_playlist();
    store.flush();

    let persisted = SqliteStorage::new(&db_path).unwrap().load().unwrap().unwrap();
    assert!(persisted.playlist.is_empty());
}
