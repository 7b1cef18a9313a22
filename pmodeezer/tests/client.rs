//! Tests bout en bout : client -> proxy Axum réel -> API Deezer simulée
#![cfg(feature = "pmoserver")]

use axum::Router;
use pmodeezer::{DeezerClient, DeezerError, DeezerProxy, api::proxy_router};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Démarre le proxy sur un port libre et renvoie un client pointant dessus
async fn setup() -> (MockServer, DeezerClient) {
    let upstream = MockServer::start().await;

    let proxy = DeezerProxy::builder()
        .api_base(upstream.uri())
        .build()
        .unwrap();
    let app = Router::new().nest("/api/deezer", proxy_router(Arc::new(proxy)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });

    let client = DeezerClient::new(format!("http://{}/api/deezer", addr)).unwrap();
    (upstream, client)
}

fn track(id: u64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "duration": 200,
        "preview": format!("https://cdn.example/{}.mp3", id),
        "artist": {"id": 27, "name": "Daft Punk"},
        "album": {"id": 302127, "title": "Discovery"}
    })
}

#[tokio::test]
async fn test_search_encodes_query_and_default_limit() {
    let (upstream, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "daft punk & co"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [track(1, "One More Time"), track(2, "Aerodynamic")],
            "total": 2
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let result = client.search("daft punk & co", None).await.unwrap();
    assert_eq!(result.total, 2);
    assert_eq!(result.data.len(), 2);
    assert_eq!(result.data[0].title, "One More Time");
    assert_eq!(result.data[1].artist.name, "Daft Punk");
}

#[tokio::test]
async fn test_get_album_with_tracks() {
    let (upstream, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/album/302127"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 302127,
            "title": "Discovery",
            "cover_medium": "m.jpg",
            "cover_xl": "xl.jpg",
            "artist": {"id": 27, "name": "Daft Punk"},
            "tracks": {"data": [track(1, "One More Time"), {
                "id": 3,
                "title": "No Preview",
                "duration": 100,
                "preview": "",
                "artist": {"id": 27, "name": "Daft Punk"}
            }]}
        })))
        .mount(&upstream)
        .await;

    let album = client.get_album(302127).await.unwrap();
    assert_eq!(album.title, "Discovery");
    assert_eq!(album.artist.name, "Daft Punk");
    assert_eq!(album.tracks.data.len(), 2);
    assert_eq!(album.playable_tracks().len(), 1);
}

#[tokio::test]
async fn test_artist_top_tracks_and_chart_limits() {
    let (upstream, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/artist/27/top"))
        .and(query_param("limit", "10"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [track(1, "One More Time")]})),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    Mock::given(method("GET"))
        .and(path("/chart/0/tracks"))
        .and(query_param("limit", "5"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": [track(4, "Chart"), track(5, "Topper")], "total": 2})),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let top = client.get_artist_top_tracks(27, None).await.unwrap();
    assert_eq!(top.data.len(), 1);

    let chart = client.get_chart(Some(5)).await.unwrap();
    assert_eq!(chart.data.len(), 2);
    assert_eq!(chart.total, Some(2));
}

#[tokio::test]
async fn test_get_artist() {
    let (upstream, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/artist/27"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 27,
            "name": "Daft Punk",
            "picture_xl": "xl.jpg",
            "nb_fan": 4200000,
            "nb_album": 32
        })))
        .mount(&upstream)
        .await;

    let artist = client.get_artist(27).await.unwrap();
    assert_eq!(artist.name, "Daft Punk");
    assert_eq!(artist.nb_fan, Some(4200000));
    assert_eq!(
        pmodeezer::format::format_fans(artist.nb_fan).as_deref(),
        Some("4,200,000 fans")
    );
}

#[tokio::test]
async fn test_upstream_status_surfaces_as_error() {
    let (upstream, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/track/0"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&upstream)
        .await;

    let err = client.get_track(0).await.unwrap_err();
    assert!(matches!(err, DeezerError::Upstream { status: 404 }));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_in_band_api_error_is_detected() {
    let (upstream, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/album/999999999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {"type": "DataException", "message": "no data", "code": 800}
        })))
        .mount(&upstream)
        .await;

    let err = client.get_album(999999999).await.unwrap_err();
    assert!(matches!(err, DeezerError::Api { code: 800, .. }));
    assert!(err.is_not_found());
}
