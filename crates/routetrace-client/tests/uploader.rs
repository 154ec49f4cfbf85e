//! Integration tests for `Uploader` using wiremock.

use std::path::PathBuf;

use routetrace_client::{UploadError, UploadOutcome, Uploader};
use routetrace_core::LatLng;
use routetrace_map::{LeafletDocument, MapSession, RenderSummary};
use tempdir::TempDir;
use wiremock::matchers::{body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TRACK_CSV: &str = "Latitude,Longitude,Accuracy,DateTime\n6.14,80.10,5,2024-01-15 10:00:00\n";

const CAFE_BODY: &str = r#"{
  "visit_records": [
    {"shop": "Cafe A", "check_in": [6.14, 80.10], "check_out": [6.15, 80.11], "duration_min": 30}
  ],
  "route_coords": [[6.14, 80.10], [6.15, 80.11]]
}"#;

fn write_track(dir: &TempDir) -> PathBuf {
    let file = dir.path().join("track.csv");
    std::fs::write(&file, TRACK_CSV).expect("write track");
    file
}

#[tokio::test]
async fn posts_file_as_multipart_part_and_renders() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains(r#"name="file"; filename="track.csv""#))
        .and(body_string_contains("6.14,80.10,5,2024-01-15 10:00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CAFE_BODY))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new("routetrace-client").expect("tempdir");
    let file = write_track(&dir);
    let uploader = Uploader::new(&server.uri(), 5).expect("uploader");
    let mut session = MapSession::new(LeafletDocument::new());

    let outcome = uploader
        .upload_and_render(Some(&file), &mut session)
        .await
        .expect("upload");

    assert_eq!(
        outcome,
        UploadOutcome::Rendered(RenderSummary {
            markers: 1,
            route_points: 2
        })
    );
    let doc = session.canvas();
    assert_eq!(doc.markers().len(), 1);
    assert_eq!(doc.markers()[0].position, LatLng::new(6.14, 80.10));
    assert!(doc.markers()[0].popup_html.contains("Cafe A"));
    assert!(doc.markers()[0].popup_html.contains("30 min"));
    assert_eq!(doc.polylines()[0].path.len(), 2);
}

#[tokio::test]
async fn no_selection_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CAFE_BODY))
        .expect(0)
        .mount(&server)
        .await;

    let uploader = Uploader::new(&server.uri(), 5).expect("uploader");
    let err = uploader.upload(None).await.unwrap_err();
    assert!(matches!(err, UploadError::NoFileSelected));

    let mut session = MapSession::new(LeafletDocument::new());
    let outcome = uploader
        .upload_and_render(None, &mut session)
        .await
        .expect("outcome");
    assert_eq!(outcome, UploadOutcome::NoFileSelected);
    assert!(!session.is_rendered());
}

#[tokio::test]
async fn connection_failure_is_logged_and_leaves_map_uninitialized() {
    // Grab a free port, then close it so the connect is refused.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let uri = format!("http://{}", listener.local_addr().expect("addr"));
    drop(listener);

    let dir = TempDir::new("routetrace-client").expect("tempdir");
    let file = write_track(&dir);
    let uploader = Uploader::new(&uri, 2).expect("uploader");
    let mut session = MapSession::new(LeafletDocument::new());

    let outcome = uploader
        .upload_and_render(Some(&file), &mut session)
        .await
        .expect("transport errors are not propagated");
    assert_eq!(outcome, UploadOutcome::TransportFailed);
    assert!(!session.is_rendered());
    assert!(!session.canvas().is_initialized());
}

#[tokio::test]
async fn non_json_body_is_treated_like_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let dir = TempDir::new("routetrace-client").expect("tempdir");
    let file = write_track(&dir);
    let uploader = Uploader::new(&server.uri(), 5).expect("uploader");

    let err = uploader.upload(Some(&file)).await.unwrap_err();
    assert!(matches!(err, UploadError::Parse(_)));

    let mut session = MapSession::new(LeafletDocument::new());
    let outcome = uploader
        .upload_and_render(Some(&file), &mut session)
        .await
        .expect("parse errors are not propagated");
    assert_eq!(outcome, UploadOutcome::TransportFailed);
    assert!(!session.is_rendered());
}

#[tokio::test]
async fn wrong_shape_propagates_as_schema_error() {
    let server = MockServer::start().await;
    // Error envelopes are JSON too, and are decoded regardless of status.
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            r#"{"error":{"code":"validation_error","message":"Missing required columns"}}"#,
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new("routetrace-client").expect("tempdir");
    let file = write_track(&dir);
    let uploader = Uploader::new(&server.uri(), 5).expect("uploader");
    let mut session = MapSession::new(LeafletDocument::new());

    let err = uploader
        .upload_and_render(Some(&file), &mut session)
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::Schema(_)), "got {err:?}");
    assert!(!session.is_rendered());
}

#[tokio::test]
async fn unreadable_selection_is_an_io_error() {
    let server = MockServer::start().await;
    let uploader = Uploader::new(&server.uri(), 5).expect("uploader");
    let dir = TempDir::new("routetrace-client").expect("tempdir");

    let err = uploader
        .upload(Some(&dir.path().join("missing.csv")))
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::Io { .. }));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
