use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use photo_carousel::config::{ContactOptions, SourceOptions, Variant};
use photo_carousel::contact::{ContactClient, ContactError, ContactForm};
use photo_carousel::error::Error;
use photo_carousel::source::PhotoSource;

const MANIFEST: &str = r#"{
    "variant": "desktop",
    "count": 2,
    "photos": [
        { "filename": "a.jpg", "url": "assets/photos/desktop/a.jpg",
          "view_url": "view/?variant=desktop&file=a.jpg" },
        { "filename": "b.jpg", "url": "assets/photos/desktop/b.jpg",
          "view_url": "view/?variant=desktop&file=b.jpg" }
    ]
}"#;

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn source_for(addr: SocketAddr) -> PhotoSource {
    PhotoSource::new(&SourceOptions {
        base_url: format!("http://{addr}"),
        variant: Variant::Desktop,
    })
}

fn contact_for(addr: SocketAddr, path: &str) -> ContactClient {
    ContactClient::new(&ContactOptions {
        endpoint: format!("http://{addr}{path}"),
        access_key: "test-key".to_string(),
        result_visible: Duration::from_secs(5),
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fetches_and_parses_a_published_manifest() {
    let app = Router::new().route("/photos.desktop.json", get(|| async { MANIFEST }));
    let addr = serve(app).await;

    let photos = source_for(addr).fetch(Variant::Desktop).await.unwrap();
    assert_eq!(photos.len(), 2);
    assert_eq!(photos[0].filename, "a.jpg");
    assert_eq!(photos[1].display_url, "assets/photos/desktop/b.jpg");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn a_missing_manifest_is_a_fetch_error() {
    let app = Router::new().route("/photos.desktop.json", get(|| async { MANIFEST }));
    let addr = serve(app).await;

    let err = source_for(addr).fetch(Variant::Mobile).await.unwrap_err();
    assert!(matches!(err, Error::Fetch(_)), "got {err:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn a_truncated_manifest_never_partially_renders() {
    let app = Router::new().route(
        "/photos.desktop.json",
        get(|| async { r#"{ "variant": "desktop", "count": 3, "photos": [] }"# }),
    );
    let addr = serve(app).await;

    let err = source_for(addr).fetch(Variant::Desktop).await.unwrap_err();
    assert!(matches!(err, Error::Manifest(_)), "got {err:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn contact_submission_round_trip() {
    let app = Router::new().route(
        "/submit",
        post(|| async { Json(serde_json::json!({ "message": "Thanks for writing!" })) }),
    );
    let addr = serve(app).await;

    let mut form = ContactForm::new("test-key");
    form.name = "Ada".to_string();
    form.email = "ada@example.com".to_string();
    form.message = "Hello".to_string();

    let confirmation = contact_for(addr, "/submit").submit(&form).await.unwrap();
    assert_eq!(confirmation, "Thanks for writing!");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn contact_rejection_carries_the_server_message() {
    let app = Router::new().route(
        "/submit",
        post(|| async {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "message": "Invalid email" })),
            )
        }),
    );
    let addr = serve(app).await;

    let err = contact_for(addr, "/submit")
        .submit(&ContactForm::new("test-key"))
        .await
        .unwrap_err();
    match err {
        ContactError::Rejected { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "Invalid email");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn contact_network_failure_is_its_own_error() {
    let client = ContactClient::new(&ContactOptions {
        // Nothing listens here.
        endpoint: "http://127.0.0.1:1/submit".to_string(),
        access_key: "test-key".to_string(),
        result_visible: Duration::from_secs(5),
    });
    let err = client
        .submit(&ContactForm::new("test-key"))
        .await
        .unwrap_err();
    assert!(matches!(err, ContactError::Network(_)), "got {err:?}");
}
