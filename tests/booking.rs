//! Booking client against a local mock endpoint.
//!
//! Each test starts an axum server on an ephemeral port whose handler
//! replays a scripted sequence of responses and counts the requests it saw.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use pragna_site::booking::{BookingClient, BookingError, BookingForm, Branch};
use pragna_site::config::BookingConfig;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[derive(Clone, Default)]
struct Mock {
    /// Responses to serve in order; the last one repeats.
    script: Arc<Vec<(StatusCode, Value)>>,
    received: Arc<Mutex<Vec<Value>>>,
}

impl Mock {
    fn new(script: Vec<(StatusCode, Value)>) -> Self {
        Self {
            script: Arc::new(script),
            received: Arc::default(),
        }
    }

    fn hits(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

async fn handle(State(mock): State<Mock>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let mut received = mock.received.lock().unwrap();
    received.push(body);
    let index = (received.len() - 1).min(mock.script.len() - 1);
    let (status, reply) = mock.script[index].clone();
    (status, Json(reply))
}

/// Serve `mock` and return its URL.
async fn serve(mock: Mock) -> String {
    let app = Router::new()
        .route("/submit", post(handle))
        .with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/submit")
}

fn client(endpoint: String, max_retries: u32) -> BookingClient {
    BookingClient::new(&BookingConfig {
        endpoint,
        max_retries,
        initial_backoff_ms: 5,
        timeout_secs: 5,
        ..BookingConfig::default()
    })
    .unwrap()
}

fn form() -> BookingForm {
    BookingForm {
        name: "Ananya Rao".into(),
        phone: "9848012345".into(),
        country_code: "+91".into(),
        email: "ananya@example.com".into(),
        branch: "punjagutta".into(),
        concerns: "Acne scars".into(),
    }
}

fn ok() -> (StatusCode, Value) {
    (
        StatusCode::OK,
        json!({"success": true, "message": "We'll call you shortly"}),
    )
}

fn unavailable() -> (StatusCode, Value) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        json!({"success": false, "error": "busy"}),
    )
}

#[tokio::test]
async fn accepted_lead_returns_message() {
    let mock = Mock::new(vec![ok()]);
    let url = serve(mock.clone()).await;

    let receipt = client(url, 3).submit_form(&form(), Utc::now()).await.unwrap();
    assert_eq!(receipt.message, "We'll call you shortly");
    assert_eq!(mock.hits(), 1);
}

#[tokio::test]
async fn payload_uses_wire_field_names() {
    let mock = Mock::new(vec![ok()]);
    let url = serve(mock.clone()).await;
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();

    client(url, 0).submit_form(&form(), now).await.unwrap();

    let body = mock.received.lock().unwrap()[0].clone();
    assert_eq!(body["name"], "Ananya Rao");
    assert_eq!(body["countryCode"], "+91");
    assert_eq!(body["branch"], "punjagutta");
    assert_eq!(body["timestamp"], "2026-03-01T09:30:00.000Z");
    assert_eq!(body["source"], "website");
}

#[tokio::test]
async fn server_errors_are_retried_until_success() {
    let mock = Mock::new(vec![unavailable(), unavailable(), ok()]);
    let url = serve(mock.clone()).await;

    let receipt = client(url, 3).submit_form(&form(), Utc::now()).await;
    assert!(receipt.is_ok());
    assert_eq!(mock.hits(), 3);
}

#[tokio::test]
async fn rate_limit_is_retried() {
    let mock = Mock::new(vec![
        (StatusCode::TOO_MANY_REQUESTS, json!({})),
        ok(),
    ]);
    let url = serve(mock.clone()).await;

    client(url, 1).submit_form(&form(), Utc::now()).await.unwrap();
    assert_eq!(mock.hits(), 2);
}

#[tokio::test]
async fn retries_stop_after_max() {
    let mock = Mock::new(vec![unavailable()]);
    let url = serve(mock.clone()).await;

    let err = client(url, 2)
        .submit_form(&form(), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::RetriesExhausted { attempts: 3, .. }));
    assert!(err.to_string().contains("please try again"));
    assert_eq!(mock.hits(), 3);
}

#[tokio::test]
async fn rejection_is_not_retried() {
    let mock = Mock::new(vec![(
        StatusCode::OK,
        json!({"success": false, "error": "Duplicate submission"}),
    )]);
    let url = serve(mock.clone()).await;

    let err = client(url, 3)
        .submit_form(&form(), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Rejected(ref m) if m == "Duplicate submission"));
    assert_eq!(mock.hits(), 1);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let mock = Mock::new(vec![(StatusCode::BAD_REQUEST, json!({"detail": "bad"}))]);
    let url = serve(mock.clone()).await;

    let err = client(url, 3)
        .submit_form(&form(), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Status { status: 400, .. }));
    assert_eq!(mock.hits(), 1);
}

#[tokio::test]
async fn invalid_form_never_reaches_the_endpoint() {
    let mock = Mock::new(vec![ok()]);
    let url = serve(mock.clone()).await;

    let mut bad = form();
    bad.name = "  ".into();
    bad.email = "not-an-email".into();
    let err = client(url, 3)
        .submit_form(&bad, Utc::now())
        .await
        .unwrap_err();
    match err {
        BookingError::Invalid(fields) => {
            let names: Vec<&str> = fields.iter().map(|f| f.field).collect();
            assert_eq!(names, vec!["name", "email"]);
        }
        other => panic!("expected validation error, got {other}"),
    }
    assert_eq!(mock.hits(), 0);
}

#[tokio::test]
async fn unreachable_endpoint_exhausts_retries() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(format!("http://{addr}/submit"), 1)
        .submit_form(&form(), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::RetriesExhausted { attempts: 2, .. }));
}

#[tokio::test]
async fn other_branch_is_sent_verbatim() {
    let mock = Mock::new(vec![ok()]);
    let url = serve(mock.clone()).await;

    let mut lead = form();
    lead.branch = "Banjara Hills".into();
    let request = lead.validate("website", Utc::now()).unwrap();
    assert_eq!(request.branch, Branch::Other("Banjara Hills".into()));

    client(url, 0).submit(&request).await.unwrap();
    assert_eq!(mock.received.lock().unwrap()[0]["branch"], "Banjara Hills");
}

/// Serve a 200 whose body is shorter than its Content-Length, then hang up.
async fn serve_truncated(hits: Arc<AtomicUsize>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            hits.fetch_add(1, Ordering::SeqCst);
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            while !request.ends_with(b"}") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 64\r\n\r\n{\"success\":",
                )
                .await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{addr}/submit")
}

#[tokio::test]
async fn truncated_body_is_retried_as_transport_failure() {
    let hits = Arc::new(AtomicUsize::new(0));
    let url = serve_truncated(hits.clone()).await;

    let err = client(url, 1)
        .submit_form(&form(), Utc::now())
        .await
        .unwrap_err();
    assert!(
        matches!(err, BookingError::RetriesExhausted { attempts: 2, ref last } if last.contains("body read failed")),
        "got {err}"
    );
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}
