use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header::CONTENT_TYPE};
use axum::routing::post;
use submission_client::{Client, Issuer, IssuerConfig, RestErrorKind, Submission};
use tokio::net::TcpListener;

const CANONICAL_BODY: &str = r#"{
  "repo_url": "https://github.com/ishAN-121/APDP-Implementation",
  "participant_summary": "We used the topsis for immediate SMS alerts and Firebase to manage user profiles. The logic employs a custom graph database for decision making.",
  "sponsor_requirements": "This challenge requires integration of two key external components:1. The project must use the Topsis SMS API for user notification.2. The project must use PDP user data using the firebase module/SDK.3. Bonus points for using the MeTTa knowledge graph for complex reasoning."
}"#;

#[derive(Clone, Debug)]
struct Captured {
    content_type: Option<String>,
    body: Bytes,
}

#[derive(Clone, Default)]
struct AppState {
    captured: Arc<Mutex<Vec<Captured>>>,
}

#[tokio::test]
async fn e2e_accepted_submission_prints_body_verbatim() {
    let server = TestServer::start().await;
    let issuer = issuer_for(server.url("/rest/post"));

    let mut out = Vec::new();
    let outcome = issuer
        .issue(&Submission::canonical(), &mut out)
        .await
        .expect("local endpoint should answer");

    assert_eq!(outcome.status, 200);
    assert_eq!(out, br#"{"status":"accepted","id":"123"}"#);

    let captured = server.captured();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(captured[0].body, CANONICAL_BODY.as_bytes());
}

#[tokio::test]
async fn e2e_server_error_is_reported_as_received() {
    let server = TestServer::start().await;
    let issuer = issuer_for(server.url("/rest/broken"));

    let mut out = Vec::new();
    let outcome = issuer
        .issue(&Submission::canonical(), &mut out)
        .await
        .expect("5xx is still a response");

    assert_eq!(outcome.status, 500);
    assert_eq!(out, b"agent unavailable");
    assert_eq!(server.captured().len(), 1);
}

#[tokio::test]
async fn e2e_connection_refused_is_connect_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind probe");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let issuer = issuer_for(format!("http://{addr}/rest/post"));
    let err = issuer
        .issue(&Submission::canonical(), &mut Vec::new())
        .await
        .expect_err("nothing is listening");

    let rest = err.as_rest().expect("transport error");
    assert_eq!(rest.kind(), RestErrorKind::Connect);
}

fn issuer_for(url: String) -> Issuer {
    Issuer::new(Client::new(), IssuerConfig::new(url)).expect("valid endpoint")
}

struct TestServer {
    base_url: String,
    state: AppState,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let state = AppState::default();
        let app = Router::new()
            .route("/rest/post", post(accept_handler))
            .route("/rest/broken", post(broken_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let base_url = format!("http://{}", addr);

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url,
            state,
            task,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn captured(&self) -> Vec<Captured> {
        self.state
            .captured
            .lock()
            .expect("capture lock")
            .clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn record(state: &AppState, headers: &HeaderMap, body: Bytes) {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    state
        .captured
        .lock()
        .expect("capture lock")
        .push(Captured { content_type, body });
}

async fn accept_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    record(&state, &headers, body);
    (StatusCode::OK, r#"{"status":"accepted","id":"123"}"#)
}

async fn broken_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    record(&state, &headers, body);
    (StatusCode::INTERNAL_SERVER_ERROR, "agent unavailable")
}
