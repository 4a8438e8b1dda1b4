//! In-process stand-in for the Supabase REST endpoint.
//!
//! Routes are keyed by method and collection name. Every request is recorded
//! so tests can check what was (or was not) sent.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use matchday_seed::config::SeedConfig;

pub const SERVICE_KEY: &str = "test-service-key";
pub const PLAYER_EMAIL: &str = "player@matchday.com";

pub const TABLE_MISSING_BODY: &str = r#"{"code":"PGRST205","details":null,"hint":null,"message":"Could not find the table 'public.player_stats' in the schema cache"}"#;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub collection: String,
    pub query: String,
    pub apikey: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Default)]
struct MockState {
    routes: HashMap<(Method, String), (StatusCode, String)>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Route table for a mock backend that has not been started yet.
#[derive(Default)]
pub struct MockBackend {
    routes: HashMap<(Method, String), (StatusCode, String)>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, method: Method, collection: &str, status: u16, body: impl Into<String>) -> Self {
        let status = StatusCode::from_u16(status).expect("valid status");
        self.routes
            .insert((method, collection.to_string()), (status, body.into()));
        self
    }

    /// A backend where every step of the run succeeds.
    pub fn happy_path(user_id: &str, teams: &[&str]) -> Self {
        let members: Vec<String> = teams
            .iter()
            .map(|t| format!(r#"{{"team_id":"{t}"}}"#))
            .collect();
        Self::new()
            .on(Method::GET, "player_stats", 200, "[]")
            .on(Method::GET, "users", 200, format!(r#"[{{"id":"{user_id}"}}]"#))
            .on(Method::GET, "team_members", 200, format!("[{}]", members.join(",")))
            .on(Method::POST, "player_stats", 201, "")
            .on(
                Method::GET,
                "user_dashboard_stats",
                200,
                format!(
                    r#"[{{"user_id":"{user_id}","matches_played":3,"goals_scored":6,"assists":3,"teams_joined":2}}]"#
                ),
            )
    }

    pub async fn start(self) -> RunningBackend {
        let state = Arc::new(MockState {
            routes: self.routes,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend");
        });

        RunningBackend { addr, state }
    }
}

pub struct RunningBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl RunningBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn config(&self) -> SeedConfig {
        SeedConfig::resolve(Some(self.url()), Some(SERVICE_KEY.to_string()))
            .expect("valid config")
            .with_user_email(PLAYER_EMAIL)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// `(method, collection)` of every request, in arrival order.
    pub fn calls(&self) -> Vec<(Method, String)> {
        self.requests()
            .into_iter()
            .map(|r| (r.method, r.collection))
            .collect()
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let collection = uri
        .path()
        .trim_start_matches("/rest/v1/")
        .to_string();

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        collection: collection.clone(),
        query: uri.query().unwrap_or_default().to_string(),
        apikey: header("apikey"),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body,
    });

    state
        .routes
        .get(&(method, collection))
        .cloned()
        .unwrap_or((
            StatusCode::NOT_FOUND,
            r#"{"message":"no route mocked"}"#.to_string(),
        ))
}
