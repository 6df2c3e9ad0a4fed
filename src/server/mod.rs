//! Dev server for shared storage and session ownership.
//!
//! Two endpoint families, consumed by the HTTP persistence backend and the
//! HTTP session transport:
//!
//! - `GET /api/storage` returns the whole storage document, or `{}` if
//!   nothing was ever saved; `POST /api/storage` validates the body parses
//!   as JSON and replaces the file atomically.
//! - `POST /api/session` registers or heartbeats a session against the
//!   single ownership record; `DELETE /api/session` releases it. Ownership
//!   expires when heartbeats stop long enough, so a crashed owner does not
//!   wedge the sink.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tower_http::cors::CorsLayer;

use crate::session::{SessionAction, SessionRelease, SessionReply, SessionRequest};

/// A session gets this many missed heartbeat intervals before its
/// ownership is considered stale.
const STALE_MULTIPLIER: u32 = 3;

/// The single ownership record.
#[derive(Debug, Clone)]
struct OwnerRecord {
    session_id: String,
    connected_at: DateTime<Utc>,
    last_heartbeat: Instant,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Path of the storage document
    storage_path: PathBuf,
    /// Current owner, if any
    owner: Arc<Mutex<Option<OwnerRecord>>>,
    /// Heartbeats older than this mark the owner stale
    stale_after: Duration,
}

impl AppState {
    pub fn new(storage_path: PathBuf, heartbeat_secs: u64) -> Self {
        Self {
            storage_path,
            owner: Arc::new(Mutex::new(None)),
            stale_after: Duration::from_secs(heartbeat_secs * STALE_MULTIPLIER as u64),
        }
    }

    /// Apply a register/heartbeat request to the ownership record.
    fn apply_session(&self, request: &SessionRequest) -> SessionReply {
        let mut owner = self.owner.lock().expect("owner lock");
        let now = Instant::now();

        let grant = match owner.as_ref() {
            None => true,
            Some(record) => {
                record.session_id == request.session_id
                    || now.duration_since(record.last_heartbeat) > self.stale_after
            }
        };

        if grant {
            let connected_at = match owner.as_ref() {
                Some(record) if record.session_id == request.session_id => record.connected_at,
                _ => Utc::now(),
            };
            *owner = Some(OwnerRecord {
                session_id: request.session_id.clone(),
                connected_at,
                last_heartbeat: now,
            });
            SessionReply {
                is_owner: true,
                owner_id: Some(request.session_id.clone()),
                owner_connected_at: Some(connected_at),
            }
        } else {
            let record = owner.as_ref().unwrap();
            SessionReply {
                is_owner: false,
                owner_id: Some(record.session_id.clone()),
                owner_connected_at: Some(record.connected_at),
            }
        }
    }

    /// Release ownership if held by the given session.
    fn release_session(&self, session_id: &str) -> bool {
        let mut owner = self.owner.lock().expect("owner lock");
        match owner.as_ref() {
            Some(record) if record.session_id == session_id => {
                *owner = None;
                true
            }
            _ => false,
        }
    }
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/storage", get(get_storage).post(post_storage))
        .route(
            "/api/session",
            post(post_session).delete(delete_session),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the dev server.
pub async fn start_server(
    data_dir: &Path,
    port: u16,
    host: &str,
    heartbeat_secs: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "schemeland=info,tower_http=warn".into()),
        )
        .try_init()
        .ok();

    std::fs::create_dir_all(data_dir)?;
    let state = AppState::new(data_dir.join("storage.json"), heartbeat_secs);
    let app = router(state);

    let host_addr: std::net::IpAddr = host
        .parse()
        .map_err(|e| format!("Invalid host address '{}': {}", host, e))?;
    let addr = SocketAddr::from((host_addr, port));
    tracing::info!("Starting SchemeLand storage server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutting down");
}

/// Return the whole storage document, or `{}` when absent/unreadable.
async fn get_storage(State(state): State<AppState>) -> Json<serde_json::Value> {
    let value = std::fs::read_to_string(&state.storage_path)
        .ok()
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_else(|| serde_json::json!({}));
    Json(value)
}

/// Replace the storage document wholesale after validating it parses.
async fn post_storage(State(state): State<AppState>, body: String) -> impl IntoResponse {
    if serde_json::from_str::<serde_json::Value>(&body).is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "body is not valid JSON"})),
        );
    }

    match write_atomic(&state.storage_path, &body) {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({"success": true}))),
        Err(e) => {
            tracing::error!("storage write failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
        }
    }
}

/// Write the whole file via temp-file + rename.
fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Register or heartbeat a session.
async fn post_session(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Json<SessionReply> {
    let reply = state.apply_session(&request);
    match request.action {
        SessionAction::Register => {
            tracing::info!(
                session = %request.session_id,
                granted = reply.is_owner,
                "session register"
            );
        }
        SessionAction::Heartbeat => {
            tracing::debug!(
                session = %request.session_id,
                owner = reply.is_owner,
                "session heartbeat"
            );
        }
    }
    Json(reply)
}

/// Release session ownership.
async fn delete_session(
    State(state): State<AppState>,
    Json(request): Json<SessionRelease>,
) -> Json<serde_json::Value> {
    let released = state.release_session(&request.session_id);
    tracing::info!(session = %request.session_id, released, "session release");
    Json(serde_json::json!({"released": released}))
}
