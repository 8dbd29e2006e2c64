//! Web front end.
//!
//! Serves a server-rendered editing page backed by per-browser
//! [`EditorSession`](crate::ui::EditorSession)s, plus `POST /api/edit` which
//! exposes the edit handler as JSON.

mod page;
mod routes;
mod sessions;

pub use sessions::{SessionHandle, SessionStore, SESSION_COOKIE};

use crate::config::ServerConfig;
use crate::error::Result;
use crate::image::ImageEditor;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    editor: Arc<dyn ImageEditor>,
    sessions: SessionStore,
}

impl AppState {
    /// Wraps `editor` with an empty session store of the default size.
    pub fn new(editor: Arc<dyn ImageEditor>) -> Self {
        Self {
            editor,
            sessions: SessionStore::new(),
        }
    }

    /// Replaces the session store with an empty one holding `max_sessions`.
    pub fn with_session_limit(mut self, max_sessions: usize) -> Self {
        self.sessions = SessionStore::with_limit(max_sessions);
        self
    }

    /// Live browser sessions.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

/// Builds the application router.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/upload", post(routes::upload))
        .route("/generate", post(routes::generate))
        .route("/clear", post(routes::clear))
        .route("/api/edit", post(routes::api_edit))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `config.bind` and serves until the process is stopped.
pub async fn serve(editor: Arc<dyn ImageEditor>, config: ServerConfig) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        model = editor.model(),
        max_upload_bytes = config.max_upload_bytes,
        max_sessions = config.max_sessions,
        "image editor listening"
    );

    let state = AppState::new(editor).with_session_limit(config.max_sessions);
    let app = router(state, &config);
    axum::serve(listener, app).await?;
    Ok(())
}
