//! In-memory session store keyed by a browser cookie.

use crate::config::DEFAULT_MAX_SESSIONS;
use crate::image::EditResult;
use crate::ui::{EditorSession, GenerationTicket};
use axum::http::header::{HeaderMap, HeaderValue, COOKIE};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "imagedit_session";

/// Sessions untouched for this long are dropped.
const SESSION_TTL: Duration = Duration::from_secs(60 * 60);

struct Entry {
    session: EditorSession,
    last_seen: Instant,
}

/// The session a request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    /// Session id, also the cookie value.
    pub id: String,
    /// True when the request carried no known id and a cookie must be set.
    pub created: bool,
}

impl SessionHandle {
    /// `Set-Cookie` value for a freshly created session.
    pub fn set_cookie(&self) -> Option<HeaderValue> {
        if !self.created {
            return None;
        }
        HeaderValue::from_str(&format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            self.id
        ))
        .ok()
    }
}

/// Shared map of live sessions, bounded in size.
#[derive(Clone)]
pub struct SessionStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limit(DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    /// Creates a store holding up to [`DEFAULT_MAX_SESSIONS`] sessions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding up to `max_sessions` sessions (at least one).
    pub fn with_limit(max_sessions: usize) -> Self {
        Self {
            entries: Arc::default(),
            max_sessions: max_sessions.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` on the session named by `id`, creating one when `id` is
    /// missing or unknown.
    pub fn access<R>(
        &self,
        id: Option<&str>,
        f: impl FnOnce(&mut EditorSession) -> R,
    ) -> (SessionHandle, R) {
        let mut entries = self.lock();
        let now = Instant::now();

        let handle = match id {
            Some(id) if entries.contains_key(id) => SessionHandle {
                id: id.to_string(),
                created: false,
            },
            _ => {
                entries.retain(|_, e| now.duration_since(e.last_seen) < SESSION_TTL);
                while entries.len() >= self.max_sessions {
                    let Some(oldest) = entries
                        .iter()
                        .min_by_key(|(_, e)| e.last_seen)
                        .map(|(id, _)| id.clone())
                    else {
                        break;
                    };
                    entries.remove(&oldest);
                    tracing::info!(session = %oldest, "evicted least recently seen session");
                }
                let id = new_session_id();
                tracing::debug!(session = %id, live = entries.len() + 1, "new session");
                SessionHandle { id, created: true }
            }
        };

        let entry = entries.entry(handle.id.clone()).or_insert_with(|| Entry {
            session: EditorSession::new(),
            last_seen: now,
        });
        entry.last_seen = now;
        let result = f(&mut entry.session);
        (handle, result)
    }

    /// Runs `f` on an existing session without creating one. Returns `None`
    /// when `id` is missing or unknown.
    pub fn peek<R>(&self, id: Option<&str>, f: impl FnOnce(&EditorSession) -> R) -> Option<R> {
        let mut entries = self.lock();
        let entry = entries.get_mut(id?)?;
        entry.last_seen = Instant::now();
        Some(f(&entry.session))
    }

    /// Delivers a finished generation. Returns false when the session is gone
    /// or the result was superseded.
    pub fn complete(&self, id: &str, ticket: GenerationTicket, result: EditResult) -> bool {
        match self.lock().get_mut(id) {
            Some(entry) => entry.session.complete(ticket, result),
            None => {
                tracing::warn!(session = %id, "session expired before generation finished");
                false
            }
        }
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no session is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reads the session id from the request's `Cookie` headers.
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageFile;

    #[test]
    fn test_unknown_id_creates_session() {
        let store = SessionStore::new();
        let (handle, _) = store.access(Some("forged"), |_| ());
        assert!(handle.created);
        assert_ne!(handle.id, "forged");
        assert_eq!(handle.id.len(), 32);
        assert!(handle.set_cookie().is_some());

        let (again, _) = store.access(Some(handle.id.as_str()), |_| ());
        assert!(!again.created);
        assert!(again.set_cookie().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_complete_routes_result_to_session() {
        let store = SessionStore::new();
        let (handle, pending) = store.access(None, |s| {
            s.upload(ImageFile::new("AAAA", "image/png")).unwrap();
            s.set_prompt("blur").unwrap();
            s.begin_generation().unwrap()
        });

        assert!(!store.complete("missing", pending.ticket, EditResult::error("x")));
        assert!(store.complete(&handle.id, pending.ticket, EditResult::error("x")));

        let (_, state) = store.access(Some(handle.id.as_str()), |s| s.state().name());
        assert_eq!(state, "error");
    }

    #[test]
    fn test_session_cookie_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_cookie(&headers), None);

        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; imagedit_session=abc123; other=1"),
        );
        assert_eq!(session_cookie(&headers), Some("abc123"));

        headers.insert(COOKIE, HeaderValue::from_static("imagedit_session="));
        assert_eq!(session_cookie(&headers), None);
    }

    #[test]
    fn test_session_ids_are_distinct() {
        let id = new_session_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, new_session_id());
    }

    #[test]
    fn test_peek_never_creates() {
        let store = SessionStore::new();
        assert_eq!(store.peek(None, |s| s.view()), None);
        assert_eq!(store.peek(Some("unknown"), |s| s.view()), None);
        assert!(store.is_empty());

        let (handle, ()) = store.access(None, |_| ());
        assert_eq!(
            store.peek(Some(handle.id.as_str()), |s| s.state().name()),
            Some("idle")
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_full_store_evicts_least_recently_seen() {
        let store = SessionStore::with_limit(2);
        let (first, ()) = store.access(None, |_| ());
        std::thread::sleep(Duration::from_millis(5));
        let (second, ()) = store.access(None, |_| ());
        std::thread::sleep(Duration::from_millis(5));
        // Touching the first makes the second the oldest.
        store.peek(Some(first.id.as_str()), |_| ());
        std::thread::sleep(Duration::from_millis(5));

        let (third, ()) = store.access(None, |_| ());
        assert_eq!(store.len(), 2);
        assert!(store.peek(Some(first.id.as_str()), |_| ()).is_some());
        assert!(store.peek(Some(second.id.as_str()), |_| ()).is_none());
        assert!(store.peek(Some(third.id.as_str()), |_| ()).is_some());
    }
}
