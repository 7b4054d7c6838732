// crates/client/src/session.rs
//! The session store: single source of truth for authentication state.
//!
//! Holds the current `Session` behind a `std::sync::RwLock` (writes are
//! rare, reads are uncontended, and the lock is never held across an
//! `.await`), persists it to a credentials file, and broadcasts every
//! mutation so the transport and UI observe changes without import-order
//! coupling.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use morphbox_types::{Identity, Session};
use tokio::sync::broadcast;

use crate::error::{Error, Result};
use crate::paths;

/// Published on every session mutation.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    SignedIn(Identity),
    SignedOut,
}

/// Injectable holder for the one live session per client.
///
/// All three parts of a session (access token, refresh token, identity)
/// are swapped as a unit — partial states are unrepresentable. Mutations
/// are visible to all readers as soon as the call returns.
pub struct SessionStore {
    /// Credentials file. `None` when the platform has no config dir; the
    /// store then works in memory only.
    path: Option<PathBuf>,
    current: RwLock<Option<Session>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    /// Store backed by the platform credentials file, rehydrated from disk.
    pub fn open_default() -> Self {
        match paths::credentials_path() {
            Some(path) => Self::open(path),
            None => {
                tracing::warn!("no config directory — session will not persist");
                Self::new_inner(None)
            }
        }
    }

    /// Store backed by an explicit credentials file, rehydrated from disk.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let store = Self::new_inner(Some(path));
        let loaded = store.path.as_deref().and_then(load_credentials);
        if let Some(session) = loaded {
            match store.current.write() {
                Ok(mut guard) => *guard = Some(session),
                Err(e) => tracing::error!("RwLock poisoned rehydrating session: {e}"),
            }
        }
        store
    }

    fn new_inner(path: Option<PathBuf>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            path,
            current: RwLock::new(None),
            events,
        }
    }

    /// The current session, if authenticated.
    pub fn get(&self) -> Option<Session> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(e) => {
                tracing::error!("RwLock poisoned reading session: {e}");
                None
            }
        }
    }

    /// Install a new session: persist, swap in memory, publish.
    ///
    /// Persistence failure leaves the previous state fully intact — the
    /// caller sees the error, readers never see a half-written session.
    pub fn set(&self, access: String, refresh: String, user: Identity) -> Result<()> {
        let session = Session {
            access,
            refresh,
            user,
        };
        if let Some(path) = &self.path {
            persist_credentials(path, &session)?;
        }
        let identity = session.user.clone();
        match self.current.write() {
            Ok(mut guard) => *guard = Some(session),
            Err(e) => tracing::error!("RwLock poisoned writing session: {e}"),
        }
        let _ = self.events.send(SessionEvent::SignedIn(identity));
        Ok(())
    }

    /// Destroy the session wholesale: persisted entries and in-memory
    /// state together. Infallible on purpose — the 401 handler must always
    /// be able to invalidate, so file removal problems are only logged.
    pub fn clear(&self) {
        if let Some(path) = &self.path {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove credentials file");
                }
            }
        }
        let had_session = match self.current.write() {
            Ok(mut guard) => guard.take().is_some(),
            Err(e) => {
                tracing::error!("RwLock poisoned clearing session: {e}");
                false
            }
        };
        if had_session {
            let _ = self.events.send(SessionEvent::SignedOut);
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().is_some_and(|s| !s.access.is_empty())
    }

    pub fn is_admin(&self) -> bool {
        self.get().is_some_and(|s| s.user.is_admin())
    }

    /// Subscribe to session mutations.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

/// Read and parse the credentials file. A corrupt file is removed and
/// treated as "no session" — never surfaced as a partial one.
fn load_credentials(path: &Path) -> Option<Session> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "failed to read credentials file");
            }
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "discarding corrupt credentials file");
            let _ = std::fs::remove_file(path);
            None
        }
    }
}

/// Write the credentials file atomically (temp file + rename) so readers
/// of the file never observe a torn write.
fn persist_credentials(path: &Path, session: &Session) -> Result<()> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(io_err)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
    let json = serde_json::to_vec_pretty(session).map_err(|e| Error::decode("credentials", e))?;
    tmp.write_all(&json).map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
