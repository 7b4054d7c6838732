// crates/client/src/lib.rs
//! Client library for a remote file-conversion service.
//!
//! The pieces, leaves first: [`session::SessionStore`] is the single
//! source of truth for authentication state; [`transport::Transport`]
//! performs authenticated calls and classifies every response;
//! [`catalog::CatalogClient`] caches the server's conversion matrix;
//! [`submit::SubmitFlow`] validates and uploads; [`poller::JobPoller`]
//! keeps a snapshot of the job collection in sync; [`actions::JobActions`]
//! issues cancel/download without ever second-guessing server truth.

pub mod actions;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod paths;
pub mod poller;
pub mod session;
pub mod submit;
pub mod transport;

use std::sync::Arc;

pub use actions::JobActions;
pub use auth::AuthClient;
pub use catalog::CatalogClient;
pub use config::ClientConfig;
pub use error::{Error, Result, ValidationError};
pub use poller::{JobFilter, JobPoller, PollPolicy, PollerState};
pub use session::{SessionEvent, SessionStore};
pub use submit::{SubmitFlow, Submission};
pub use transport::{Payload, Transport};

/// Everything wired together: one session store, one transport, and the
/// flows that share them.
pub struct Client {
    config: ClientConfig,
    pub session: Arc<SessionStore>,
    pub transport: Arc<Transport>,
    pub auth: AuthClient,
    pub catalog: CatalogClient,
    pub submit: SubmitFlow,
    pub jobs: JobActions,
}

impl Client {
    /// Build a client from config, rehydrating any persisted session.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let session = Arc::new(match &config.credentials_path {
            Some(path) => SessionStore::open(path),
            None => SessionStore::open_default(),
        });
        let transport = Arc::new(Transport::new(&config, Arc::clone(&session))?);
        Ok(Self {
            auth: AuthClient::new(Arc::clone(&transport), Arc::clone(&session)),
            catalog: CatalogClient::new(Arc::clone(&transport)),
            submit: SubmitFlow::new(Arc::clone(&transport)),
            jobs: JobActions::new(Arc::clone(&transport)),
            session,
            transport,
            config,
        })
    }

    /// A fresh polling engine over this client's transport, at the
    /// configured cadence. Engines are independent; each caller that
    /// needs a live list owns its own.
    pub fn poller(&self) -> JobPoller {
        JobPoller::new(Arc::clone(&self.transport), self.config.poll_interval)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}
