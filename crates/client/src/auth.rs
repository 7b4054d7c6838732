// crates/client/src/auth.rs
//! Login, registration and identity flows.

use std::sync::Arc;

use morphbox_types::{AuthResponse, Identity, StorageInfo};
use serde_json::json;

use crate::error::Result;
use crate::session::SessionStore;
use crate::transport::Transport;

/// Auth endpoints plus the session side effects they imply.
pub struct AuthClient {
    transport: Arc<Transport>,
    session: Arc<SessionStore>,
}

impl AuthClient {
    pub fn new(transport: Arc<Transport>, session: Arc<SessionStore>) -> Self {
        Self { transport, session }
    }

    /// Exchange credentials for a session and install it in the store.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity> {
        let resp: AuthResponse = self
            .transport
            .post_json("/auth/login/", &json!({ "email": email, "password": password }))
            .await?;
        self.install(resp)
    }

    /// Create an account; the server logs the new user straight in.
    /// The confirmation field is duplicated client-side — the form's
    /// "repeat password" box has no business reaching this layer.
    pub async fn register(&self, email: &str, password: &str) -> Result<Identity> {
        let resp: AuthResponse = self
            .transport
            .post_json(
                "/auth/register/",
                &json!({ "email": email, "password": password, "password2": password }),
            )
            .await?;
        self.install(resp)
    }

    fn install(&self, resp: AuthResponse) -> Result<Identity> {
        self.session
            .set(resp.access, resp.refresh, resp.user.clone())?;
        Ok(resp.user)
    }

    /// Fetch the current identity from the server.
    pub async fn me(&self) -> Result<Identity> {
        self.transport.get_json("/auth/me/", &[]).await
    }

    /// Fetch storage usage for the current account.
    pub async fn storage(&self) -> Result<StorageInfo> {
        self.transport.get_json("/auth/me/storage/", &[]).await
    }

    /// Drop the session. Purely local — token expiry is server-side.
    pub fn logout(&self) {
        self.session.clear();
    }
}
