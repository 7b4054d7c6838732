// crates/types/src/session.rs
//! Session and identity types shared by the session store and auth flows.

use serde::{Deserialize, Serialize};

/// The authenticated user as the server reports it.
///
/// Extra wire fields (storage quota, timestamps) are ignored on
/// deserialization so server-side additions don't break older clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role: String,
}

impl Identity {
    /// True iff the server granted the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// One live authenticated session: token pair plus identity.
///
/// Invariant: a `Session` always carries all three parts. Partial states
/// (token without identity) are unrepresentable — the session store swaps
/// an `Option<Session>` wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access: String,
    pub refresh: String,
    pub user: Identity,
}

/// Body of a successful login/register response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: Identity,
    pub access: String,
    pub refresh: String,
}

/// Storage usage for the current account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageInfo {
    pub quota: i64,
    pub used: i64,
    pub available: i64,
    pub percentage: f64,
}
