// crates/client/src/paths.rs
//! Centralized path functions for client storage locations.
//!
//! Single source of truth — no ad-hoc `dirs::config_dir().join(...)`
//! elsewhere in the crate.

use std::path::PathBuf;

/// App config root: `~/.config/morphbox/` (Linux) or the platform
/// equivalent.
pub fn app_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("morphbox"))
}

/// Credentials file holding the persisted session:
/// `<app_config_dir>/credentials.json`.
pub fn credentials_path() -> Option<PathBuf> {
    app_config_dir().map(|d| d.join("credentials.json"))
}
