//! Application settings.
//!
//! Settings are a flat key/value map with documented defaults plus
//! arbitrary user-defined keys. Values keep their native JSON types.

use std::collections::BTreeMap;

use serde_json::{Value, json};

/// The settings map as persisted in the document.
pub type SettingsMap = BTreeMap<String, Value>;

/// Well-known setting keys.
pub mod keys {
    /// UI theme: `"light"`, `"dark"`, or `"system"`.
    pub const THEME: &str = "theme";
    /// Verb pre-selected for new requests.
    pub const DEFAULT_METHOD: &str = "defaultMethod";
    /// Per-request timeout in milliseconds.
    pub const REQUEST_TIMEOUT: &str = "requestTimeout";
    /// Whether the HTTP adapter follows redirects.
    pub const FOLLOW_REDIRECTS: &str = "followRedirects";
    /// Whether TLS certificates are verified.
    pub const SSL_VERIFICATION: &str = "sslVerification";
    /// Whether edits are saved without an explicit save action.
    pub const AUTO_SAVE_REQUESTS: &str = "autoSaveRequests";
    /// Maximum number of retained history entries.
    pub const MAX_HISTORY: &str = "maxHistory";
    /// Whether verbose diagnostics are enabled.
    pub const DEBUG_MODE: &str = "debugMode";
}

/// Returns the default settings for a fresh document. `reset` restores
/// exactly this map.
#[must_use]
pub fn default_settings() -> SettingsMap {
    let mut settings = SettingsMap::new();
    settings.insert(keys::THEME.to_string(), json!("system"));
    settings.insert(keys::DEFAULT_METHOD.to_string(), json!("GET"));
    settings.insert(keys::REQUEST_TIMEOUT.to_string(), json!(30_000));
    settings.insert(keys::FOLLOW_REDIRECTS.to_string(), json!(true));
    settings.insert(keys::SSL_VERIFICATION.to_string(), json!(true));
    settings.insert(keys::AUTO_SAVE_REQUESTS.to_string(), json!(true));
    settings.insert(keys::MAX_HISTORY.to_string(), json!(100));
    settings.insert(keys::DEBUG_MODE.to_string(), json!(false));
    settings
}

/// Reads `maxHistory` from a settings map, falling back to the default
/// when missing or malformed.
#[must_use]
pub fn max_history(settings: &SettingsMap) -> usize {
    settings
        .get(keys::MAX_HISTORY)
        .and_then(Value::as_u64)
        .map_or(100, |n| n as usize)
}
