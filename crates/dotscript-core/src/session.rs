//! Session state shared between the host and a running script.
//!
//! A [`SessionState`] is created empty for every run, handed to the script
//! as `&mut SessionState`, and serialized once the run finishes:
//!
//! ```json
//! {
//!   "SavedEnvironment": {
//!     "BUILD_LABEL": "nightly"
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key/value environment saved by a script for the build host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Values explicitly set during this run.
    #[serde(rename = "SavedEnvironment")]
    saved: BTreeMap<String, String>,
}

impl SessionState {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.saved.insert(key.into(), value.into());
    }

    /// Look up a value.
    ///
    /// Values set on the session take precedence; otherwise the process
    /// environment variable of the same name is returned if present.
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.saved.get(key) {
            return Some(value.clone());
        }
        env_lookup(key)
    }

    /// Remove a saved value. The process environment is not touched.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.saved.remove(key)
    }

    /// Whether the key was explicitly set during this run.
    pub fn contains(&self, key: &str) -> bool {
        self.saved.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.saved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saved.is_empty()
    }

    /// Iterate over saved values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.saved.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize to the indented JSON artifact format.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Read an environment variable, treating unusable keys and non-UTF-8
/// values as absent.
fn env_lookup(key: &str) -> Option<String> {
    if key.is_empty() || key.contains(['=', '\0']) {
        return None;
    }
    std::env::var(key).ok()
}
