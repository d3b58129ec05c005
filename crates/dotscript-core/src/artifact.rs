//! Reading the session artifact back on the build-host side.
//!
//! After a run, the host injects the saved environment into the build as
//! properties-style `KEY=VALUE` lines.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::Result;

/// Field holding the saved environment in the artifact.
pub const SAVED_ENVIRONMENT_FIELD: &str = "SavedEnvironment";

/// Load the saved environment from an artifact file.
///
/// Returns `None` (and logs a warning) when the artifact has no
/// `SavedEnvironment` object.
pub fn load_saved_environment(path: impl AsRef<Path>) -> Result<Option<BTreeMap<String, String>>> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_saved_environment(&contents)
}

/// Parse the saved environment from artifact JSON text.
///
/// String values are taken as-is, `null` becomes the literal `null`, and
/// any other value is rendered as its JSON text.
pub fn parse_saved_environment(json: &str) -> Result<Option<BTreeMap<String, String>>> {
    let root: Value = serde_json::from_str(json)?;

    let Some(Value::Object(environment)) = root.get(SAVED_ENVIRONMENT_FIELD) else {
        tracing::warn!("SavedEnvironment not found");
        return Ok(None);
    };

    let saved = environment
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Null => "null".to_string(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect();

    Ok(Some(saved))
}

/// Render saved values as env-inject properties, one `KEY=VALUE\r\n` line
/// per entry. Backslashes in values are doubled.
pub fn to_env_properties(saved: &BTreeMap<String, String>) -> String {
    saved
        .iter()
        .map(|(key, value)| format!("{}={}\r\n", key, value.replace('\\', "\\\\")))
        .collect()
}
