//! Env command implementation for the dotscript CLI.
//!
//! Turns the saved environment into properties lines that an env-inject
//! build step can consume.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use dotscript_core::artifact;

/// Print or write the env-inject properties for an artifact.
pub fn execute(artifact_path: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let saved = artifact::load_saved_environment(artifact_path)?.unwrap_or_default();
    tracing::debug!(
        path = %artifact_path.display(),
        entries = saved.len(),
        "loaded saved environment"
    );

    let properties = artifact::to_env_properties(&saved);

    match output {
        Some(path) => fs::write(path, properties)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(properties.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
