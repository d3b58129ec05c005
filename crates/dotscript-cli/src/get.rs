//! Get command implementation for the dotscript CLI.

use std::path::Path;

use anyhow::bail;
use dotscript_core::artifact;

/// Print the saved value for `key`, failing if it is absent.
pub fn execute(artifact_path: &Path, key: &str) -> anyhow::Result<()> {
    let saved = artifact::load_saved_environment(artifact_path)?.unwrap_or_default();

    match saved.get(key) {
        Some(value) => {
            println!("{value}");
            Ok(())
        }
        None => bail!("`{}` is not saved in {}", key, artifact_path.display()),
    }
}
