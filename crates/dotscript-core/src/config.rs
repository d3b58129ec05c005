//! Executor configuration.
//!
//! Two deployments of the same protocol exist, differing only in the
//! entry-point name they require. The artifact path defaults to
//! `jenkinsExecution.json` in the current working directory.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Default artifact file name, read back by the build host.
pub const ARTIFACT_FILE_NAME: &str = "jenkinsExecution.json";

/// Environment variable selecting the deployment.
pub const DEPLOYMENT_ENV: &str = "DOTSCRIPT_DEPLOYMENT";

/// Environment variable overriding the artifact path.
pub const ARTIFACT_ENV: &str = "DOTSCRIPT_ARTIFACT";

/// Which entry-point name a deployment requires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Deployment {
    /// Requires `DotScriptMain`.
    #[default]
    DotScript,
    /// Requires `ScriptMain`.
    Script,
}

impl Deployment {
    pub fn entry_name(self) -> &'static str {
        match self {
            Deployment::DotScript => "DotScriptMain",
            Deployment::Script => "ScriptMain",
        }
    }
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deployment::DotScript => f.write_str("dotscript"),
            Deployment::Script => f.write_str("script"),
        }
    }
}

impl FromStr for Deployment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dotscript" => Ok(Deployment::DotScript),
            "script" => Ok(Deployment::Script),
            other => Err(Error::Config(format!("unknown deployment `{other}`"))),
        }
    }
}

/// Settings for a single [`Executor`](crate::Executor) run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Entry-point name to resolve.
    pub entry_name: String,
    /// Where the session artifact is written.
    pub artifact_path: PathBuf,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::for_deployment(Deployment::default())
    }
}

impl ExecutorConfig {
    pub fn for_deployment(deployment: Deployment) -> Self {
        Self {
            entry_name: deployment.entry_name().to_string(),
            artifact_path: PathBuf::from(ARTIFACT_FILE_NAME),
        }
    }

    /// Build from `DOTSCRIPT_DEPLOYMENT` and `DOTSCRIPT_ARTIFACT`, falling back
    /// to the defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let deployment = match lookup(DEPLOYMENT_ENV) {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => Deployment::default(),
        };

        let mut config = Self::for_deployment(deployment);
        if let Some(path) = lookup(ARTIFACT_ENV).filter(|p| !p.is_empty()) {
            config.artifact_path = PathBuf::from(path);
        }
        Ok(config)
    }

    pub fn with_entry_name(mut self, name: impl Into<String>) -> Self {
        self.entry_name = name.into();
        self
    }

    pub fn with_artifact_path(mut self, path: impl AsRef<Path>) -> Self {
        self.artifact_path = path.as_ref().to_path_buf();
        self
    }
}
