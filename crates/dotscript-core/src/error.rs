//! Error types for dotscript-core.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for dotscript-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running a script.
#[derive(Debug, Error)]
pub enum Error {
    /// No registered entry point matched the required name.
    #[error("cannot find any main method named `{name}`")]
    EntryPointNotFound { name: String },

    /// The resolved entry point declares a parameter that cannot be bound.
    #[error("main method `{name}` contains invalid parameters: unsupported `{parameter}`")]
    UnsupportedParameter { name: String, parameter: String },

    /// The script raised an error or panicked.
    #[error("an error happened executing the script")]
    ScriptExecution {
        #[source]
        source: ScriptError,
    },

    /// Writing the session artifact failed.
    #[error("failed to persist session state to {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Render the error together with a hint on how to recover from it.
    pub fn with_hint(&self) -> String {
        let hint = match self {
            Error::EntryPointNotFound { name } => format!(
                "register a function named `{name}`, or set DOTSCRIPT_DEPLOYMENT to match the registered name"
            ),
            Error::UnsupportedParameter { .. } => {
                "entry points may only take `&[String]` and `&mut SessionState`".to_string()
            }
            Error::ScriptExecution { source } if source.is_panic() => {
                "the script panicked; set RUST_BACKTRACE=1 for a backtrace".to_string()
            }
            Error::ScriptExecution { .. } => {
                "the script returned an error, see the cause below".to_string()
            }
            Error::Persist { .. } => {
                "check that the working directory is writable".to_string()
            }
            Error::Serialization(_) | Error::Io(_) => return self.to_string(),
            Error::Config(_) => {
                "valid DOTSCRIPT_DEPLOYMENT values are `dotscript` and `script`".to_string()
            }
        };
        format!("{self}\n  hint: {hint}")
    }
}

/// The failure raised by a script, preserved as the cause of
/// [`Error::ScriptExecution`].
#[derive(Debug)]
pub struct ScriptError {
    kind: ScriptErrorKind,
}

#[derive(Debug)]
enum ScriptErrorKind {
    Raised(Box<dyn StdError + Send + Sync>),
    Panicked(String),
}

impl ScriptError {
    /// Wrap an error returned by the script.
    pub fn raised(error: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            kind: ScriptErrorKind::Raised(error.into()),
        }
    }

    /// Build from a panic payload caught while invoking the script.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self {
            kind: ScriptErrorKind::Panicked(message),
        }
    }

    /// Whether the script panicked rather than returning an error.
    pub fn is_panic(&self) -> bool {
        matches!(self.kind, ScriptErrorKind::Panicked(_))
    }

    /// The error the script returned, if it returned one.
    pub fn raised_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match &self.kind {
            ScriptErrorKind::Raised(e) => Some(e.as_ref()),
            ScriptErrorKind::Panicked(_) => None,
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ScriptErrorKind::Raised(e) => write!(f, "{e}"),
            ScriptErrorKind::Panicked(msg) => write!(f, "script panicked: {msg}"),
        }
    }
}

impl StdError for ScriptError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ScriptErrorKind::Raised(e) => Some(e.as_ref()),
            ScriptErrorKind::Panicked(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_execution_keeps_source() {
        let err = Error::ScriptExecution {
            source: ScriptError::raised("disk full"),
        };
        assert_eq!(err.to_string(), "an error happened executing the script");

        let source = err.source().expect("source should be preserved");
        assert_eq!(source.to_string(), "disk full");
    }

    #[test]
    fn test_panic_payloads() {
        let from_str = ScriptError::from_panic(Box::new("boom"));
        assert!(from_str.is_panic());
        assert_eq!(from_str.to_string(), "script panicked: boom");

        let from_string = ScriptError::from_panic(Box::new(String::from("bang")));
        assert_eq!(from_string.to_string(), "script panicked: bang");

        let opaque = ScriptError::from_panic(Box::new(42_u8));
        assert_eq!(opaque.to_string(), "script panicked: unknown panic payload");
        assert!(opaque.raised_error().is_none());
    }

    #[test]
    fn test_with_hint() {
        let err = Error::EntryPointNotFound {
            name: "ScriptMain".to_string(),
        };
        let rendered = err.with_hint();
        assert!(rendered.starts_with("cannot find any main method named `ScriptMain`"));
        assert!(rendered.contains("hint:"));
    }
}
