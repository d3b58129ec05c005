//! Execution coordinator.
//!
//! Runs one script per call:
//!
//! ```text
//! Executor::execute(registry, args)
//!     │
//!     ├── SessionState::new()  (held by a persist guard)
//!     ├── Registry::resolve(entry_name) ── none ──> EntryPointNotFound
//!     ├── bind parameters ──────────── unsupported ──> UnsupportedParameter
//!     ├── EntryPoint::invoke ───────── error/panic ──> ScriptExecution
//!     └── persist guard writes the artifact (every path, exactly once)
//! ```

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crate::config::ExecutorConfig;
use crate::entry::{Binding, EntryPoint, Invocation, ParamKind, ReturnKind};
use crate::error::{Error, Result, ScriptError};
use crate::resolver::Registry;
use crate::session::SessionState;

/// Destination for the session state at the end of a run.
pub trait StateSink {
    fn persist(&mut self, state: &SessionState) -> Result<()>;
}

/// Writes the session state as indented JSON, overwriting the file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateSink for JsonFileSink {
    fn persist(&mut self, state: &SessionState) -> Result<()> {
        let json = state.to_json_pretty()?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| Error::Persist {
                path: self.path.clone(),
                source,
            })?;
        }

        fs::write(&self.path, json).map_err(|source| Error::Persist {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), entries = state.len(), "session state persisted");
        Ok(())
    }
}

/// RAII guard that persists the session exactly once.
///
/// The normal path calls [`PersistGuard::persist`]; if the run unwinds
/// before that, `Drop` writes the state instead.
struct PersistGuard<'a> {
    state: SessionState,
    sink: &'a mut dyn StateSink,
    persisted: bool,
}

impl<'a> PersistGuard<'a> {
    fn new(sink: &'a mut dyn StateSink) -> Self {
        Self {
            state: SessionState::new(),
            sink,
            persisted: false,
        }
    }

    fn persist(&mut self) -> Result<()> {
        self.persisted = true;
        self.sink.persist(&self.state)
    }
}

impl Drop for PersistGuard<'_> {
    fn drop(&mut self) {
        if !self.persisted
            && let Err(e) = self.persist()
        {
            tracing::error!("Failed to persist session state during unwind: {}", e);
        }
    }
}

/// Resolves and runs a script entry point, persisting its session state.
pub struct Executor<S = JsonFileSink> {
    config: ExecutorConfig,
    sink: S,
}

impl Executor<JsonFileSink> {
    /// Create an executor writing the artifact to `config.artifact_path`.
    pub fn new(config: ExecutorConfig) -> Self {
        let sink = JsonFileSink::new(&config.artifact_path);
        Self { config, sink }
    }
}

impl<S: StateSink> Executor<S> {
    /// Create an executor with a custom persistence sink.
    pub fn with_sink(config: ExecutorConfig, sink: S) -> Self {
        Self { config, sink }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run the configured entry point with `args`.
    ///
    /// Returns the script's exit code: its return value for integer entry
    /// points, 0 for unit ones. The session state is persisted before this
    /// returns, whatever the outcome. When both the run and the persistence
    /// fail, the run's error is returned and the persistence error logged.
    pub fn execute(&mut self, registry: &Registry, args: &[String]) -> Result<i32> {
        let entry_name = self.config.entry_name.as_str();
        tracing::info!(entry = entry_name, args = args.len(), "executing script");

        let mut guard = PersistGuard::new(&mut self.sink);
        let outcome = run_entry(registry, entry_name, args, &mut guard.state);
        let persisted = guard.persist();

        match (outcome, persisted) {
            (Ok(code), Ok(())) => {
                tracing::info!(entry = entry_name, code, "script finished");
                Ok(code)
            }
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => {
                tracing::debug!(entry = entry_name, "script run failed: {}", e);
                Err(e)
            }
            (Err(e), Err(persist_err)) => {
                tracing::error!("Failed to persist session state: {}", persist_err);
                Err(e)
            }
        }
    }
}

/// Map declared parameters to the two injectable capabilities.
fn bind_parameters(entry: &EntryPoint) -> Result<Vec<Binding>> {
    entry
        .params()
        .iter()
        .map(|param| match param {
            ParamKind::Args => Ok(Binding::Args),
            ParamKind::SessionState => Ok(Binding::SessionState),
            ParamKind::Unsupported(ty) => Err(Error::UnsupportedParameter {
                name: entry.name().to_string(),
                parameter: ty.clone(),
            }),
        })
        .collect()
}

fn run_entry(
    registry: &Registry,
    entry_name: &str,
    args: &[String],
    state: &mut SessionState,
) -> Result<i32> {
    let entry = registry
        .resolve(entry_name)
        .ok_or_else(|| Error::EntryPointNotFound {
            name: entry_name.to_string(),
        })?;

    let bindings = bind_parameters(entry)?;
    let invocation = Invocation::new(args, state, &bindings);

    let value = match panic::catch_unwind(AssertUnwindSafe(|| entry.invoke(invocation))) {
        Ok(Ok(value)) => value,
        Ok(Err(source)) => return Err(Error::ScriptExecution { source }),
        Err(payload) => {
            return Err(Error::ScriptExecution {
                source: ScriptError::from_panic(payload),
            });
        }
    };

    Ok(match entry.returns() {
        ReturnKind::Integer => value.unwrap_or(0),
        ReturnKind::Unit | ReturnKind::Unsupported(_) => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingSink {
        writes: Vec<SessionState>,
    }

    impl StateSink for CountingSink {
        fn persist(&mut self, state: &SessionState) -> Result<()> {
            self.writes.push(state.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl StateSink for FailingSink {
        fn persist(&mut self, _state: &SessionState) -> Result<()> {
            Err(Error::Persist {
                path: PathBuf::from("unwritable.json"),
                source: std::io::Error::other("read-only"),
            })
        }
    }

    fn executor() -> Executor<CountingSink> {
        Executor::with_sink(ExecutorConfig::default(), CountingSink::default())
    }

    #[test]
    fn test_bind_parameters() {
        let entry = EntryPoint::from_parts(
            "tests",
            "DotScriptMain",
            vec![ParamKind::SessionState, ParamKind::Args],
            ReturnKind::Unit,
            |_| Ok(None),
        );
        assert_eq!(
            bind_parameters(&entry).unwrap(),
            vec![Binding::SessionState, Binding::Args]
        );

        let entry = EntryPoint::from_parts(
            "tests",
            "DotScriptMain",
            vec![ParamKind::Args, ParamKind::Unsupported("HashMap<String, String>".to_string())],
            ReturnKind::Unit,
            |_| Ok(None),
        );
        match bind_parameters(&entry) {
            Err(Error::UnsupportedParameter { name, parameter }) => {
                assert_eq!(name, "DotScriptMain");
                assert_eq!(parameter, "HashMap<String, String>");
            }
            other => panic!("expected UnsupportedParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_persists_once_on_success() {
        let registry = Registry::new().register("DotScriptMain", |state: &mut SessionState| {
            state.set("K", "V");
        });

        let mut exec = executor();
        assert_eq!(exec.execute(&registry, &[]).unwrap(), 0);
        assert_eq!(exec.sink().writes.len(), 1);
        assert_eq!(exec.sink().writes[0].get("K").as_deref(), Some("V"));
    }

    #[test]
    fn test_persists_once_on_not_found() {
        let mut exec = executor();
        let err = exec.execute(&Registry::new(), &[]).unwrap_err();
        assert!(matches!(err, Error::EntryPointNotFound { .. }));
        assert_eq!(exec.sink().writes.len(), 1);
        assert!(exec.sink().writes[0].is_empty());
    }

    #[test]
    fn test_panic_is_wrapped() {
        let registry = Registry::new().register("DotScriptMain", |state: &mut SessionState| -> i32 {
            state.set("BEFORE", "1");
            panic!("kaboom");
        });

        let mut exec = executor();
        match exec.execute(&registry, &[]) {
            Err(Error::ScriptExecution { source }) => {
                assert!(source.is_panic());
                assert!(source.to_string().contains("kaboom"));
            }
            other => panic!("expected ScriptExecution, got {:?}", other),
        }
        assert_eq!(exec.sink().writes.len(), 1);
        assert_eq!(exec.sink().writes[0].get("BEFORE").as_deref(), Some("1"));
    }

    #[test]
    fn test_persist_failure_after_success() {
        let registry = Registry::new().register("DotScriptMain", || 3_i32);
        let mut exec = Executor::with_sink(ExecutorConfig::default(), FailingSink);
        assert!(matches!(
            exec.execute(&registry, &[]),
            Err(Error::Persist { .. })
        ));
    }

    #[test]
    fn test_run_error_wins_over_persist_failure() {
        let mut exec = Executor::with_sink(ExecutorConfig::default(), FailingSink);
        assert!(matches!(
            exec.execute(&Registry::new(), &[]),
            Err(Error::EntryPointNotFound { .. })
        ));
    }

    #[test]
    fn test_guard_persists_on_drop() {
        let mut sink = CountingSink::default();
        {
            let mut guard = PersistGuard::new(&mut sink);
            guard.state.set("DROPPED", "yes");
        }
        assert_eq!(sink.writes.len(), 1);
        assert!(sink.writes[0].contains("DROPPED"));
    }

    #[test]
    fn test_guard_does_not_persist_twice() {
        let mut sink = CountingSink::default();
        {
            let mut guard = PersistGuard::new(&mut sink);
            guard.persist().unwrap();
        }
        assert_eq!(sink.writes.len(), 1);
    }
}
