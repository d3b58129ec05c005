//! Host integration: the `main` of a script program.
//!
//! The build host runs the compiled script program with opaque arguments and
//! reads its exit status. [`run`] wires logging and configuration around
//! [`Executor::execute`] and turns failures into a non-zero status.

use std::error::Error as StdError;

use dotscript_core::{Error, Executor, ExecutorConfig, Registry};
use tracing_subscriber::EnvFilter;

/// Exit status reported when the run fails.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Run the configured entry point with the process arguments.
///
/// Configuration comes from `DOTSCRIPT_DEPLOYMENT` and `DOTSCRIPT_ARTIFACT`.
/// Returns the script's exit code, or [`FAILURE_EXIT_CODE`] after printing
/// the error chain to stderr.
pub fn run(registry: Registry) -> i32 {
    init_logging();

    let config = match ExecutorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            report(&e);
            return FAILURE_EXIT_CODE;
        }
    };

    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    run_with(config, &registry, &args)
}

/// Run with explicit configuration and arguments.
pub fn run_with(config: ExecutorConfig, registry: &Registry, args: &[String]) -> i32 {
    match Executor::new(config).execute(registry, args) {
        Ok(code) => code,
        Err(e) => {
            report(&e);
            FAILURE_EXIT_CODE
        }
    }
}

fn report(err: &Error) {
    eprintln!("error: {}", err.with_hint());

    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // A subscriber may already be installed by the embedding program.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotscript_core::SessionState;
    use tempfile::TempDir;

    fn config_in(temp: &TempDir) -> ExecutorConfig {
        ExecutorConfig::default().with_artifact_path(temp.path().join("jenkinsExecution.json"))
    }

    #[test]
    fn test_run_with_success() {
        let temp = TempDir::new().unwrap();
        let registry = Registry::new().register("DotScriptMain", |args: &[String]| -> i32 {
            args.len() as i32 + 40
        });

        let code = run_with(config_in(&temp), &registry, &["a".to_string(), "b".to_string()]);
        assert_eq!(code, 42);
        assert!(temp.path().join("jenkinsExecution.json").exists());
    }

    #[test]
    fn test_run_with_failure_maps_to_exit_code() {
        let temp = TempDir::new().unwrap();
        let registry = Registry::new().register("DotScriptMain", |state: &mut SessionState| {
            state.set("PARTIAL", "1");
            Err::<i32, _>("broken")
        });

        assert_eq!(run_with(config_in(&temp), &registry, &[]), FAILURE_EXIT_CODE);
        assert!(temp.path().join("jenkinsExecution.json").exists());
    }

    #[test]
    fn test_run_with_missing_entry_point() {
        let temp = TempDir::new().unwrap();
        assert_eq!(
            run_with(config_in(&temp), &Registry::new(), &[]),
            FAILURE_EXIT_CODE
        );
    }
}
