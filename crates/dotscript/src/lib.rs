//! dotscript: run a build script's entry point and persist its session.
//!
//! A build host compiles a user script into a program, runs it, and reads
//! back `jenkinsExecution.json` afterwards. This crate is the piece inside
//! that program: it finds the script's entry point, injects the process
//! arguments and a [`SessionState`], and always writes the session out, even
//! when the script fails.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dotscript::prelude::*;
//!
//! #[dotscript::script_main]
//! fn build(args: &[String], state: &mut SessionState) -> i32 {
//!     let label = state.get("BUILD_LABEL").unwrap_or_else(|| "dev".into());
//!     state.set("ARTIFACT", format!("app-{label}.tar.gz"));
//!     args.len() as i32
//! }
//! ```
//!
//! # Without the macro
//!
//! ```rust,ignore
//! fn main() {
//!     let registry = dotscript::Registry::new().register("DotScriptMain", build);
//!     std::process::exit(dotscript::host::run(registry));
//! }
//! ```
//!
//! For lower-level control (custom sinks, raw entry-point descriptors), see
//! the `dotscript-core` crate.

pub use dotscript_macros::script_main;

pub use dotscript_core::{
    Binding, Deployment, EntryPoint, Error, Executor, ExecutorConfig, IntoEntryPoint, Invocation,
    JsonFileSink, ParamKind, Registry, Result, ReturnKind, ScriptError, ScriptReturn,
    SessionState, StateSink, artifact,
};

pub mod host;

pub mod prelude {
    //! Common imports for dotscript programs.
    //!
    //! ```rust,ignore
    //! use dotscript::prelude::*;
    //! ```

    pub use crate::script_main;
    pub use crate::{Registry, SessionState};
}
