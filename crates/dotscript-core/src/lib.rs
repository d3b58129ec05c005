//! Core engine for the dotscript execution shim.
//!
//! This crate provides:
//! - Session state injected into scripts and persisted after every run
//! - Entry-point registration and resolution
//! - The execution coordinator with guaranteed state persistence
//! - Read-back of the persisted artifact for the build host

pub mod artifact;
pub mod config;
pub mod coordinator;
pub mod entry;
pub mod error;
pub mod resolver;
pub mod session;

pub use config::{Deployment, ExecutorConfig};
pub use coordinator::{Executor, JsonFileSink, StateSink};
pub use entry::{Binding, EntryPoint, Invocation, IntoEntryPoint, ParamKind, ReturnKind, ScriptReturn};
pub use error::{Error, Result, ScriptError};
pub use resolver::Registry;
pub use session::SessionState;
