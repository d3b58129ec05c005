//! Entry-point registry and resolution.
//!
//! The host registers script functions up front; resolution picks the first
//! registered entry point whose name matches and whose return type is
//! recognized. Registration order is the only tie-break: later duplicates
//! are shadowed without a warning.

use crate::entry::{EntryPoint, IntoEntryPoint};

/// Ordered collection of entry points known to the running program.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<EntryPoint>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a script function under `name`.
    pub fn register<M>(mut self, name: impl Into<String>, f: impl IntoEntryPoint<M>) -> Self {
        self.add(f.into_entry_point(name.into()));
        self
    }

    /// Register a pre-built entry point.
    pub fn add(&mut self, entry: EntryPoint) {
        tracing::debug!(
            name = entry.name(),
            owner = entry.owner(),
            "registered entry point"
        );
        self.entries.push(entry);
    }

    /// Find the entry point to run for `required_name`.
    pub fn resolve(&self, required_name: &str) -> Option<&EntryPoint> {
        for entry in self.entries.iter().filter(|e| e.name() == required_name) {
            if entry.returns().is_recognized() {
                tracing::debug!(
                    name = required_name,
                    owner = entry.owner(),
                    "resolved entry point"
                );
                return Some(entry);
            }
            tracing::debug!(
                name = required_name,
                owner = entry.owner(),
                returns = ?entry.returns(),
                "skipping entry point with unrecognized return type"
            );
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntryPoint> {
        self.entries.iter()
    }
}
