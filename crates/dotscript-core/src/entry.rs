//! Entry-point descriptors and the closed set of accepted script signatures.
//!
//! Scripts expose a single function that the coordinator calls. Its
//! parameters are injected from two capabilities only:
//!
//! | parameter            | bound to                   |
//! |----------------------|----------------------------|
//! | `&[String]`          | the raw process arguments  |
//! | `&mut SessionState`  | the run's session state    |
//!
//! Accepted shapes are `fn()`, `fn(&[String])`, `fn(&mut SessionState)`,
//! `fn(&[String], &mut SessionState)` and `fn(&mut SessionState, &[String])`,
//! returning `i32`, `()`, `Result<i32, E>` or `Result<(), E>`. Any of them
//! converts into an [`EntryPoint`] through [`IntoEntryPoint`].

use std::error::Error as StdError;
use std::fmt;

use crate::error::ScriptError;
use crate::session::SessionState;

/// Declared type of an entry-point parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// Sequence of strings: receives the process arguments.
    Args,
    /// Receives the session state.
    SessionState,
    /// Anything else. Carries the declared type name for diagnostics.
    Unsupported(String),
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Args => f.write_str("&[String]"),
            ParamKind::SessionState => f.write_str("&mut SessionState"),
            ParamKind::Unsupported(ty) => f.write_str(ty),
        }
    }
}

/// Declared return type of an entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnKind {
    /// The returned integer becomes the exit code.
    Integer,
    /// No value; the exit code is 0.
    Unit,
    /// Not a recognized return type. Never selected by the resolver.
    Unsupported(String),
}

impl ReturnKind {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, ReturnKind::Unsupported(_))
    }
}

/// A parameter after it has been mapped to a concrete capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Args,
    SessionState,
}

/// Arguments handed to an entry point for a single call.
pub struct Invocation<'a> {
    /// Raw process arguments.
    pub args: &'a [String],
    /// Session state for this run.
    pub state: &'a mut SessionState,
    bindings: &'a [Binding],
}

impl<'a> Invocation<'a> {
    pub fn new(args: &'a [String], state: &'a mut SessionState, bindings: &'a [Binding]) -> Self {
        Self {
            args,
            state,
            bindings,
        }
    }

    /// Bindings in declared parameter order.
    pub fn bindings(&self) -> &[Binding] {
        self.bindings
    }
}

type InvokeFn = dyn Fn(Invocation<'_>) -> Result<Option<i32>, ScriptError>;

/// A resolvable script entry point.
pub struct EntryPoint {
    owner: String,
    name: String,
    params: Vec<ParamKind>,
    returns: ReturnKind,
    invoke: Box<InvokeFn>,
}

impl EntryPoint {
    /// Build an entry point from an explicit descriptor.
    ///
    /// Used by hosts that describe signatures at runtime. `invoke` receives
    /// the bindings computed from `params` and returns `Some(code)` for
    /// integer-returning entry points.
    pub fn from_parts(
        owner: impl Into<String>,
        name: impl Into<String>,
        params: Vec<ParamKind>,
        returns: ReturnKind,
        invoke: impl Fn(Invocation<'_>) -> Result<Option<i32>, ScriptError> + 'static,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            params,
            returns,
            invoke: Box::new(invoke),
        }
    }

    /// Path of the module or type that defines the entry point.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ParamKind] {
        &self.params
    }

    pub fn returns(&self) -> &ReturnKind {
        &self.returns
    }

    /// Call the entry point.
    pub fn invoke(&self, invocation: Invocation<'_>) -> Result<Option<i32>, ScriptError> {
        (self.invoke)(invocation)
    }
}

impl fmt::Debug for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPoint")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

/// Return types an entry point may declare.
pub trait ScriptReturn {
    fn return_kind() -> ReturnKind;

    /// `Some(code)` for integer returns, `None` for unit returns.
    fn into_exit_code(self) -> Result<Option<i32>, ScriptError>;
}

impl ScriptReturn for i32 {
    fn return_kind() -> ReturnKind {
        ReturnKind::Integer
    }

    fn into_exit_code(self) -> Result<Option<i32>, ScriptError> {
        Ok(Some(self))
    }
}

impl ScriptReturn for () {
    fn return_kind() -> ReturnKind {
        ReturnKind::Unit
    }

    fn into_exit_code(self) -> Result<Option<i32>, ScriptError> {
        Ok(None)
    }
}

impl<E> ScriptReturn for Result<i32, E>
where
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    fn return_kind() -> ReturnKind {
        ReturnKind::Integer
    }

    fn into_exit_code(self) -> Result<Option<i32>, ScriptError> {
        self.map(Some).map_err(ScriptError::raised)
    }
}

impl<E> ScriptReturn for Result<(), E>
where
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    fn return_kind() -> ReturnKind {
        ReturnKind::Unit
    }

    fn into_exit_code(self) -> Result<Option<i32>, ScriptError> {
        self.map(|()| None).map_err(ScriptError::raised)
    }
}

/// Conversion from a script function into an [`EntryPoint`].
///
/// `Marker` only disambiguates the accepted shapes; callers never name it.
pub trait IntoEntryPoint<Marker> {
    fn into_entry_point(self, name: String) -> EntryPoint;
}

macro_rules! impl_into_entry_point {
    ([$($param:ty),*], [$($kind:expr),*], |$f:ident, $inv:ident| $call:expr) => {
        impl<F, R> IntoEntryPoint<fn($($param),*) -> R> for F
        where
            F: Fn($($param),*) -> R + 'static,
            R: ScriptReturn + 'static,
        {
            fn into_entry_point(self, name: String) -> EntryPoint {
                let $f = self;
                EntryPoint {
                    owner: std::any::type_name::<F>().to_string(),
                    name,
                    params: vec![$($kind),*],
                    returns: R::return_kind(),
                    invoke: Box::new(move |$inv: Invocation<'_>| $call.into_exit_code()),
                }
            }
        }
    };
}

impl_into_entry_point!([], [], |f, _inv| f());
impl_into_entry_point!([&[String]], [ParamKind::Args], |f, inv| f(inv.args));
impl_into_entry_point!(
    [&mut SessionState],
    [ParamKind::SessionState],
    |f, inv| f(inv.state)
);
impl_into_entry_point!(
    [&[String], &mut SessionState],
    [ParamKind::Args, ParamKind::SessionState],
    |f, inv| f(inv.args, inv.state)
);
impl_into_entry_point!(
    [&mut SessionState, &[String]],
    [ParamKind::SessionState, ParamKind::Args],
    |f, inv| f(inv.state, inv.args)
);
