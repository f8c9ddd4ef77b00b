//! The command contract and the per-command arbitrary.

use crate::arbitrary::{Arbitrary, Shrinks};
use crate::data::{Seed, Size};
use crate::error::CommandError;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// A single parameterized operation applied to both the real subject under
/// test and the abstract model.
pub trait Command<S, M> {
    /// Precondition over the model. Must be synchronous and side-effect free.
    ///
    /// `Ok(false)` skips the command at this point in the sequence; `Err` is
    /// treated the same way for control flow but recorded separately by
    /// metrics.
    fn check(&self, model: &M) -> Result<bool, CommandError>;

    /// Apply the operation to the subject and the model, then report whether
    /// the observed behavior matched the model's expectation.
    ///
    /// `Ok(false)` and `Err` both abort the trial at this element.
    fn run(&self, state: &mut S, model: &mut M) -> Result<bool, CommandError>;

    /// Optional display name used in reports instead of the generic
    /// `kind(parameters)` rendering.
    fn name(&self) -> Option<String> {
        None
    }
}

/// A command instance together with the shrink space of the parameters it was
/// built from.
///
/// The `started` marker is execution metadata: the runner sets it when the
/// command's precondition held and `run` was invoked; the shrink search reads
/// it. Cloning yields a fresh, not-yet-started element, so every shrink
/// candidate starts with all markers cleared.
pub struct GeneratedCommand<S, M> {
    pub(crate) command: Rc<dyn Command<S, M>>,
    pub(crate) kind: Rc<str>,
    pub(crate) label: String,
    pub(crate) shrink_self: Rc<dyn Fn() -> Shrinks<'static, GeneratedCommand<S, M>>>,
    pub(crate) started: Cell<bool>,
}

impl<S, M> GeneratedCommand<S, M> {
    pub fn command(&self) -> &dyn Command<S, M> {
        self.command.as_ref()
    }

    /// The command-kind tag of the spec this instance was drawn from.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Rendered form: the command's own name, or `kind(parameters)`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn started(&self) -> bool {
        self.started.get()
    }

    pub(crate) fn mark_started(&self) {
        self.started.set(true);
    }

    /// Alternatives built from shrunk parameter sets of the same kind.
    ///
    /// Finite and restartable: each call yields the same candidates anew.
    pub fn shrink_self(&self) -> Shrinks<'static, GeneratedCommand<S, M>> {
        (self.shrink_self)()
    }
}

impl<S, M> Clone for GeneratedCommand<S, M> {
    fn clone(&self) -> Self {
        GeneratedCommand {
            command: Rc::clone(&self.command),
            kind: Rc::clone(&self.kind),
            label: self.label.clone(),
            shrink_self: Rc::clone(&self.shrink_self),
            started: Cell::new(false),
        }
    }
}

impl<S, M> fmt::Display for GeneratedCommand<S, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

impl<S, M> fmt::Debug for GeneratedCommand<S, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedCommand")
            .field("label", &self.label)
            .field("started", &self.started.get())
            .finish()
    }
}

struct SpecInner<P, S, M>
where
    P: Arbitrary,
{
    kind: Rc<str>,
    params: P,
    factory: Box<dyn Fn(&P::Value) -> Rc<dyn Command<S, M>>>,
}

/// Arbitrary producing instances of one command kind.
///
/// Binds the kind tag, the parameter arbitrary and the factory; `generate`
/// draws one parameter set (all positions share the size hint) and applies the
/// factory, `shrink` re-applies the factory to shrunk parameter sets.
pub struct CommandArbitrary<P, S, M>
where
    P: Arbitrary,
{
    inner: Rc<SpecInner<P, S, M>>,
}

/// Bind a command kind to its parameter arbitrary and factory.
///
/// Zero-parameter commands pass `()` as the parameter arbitrary; a single
/// parameter passes its arbitrary directly; several parameters pass a tuple of
/// arbitraries, applied to the factory positionally.
pub fn command<P, S, M, F>(kind: &str, params: P, factory: F) -> CommandArbitrary<P, S, M>
where
    P: Arbitrary + 'static,
    P::Value: Clone + 'static,
    F: Fn(&P::Value) -> Rc<dyn Command<S, M>> + 'static,
    S: 'static,
    M: 'static,
{
    CommandArbitrary {
        inner: Rc::new(SpecInner {
            kind: Rc::from(kind),
            params,
            factory: Box::new(factory),
        }),
    }
}

fn instantiate<P, S, M>(inner: &Rc<SpecInner<P, S, M>>, params: P::Value) -> GeneratedCommand<S, M>
where
    P: Arbitrary + 'static,
    P::Value: Clone + 'static,
    S: 'static,
    M: 'static,
{
    let command = (inner.factory)(&params);
    let label = command
        .name()
        .unwrap_or_else(|| format!("{}({})", inner.kind, inner.params.show(&params)));

    let spec = Rc::clone(inner);
    let shrink_params = params;
    let shrink_self: Rc<dyn Fn() -> Shrinks<'static, GeneratedCommand<S, M>>> =
        Rc::new(move || {
            let spec = Rc::clone(&spec);
            let candidates: Vec<P::Value> = spec.params.shrink(&shrink_params).collect();
            Box::new(
                candidates
                    .into_iter()
                    .map(move |shrunk| instantiate(&spec, shrunk)),
            )
        });

    GeneratedCommand {
        command,
        kind: Rc::clone(&inner.kind),
        label,
        shrink_self,
        started: Cell::new(false),
    }
}

impl<P, S, M> Arbitrary for CommandArbitrary<P, S, M>
where
    P: Arbitrary + 'static,
    P::Value: Clone + 'static,
    S: 'static,
    M: 'static,
{
    type Value = GeneratedCommand<S, M>;

    fn generate(&self, size: Size, seed: Seed) -> GeneratedCommand<S, M> {
        instantiate(&self.inner, self.inner.params.generate(size, seed))
    }

    fn shrink<'a>(&'a self, value: &GeneratedCommand<S, M>) -> Shrinks<'a, GeneratedCommand<S, M>> {
        value.shrink_self()
    }

    fn show(&self, value: &GeneratedCommand<S, M>) -> String {
        value.label().to_string()
    }
}
