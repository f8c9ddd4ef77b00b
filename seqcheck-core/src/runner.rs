//! Trial execution: warmup, sequential command execution, teardown.

use crate::command::{Command, GeneratedCommand};
use crate::error::CommandError;
use std::rc::Rc;

/// The live pair a trial executes against: the real subject and its model.
///
/// Exclusively owned by one trial; produced by warmup, consumed by the runner,
/// handed back to teardown.
#[derive(Debug, Clone, Default)]
pub struct RunContext<S, M> {
    pub state: S,
    pub model: M,
}

impl<S, M> RunContext<S, M> {
    pub fn new(state: S, model: M) -> Self {
        RunContext { state, model }
    }
}

/// Acquire a context from a seed. May fail; failure aborts the trial before
/// any command runs.
pub type WarmupFn<V, S, M> = Rc<dyn Fn(&V) -> Result<RunContext<S, M>, CommandError>>;

/// Release a context. Receives `None` when acquisition itself failed, and is
/// invoked exactly once per trial no matter how the trial went.
pub type TeardownFn<S, M> = Rc<dyn Fn(Option<RunContext<S, M>>) -> Result<(), CommandError>>;

/// Executes sequences against fresh contexts and reports the trial outcome.
///
/// Per element: the precondition is consulted first — `Ok(false)` or `Err`
/// skips the element without marking it started. Otherwise the element is
/// marked started and `run` is invoked; `Ok(false)` or `Err` aborts the trial
/// immediately, with no further `check` or `run` calls. A trial passes iff
/// acquisition succeeded, every element either skipped or ran truthy, and
/// teardown succeeded.
pub struct Runner<V, S, M> {
    warmup: WarmupFn<V, S, M>,
    teardown: TeardownFn<S, M>,
}

impl<V, S, M> Runner<V, S, M> {
    pub fn new<W, T>(warmup: W, teardown: T) -> Self
    where
        W: Fn(&V) -> Result<RunContext<S, M>, CommandError> + 'static,
        T: Fn(Option<RunContext<S, M>>) -> Result<(), CommandError> + 'static,
    {
        Runner {
            warmup: Rc::new(warmup),
            teardown: Rc::new(teardown),
        }
    }

    pub fn from_parts(warmup: WarmupFn<V, S, M>, teardown: TeardownFn<S, M>) -> Self {
        Runner { warmup, teardown }
    }

    /// Run one trial. The only mutation of `sequence` is setting `started`
    /// markers on elements whose precondition held.
    pub fn trial(&self, seed: &V, sequence: &[GeneratedCommand<S, M>]) -> bool {
        let mut ctx = match (self.warmup)(seed) {
            Ok(ctx) => ctx,
            Err(_) => {
                // zero commands attributed; release still happens
                let _ = (self.teardown)(None);
                return false;
            }
        };

        let mut passed = true;
        for element in sequence {
            match element.command().check(&ctx.model) {
                Ok(true) => {}
                Ok(false) | Err(_) => continue,
            }
            element.mark_started();
            match element.command().run(&mut ctx.state, &mut ctx.model) {
                Ok(true) => {}
                Ok(false) | Err(_) => {
                    passed = false;
                    break;
                }
            }
        }

        let released = (self.teardown)(Some(ctx));
        passed && released.is_ok()
    }
}

impl<V, S, M> Clone for Runner<V, S, M> {
    fn clone(&self) -> Self {
        Runner {
            warmup: Rc::clone(&self.warmup),
            teardown: Rc::clone(&self.teardown),
        }
    }
}
