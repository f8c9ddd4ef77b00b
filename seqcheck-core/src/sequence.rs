//! Sequences of generated commands and the shrink search over them.

use crate::arbitrary::{shrink_list, Arbitrary, Shrinks};
use crate::command::GeneratedCommand;
use crate::data::{Seed, Size};
use std::rc::Rc;

/// One trial's worth of commands, in execution order.
pub type CommandSequence<S, M> = Vec<GeneratedCommand<S, M>>;

/// Arbitrary of command sequences drawn from one or more command specs.
///
/// Generation picks a length uniformly in `[0, max_len]` and fills each
/// position from a uniformly selected spec. Preconditions are not consulted
/// here: validity against a model is only established during execution, so
/// generation needs no model instance.
///
/// Shrinking is the counterexample search. Given a sequence that has been
/// executed (and therefore carries `started` markers), it first discards every
/// element that never ran — an element that was never reached, or whose
/// precondition never held, carries no evidence it contributes to the failure.
/// The trimmed sequence is itself the first candidate whenever trimming
/// removed anything, so a trial that fails before running any command (say, a
/// failing warmup) shrinks all the way to the empty sequence. The rest of the
/// candidates come from [`shrink_list`]: exponentially backed-off structural
/// cuts, then per-command parameter shrinks, then the same search over the
/// suffix. Relative order is never changed, discarded elements never
/// reappear, and every candidate comes out with all markers cleared.
pub struct SequenceArbitrary<S, M> {
    specs: Vec<Rc<dyn Arbitrary<Value = GeneratedCommand<S, M>>>>,
    max_len: usize,
}

/// Build a sequence arbitrary over the given command specs.
///
/// Panics if `specs` is empty.
pub fn commands<S, M>(
    specs: Vec<Rc<dyn Arbitrary<Value = GeneratedCommand<S, M>>>>,
) -> SequenceArbitrary<S, M> {
    SequenceArbitrary::new(specs)
}

impl<S, M> SequenceArbitrary<S, M> {
    /// Panics if `specs` is empty.
    pub fn new(specs: Vec<Rc<dyn Arbitrary<Value = GeneratedCommand<S, M>>>>) -> Self {
        assert!(
            !specs.is_empty(),
            "a sequence arbitrary needs at least one command spec"
        );
        SequenceArbitrary {
            specs,
            max_len: 100,
        }
    }

    /// Bound the generated sequence length (default 100).
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }
}

impl<S, M> Arbitrary for SequenceArbitrary<S, M>
where
    S: 'static,
    M: 'static,
{
    type Value = CommandSequence<S, M>;

    fn generate(&self, size: Size, seed: Seed) -> CommandSequence<S, M> {
        let (len_seed, mut seed) = seed.split();
        let (len, _) = len_seed.next_bounded(self.max_len as u64 + 1);
        (0..len)
            .map(|_| {
                let (elem_seed, rest) = seed.split();
                seed = rest;
                let (pick, elem_seed) = elem_seed.next_bounded(self.specs.len() as u64);
                self.specs[pick as usize].generate(size, elem_seed)
            })
            .collect()
    }

    fn shrink<'a>(&'a self, value: &CommandSequence<S, M>) -> Shrinks<'a, CommandSequence<S, M>> {
        // Clones reset the started markers, so the trimmed sequence and every
        // candidate derived from it are fresh, not-yet-run sequences.
        let trimmed: CommandSequence<S, M> = value
            .iter()
            .filter(|element| element.started())
            .cloned()
            .collect();

        let searched = shrink_list(
            |element: &GeneratedCommand<S, M>| element.shrink_self(),
            &trimmed,
        );

        if trimmed.len() < value.len() {
            Box::new(std::iter::once(trimmed).chain(searched))
        } else {
            Box::new(searched)
        }
    }

    fn show(&self, value: &CommandSequence<S, M>) -> String {
        let labels: Vec<&str> = value.iter().map(|element| element.label()).collect();
        labels.join(", ")
    }
}
