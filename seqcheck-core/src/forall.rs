//! Composition of seed arbitrary, sequence arbitrary, runner and metrics into
//! a checkable property.

use crate::arbitrary::{constant, pair, Arbitrary, Constant, PairArbitrary};
use crate::data::{Config, Seed};
use crate::error::{CommandError, TestResult};
use crate::metrics::{metrics_table, pretty_print, MetricsArbitrary, SharedMetrics};
use crate::property::Property;
use crate::runner::{RunContext, Runner, TeardownFn, WarmupFn};
use crate::sequence::{CommandSequence, SequenceArbitrary};
use std::rc::Rc;

/// Driver settings.
///
/// `metrics` turns the counting overlay on; `verbose` prints the metrics
/// report once the trial batch completes, success or failure; `log` is the
/// sink the report goes to.
#[derive(Clone)]
pub struct Settings {
    pub metrics: bool,
    pub verbose: bool,
    pub log: Rc<dyn Fn(&str)>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            metrics: false,
            verbose: false,
            log: Rc::new(|line| println!("{line}")),
        }
    }
}

type SequenceDyn<S, M> = Rc<dyn Arbitrary<Value = CommandSequence<S, M>>>;

/// A command-sequence property under construction.
///
/// Produced by [`forall`], [`forall_with`] or [`forall_seeded`]; turned into a
/// plain [`Property`] over `(seed, sequence)` pairs by [`Forall::property`],
/// or checked directly with [`Forall::check`].
pub struct Forall<SA, S, M>
where
    SA: Arbitrary,
{
    seed_arb: SA,
    sequence_arb: SequenceDyn<S, M>,
    warmup: WarmupFn<SA::Value, S, M>,
    teardown: TeardownFn<S, M>,
    settings: Settings,
    metrics: Option<SharedMetrics>,
}

/// Command-sequence property with no seed and a default warmup building an
/// empty state/model pair.
pub fn forall<S, M>(sequence_arb: SequenceArbitrary<S, M>) -> Forall<Constant<()>, S, M>
where
    S: Default + 'static,
    M: Default + 'static,
{
    forall_with(sequence_arb, |_seed: &()| Ok(RunContext::default()))
}

/// Command-sequence property with no seed and an explicit warmup.
pub fn forall_with<S, M, W>(
    sequence_arb: SequenceArbitrary<S, M>,
    warmup: W,
) -> Forall<Constant<()>, S, M>
where
    S: 'static,
    M: 'static,
    W: Fn(&()) -> Result<RunContext<S, M>, CommandError> + 'static,
{
    forall_seeded(constant(()), sequence_arb, warmup)
}

/// Command-sequence property whose warmup consumes a generated seed.
pub fn forall_seeded<SA, S, M, W>(
    seed_arb: SA,
    sequence_arb: SequenceArbitrary<S, M>,
    warmup: W,
) -> Forall<SA, S, M>
where
    SA: Arbitrary,
    S: 'static,
    M: 'static,
    W: Fn(&SA::Value) -> Result<RunContext<S, M>, CommandError> + 'static,
{
    Forall {
        seed_arb,
        sequence_arb: Rc::new(sequence_arb),
        warmup: Rc::new(warmup),
        teardown: Rc::new(|_ctx| Ok(())),
        settings: Settings::default(),
        metrics: None,
    }
}

impl<SA, S, M> Forall<SA, S, M>
where
    SA: Arbitrary,
    S: 'static,
    M: 'static,
{
    /// Replace the default no-op teardown. Invoked exactly once per trial,
    /// with `None` when warmup failed.
    pub fn with_teardown<T>(mut self, teardown: T) -> Self
    where
        T: Fn(Option<RunContext<S, M>>) -> Result<(), CommandError> + 'static,
    {
        self.teardown = Rc::new(teardown);
        self
    }

    /// Apply settings. Enabling metrics wraps the sequence arbitrary in the
    /// counting overlay and exposes the table via [`Forall::metrics_output`].
    pub fn with_settings(mut self, settings: Settings) -> Self {
        if settings.metrics && self.metrics.is_none() {
            let table = metrics_table();
            self.sequence_arb = Rc::new(MetricsArbitrary::new(
                Rc::clone(&self.sequence_arb),
                Rc::clone(&table),
            ));
            self.metrics = Some(table);
        }
        self.settings = settings;
        self
    }

    /// The shared metrics table, when metrics are enabled.
    pub fn metrics_output(&self) -> Option<SharedMetrics> {
        self.metrics.clone()
    }
}

impl<SA, S, M> Forall<SA, S, M>
where
    SA: Arbitrary + Clone + 'static,
    SA::Value: Clone + 'static,
    S: 'static,
    M: 'static,
{
    /// The composed property over `(seed, sequence)` pairs, ready to hand to
    /// any engine speaking the arbitrary contract.
    pub fn property(&self) -> Property<PairArbitrary<SA, SequenceDyn<S, M>>> {
        let runner = Runner::from_parts(Rc::clone(&self.warmup), Rc::clone(&self.teardown));
        Property::new(
            pair(self.seed_arb.clone(), Rc::clone(&self.sequence_arb)),
            move |(seed, sequence): &(SA::Value, CommandSequence<S, M>)| {
                runner.trial(seed, sequence)
            },
        )
    }

    /// Run the batch with the embedded engine, then report metrics when asked
    /// to — after the batch, success or failure.
    pub fn check(&self, config: &Config) -> TestResult<(SA::Value, CommandSequence<S, M>)> {
        let result = self.property().check(config);
        self.report();
        result
    }

    /// Deterministic variant of [`Forall::check`].
    pub fn check_from(
        &self,
        seed: Seed,
        config: &Config,
    ) -> TestResult<(SA::Value, CommandSequence<S, M>)> {
        let result = self.property().check_from(seed, config);
        self.report();
        result
    }

    fn report(&self) {
        if !self.settings.verbose {
            return;
        }
        if let Some(table) = &self.metrics {
            (self.settings.log)(&pretty_print(&table.borrow()));
        }
    }
}
