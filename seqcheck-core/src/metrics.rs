//! Cross-cutting instrumentation: per-kind counters and the report table.
//!
//! Instrumentation is a capability-wrapping decorator: [`MetricsArbitrary`]
//! implements the same arbitrary contract as the sequence arbitrary it wraps,
//! and every command it hands out is a [`Command`] wrapper delegating to the
//! real one while updating a shared side table. Nothing is patched in place.

use crate::arbitrary::{Arbitrary, Shrinks};
use crate::command::{Command, GeneratedCommand};
use crate::data::{Seed, Size};
use crate::error::CommandError;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Success/failed/exception counters for one command method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounters {
    pub success: u64,
    pub failed: u64,
    pub exception: u64,
}

impl OutcomeCounters {
    fn record<T>(&mut self, outcome: &Result<bool, T>) {
        match outcome {
            Ok(true) => self.success += 1,
            Ok(false) => self.failed += 1,
            Err(_) => self.exception += 1,
        }
    }

    fn add(&mut self, other: &OutcomeCounters) {
        self.success += other.success;
        self.failed += other.failed;
        self.exception += other.exception;
    }
}

/// Monotonic counters for one command kind. Created lazily on first
/// encounter, never reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsRecord {
    pub generated: u64,
    pub shrink: u64,
    pub check: OutcomeCounters,
    pub run: OutcomeCounters,
}

impl MetricsRecord {
    fn add(&mut self, other: &MetricsRecord) {
        self.generated += other.generated;
        self.shrink += other.shrink;
        self.check.add(&other.check);
        self.run.add(&other.run);
    }
}

/// Records keyed by command kind, in a stable order for reporting.
pub type MetricsTable = BTreeMap<String, MetricsRecord>;

/// The table handle shared between the decorator and its caller.
pub type SharedMetrics = Rc<RefCell<MetricsTable>>;

/// Create an empty shared table.
pub fn metrics_table() -> SharedMetrics {
    Rc::new(RefCell::new(MetricsTable::new()))
}

struct MeteredCommand<S, M> {
    inner: Rc<dyn Command<S, M>>,
    kind: Rc<str>,
    table: SharedMetrics,
}

impl<S, M> Command<S, M> for MeteredCommand<S, M> {
    fn check(&self, model: &M) -> Result<bool, CommandError> {
        let outcome = self.inner.check(model);
        self.table
            .borrow_mut()
            .entry(self.kind.to_string())
            .or_default()
            .check
            .record(&outcome);
        outcome
    }

    fn run(&self, state: &mut S, model: &mut M) -> Result<bool, CommandError> {
        let outcome = self.inner.run(state, model);
        self.table
            .borrow_mut()
            .entry(self.kind.to_string())
            .or_default()
            .run
            .record(&outcome);
        outcome
    }

    fn name(&self) -> Option<String> {
        self.inner.name()
    }
}

/// Wrap a freshly produced element: register its kind, count the production,
/// meter its command, and arrange for every parameter-shrunk alternative to be
/// wrapped the same way when (and only when) the shrink space is walked.
///
/// Structural shrink candidates clone already-wrapped elements and keep their
/// metering without being counted as new productions.
fn meter<S, M>(element: GeneratedCommand<S, M>, table: &SharedMetrics) -> GeneratedCommand<S, M>
where
    S: 'static,
    M: 'static,
{
    let GeneratedCommand {
        command,
        kind,
        label,
        shrink_self,
        started,
    } = element;

    table
        .borrow_mut()
        .entry(kind.to_string())
        .or_default()
        .generated += 1;

    let metered: Rc<dyn Command<S, M>> = Rc::new(MeteredCommand {
        inner: command,
        kind: Rc::clone(&kind),
        table: Rc::clone(table),
    });

    let shrink_table = Rc::clone(table);
    let shrink_kind = Rc::clone(&kind);
    let metered_shrink: Rc<dyn Fn() -> Shrinks<'static, GeneratedCommand<S, M>>> =
        Rc::new(move || {
            shrink_table
                .borrow_mut()
                .entry(shrink_kind.to_string())
                .or_default()
                .shrink += 1;
            let table = Rc::clone(&shrink_table);
            Box::new(shrink_self().map(move |alternative| meter(alternative, &table)))
        });

    GeneratedCommand {
        command: metered,
        kind,
        label,
        shrink_self: metered_shrink,
        started,
    }
}

/// Decorator adding metrics to a sequence arbitrary.
pub struct MetricsArbitrary<A> {
    inner: A,
    table: SharedMetrics,
}

impl<A> MetricsArbitrary<A> {
    pub fn new(inner: A, table: SharedMetrics) -> Self {
        MetricsArbitrary { inner, table }
    }
}

impl<A, S, M> Arbitrary for MetricsArbitrary<A>
where
    A: Arbitrary<Value = Vec<GeneratedCommand<S, M>>>,
    S: 'static,
    M: 'static,
{
    type Value = Vec<GeneratedCommand<S, M>>;

    fn generate(&self, size: Size, seed: Seed) -> Self::Value {
        self.inner
            .generate(size, seed)
            .into_iter()
            .map(|element| meter(element, &self.table))
            .collect()
    }

    fn shrink<'a>(&'a self, value: &Self::Value) -> Shrinks<'a, Self::Value> {
        // Candidates are built from clones of already-metered elements and
        // from their metered shrink spaces; re-wrapping here would meter
        // check/run twice.
        self.inner.shrink(value)
    }

    fn show(&self, value: &Self::Value) -> String {
        self.inner.show(value)
    }
}

const MEASURES: [&str; 8] = [
    "generated",
    "shrinks",
    "check ok",
    "check ko",
    "check err",
    "run ok",
    "run ko",
    "run err",
];

fn cells(record: &MetricsRecord) -> [u64; 8] {
    [
        record.generated,
        record.shrink,
        record.check.success,
        record.check.failed,
        record.check.exception,
        record.run.success,
        record.run.failed,
        record.run.exception,
    ]
}

fn format_row(name: &str, columns: &[String]) -> String {
    let mut row = format!("| {name:>20} |");
    for column in columns {
        row.push_str(&format!(" {column:>12} |"));
    }
    row
}

/// Render the table: header, one row per kind, and a totals row summing every
/// column.
pub fn pretty_print(table: &MetricsTable) -> String {
    let header = format_row(
        "Command name",
        &MEASURES.iter().map(|m| m.to_string()).collect::<Vec<_>>(),
    );
    let separator: String = header
        .chars()
        .map(|c| if c == '|' { '+' } else { '-' })
        .collect();

    let mut lines = vec![separator.clone(), header, separator.clone()];
    let mut totals = MetricsRecord::default();
    for (kind, record) in table {
        totals.add(record);
        lines.push(format_row(
            kind,
            &cells(record).iter().map(|c| c.to_string()).collect::<Vec<_>>(),
        ));
    }
    lines.push(separator.clone());
    lines.push(format_row(
        "",
        &cells(&totals).iter().map(|c| c.to_string()).collect::<Vec<_>>(),
    ));
    lines.push(separator);
    lines.join("\n")
}
