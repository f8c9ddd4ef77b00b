//! Minimal trial loop: draw values, test them, shrink the first failure.

use crate::arbitrary::Arbitrary;
use crate::data::{Config, Seed, Size};
use crate::error::{ShrinkStep, TestResult};

/// A testable property over one arbitrary.
pub struct Property<A: Arbitrary> {
    arbitrary: A,
    test: Box<dyn Fn(&A::Value) -> bool>,
}

impl<A: Arbitrary> Property<A> {
    pub fn new<F>(arbitrary: A, test: F) -> Self
    where
        F: Fn(&A::Value) -> bool + 'static,
    {
        Property {
            arbitrary,
            test: Box::new(test),
        }
    }

    /// Run the trial batch from a random seed.
    pub fn check(&self, config: &Config) -> TestResult<A::Value> {
        self.check_from(Seed::random(), config)
    }

    /// Run the trial batch from a fixed seed, deterministically.
    pub fn check_from(&self, seed: Seed, config: &Config) -> TestResult<A::Value> {
        let mut seed = seed;
        for trial in 0..config.test_limit {
            let size = Size::new(ramp(trial, config));
            let (trial_seed, next_seed) = seed.split();
            seed = next_seed;

            let value = self.arbitrary.generate(size, trial_seed);
            if (self.test)(&value) {
                continue;
            }
            return self.shrink_failure(value, trial + 1, config);
        }
        TestResult::Pass {
            tests_run: config.test_limit,
        }
    }

    /// Greedy descent: scan the candidates of the current failure in order,
    /// restart from the first one that still fails, stop when a full scan
    /// finds none or the shrink budget is spent.
    fn shrink_failure(
        &self,
        original: A::Value,
        tests_run: usize,
        config: &Config,
    ) -> TestResult<A::Value> {
        let mut shrink_steps = vec![ShrinkStep {
            rendered: self.arbitrary.show(&original),
            step: 0,
        }];
        let mut current = original;
        let mut accepted = 0;
        let mut evaluated = 0;

        'descent: while evaluated < config.shrink_limit {
            for candidate in self.arbitrary.shrink(&current) {
                evaluated += 1;
                if !(self.test)(&candidate) {
                    accepted += 1;
                    shrink_steps.push(ShrinkStep {
                        rendered: self.arbitrary.show(&candidate),
                        step: accepted,
                    });
                    current = candidate;
                    continue 'descent;
                }
                if evaluated >= config.shrink_limit {
                    break 'descent;
                }
            }
            break;
        }

        TestResult::Fail {
            rendered: self.arbitrary.show(&current),
            counterexample: current,
            tests_run,
            shrinks_performed: accepted,
            shrink_steps,
        }
    }
}

/// Size grows linearly over the batch, up to the configured limit.
fn ramp(trial: usize, config: &Config) -> usize {
    if config.test_limit == 0 {
        0
    } else {
        (trial * config.size_limit) / config.test_limit
    }
}
