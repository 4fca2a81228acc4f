use crate::classify::Classifier;
use crate::error::{MinimizeError, PreconditionViolation};
use crate::minimize::Minimizer;
use crate::types::{MinimizeStats, Minimized, Outcome};
use tracing::{debug, info, trace};

/// Adaptive partitioning reduction (ddmin).
///
/// Each round splits the candidate into `granularity` blocks and tests the
/// candidate with one block removed. A failing complement replaces the
/// candidate and lowers the granularity by one; a round without reduction
/// doubles it, capped at the candidate length. The search stops once every
/// single-element complement passes, so the result is 1-minimal.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeltaDebugMinimizer;

struct Round<T> {
    candidate: Vec<T>,
    granularity: usize,
}

enum Step<T> {
    Shrunk(Round<T>),
    Refined(Round<T>),
    Converged(Round<T>),
}

impl DeltaDebugMinimizer {
    fn test<T, C>(
        classifier: &mut C,
        input: &[T],
        stats: &mut MinimizeStats,
    ) -> Result<Outcome, MinimizeError<C::Error>>
    where
        C: Classifier<T>,
    {
        stats.tests += 1;
        let outcome = classifier
            .classify(input)
            .map_err(MinimizeError::Classifier)?;
        trace!(len = input.len(), outcome = outcome.as_str(), "tested candidate");
        Ok(outcome)
    }

    fn round<T, C>(
        round: Round<T>,
        classifier: &mut C,
        stats: &mut MinimizeStats,
    ) -> Result<Step<T>, MinimizeError<C::Error>>
    where
        T: Clone,
        C: Classifier<T>,
    {
        let Round {
            candidate,
            granularity,
        } = round;
        let len = candidate.len();
        let subset_length = (len / granularity).max(1);

        let mut start = 0;
        while start < len {
            let end = (start + subset_length).min(len);
            let complement: Vec<T> = candidate[..start]
                .iter()
                .chain(&candidate[end..])
                .cloned()
                .collect();

            // Unresolved counts as non-reducing.
            if Self::test(classifier, &complement, stats)?.is_fail() {
                stats.reductions += 1;
                debug!(
                    start,
                    removed = end - start,
                    remaining = complement.len(),
                    granularity,
                    "reduced to complement"
                );
                return Ok(Step::Shrunk(Round {
                    candidate: complement,
                    granularity: granularity.saturating_sub(1).max(2),
                }));
            }
            start += subset_length;
        }

        if granularity >= len {
            return Ok(Step::Converged(Round {
                candidate,
                granularity,
            }));
        }

        let next = (granularity * 2).min(len);
        stats.granularity_increases += 1;
        debug!(from = granularity, to = next, len, "increased granularity");
        Ok(Step::Refined(Round {
            candidate,
            granularity: next,
        }))
    }
}

impl Minimizer for DeltaDebugMinimizer {
    fn minimize<T, C>(
        &self,
        input: Vec<T>,
        classifier: &mut C,
    ) -> Result<Minimized<T>, MinimizeError<C::Error>>
    where
        T: Clone,
        C: Classifier<T>,
    {
        let mut stats = MinimizeStats {
            original_len: input.len(),
            ..MinimizeStats::default()
        };

        let empty = Self::test(classifier, &[], &mut stats)?;
        if empty != Outcome::Pass {
            return Err(PreconditionViolation::EmptyInputDoesNotPass(empty).into());
        }
        let full = Self::test(classifier, &input, &mut stats)?;
        if !full.is_fail() {
            return Err(PreconditionViolation::InputDoesNotFail(full).into());
        }

        let mut round = Round {
            candidate: input,
            granularity: 2,
        };
        let last = loop {
            if round.candidate.len() < 2 {
                break round;
            }
            stats.rounds += 1;
            round = match Self::round(round, classifier, &mut stats)? {
                Step::Shrunk(next) | Step::Refined(next) => next,
                Step::Converged(done) => break done,
            };
        };

        stats.minimized_len = last.candidate.len();
        stats.final_granularity = last.granularity;
        info!(
            original_len = stats.original_len,
            minimized_len = stats.minimized_len,
            rounds = stats.rounds,
            tests = stats.tests,
            "minimization finished"
        );

        Ok(Minimized {
            input: last.candidate,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::infallible;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    fn contains(needle: &'static str) -> impl FnMut(&[char]) -> Outcome {
        move |input| {
            let text: String = input.iter().collect();
            if text.contains(needle) {
                Outcome::Fail
            } else {
                Outcome::Pass
            }
        }
    }

    #[test]
    fn reduces_padding_around_cause() {
        let input = chars(&format!("ab{}", "x".repeat(50)));
        let output = DeltaDebugMinimizer
            .minimize(input, &mut infallible(contains("ab")))
            .expect("minimize");

        assert_eq!(output.input, chars("ab"));
        assert_eq!(output.stats.original_len, 52);
        assert_eq!(output.stats.minimized_len, 2);
        assert!(output.stats.reductions > 0);
    }

    #[test]
    fn converges_at_full_granularity() {
        let output = DeltaDebugMinimizer
            .minimize(chars("xxabxx"), &mut infallible(contains("ab")))
            .expect("minimize");

        assert_eq!(output.input, chars("ab"));
        assert_eq!(output.stats.final_granularity, 2);
    }

    #[test]
    fn rejects_input_that_passes() {
        let err = DeltaDebugMinimizer
            .minimize(chars("xyz"), &mut infallible(contains("ab")))
            .expect_err("precondition");

        assert_eq!(
            err.precondition(),
            Some(PreconditionViolation::InputDoesNotFail(Outcome::Pass))
        );
    }

    #[test]
    fn rejects_classifier_failing_on_empty_input() {
        let err = DeltaDebugMinimizer
            .minimize(chars("ab"), &mut infallible(|_input: &[char]| Outcome::Fail))
            .expect_err("precondition");

        assert_eq!(
            err.precondition(),
            Some(PreconditionViolation::EmptyInputDoesNotPass(Outcome::Fail))
        );
    }

    #[test]
    fn rejects_unresolved_verdict_on_empty_input() {
        let mut calls = 0;
        let err = DeltaDebugMinimizer
            .minimize(
                chars("ab"),
                &mut infallible(|input: &[char]| {
                    calls += 1;
                    if input.is_empty() {
                        Outcome::Unresolved
                    } else {
                        Outcome::Fail
                    }
                }),
            )
            .expect_err("precondition");

        assert_eq!(
            err.precondition(),
            Some(PreconditionViolation::EmptyInputDoesNotPass(
                Outcome::Unresolved
            ))
        );
        assert_eq!(calls, 1);
    }

    #[test]
    fn unresolved_complements_are_not_adopted() {
        let mut classifier = infallible(|input: &[char]| match input.len() {
            0 => Outcome::Pass,
            4 => Outcome::Fail,
            _ => Outcome::Unresolved,
        });
        let output = DeltaDebugMinimizer
            .minimize(chars("abcd"), &mut classifier)
            .expect("minimize");

        assert_eq!(output.input, chars("abcd"));
        assert_eq!(output.stats.reductions, 0);
        assert_eq!(output.stats.final_granularity, 4);
    }
}
