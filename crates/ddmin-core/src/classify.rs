use crate::classify_budget::Budgeted;
use crate::classify_cache::Cached;
use crate::types::Outcome;
use std::convert::Infallible;
use std::hash::Hash;

/// Decides whether a candidate input still reproduces a failure.
///
/// Implementations are expected to be deterministic and free of side
/// effects that influence later verdicts. Minimality and termination
/// guarantees do not hold for classifiers that change their mind.
pub trait Classifier<T> {
    type Error;

    fn classify(&mut self, input: &[T]) -> Result<Outcome, Self::Error>;
}

impl<T, E, F> Classifier<T> for F
where
    F: FnMut(&[T]) -> Result<Outcome, E>,
{
    type Error = E;

    fn classify(&mut self, input: &[T]) -> Result<Outcome, E> {
        self(input)
    }
}

/// Wraps a classifier that cannot fail.
pub fn infallible<T, F>(mut classify: F) -> impl FnMut(&[T]) -> Result<Outcome, Infallible>
where
    F: FnMut(&[T]) -> Outcome,
{
    move |input| Ok(classify(input))
}

/// Attaches wrapper capabilities to any classifier.
pub trait ClassifierExt<T>: Classifier<T> + Sized {
    /// Refuses further tests once `limit` calls have been made.
    fn budgeted(self, limit: u64) -> Budgeted<Self> {
        Budgeted::new(self, limit)
    }

    /// Answers repeated inputs from memory.
    fn cached(self) -> Cached<T, Self>
    where
        T: Clone + Eq + Hash,
    {
        Cached::new(self)
    }
}

impl<T, C> ClassifierExt<T> for C where C: Classifier<T> {}
