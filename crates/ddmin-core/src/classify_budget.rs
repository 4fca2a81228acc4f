use crate::classify::Classifier;
use crate::types::Outcome;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BudgetError<E> {
    #[error("classifier budget of {limit} tests exhausted")]
    Exhausted { limit: u64 },
    #[error(transparent)]
    Inner(E),
}

/// Caps the number of calls forwarded to the inner classifier.
///
/// The call that would exceed `limit` returns [`BudgetError::Exhausted`]
/// without reaching the inner classifier.
#[derive(Debug)]
pub struct Budgeted<C> {
    inner: C,
    limit: u64,
    used: u64,
}

impl<C> Budgeted<C> {
    pub fn new(inner: C, limit: u64) -> Self {
        Self {
            inner,
            limit,
            used: 0,
        }
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.used)
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<T, C> Classifier<T> for Budgeted<C>
where
    C: Classifier<T>,
{
    type Error = BudgetError<C::Error>;

    fn classify(&mut self, input: &[T]) -> Result<Outcome, Self::Error> {
        if self.used >= self.limit {
            return Err(BudgetError::Exhausted { limit: self.limit });
        }
        self.used += 1;
        self.inner.classify(input).map_err(BudgetError::Inner)
    }
}
