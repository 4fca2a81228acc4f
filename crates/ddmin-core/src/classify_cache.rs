use crate::classify::Classifier;
use crate::types::Outcome;
use std::collections::HashMap;
use std::hash::Hash;

/// Memoizes verdicts by input so repeated candidates cost one test.
///
/// Errors are not cached; the next request for the same input asks the
/// inner classifier again.
#[derive(Debug)]
pub struct Cached<T, C>
where
    T: Eq + Hash,
{
    inner: C,
    outcomes: HashMap<Vec<T>, Outcome>,
    hits: u64,
    misses: u64,
}

impl<T, C> Cached<T, C>
where
    T: Eq + Hash,
{
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            outcomes: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<T, C> Classifier<T> for Cached<T, C>
where
    T: Clone + Eq + Hash,
    C: Classifier<T>,
{
    type Error = C::Error;

    fn classify(&mut self, input: &[T]) -> Result<Outcome, Self::Error> {
        if let Some(outcome) = self.outcomes.get(input) {
            self.hits += 1;
            return Ok(*outcome);
        }
        let outcome = self.inner.classify(input)?;
        self.misses += 1;
        self.outcomes.insert(input.to_vec(), outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::infallible;

    #[test]
    fn repeated_input_is_classified_once() {
        let mut calls = 0;
        let mut cached = Cached::new(infallible(|input: &[char]| {
            calls += 1;
            if input.contains(&'!') {
                Outcome::Fail
            } else {
                Outcome::Pass
            }
        }));

        let bang = ['a', '!'];
        assert_eq!(cached.classify(&bang[..]), Ok(Outcome::Fail));
        assert_eq!(cached.classify(&bang[..]), Ok(Outcome::Fail));
        assert_eq!(cached.classify(&['a'][..]), Ok(Outcome::Pass));
        assert_eq!(cached.hits(), 1);
        assert_eq!(cached.misses(), 2);
        assert_eq!(cached.len(), 2);
        drop(cached);
        assert_eq!(calls, 2);
    }

    #[test]
    fn errors_are_not_remembered() {
        let mut attempts = 0;
        let mut cached = Cached::new(|_input: &[u8]| {
            attempts += 1;
            if attempts == 1 {
                Err("flaky")
            } else {
                Ok(Outcome::Pass)
            }
        });

        assert_eq!(cached.classify(&b"x"[..]), Err("flaky"));
        assert_eq!(cached.classify(&b"x"[..]), Ok(Outcome::Pass));
        assert!(cached.hits() == 0 && cached.misses() == 1);
    }
}
