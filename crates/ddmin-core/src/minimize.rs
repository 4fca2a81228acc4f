use crate::classify::Classifier;
use crate::error::MinimizeError;
use crate::minimize_ddmin::DeltaDebugMinimizer;
use crate::types::Minimized;

pub trait Minimizer {
    fn minimize<T, C>(
        &self,
        input: Vec<T>,
        classifier: &mut C,
    ) -> Result<Minimized<T>, MinimizeError<C::Error>>
    where
        T: Clone,
        C: Classifier<T>;
}

/// Reduces `input` with [`DeltaDebugMinimizer`] and returns only the result.
pub fn ddmin<T, C>(input: &[T], mut classifier: C) -> Result<Vec<T>, MinimizeError<C::Error>>
where
    T: Clone,
    C: Classifier<T>,
{
    DeltaDebugMinimizer
        .minimize(input.to_vec(), &mut classifier)
        .map(Minimized::into_inner)
}

pub trait MinimizeExt<T> {
    fn ddmin<C>(&self, classifier: C) -> Result<Minimized<T>, MinimizeError<C::Error>>
    where
        C: Classifier<T>;
}

impl<T> MinimizeExt<T> for [T]
where
    T: Clone,
{
    fn ddmin<C>(&self, mut classifier: C) -> Result<Minimized<T>, MinimizeError<C::Error>>
    where
        C: Classifier<T>,
    {
        DeltaDebugMinimizer.minimize(self.to_vec(), &mut classifier)
    }
}
