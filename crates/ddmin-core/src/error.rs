use crate::types::Outcome;
use thiserror::Error;

/// The caller handed over an input/classifier pair that cannot be minimized.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PreconditionViolation {
    #[error("empty input must pass, classifier said {}", .0.as_str())]
    EmptyInputDoesNotPass(Outcome),
    #[error("input must fail, classifier said {}", .0.as_str())]
    InputDoesNotFail(Outcome),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MinimizeError<E> {
    #[error("precondition violated: {0}")]
    Precondition(#[from] PreconditionViolation),
    /// Raised by the classifier; passed through untouched.
    #[error("classifier failed: {0}")]
    Classifier(#[source] E),
}

impl<E> MinimizeError<E> {
    pub fn precondition(&self) -> Option<PreconditionViolation> {
        match self {
            MinimizeError::Precondition(violation) => Some(*violation),
            MinimizeError::Classifier(_) => None,
        }
    }

    pub fn into_classifier_error(self) -> Option<E> {
        match self {
            MinimizeError::Classifier(err) => Some(err),
            MinimizeError::Precondition(_) => None,
        }
    }
}
