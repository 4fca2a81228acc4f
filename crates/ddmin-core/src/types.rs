use serde::{Deserialize, Serialize};

/// Verdict a classifier reaches for one candidate input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The input reproduces the failure.
    Fail,
    /// The input does not reproduce the failure.
    Pass,
    /// Neither clearly reproduces nor clearly avoids the failure.
    /// Minimization never shrinks on it.
    Unresolved,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Fail => "fail",
            Outcome::Pass => "pass",
            Outcome::Unresolved => "unresolved",
        }
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Outcome::Fail)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MinimizeStats {
    pub original_len: usize,
    pub minimized_len: usize,
    /// Outer-loop iterations, one per granularity setting tried.
    pub rounds: u64,
    /// Classifier calls, the two precondition checks included.
    pub tests: u64,
    pub reductions: u64,
    pub granularity_increases: u64,
    /// Granularity in effect when the search stopped.
    pub final_granularity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minimized<T> {
    pub input: Vec<T>,
    pub stats: MinimizeStats,
}

impl<T> Minimized<T> {
    pub fn into_inner(self) -> Vec<T> {
        self.input
    }
}
