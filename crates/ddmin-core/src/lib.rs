pub mod classify;
pub mod classify_budget;
pub mod classify_cache;
pub mod error;
pub mod evaluate;
pub mod fuzz;
pub mod minimize;
pub mod minimize_ddmin;
pub mod types;

pub use classify::{infallible, Classifier, ClassifierExt};
pub use classify_budget::{BudgetError, Budgeted};
pub use classify_cache::Cached;
pub use error::{MinimizeError, PreconditionViolation};
pub use evaluate::{evaluate, evaluate_parallel, EvaluateError, Evaluation};
pub use fuzz::{generate, FuzzConfig, FuzzError, Fuzzer};
pub use minimize::{ddmin, MinimizeExt, Minimizer};
pub use minimize_ddmin::DeltaDebugMinimizer;
pub use types::{MinimizeStats, Minimized, Outcome};
