use crate::fuzz::{FuzzConfig, FuzzError};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    pub average_length: f64,
    pub max_length: usize,
}

#[derive(Debug, Error)]
pub enum EvaluateError {
    #[error(transparent)]
    Fuzz(#[from] FuzzError),
    #[error("build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

fn summarize(lengths: impl IntoIterator<Item = usize>, tries: usize) -> Evaluation {
    let mut sum_length = 0usize;
    let mut max_length = 0usize;
    for length in lengths {
        sum_length += length;
        max_length = max_length.max(length);
    }
    let average_length = if tries == 0 {
        0.0
    } else {
        sum_length as f64 / tries as f64
    };
    Evaluation {
        average_length,
        max_length,
    }
}

/// Calls `generate` `tries` times and reports the average and maximum
/// sample length in chars.
pub fn evaluate<F, E>(tries: usize, mut generate: F) -> Result<Evaluation, E>
where
    F: FnMut() -> Result<String, E>,
{
    let lengths = (0..tries)
        .map(|_| generate().map(|sample| sample.chars().count()))
        .collect::<Result<Vec<_>, E>>()?;
    Ok(summarize(lengths, tries))
}

/// Like [`evaluate`], spread over `workers` threads. Try `i` draws from its
/// own generator seeded with `seed + i`, so the result does not depend on
/// the number of workers.
pub fn evaluate_parallel(
    config: &FuzzConfig,
    seed: u64,
    tries: usize,
    workers: usize,
) -> Result<Evaluation, EvaluateError> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()?;

    let lengths = pool.install(|| {
        (0..tries)
            .into_par_iter()
            .map(|index| {
                let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(index as u64));
                config
                    .generate(&mut rng)
                    .map(|sample| sample.chars().count())
            })
            .collect::<Result<Vec<_>, FuzzError>>()
    })?;

    Ok(summarize(lengths, tries))
}
