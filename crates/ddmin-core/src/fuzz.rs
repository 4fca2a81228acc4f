use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum FuzzError {
    #[error("char range is empty but a non-empty sample was requested")]
    EmptyCharRange,
    #[error("char range {char_start}+{char_range} overflows u32")]
    CharRangeOverflow { char_start: u32, char_range: u32 },
    #[error("code point {0:#x} is not a valid char")]
    InvalidCodePoint(u32),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FuzzConfig {
    /// Exclusive upper bound on sample length.
    pub max_length: usize,
    pub char_start: u32,
    pub char_range: u32,
}

impl Default for FuzzConfig {
    fn default() -> Self {
        Self {
            max_length: 100,
            char_start: 32,
            char_range: 32,
        }
    }
}

impl FuzzConfig {
    pub fn generate<R>(&self, rng: &mut R) -> Result<String, FuzzError>
    where
        R: Rng + ?Sized,
    {
        generate(rng, self.max_length, self.char_start, self.char_range)
    }
}

/// Draws a string whose length is uniform in `[0, max_length)` and whose
/// chars are uniform in `[char_start, char_start + char_range)`.
pub fn generate<R>(
    rng: &mut R,
    max_length: usize,
    char_start: u32,
    char_range: u32,
) -> Result<String, FuzzError>
where
    R: Rng + ?Sized,
{
    let char_end = char_start
        .checked_add(char_range)
        .ok_or(FuzzError::CharRangeOverflow {
            char_start,
            char_range,
        })?;
    if max_length == 0 {
        return Ok(String::new());
    }

    let length = rng.gen_range(0..max_length);
    if length > 0 && char_range == 0 {
        return Err(FuzzError::EmptyCharRange);
    }

    let mut out = String::with_capacity(length);
    for _ in 0..length {
        let code = rng.gen_range(char_start..char_end);
        out.push(char::from_u32(code).ok_or(FuzzError::InvalidCodePoint(code))?);
    }
    Ok(out)
}

/// Seeded sample source; equal seeds give equal sample sequences.
#[derive(Debug, Clone)]
pub struct Fuzzer {
    config: FuzzConfig,
    rng: SmallRng,
}

impl Fuzzer {
    pub fn new(config: FuzzConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &FuzzConfig {
        &self.config
    }

    pub fn generate(&mut self) -> Result<String, FuzzError> {
        self.config.generate(&mut self.rng)
    }
}

impl Iterator for Fuzzer {
    type Item = Result<String, FuzzError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.generate())
    }
}
