//! Construction parameters.

use crate::error::{Error, Result};
use crate::hasher::DEFAULT_ENTROPY_PRIME;

/// What to do when a level cannot be split within the reseed cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Exhaustion {
    /// Store the stuck keys in a slot that is searched linearly.
    #[default]
    LinearScan,
    /// Abort construction with [`Error::ReseedExhausted`].
    Fail,
}

/// Configuration for dispatcher construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Keys per slot; each level has `ceil(keys / load_factor)` slots.
    pub load_factor: f64,
    /// Multiplier applied to the entropy on every reseed. Must be odd.
    pub entropy_prime: i32,
    /// Reseeds allowed per level before giving up; `None` never gives up.
    pub max_reseed: Option<u32>,
    /// Behaviour once `max_reseed` is hit.
    pub on_exhausted: Exhaustion,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            load_factor: 0.75,
            entropy_prime: DEFAULT_ENTROPY_PRIME,
            max_reseed: Some(256),
            on_exhausted: Exhaustion::LinearScan,
        }
    }
}

impl Config {
    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn with_entropy_prime(mut self, entropy_prime: i32) -> Self {
        self.entropy_prime = entropy_prime;
        self
    }

    pub fn with_max_reseed(mut self, max_reseed: Option<u32>) -> Self {
        self.max_reseed = max_reseed;
        self
    }

    pub fn with_exhaustion(mut self, on_exhausted: Exhaustion) -> Self {
        self.on_exhausted = on_exhausted;
        self
    }

    /// Checks the parameters that do not depend on the key count.
    pub fn validate(&self) -> Result<()> {
        if !self.load_factor.is_finite() || self.load_factor <= 0.0 || self.load_factor > 1.0 {
            return Err(Error::InvalidConfig(format!(
                "load factor {} outside (0, 1]",
                self.load_factor
            )));
        }
        if self.entropy_prime % 2 == 0 {
            return Err(Error::InvalidConfig(format!(
                "entropy prime {} is not odd",
                self.entropy_prime
            )));
        }
        Ok(())
    }

    /// Slot count for a level holding `keys` keys.
    pub fn table_size(&self, keys: usize) -> Result<usize> {
        let m = (keys as f64 / self.load_factor).ceil();
        if !(m >= 1.0 && m <= i32::MAX as f64) {
            return Err(Error::InvalidConfig(format!(
                "table size {m} for {keys} keys is not a positive i32"
            )));
        }
        Ok(m as usize)
    }
}
