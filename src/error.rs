//! Error types for dispatcher construction.
//!
//! Lookup never fails; only building a dispatcher does, and a failed build
//! leaves nothing behind.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while constructing a dispatcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The hasher returned a negative value.
    #[error("hasher returned negative value {hash} at entropy {entropy}")]
    BadHasher {
        /// The offending hash value.
        hash: i32,
        /// Entropy the hasher was called with.
        entropy: i32,
    },

    /// Two input keys compare equal.
    #[error("duplicate key in input set")]
    DuplicateKey,

    /// The reseed cap was reached without a non-degenerate distribution and
    /// the configuration asked for failure rather than a linear scan.
    #[error("no non-degenerate distribution for {keys} keys after {attempts} reseeds")]
    ReseedExhausted {
        /// Number of keys at the stuck level.
        keys: usize,
        /// Reseed attempts made.
        attempts: u32,
    },

    /// Load factor, entropy prime or derived table size is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
