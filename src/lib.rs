//! # perfect-switch
//!
//! Minimal perfect hash dispatch for a fixed set of keys.
//!
//! Given keys `K`, construction produces a [`Dispatcher`] that maps every
//! member to a distinct index in `[0, |K|)` and every other input to
//! [`MISS`]. It replaces a hash-map lookup when lowering a `switch` on string
//! values to an integer jump table.
//!
//! Construction hashes the keys into `ceil(n / load_factor)` buckets,
//! reseeding whenever every key lands in the same bucket, and recurses into
//! each bucket that still holds several keys. Lookup descends the resulting
//! tree and confirms the key against the single saved key at the leaf.
//!
//! ## Example
//!
//! ```rust
//! use perfect_switch::{minimal_perfect_hash, MISS};
//!
//! let d = minimal_perfect_hash(["alpha", "beta", "gamma"]).unwrap();
//!
//! let mut indices: Vec<i32> = ["alpha", "beta", "gamma"].iter().map(|k| d.lookup(*k)).collect();
//! indices.sort();
//! assert_eq!(indices, vec![0, 1, 2]);
//! assert_eq!(d.lookup("delta"), MISS);
//! ```

#![deny(unsafe_code)]

mod builder;
mod config;
mod dispatcher;
mod error;
mod hasher;
mod switch;
mod wrapper;

pub use builder::BuildStats;
pub use config::{Config, Exhaustion};
pub use dispatcher::{Dispatcher, Iter, MISS};
pub use error::{Error, Result};
pub use hasher::{DefaultHasher, KeyHasher, DEFAULT_ENTROPY_PRIME};
pub use switch::Switch;
pub use wrapper::{linear, wrap, FnIndex, KeyIndex};

/// Builds a dispatcher over byte-string keys with [`DefaultHasher`] and the
/// default [`Config`].
pub fn minimal_perfect_hash<K, I>(keys: I) -> Result<Dispatcher<K>>
where
    K: AsRef<[u8]> + Eq,
    I: IntoIterator<Item = K>,
{
    Dispatcher::new(keys)
}

/// Builds a dispatcher with a caller-supplied hasher and configuration.
pub fn minimal_perfect_hash_with<K, H, I>(keys: I, hasher: H, config: Config) -> Result<Dispatcher<K, H>>
where
    K: Eq,
    H: KeyHasher<K>,
    I: IntoIterator<Item = K>,
{
    Dispatcher::with_hasher(keys, hasher, config)
}


#[cfg(test)]
mod proptests;
