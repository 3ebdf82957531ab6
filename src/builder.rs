//! Recursive bucket construction.
//!
//! Each level hashes its keys into `ceil(n / load_factor)` buckets. Buckets
//! with one key become leaves, buckets with several keys become child levels
//! built from the same entropy. A level where every key lands in one bucket
//! is reseeded before descending, since descending would not shrink it.

use crate::config::{Config, Exhaustion};
use crate::dispatcher::{Level, Slot};
use crate::error::{Error, Result};
use crate::hasher::KeyHasher;

/// Hands out terminal indices in visit order.
///
/// Owned by one construction call and threaded through the recursion by
/// `&mut`; once construction finishes the final count is frozen into the
/// dispatcher.
#[derive(Debug, Default)]
pub(crate) struct IndexAllocator {
    next: i32,
}

impl IndexAllocator {
    pub(crate) fn new() -> Self {
        Self { next: 0 }
    }

    #[inline]
    pub(crate) fn next(&mut self) -> i32 {
        let idx = self.next;
        self.next += 1;
        idx
    }

    pub(crate) fn finish(self) -> usize {
        self.next as usize
    }
}

/// Shape of a built dispatcher.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Number of keys.
    pub keys: usize,
    /// Hashed levels, including the root.
    pub levels: usize,
    /// Deepest hashed level (root is 0).
    pub max_depth: usize,
    /// Leaves holding a single key.
    pub leaves: usize,
    /// Slots with no key.
    pub empty_slots: usize,
    /// Linear-scan slots produced by the reseed cap.
    pub scan_slots: usize,
    /// Keys held in linear-scan slots.
    pub scan_keys: usize,
    /// Reseeds across all levels.
    pub reseeds: u64,
}

struct Builder<'a, H> {
    hasher: &'a H,
    config: &'a Config,
    alloc: IndexAllocator,
    stats: BuildStats,
}

/// Builds the slot tree for `keys`.
///
/// Fails without producing anything if the hasher misbehaves, keys repeat,
/// the configuration is unusable, or (with [`Exhaustion::Fail`]) a level
/// cannot be split.
pub(crate) fn build<K, H>(keys: Vec<K>, hasher: &H, config: &Config) -> Result<(Slot<K>, BuildStats)>
where
    K: Eq,
    H: KeyHasher<K>,
{
    config.validate()?;
    let n = keys.len();
    if n > i32::MAX as usize {
        return Err(Error::InvalidConfig(format!("{n} keys exceed the i32 index range")));
    }

    let span = tracing::debug_span!("mph_build", keys = n);
    let _enter = span.enter();

    let mut builder = Builder {
        hasher,
        config,
        alloc: IndexAllocator::new(),
        stats: BuildStats::default(),
    };

    let mut keys = keys;
    let root = if n > 1 {
        builder.level(keys, 0, 0)?
    } else {
        match keys.pop() {
            Some(key) => {
                // Never hashed at lookup, but the hasher still has to be sound.
                builder.check_hash(&key, 0)?;
                builder.leaf(key)
            }
            None => Slot::Empty,
        }
    };

    let Builder { alloc, mut stats, .. } = builder;
    let assigned = alloc.finish();
    debug_assert_eq!(assigned, n, "every key must receive exactly one index");
    stats.keys = assigned;

    tracing::debug!(
        levels = stats.levels,
        max_depth = stats.max_depth,
        reseeds = stats.reseeds,
        scan_slots = stats.scan_slots,
        "dispatcher built"
    );
    Ok((root, stats))
}

impl<H> Builder<'_, H> {
    fn check_hash<K>(&self, key: &K, entropy: i32) -> Result<usize>
    where
        H: KeyHasher<K>,
    {
        let hash = self.hasher.hash(key, entropy);
        if hash < 0 {
            return Err(Error::BadHasher { hash, entropy });
        }
        Ok(hash as usize)
    }

    fn leaf<K>(&mut self, key: K) -> Slot<K> {
        self.stats.leaves += 1;
        Slot::Leaf {
            key,
            index: self.alloc.next(),
        }
    }

    fn scan<K>(&mut self, keys: Vec<K>, depth: usize) -> Slot<K> {
        tracing::warn!(
            depth,
            keys = keys.len(),
            "reseed cap reached, falling back to linear scan"
        );
        self.stats.scan_slots += 1;
        self.stats.scan_keys += keys.len();
        let entries: Vec<(K, i32)> = keys.into_iter().map(|k| (k, self.alloc.next())).collect();
        Slot::Scan(entries.into_boxed_slice())
    }

    /// Builds one hashed level over `keys` (at least two of them).
    fn level<K>(&mut self, keys: Vec<K>, entropy_in: i32, depth: usize) -> Result<Slot<K>>
    where
        K: Eq,
        H: KeyHasher<K>,
    {
        debug_assert!(keys.len() >= 2);
        let n = keys.len();
        let m = self.config.table_size(n)?;

        let mut entropy = entropy_in;
        let mut slot_of = vec![0usize; n];
        let mut counts = vec![0u32; m];
        let mut attempts = 0u32;
        let mut checked_duplicates = false;

        loop {
            counts.fill(0);
            for (key, slot) in keys.iter().zip(slot_of.iter_mut()) {
                *slot = self.check_hash(key, entropy)? % m;
                counts[*slot] += 1;
            }

            if !is_degenerate(&counts) {
                break;
            }

            // Equal keys never separate, so they would stall every reseed.
            if !checked_duplicates {
                if has_duplicate(&keys) {
                    return Err(Error::DuplicateKey);
                }
                checked_duplicates = true;
            }

            if self.config.max_reseed.is_some_and(|cap| attempts >= cap) {
                return match self.config.on_exhausted {
                    Exhaustion::LinearScan => Ok(self.scan(keys, depth)),
                    Exhaustion::Fail => Err(Error::ReseedExhausted { keys: n, attempts }),
                };
            }

            attempts += 1;
            self.stats.reseeds += 1;
            entropy = if entropy == 0 {
                self.config.entropy_prime
            } else {
                entropy.wrapping_mul(self.config.entropy_prime)
            };
            tracing::debug!(depth, keys = n, attempts, entropy, "degenerate distribution, reseeding");
        }

        tracing::trace!(depth, keys = n, m, entropy, "level");
        self.stats.levels += 1;
        self.stats.max_depth = self.stats.max_depth.max(depth);

        let mut buckets: Vec<Vec<K>> = counts
            .iter()
            .map(|&c| Vec::with_capacity(c as usize))
            .collect();
        for (key, slot) in keys.into_iter().zip(slot_of) {
            buckets[slot].push(key);
        }

        let mut slots = Vec::with_capacity(m);
        for mut bucket in buckets {
            let slot = if bucket.len() > 1 {
                self.level(bucket, entropy, depth + 1)?
            } else {
                match bucket.pop() {
                    Some(key) => self.leaf(key),
                    None => {
                        self.stats.empty_slots += 1;
                        Slot::Empty
                    }
                }
            };
            slots.push(slot);
        }

        Ok(Slot::Level(Box::new(Level {
            entropy,
            slots: slots.into_boxed_slice(),
        })))
    }
}

/// All keys in one bucket, i.e. exactly `m - 1` buckets empty.
#[inline]
fn is_degenerate(counts: &[u32]) -> bool {
    counts.iter().filter(|&&c| c == 0).count() == counts.len() - 1
}

fn has_duplicate<K: Eq>(keys: &[K]) -> bool {
    keys.iter()
        .enumerate()
        .any(|(i, a)| keys[i + 1..].iter().any(|b| a == b))
}
