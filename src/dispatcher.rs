//! The built dispatcher: an immutable tree of hashed levels.

use std::borrow::Borrow;
use std::fmt;

use crate::builder::{self, BuildStats};
use crate::config::Config;
use crate::error::Result;
use crate::hasher::{DefaultHasher, KeyHasher};

/// Returned by [`Dispatcher::lookup`] for keys outside the set.
pub const MISS: i32 = -1;

/// One entry of a level's jump table.
#[derive(Clone, Debug)]
pub(crate) enum Slot<K> {
    Empty,
    /// A single key; lookups must compare equal to it.
    Leaf {
        key: K,
        index: i32,
    },
    Level(Box<Level<K>>),
    /// Keys the hasher could not separate within the reseed cap.
    Scan(Box<[(K, i32)]>),
}

/// A hashed level: `hash(key, entropy) % slots.len()` selects the slot.
#[derive(Clone, Debug)]
pub(crate) struct Level<K> {
    pub(crate) entropy: i32,
    pub(crate) slots: Box<[Slot<K>]>,
}

impl<K> Slot<K> {
    fn lookup<Q, H>(&self, key: &Q, hasher: &H) -> i32
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        let mut slot = self;
        loop {
            match slot {
                Slot::Empty => return MISS,
                Slot::Leaf { key: saved, index } => {
                    return if saved.borrow() == key { *index } else { MISS };
                }
                Slot::Level(level) => {
                    let hash = hasher.hash(key, level.entropy);
                    // Construction rejected negative hashes for members, so
                    // anything negative here is a non-member.
                    if hash < 0 {
                        return MISS;
                    }
                    // Out-of-range indexing is the jump table's unreachable arm.
                    slot = &level.slots[hash as usize % level.slots.len()];
                }
                Slot::Scan(entries) => {
                    return entries
                        .iter()
                        .find(|(saved, _)| saved.borrow() == key)
                        .map_or(MISS, |&(_, index)| index);
                }
            }
        }
    }
}

/// Maps each key of a fixed set to a unique index in `[0, len)` and every
/// other key to [`MISS`].
///
/// Immutable once built; lookups take `&self` and may run from any number
/// of threads.
///
/// ```rust
/// use perfect_switch::{Dispatcher, MISS};
///
/// let d = Dispatcher::new(["get", "put", "delete"]).unwrap();
/// let mut seen: Vec<i32> = ["get", "put", "delete"].iter().map(|k| d.lookup(k)).collect();
/// seen.sort();
/// assert_eq!(seen, vec![0, 1, 2]);
/// assert_eq!(d.lookup("patch"), MISS);
/// ```
#[derive(Clone)]
pub struct Dispatcher<K, H = DefaultHasher> {
    root: Slot<K>,
    hasher: H,
    config: Config,
    stats: BuildStats,
}

impl<K> Dispatcher<K>
where
    K: AsRef<[u8]> + Eq,
{
    /// Builds a dispatcher over byte-string keys with the default hasher
    /// and configuration.
    pub fn new<I>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
    {
        Self::with_hasher(keys, DefaultHasher, Config::default())
    }

    pub fn with_config<I>(keys: I, config: Config) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
    {
        Self::with_hasher(keys, DefaultHasher, config)
    }
}

impl<K, H> Dispatcher<K, H>
where
    K: Eq,
    H: KeyHasher<K>,
{
    /// Builds a dispatcher with a caller-supplied hasher.
    ///
    /// The hasher is kept for lookups, so it must agree with itself across
    /// `K` and any borrowed form used to look keys up.
    pub fn with_hasher<I>(keys: I, hasher: H, config: Config) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
    {
        let keys: Vec<K> = keys.into_iter().collect();
        let (root, stats) = builder::build(keys, &hasher, &config)?;
        Ok(Self::from_parts(root, hasher, config, stats))
    }
}

impl<K, H> Dispatcher<K, H> {
    pub(crate) fn from_parts(root: Slot<K>, hasher: H, config: Config, stats: BuildStats) -> Self {
        Self {
            root,
            hasher,
            config,
            stats,
        }
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> &Slot<K> {
        &self.root
    }

    /// Index of `key`, or [`MISS`] if it is not in the set.
    #[inline]
    pub fn lookup<Q>(&self, key: &Q) -> i32
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        self.root.lookup(key, &self.hasher)
    }

    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        usize::try_from(self.lookup(key)).ok()
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        self.lookup(key) != MISS
    }

    pub fn len(&self) -> usize {
        self.stats.keys
    }

    pub fn is_empty(&self) -> bool {
        self.stats.keys == 0
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Keys with their indices, in slot order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            stack: vec![&self.root],
            scan: <&[(K, i32)]>::default().iter(),
        }
    }
}

impl<K: fmt::Debug, H> fmt::Debug for Dispatcher<K, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, H> IntoIterator for &'a Dispatcher<K, H> {
    type Item = (&'a K, usize);
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct Iter<'a, K> {
    stack: Vec<&'a Slot<K>>,
    scan: std::slice::Iter<'a, (K, i32)>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = (&'a K, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, index)) = self.scan.next() {
                return Some((key, *index as usize));
            }
            match self.stack.pop()? {
                Slot::Empty => {}
                Slot::Leaf { key, index } => return Some((key, *index as usize)),
                Slot::Level(level) => self.stack.extend(level.slots.iter().rev()),
                Slot::Scan(entries) => self.scan = entries.iter(),
            }
        }
    }
}
