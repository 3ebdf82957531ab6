//! Lowering a `switch` over string labels to a dense jump table.
//!
//! Each case label gets a slot in `[0, n)` from the dispatcher; the case
//! values are stored densely in that order so resolving a label is one
//! dispatcher lookup plus one array index.

use std::borrow::Borrow;
use std::fmt;

use crate::builder;
use crate::config::Config;
use crate::dispatcher::{Dispatcher, Level, Slot};
use crate::error::{Error, Result};
use crate::hasher::{DefaultHasher, KeyHasher};

/// Label paired with its input position; equality ignores the position.
struct Tagged<K> {
    key: K,
    pos: usize,
}

impl<K: PartialEq> PartialEq for Tagged<K> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<K: Eq> Eq for Tagged<K> {}

struct ByLabel<'a, H>(&'a H);

impl<K, H: KeyHasher<K>> KeyHasher<Tagged<K>> for ByLabel<'_, H> {
    #[inline]
    fn hash(&self, key: &Tagged<K>, entropy: i32) -> i32 {
        self.0.hash(&key.key, entropy)
    }
}

impl<K> Slot<Tagged<K>> {
    /// Drops the tags, recording `positions[index] = input position`.
    fn untag(self, positions: &mut [usize]) -> Slot<K> {
        match self {
            Slot::Empty => Slot::Empty,
            Slot::Leaf { key, index } => {
                positions[index as usize] = key.pos;
                Slot::Leaf { key: key.key, index }
            }
            Slot::Level(level) => {
                let Level { entropy, slots } = *level;
                let slots: Vec<Slot<K>> = slots
                    .into_vec()
                    .into_iter()
                    .map(|s| s.untag(positions))
                    .collect();
                Slot::Level(Box::new(Level {
                    entropy,
                    slots: slots.into_boxed_slice(),
                }))
            }
            Slot::Scan(entries) => {
                let entries: Vec<(K, i32)> = entries
                    .into_vec()
                    .into_iter()
                    .map(|(key, index)| {
                        positions[index as usize] = key.pos;
                        (key.key, index)
                    })
                    .collect();
                Slot::Scan(entries.into_boxed_slice())
            }
        }
    }
}

/// A string switch: case labels resolved to case values, everything else to
/// the default arm.
pub struct Switch<K, V, H = DefaultHasher> {
    dispatcher: Dispatcher<K, H>,
    targets: Box<[V]>,
}

impl<K, V> Switch<K, V>
where
    K: AsRef<[u8]> + Eq,
{
    /// Builds a switch from `(label, value)` cases using the default hasher.
    ///
    /// ```rust
    /// use perfect_switch::Switch;
    ///
    /// let sw = Switch::new([("GET", 1), ("POST", 2), ("PUT", 3)]).unwrap();
    /// assert_eq!(sw.get("POST"), Some(&2));
    /// assert_eq!(sw.get_or("PATCH", &0), &0);
    /// ```
    pub fn new<I>(cases: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::with_hasher(cases, DefaultHasher, Config::default())
    }
}

impl<K, V, H> Switch<K, V, H>
where
    K: Eq,
    H: KeyHasher<K>,
{
    pub fn with_hasher<I>(cases: I, hasher: H, config: Config) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let (labels, values): (Vec<Tagged<K>>, Vec<V>) = cases
            .into_iter()
            .enumerate()
            .map(|(pos, (key, value))| (Tagged { key, pos }, value))
            .unzip();

        let (root, stats) = builder::build(labels, &ByLabel(&hasher), &config)?;
        let mut positions = vec![0usize; stats.keys];
        let root = root.untag(&mut positions);

        let mut values: Vec<Option<V>> = values.into_iter().map(Some).collect();
        let targets = positions
            .into_iter()
            .map(|pos| values[pos].take())
            .collect::<Option<Vec<V>>>()
            .ok_or(Error::DuplicateKey)?;

        Ok(Self {
            dispatcher: Dispatcher::from_parts(root, hasher, config, stats),
            targets: targets.into_boxed_slice(),
        })
    }
}

impl<K, V, H> Switch<K, V, H> {
    /// Case index for `label`, or [`MISS`](crate::MISS) for the default arm.
    #[inline]
    pub fn case_index<Q>(&self, label: &Q) -> i32
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        self.dispatcher.lookup(label)
    }

    #[inline]
    pub fn get<Q>(&self, label: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        self.dispatcher.get(label).map(|i| &self.targets[i])
    }

    pub fn get_or<'a, Q>(&'a self, label: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        H: KeyHasher<Q>,
    {
        self.get(label).unwrap_or(default)
    }

    /// Case values indexed by case index.
    pub fn targets(&self) -> &[V] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn dispatcher(&self) -> &Dispatcher<K, H> {
        &self.dispatcher
    }

    pub fn cases(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.dispatcher
            .iter()
            .map(move |(label, idx)| (label, &self.targets[idx]))
    }
}

impl<K: fmt::Debug, V: fmt::Debug, H> fmt::Debug for Switch<K, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.cases()).finish()
    }
}
