//! Entropy-parameterised key hashing.

/// The FNV-64 prime truncated to 32 bits (`0x1B3`).
pub const DEFAULT_ENTROPY_PRIME: i32 = 1_099_511_628_211_i64 as i32;

/// Hashes a key under a given entropy.
///
/// Implementations must be deterministic for a given `(key, entropy)` pair and
/// must never return a negative value; construction rejects negative hashes
/// with [`Error::BadHasher`](crate::Error::BadHasher).
///
/// Distinct keys that collide at one entropy should separate at some other
/// entropy, otherwise construction has to fall back to a linear scan for them.
pub trait KeyHasher<K: ?Sized> {
    fn hash(&self, key: &K, entropy: i32) -> i32;
}

impl<K: ?Sized, F> KeyHasher<K> for F
where
    F: Fn(&K, i32) -> i32,
{
    #[inline]
    fn hash(&self, key: &K, entropy: i32) -> i32 {
        self(key, entropy)
    }
}

/// Polynomial byte-string hasher.
///
/// Starts from `entropy` (or 0, giving the classic `31 * h + b` string hash)
/// and folds in every byte with wrapping 32-bit arithmetic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DefaultHasher;

impl<T: AsRef<[u8]> + ?Sized> KeyHasher<T> for DefaultHasher {
    #[inline]
    fn hash(&self, key: &T, entropy: i32) -> i32 {
        non_negative(poly_hash(key.as_ref(), entropy))
    }
}

#[inline]
fn poly_hash(bytes: &[u8], seed: i32) -> i32 {
    bytes
        .iter()
        .fold(seed, |h, &b| h.wrapping_mul(31).wrapping_add(i32::from(b)))
}

/// Absolute value with `i32::MIN` masked to 0.
#[inline]
fn non_negative(h: i32) -> i32 {
    h.wrapping_abs() & i32::MAX
}
