//! One-method index capability and a callable-backed implementation of it.
//!
//! Call sites that need "something that maps a key to a case index" take a
//! [`KeyIndex`]. A built [`Dispatcher`] is one; [`wrap`] turns any matching
//! closure into another, so the two can be swapped without touching the
//! call site.

use std::borrow::Borrow;

use crate::dispatcher::{Dispatcher, MISS};
use crate::hasher::KeyHasher;

/// Maps a key to a case index, or [`MISS`].
pub trait KeyIndex<Q: ?Sized> {
    fn index_of(&self, key: &Q) -> i32;
}

/// A [`KeyIndex`] whose only method delegates to a captured callable.
#[derive(Clone, Copy, Debug)]
pub struct FnIndex<F> {
    f: F,
}

/// Binds `f` as a [`KeyIndex`].
pub fn wrap<Q, F>(f: F) -> FnIndex<F>
where
    Q: ?Sized,
    F: Fn(&Q) -> i32,
{
    FnIndex { f }
}

impl<F> FnIndex<F> {
    pub fn into_inner(self) -> F {
        self.f
    }
}

impl<Q: ?Sized, F> KeyIndex<Q> for FnIndex<F>
where
    F: Fn(&Q) -> i32,
{
    #[inline]
    fn index_of(&self, key: &Q) -> i32 {
        (self.f)(key)
    }
}

impl<K, H, Q> KeyIndex<Q> for Dispatcher<K, H>
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
    H: KeyHasher<Q>,
{
    #[inline]
    fn index_of(&self, key: &Q) -> i32 {
        self.lookup(key)
    }
}

impl<Q: ?Sized, T: KeyIndex<Q> + ?Sized> KeyIndex<Q> for &T {
    #[inline]
    fn index_of(&self, key: &Q) -> i32 {
        (**self).index_of(key)
    }
}

/// Linear reference implementation over a slice; index is the position.
pub fn linear<Q, K>(keys: &[K]) -> FnIndex<impl Fn(&Q) -> i32 + '_>
where
    Q: Eq + ?Sized,
    K: Borrow<Q>,
{
    wrap(move |key: &Q| {
        keys.iter()
            .position(|k| k.borrow() == key)
            .map_or(MISS, |i| i as i32)
    })
}
