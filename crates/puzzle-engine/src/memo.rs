//! Memoized functions with explicitly owned caches.
//!
//! A cache lives exactly as long as the [`Memo`] or [`MultiMemo`] that owns
//! it; drop the memo (or call `clear`) to release the cached results.

use std::hash::Hash;

use ahash::{AHashMap, RandomState};
use indexmap::IndexMap;
use smallvec::SmallVec;

/// Inline capacity for multi-argument keys
const INLINE_ARGS: usize = 4;

/// A single-argument function whose results are cached by argument.
pub struct Memo<A, R, F> {
    func: F,
    cache: AHashMap<A, R>,
}

impl<A, R, F> Memo<A, R, F>
where
    A: Hash + Eq,
    F: FnMut(&A) -> R,
{
    pub fn new(func: F) -> Self {
        Self {
            func,
            cache: AHashMap::new(),
        }
    }

    /// Return the cached result for `arg`, computing it on the first call.
    pub fn get(&mut self, arg: A) -> &R {
        let func = &mut self.func;
        self.cache.entry(arg).or_insert_with_key(|arg| func(arg))
    }

    pub fn contains(&self, arg: &A) -> bool {
        self.cache.contains_key(arg)
    }

    /// Number of cached results
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Consume the memo and return its cache.
    pub fn into_cache(self) -> AHashMap<A, R> {
        self.cache
    }
}

/// A function of several arguments of the same type, cached by the whole
/// argument list.
pub struct MultiMemo<A, R, F> {
    func: F,
    cache: IndexMap<SmallVec<[A; INLINE_ARGS]>, R, RandomState>,
}

impl<A, R, F> MultiMemo<A, R, F>
where
    A: Hash + Eq + Clone,
    F: FnMut(&[A]) -> R,
{
    pub fn new(func: F) -> Self {
        Self {
            func,
            cache: IndexMap::with_hasher(RandomState::new()),
        }
    }

    /// Return the cached result for `args`, computing it on the first call.
    ///
    /// A hit hashes `args` once; a miss hashes once more to insert.
    pub fn get(&mut self, args: &[A]) -> &R {
        let index = match self.cache.get_index_of(args) {
            Some(index) => index,
            None => {
                let result = (self.func)(args);
                self.cache.insert_full(args.iter().cloned().collect(), result).0
            }
        };
        &self.cache[index]
    }

    pub fn contains(&self, args: &[A]) -> bool {
        self.cache.contains_key(args)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
