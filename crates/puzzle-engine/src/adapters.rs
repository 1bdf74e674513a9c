//! Lazy views derived from a parent sequence.
//!
//! Each adapter takes ownership of its parent and is itself a [`Sequence`],
//! so it gets the same buffering and closure behavior. Adapters only pull
//! from the parent when their own output is requested.

use crate::error::Result;
use crate::sequence::{Sequence, Step};

impl<'a, T: Clone + 'a> Sequence<'a, T> {
    /// Keep only the values accepted by `predicate`.
    ///
    /// Output position `j` holds the `j`-th accepted parent value. A cursor
    /// into the parent moves forward only, so parent values are tested once.
    /// The filtered sequence closes when the parent closes before another
    /// value is accepted.
    pub fn filter<P>(self, mut predicate: P) -> Sequence<'a, T>
    where
        P: FnMut(&T) -> bool + 'a,
    {
        let config = *self.config();
        let mut parent = self;
        let mut cursor = 0;

        Sequence::new(move |_| loop {
            match parent.pull(cursor) {
                Ok(Some(value)) => {
                    cursor += 1;
                    if predicate(value) {
                        return Step::Value(value.clone());
                    }
                }
                Ok(None) => return Step::Exhausted,
                Err(error) => return Step::Failed(error),
            }
        })
        .with_config(config)
    }

    /// Iterate over the sequence from index 0, producing values on demand.
    pub fn iter(&mut self) -> Iter<'_, 'a, T> {
        Iter {
            sequence: self,
            next: 0,
            done: false,
        }
    }
}

impl<'a, T: 'a> Sequence<'a, T> {
    /// Transform every value, index for index.
    ///
    /// Output `i` is computed from parent value `i` the first time it is
    /// pulled; nothing is produced ahead of demand.
    pub fn map<U, F>(self, mut transform: F) -> Sequence<'a, U>
    where
        F: FnMut(&T) -> U + 'a,
    {
        let config = *self.config();
        let mut parent = self;

        Sequence::new(move |index| match parent.pull(index) {
            Ok(Some(value)) => Step::Value(transform(value)),
            Ok(None) => Step::Exhausted,
            Err(error) => Step::Failed(error),
        })
        .with_config(config)
    }
}

/// Iterator over a sequence, see [`Sequence::iter`].
///
/// Yields each value once; a generator failure is yielded as an error and
/// ends the iteration.
pub struct Iter<'s, 'a, T> {
    sequence: &'s mut Sequence<'a, T>,
    next: usize,
    done: bool,
}

impl<T: Clone> Iterator for Iter<'_, '_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.sequence.pull(self.next) {
            Ok(Some(value)) => {
                self.next += 1;
                Some(Ok(value.clone()))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}
