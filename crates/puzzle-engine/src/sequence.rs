//! Lazy, index-addressable, memoizing sequences.
//!
//! A [`Sequence`] wraps a generator that is called at most once per index,
//! always in increasing index order. Produced values are buffered, so pulling
//! an index a second time returns the cached value without touching the
//! generator again. Pulling an index that has not been produced yet produces
//! every index up to it first.
//!
//! The generator signals the end of the sequence with [`Step::Exhausted`],
//! which is a dedicated variant: a value such as `0` is always a value.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SequenceError};

/// Default cap on the number of values [`Sequence::resolve`] may produce.
pub const DEFAULT_RESOLVE_LIMIT: usize = 1 << 24;

/// Configuration for a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SequenceConfig {
    /// Maximum number of values forced production may buffer before it
    /// reports [`SequenceError::Overflow`]
    pub resolve_limit: usize,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            resolve_limit: DEFAULT_RESOLVE_LIMIT,
        }
    }
}

/// Outcome of a single generator call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<T> {
    /// A produced value, cached at the requested index
    Value(T),
    /// No further values exist; the sequence closes
    Exhausted,
    /// The generator could not produce the value
    Failed(SequenceError),
}

impl<T> Step<T> {
    /// Shorthand for a generator failure with the given reason.
    pub fn fail(reason: impl Into<String>) -> Self {
        Step::Failed(SequenceError::generator(reason))
    }
}

impl<T> From<Option<T>> for Step<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Step::Value(value),
            None => Step::Exhausted,
        }
    }
}

/// Lifecycle of a sequence
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Open,
    Closed,
    Failed(SequenceError),
}

type Generator<'a, T> = Box<dyn FnMut(usize) -> Step<T> + 'a>;
type CloseWhen<'a> = Box<dyn FnMut(usize) -> bool + 'a>;

/// A lazily produced, cached, index-addressable list of values.
pub struct Sequence<'a, T> {
    generator: Generator<'a, T>,
    close_when: Option<CloseWhen<'a>>,
    buffer: Vec<T>,
    state: State,
    config: SequenceConfig,
    generator_calls: usize,
}

impl<'a, T> Sequence<'a, T> {
    /// Create a sequence driven by `generator`, called with each production
    /// index in turn.
    pub fn new<G>(generator: G) -> Self
    where
        G: FnMut(usize) -> Step<T> + 'a,
    {
        Self {
            generator: Box::new(generator),
            close_when: None,
            buffer: Vec::new(),
            state: State::Open,
            config: SequenceConfig::default(),
            generator_calls: 0,
        }
    }

    /// Create a sequence from a generator that returns `None` once exhausted.
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(usize) -> Option<T> + 'a,
    {
        Self::new(move |index| f(index).into())
    }

    /// Create a sequence that lazily pulls from an iterator.
    pub fn from_iterator<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
    {
        let mut iter = iter.into_iter();
        Self::new(move |_| iter.next().into())
    }

    /// Force closure once `predicate(next_index)` holds after a value has
    /// been produced.
    pub fn close_when<P>(mut self, predicate: P) -> Self
    where
        P: FnMut(usize) -> bool + 'a,
    {
        self.close_when = Some(Box::new(predicate));
        self
    }

    /// Replace the sequence configuration.
    pub fn with_config(mut self, config: SequenceConfig) -> Self {
        self.config = config;
        self
    }

    /// The configuration in effect for forced production.
    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    /// Pull the value at `index`, producing every missing index before it.
    ///
    /// Returns `Ok(None)` when the sequence closes before reaching `index`.
    /// Buffered values stay readable after the sequence closes.
    pub fn pull(&mut self, index: usize) -> Result<Option<&T>> {
        self.produce_through(index)?;
        Ok(self.buffer.get(index))
    }

    /// Produce the next value past the buffer.
    pub fn pull_next(&mut self) -> Result<Option<&T>> {
        let index = self.buffer.len();
        self.pull(index)
    }

    /// Pull the value at index 0.
    pub fn first(&mut self) -> Result<Option<&T>> {
        self.pull(0)
    }

    /// Produce until the sequence closes and return every value.
    ///
    /// Never returns on a sequence that neither exhausts nor closes; use
    /// [`Sequence::resolve`] when production must be bounded.
    pub fn to_array(&mut self) -> Result<&[T]> {
        self.drain(None)?;
        Ok(&self.buffer)
    }

    /// Fold `f` left-to-right over every value of the sequence.
    pub fn reduce<A, F>(&mut self, f: F, init: A) -> Result<A>
    where
        F: FnMut(A, &T) -> A,
    {
        Ok(self.to_array()?.iter().fold(init, f))
    }

    /// Force full production and return the number of values.
    ///
    /// Fails with [`SequenceError::Overflow`] once production goes past the
    /// configured limit. A sequence of exactly `resolve_limit` values that
    /// then exhausts or closes resolves normally.
    pub fn resolve(&mut self) -> Result<usize> {
        self.drain(Some(self.config.resolve_limit))?;
        Ok(self.buffer.len())
    }

    /// Number of values, resolving the sequence first if it is still open.
    pub fn length(&mut self) -> Result<usize> {
        if !self.is_closed() {
            self.resolve()?;
        }
        Ok(self.buffer.len())
    }

    /// Final value, resolving the sequence first if it is still open.
    pub fn last(&mut self) -> Result<Option<&T>> {
        if !self.is_closed() {
            self.resolve()?;
        }
        Ok(self.buffer.last())
    }

    /// Stop production. Buffered values remain available.
    pub fn close(&mut self) {
        if self.state == State::Open {
            self.state = State::Closed;
        }
    }

    /// Whether the sequence will never produce another value.
    pub fn is_closed(&self) -> bool {
        self.state != State::Open
    }

    /// Whether the generator reported a failure.
    pub fn is_failed(&self) -> bool {
        matches!(self.state, State::Failed(_))
    }

    /// Values produced so far, in index order.
    pub fn buffered(&self) -> &[T] {
        &self.buffer
    }

    /// Number of times the generator has been invoked.
    pub fn generator_calls(&self) -> usize {
        self.generator_calls
    }

    fn produce_through(&mut self, index: usize) -> Result<()> {
        while self.buffer.len() <= index {
            match &self.state {
                State::Open => {}
                State::Closed => break,
                State::Failed(error) => return Err(error.clone()),
            }
            self.produce()?;
        }
        Ok(())
    }

    fn drain(&mut self, limit: Option<usize>) -> Result<()> {
        loop {
            match &self.state {
                State::Open => {}
                State::Closed => return Ok(()),
                State::Failed(error) => return Err(error.clone()),
            }
            self.produce()?;
            if let Some(limit) = limit {
                if self.buffer.len() > limit {
                    return Err(SequenceError::Overflow { limit });
                }
            }
        }
    }

    fn produce(&mut self) -> Result<()> {
        let index = self.buffer.len();
        self.generator_calls += 1;

        match (self.generator)(index) {
            Step::Value(value) => {
                self.buffer.push(value);
                if let Some(close_when) = self.close_when.as_mut() {
                    if close_when(index + 1) {
                        self.state = State::Closed;
                    }
                }
                Ok(())
            }
            Step::Exhausted => {
                self.state = State::Closed;
                Ok(())
            }
            Step::Failed(error) => {
                // Failures are sticky: later pulls report the same error
                // without re-running the generator.
                self.state = State::Failed(error.clone());
                Err(error)
            }
        }
    }
}

impl<'a> Sequence<'a, i64> {
    /// The unbounded sequence `start, start + 1, start + 2, ...`.
    ///
    /// Fails with a generator error once a value would not fit in `i64`.
    pub fn counting_from(start: i64) -> Self {
        Self::new(move |index| {
            match i64::try_from(index).ok().and_then(|offset| start.checked_add(offset)) {
                Some(value) => Step::Value(value),
                None => Step::fail(format!("counting from {} overflows i64 at index {}", start, index)),
            }
        })
    }

    /// The inclusive integer range `from..=to`.
    pub fn range(from: i64, to: i64) -> Result<Self> {
        if from > to {
            return Err(SequenceError::InvalidRange { from, to });
        }
        let last_index = to as i128 - from as i128;
        Ok(Self::counting_from(from).close_when(move |next| next as i128 > last_index))
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Sequence<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence")
            .field("buffer", &self.buffer)
            .field("state", &self.state)
            .field("generator_calls", &self.generator_calls)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::{Cell, RefCell};

    fn identity_up_to(last: usize) -> Sequence<'static, usize> {
        Sequence::new(|index| Step::Value(index)).close_when(move |next| next > last)
    }

    #[test]
    fn test_pull_is_memoized() {
        let calls = Cell::new(0);
        let mut seq = Sequence::new(|index: usize| {
            calls.set(calls.get() + 1);
            Step::Value(index * 10)
        });

        assert_eq!(seq.pull(3).unwrap(), Some(&30));
        assert_eq!(calls.get(), 4);
        assert_eq!(seq.pull(3).unwrap(), Some(&30));
        assert_eq!(seq.pull(1).unwrap(), Some(&10));
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn test_random_access_produces_sequentially() {
        let seen = RefCell::new(Vec::new());
        let mut seq = Sequence::new(|index: usize| {
            seen.borrow_mut().push(index);
            Step::Value(index)
        });

        seq.pull(3).unwrap();
        seq.pull_next().unwrap();

        assert_eq!(*seen.borrow(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_zero_is_a_value() {
        let mut seq = Sequence::from_fn(|_| Some(0)).close_when(|next| next >= 3);

        assert_eq!(seq.first().unwrap(), Some(&0));
        assert_eq!(seq.to_array().unwrap(), &[0, 0, 0]);
    }

    #[test]
    fn test_close_when_bounds_production() {
        let mut seq = identity_up_to(9);

        assert_eq!(seq.to_array().unwrap(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert!(seq.is_closed());
        assert_eq!(seq.generator_calls(), 10);
    }

    #[test]
    fn test_closed_sequence_skips_generator() {
        let mut seq = Sequence::from_fn(|index| (index < 2).then_some(index));

        assert_eq!(seq.to_array().unwrap(), &[0, 1]);
        assert_eq!(seq.generator_calls(), 3);

        assert_eq!(seq.pull(10).unwrap(), None);
        assert_eq!(seq.pull_next().unwrap(), None);
        assert_eq!(seq.generator_calls(), 3);
    }

    #[test]
    fn test_buffered_values_survive_close() {
        let mut seq = Sequence::counting_from(5);
        seq.pull(1).unwrap();
        seq.close();

        assert_eq!(seq.pull(0).unwrap(), Some(&5));
        assert_eq!(seq.pull(2).unwrap(), None);
        assert_eq!(seq.buffered(), &[5, 6]);
        assert_eq!(seq.generator_calls(), 2);
    }

    #[test]
    fn test_failure_is_sticky() {
        let mut seq = Sequence::new(|index: usize| {
            if index == 2 {
                Step::fail("bad index")
            } else {
                Step::Value(index)
            }
        });

        assert_eq!(seq.pull(1).unwrap(), Some(&1));
        let error = seq.pull(2).unwrap_err();
        assert_eq!(error, SequenceError::generator("bad index"));
        assert_eq!(seq.pull(5).unwrap_err(), error);
        assert_eq!(seq.generator_calls(), 3);

        assert!(seq.is_closed());
        assert!(seq.is_failed());
        assert_eq!(seq.pull(0).unwrap(), Some(&0));
        assert!(seq.to_array().is_err());
    }

    #[test]
    fn test_to_array_is_idempotent() {
        let mut seq = identity_up_to(4);

        let first = seq.to_array().unwrap().to_vec();
        let second = seq.to_array().unwrap().to_vec();

        assert_eq!(first, second);
        assert_eq!(seq.generator_calls(), 5);
    }

    #[test]
    fn test_reduce_folds_in_order() {
        let mut seq = Sequence::range(1, 4).unwrap();

        let digits = seq
            .reduce(|acc, value| format!("{}{}", acc, value), String::new())
            .unwrap();

        assert_eq!(digits, "1234");
        assert_eq!(seq.reduce(|acc, value| acc + value, 0).unwrap(), 10);
    }

    #[test]
    fn test_resolve_reports_overflow() {
        let mut seq = Sequence::counting_from(0).with_config(SequenceConfig { resolve_limit: 100 });

        assert_eq!(seq.resolve(), Err(SequenceError::Overflow { limit: 100 }));
        assert_eq!(seq.buffered().len(), 101);
        assert!(!seq.is_closed());
    }

    #[test]
    fn test_resolve_accepts_exactly_limit_values() {
        let config = SequenceConfig { resolve_limit: 100 };
        let mut exhausted = Sequence::from_fn(|index| (index < 100).then_some(index)).with_config(config);

        assert_eq!(exhausted.resolve(), Ok(100));
        assert_eq!(exhausted.generator_calls(), 101);

        let mut bounded = identity_up_to(99).with_config(config);
        assert_eq!(bounded.length(), Ok(100));
        assert_eq!(bounded.last(), Ok(Some(&99)));

        let mut too_long = Sequence::from_fn(|index| (index < 101).then_some(index)).with_config(config);
        assert_eq!(too_long.length(), Err(SequenceError::Overflow { limit: 100 }));
    }

    #[test]
    fn test_counting_from_fails_instead_of_wrapping() {
        let mut seq = Sequence::counting_from(i64::MAX - 1);

        assert_eq!(seq.pull(1).unwrap(), Some(&i64::MAX));
        assert!(matches!(seq.pull(2), Err(SequenceError::Generator { .. })));
        assert!(seq.is_failed());
        assert_eq!(seq.buffered(), &[i64::MAX - 1, i64::MAX]);
    }

    #[test]
    fn test_length_and_last_force_resolution() {
        let mut seq = Sequence::range(3, 7).unwrap();

        assert_eq!(seq.length().unwrap(), 5);
        assert_eq!(seq.last().unwrap(), Some(&7));

        let mut empty = Sequence::<u8>::from_fn(|_| None);
        assert_eq!(empty.length().unwrap(), 0);
        assert_eq!(empty.last().unwrap(), None);
    }

    #[rstest]
    #[case(-1, 1, vec![-1, 0, 1])]
    #[case(3, 3, vec![3])]
    #[case(1, 5, vec![1, 2, 3, 4, 5])]
    fn test_range_is_inclusive(#[case] from: i64, #[case] to: i64, #[case] expected: Vec<i64>) {
        let mut seq = Sequence::range(from, to).unwrap();
        assert_eq!(seq.to_array().unwrap(), expected.as_slice());
    }

    #[test]
    fn test_range_rejects_reversed_bounds() {
        let error = Sequence::range(2, 1).unwrap_err();
        assert_eq!(error, SequenceError::InvalidRange { from: 2, to: 1 });
    }

    #[test]
    fn test_from_iterator_is_lazy() {
        let consumed = Cell::new(0);
        let iter = (0..).map(|n| {
            consumed.set(consumed.get() + 1);
            n * 2
        });
        let mut seq = Sequence::from_iterator(iter);

        assert_eq!(seq.pull(2).unwrap(), Some(&4));
        assert_eq!(consumed.get(), 3);
    }

    #[test]
    fn test_config_from_json() {
        let config: SequenceConfig = serde_json::from_str(r#"{"resolveLimit": 10}"#).unwrap();
        assert_eq!(config.resolve_limit, 10);

        let config: SequenceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SequenceConfig::default());
    }
}
