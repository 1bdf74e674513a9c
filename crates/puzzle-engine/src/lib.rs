//! Shared engine library for puzzle solvers.
//!
//! This crate provides two independent components: lazy, memoizing
//! [`Sequence`]s driven by generator functions, and a generic
//! branch-and-bound [`search`] that tracks the best completed node of a
//! decision tree. Small memoization and map-collection helpers used alongside
//! them live in [`memo`] and [`collect`].

pub mod adapters;
pub mod collect;
pub mod error;
pub mod memo;
pub mod search;
pub mod sequence;
pub mod tree;

// Re-export main types
pub use adapters::Iter;
pub use collect::{collect_map, collect_multi_map};
pub use error::{Result, SequenceError};
pub use memo::{Memo, MultiMemo};
pub use search::{search, search_with, try_search_with, SearchConfig, SearchStats, Traversal};
pub use sequence::{Sequence, SequenceConfig, Step, DEFAULT_RESOLVE_LIMIT};
pub use tree::{Ancestors, DecisionNode, DecisionTree};
