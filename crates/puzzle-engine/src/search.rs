//! Generic branch-and-bound search over caller-defined states.
//!
//! The engine builds a decision tree from an initial value, depth-first and
//! pre-order. A node for which `is_complete` holds is a leaf candidate and is
//! compared against the current optimum; any other node is handed to
//! `expand`, whose candidates become its children in the order returned.
//!
//! There is no built-in bound pruning. Callers prune by returning fewer
//! candidates, by consulting state captured in their closures, or by reading
//! the running optimum through [`DecisionNode::optimum`]. A search space that
//! the callbacks never bound does not terminate.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::rc::Rc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::tree::{DecisionNode, DecisionTree};

/// How the search walks the tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Traversal {
    /// Recurse on the call stack; stack depth grows with tree depth
    #[default]
    Recursive,
    /// Keep pending children on a heap-allocated stack
    WorkStack,
}

/// Configuration for a search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    pub traversal: Traversal,
}

/// Counters collected during a search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    /// Nodes created and checked for completion, root included
    pub nodes_visited: usize,
    /// Nodes passed to `expand`
    pub expansions: usize,
    /// Complete nodes compared against the optimum
    pub completions: usize,
    /// Times the optimum was replaced
    pub optimum_updates: usize,
    /// Deepest node visited
    pub max_depth: usize,
    pub time_elapsed_ms: u64,
}

/// Search with the default configuration (recursive traversal).
///
/// Recursion depth equals tree depth; use [`search_with`] and
/// [`Traversal::WorkStack`] for deep search spaces.
pub fn search<V, I, X, C, P>(expand: X, is_complete: C, compare: P, initial: V) -> DecisionTree<V>
where
    I: IntoIterator<Item = V>,
    X: FnMut(&DecisionNode<V>) -> I,
    C: FnMut(&DecisionNode<V>) -> bool,
    P: FnMut(&DecisionNode<V>, &DecisionNode<V>) -> Ordering,
{
    search_with(SearchConfig::default(), expand, is_complete, compare, initial)
}

/// Search with an explicit configuration.
pub fn search_with<V, I, X, C, P>(
    config: SearchConfig,
    mut expand: X,
    is_complete: C,
    compare: P,
    initial: V,
) -> DecisionTree<V>
where
    I: IntoIterator<Item = V>,
    X: FnMut(&DecisionNode<V>) -> I,
    C: FnMut(&DecisionNode<V>) -> bool,
    P: FnMut(&DecisionNode<V>, &DecisionNode<V>) -> Ordering,
{
    let result = try_search_with(
        config,
        |node: &DecisionNode<V>| Ok::<_, Infallible>(expand(node)),
        is_complete,
        compare,
        initial,
    );
    match result {
        Ok(tree) => tree,
        Err(never) => match never {},
    }
}

/// Search with a fallible expansion function.
///
/// The first error returned by `expand` aborts the search and is returned
/// as is; the partial tree is discarded.
pub fn try_search_with<V, I, E, X, C, P>(
    config: SearchConfig,
    mut expand: X,
    mut is_complete: C,
    mut compare: P,
    initial: V,
) -> Result<DecisionTree<V>, E>
where
    I: IntoIterator<Item = V>,
    X: FnMut(&DecisionNode<V>) -> Result<I, E>,
    C: FnMut(&DecisionNode<V>) -> bool,
    P: FnMut(&DecisionNode<V>, &DecisionNode<V>) -> Ordering,
{
    let start_time = Instant::now();
    let mut tree = DecisionTree::new(initial);
    let root = Rc::clone(tree.root());

    let mut explorer = Explorer {
        expand: &mut expand,
        is_complete: &mut is_complete,
        compare: &mut compare,
        stats: SearchStats::default(),
    };

    match config.traversal {
        Traversal::Recursive => explorer.descend(&root)?,
        Traversal::WorkStack => explorer.run_work_stack(&root)?,
    }

    let mut stats = explorer.stats;
    stats.time_elapsed_ms = start_time.elapsed().as_millis() as u64;
    tree.stats = stats;
    Ok(tree)
}

type Expand<'f, V, I, E> = dyn FnMut(&DecisionNode<V>) -> Result<I, E> + 'f;
type IsComplete<'f, V> = dyn FnMut(&DecisionNode<V>) -> bool + 'f;
type Compare<'f, V> = dyn FnMut(&DecisionNode<V>, &DecisionNode<V>) -> Ordering + 'f;

/// Callbacks and counters shared by both traversals
struct Explorer<'f, V, I, E> {
    expand: &'f mut Expand<'f, V, I, E>,
    is_complete: &'f mut IsComplete<'f, V>,
    compare: &'f mut Compare<'f, V>,
    stats: SearchStats,
}

impl<V, I, E> Explorer<'_, V, I, E>
where
    I: IntoIterator<Item = V>,
{
    /// Visit a node: record a complete node, or return the candidates for
    /// its children.
    fn visit(&mut self, node: &Rc<DecisionNode<V>>) -> Result<Option<I::IntoIter>, E> {
        self.stats.nodes_visited += 1;
        self.stats.max_depth = self.stats.max_depth.max(node.depth());

        if (self.is_complete)(&**node) {
            self.stats.completions += 1;
            self.offer(node);
            return Ok(None);
        }

        self.stats.expansions += 1;
        let candidates = (self.expand)(&**node)?;
        Ok(Some(candidates.into_iter()))
    }

    /// Replace the optimum when `node` is strictly preferred to it.
    fn offer(&mut self, node: &Rc<DecisionNode<V>>) {
        let root = node.root();
        let improved = match root.optimum() {
            None => true,
            Some(current) => (self.compare)(&**node, &*current) == Ordering::Greater,
        };
        if improved {
            root.set_optimum(Rc::clone(node));
            self.stats.optimum_updates += 1;
        }
    }

    fn descend(&mut self, node: &Rc<DecisionNode<V>>) -> Result<(), E> {
        if let Some(candidates) = self.visit(node)? {
            for value in candidates {
                let child = DecisionNode::new_child(node, value);
                self.descend(&child)?;
            }
        }
        Ok(())
    }

    fn run_work_stack(&mut self, root: &Rc<DecisionNode<V>>) -> Result<(), E> {
        // Each frame holds a node and its remaining candidates, so children
        // are created and visited in the same order as `descend`.
        let mut stack: Vec<(Rc<DecisionNode<V>>, I::IntoIter)> = Vec::new();
        if let Some(candidates) = self.visit(root)? {
            stack.push((Rc::clone(root), candidates));
        }

        while let Some((node, candidates)) = stack.last_mut() {
            let Some(value) = candidates.next() else {
                stack.pop();
                continue;
            };
            let child = DecisionNode::new_child(node, value);
            if let Some(grandchildren) = self.visit(&child)? {
                stack.push((child, grandchildren));
            }
        }
        Ok(())
    }
}
