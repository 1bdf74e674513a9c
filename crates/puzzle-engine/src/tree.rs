//! Decision tree nodes built by the search engine.
//!
//! Children own a strong reference to their parent and nothing points from a
//! parent to its children, so a branch is freed as soon as the search
//! backtracks out of it, unless it leads to the stored optimum. Every node
//! also carries a weak link to the root, which holds the optimum slot.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::search::SearchStats;

/// A node in a decision tree.
pub struct DecisionNode<V> {
    value: V,
    depth: usize,
    parent: Option<Rc<DecisionNode<V>>>,
    root: Weak<DecisionNode<V>>,
    /// Best completed node; only used on the root
    optimum: RefCell<Option<Rc<DecisionNode<V>>>>,
}

impl<V> DecisionNode<V> {
    pub(crate) fn new_root(value: V) -> Rc<Self> {
        Rc::new_cyclic(|root| Self {
            value,
            depth: 0,
            parent: None,
            root: root.clone(),
            optimum: RefCell::new(None),
        })
    }

    pub(crate) fn new_child(parent: &Rc<Self>, value: V) -> Rc<Self> {
        Rc::new(Self {
            value,
            depth: parent.depth + 1,
            parent: Some(Rc::clone(parent)),
            root: parent.root.clone(),
            optimum: RefCell::new(None),
        })
    }

    /// The caller's state stored at this node
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Distance from the root (the root is at depth 0)
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<&Rc<DecisionNode<V>>> {
        self.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// The root of the tree this node belongs to.
    pub fn root(&self) -> Rc<DecisionNode<V>> {
        self.root
            .upgrade()
            .expect("parent chain keeps the root alive")
    }

    /// The best completed node found so far in this node's tree.
    ///
    /// Readable from any node while the search runs, which lets `expand`
    /// skip branches that can no longer beat the current optimum.
    pub fn optimum(&self) -> Option<Rc<DecisionNode<V>>> {
        self.root().optimum.borrow().clone()
    }

    pub(crate) fn set_optimum(&self, node: Rc<DecisionNode<V>>) {
        *self.optimum.borrow_mut() = Some(node);
    }

    pub(crate) fn take_optimum(&self) -> Option<Rc<DecisionNode<V>>> {
        self.optimum.borrow_mut().take()
    }

    /// Iterate from this node up to and including the root.
    pub fn ancestors(&self) -> Ancestors<'_, V> {
        Ancestors { next: Some(self) }
    }

    /// Values from the root down to this node.
    pub fn path(&self) -> Vec<&V> {
        let mut path: Vec<&V> = self.ancestors().map(|node| &node.value).collect();
        path.reverse();
        path
    }
}

impl<V> Drop for DecisionNode<V> {
    fn drop(&mut self) {
        // Unlink the parent chain iteratively so dropping a deep branch
        // does not recurse once per level.
        let mut next = self.parent.take();
        while let Some(node) = next {
            next = match Rc::try_unwrap(node) {
                Ok(mut node) => node.parent.take(),
                Err(_) => None,
            };
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for DecisionNode<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionNode")
            .field("value", &self.value)
            .field("depth", &self.depth)
            .finish()
    }
}

/// Iterator over a node and its ancestors, see [`DecisionNode::ancestors`].
pub struct Ancestors<'n, V> {
    next: Option<&'n DecisionNode<V>>,
}

impl<'n, V> Iterator for Ancestors<'n, V> {
    type Item = &'n DecisionNode<V>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.parent.as_deref();
        Some(node)
    }
}

/// The result of a search: the root node, its optimum and search metrics.
///
/// The root's optimum slot is released when the tree is dropped. Nodes
/// obtained from the tree stay valid afterwards, including the optimum when
/// taken with [`DecisionTree::into_optimum`].
pub struct DecisionTree<V> {
    root: Rc<DecisionNode<V>>,
    pub(crate) stats: SearchStats,
}

impl<V> DecisionTree<V> {
    pub(crate) fn new(value: V) -> Self {
        Self {
            root: DecisionNode::new_root(value),
            stats: SearchStats::default(),
        }
    }

    pub fn root(&self) -> &Rc<DecisionNode<V>> {
        &self.root
    }

    /// The best completed node, or `None` when no node was complete.
    pub fn optimum(&self) -> Option<Rc<DecisionNode<V>>> {
        self.root.optimum.borrow().clone()
    }

    /// Consume the tree and keep only the optimum and its ancestors.
    pub fn into_optimum(self) -> Option<Rc<DecisionNode<V>>> {
        self.root.take_optimum()
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }
}

impl<V> Drop for DecisionTree<V> {
    fn drop(&mut self) {
        // The optimum's parent chain reaches the root, so the slot must be
        // emptied for the tree to be freed.
        self.root.take_optimum();
    }
}

impl<V: fmt::Debug> fmt::Debug for DecisionTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionTree")
            .field("root", &self.root)
            .field("optimum", &self.optimum())
            .field("stats", &self.stats)
            .finish()
    }
}
