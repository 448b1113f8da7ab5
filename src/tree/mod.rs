
mod node;

use std::fmt;

pub use node::{Node, NodeId};

use crate::tree::node::Arena;

/// An ordered set of non-negative integers backed by a balanced multi-way
/// search tree with a configurable fan-out.
///
/// Every public operation restores the occupancy invariants before it
/// returns: non-root nodes hold between `min_occupancy` and `fan_out` values,
/// the root holds between zero and `fan_out`.
pub struct Tree {
    nodes: Arena,
    root: NodeId,
    fan_out: usize,
}

impl Tree {
    /// Creates an empty tree.
    ///
    /// # Panics
    /// Panics if `fan_out` is zero.
    pub fn new(fan_out: usize) -> Self {
        assert!(fan_out >= 1, "fan-out must be at least 1");
        let mut nodes = Arena::default();
        let root = nodes.alloc(Node::default());
        Self {
            nodes,
            root,
            fan_out,
        }
    }

    /// Maximum number of values a node may hold.
    pub fn fan_out(&self) -> usize {
        self.fan_out
    }

    /// Minimum number of values a non-root node must hold.
    pub fn min_occupancy(&self) -> usize {
        self.fan_out / 2
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.nodes.get(id)
    }

    pub fn is_overflow(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_overflow(self.fan_out)
    }

    pub fn is_underflow(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_underflow(self.min_occupancy())
    }

    /// Position of a node among its parent's children.
    ///
    /// # Panics
    /// Panics if called on the root.
    pub fn index_in_parent(&self, id: NodeId) -> usize {
        self.nodes.index_in_parent(id)
    }

    pub fn left_neighbor(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.left_neighbor(id)
    }

    pub fn right_neighbor(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.right_neighbor(id)
    }

    /// Descends from the root towards `value`, counting one access per node
    /// visited. Ends either at the node holding the value or at the leaf
    /// where the value would have to be inserted.
    pub fn search(&self, value: i64) -> SearchOutcome {
        let mut node = self.root;
        let mut access_count = 0;

        loop {
            access_count += 1;
            let current = self.nodes.get(node);

            if current.values.binary_search(&value).is_ok() {
                return SearchOutcome {
                    found: true,
                    node,
                    access_count,
                };
            }

            if current.is_leaf() {
                return SearchOutcome {
                    found: false,
                    node,
                    access_count,
                };
            }

            // Child just before the first value greater than 'value';
            // past-the-end picks the rightmost child.
            let child_idx = current.values.partition_point(|&v| v < value);
            node = current.children[child_idx];
        }
    }

    /// Inserts a value, splitting overfull nodes on the way up.
    pub fn insert(&mut self, value: i64) -> Result<()> {
        if value < 0 {
            return Err(Error::InvalidValue(value));
        }

        let outcome = self.search(value);
        if outcome.found {
            return Err(Error::Duplicate(value));
        }

        self.insert_into(outcome.node, value);

        // Splitting may have stacked a new root above the old one.
        while let Some(parent) = self.nodes.get(self.root).parent {
            self.root = parent;
        }

        Ok(())
    }

    /// Ordered insertion into a known destination node. Climbs the parent
    /// chain as long as splits keep promoting medians.
    fn insert_into(&mut self, mut node: NodeId, mut value: i64) {
        loop {
            let current = self.nodes.get_mut(node);
            let idx = current.values.partition_point(|&v| v < value);
            current.values.insert(idx, value);

            if !current.is_overflow(self.fan_out) {
                return;
            }

            let (parent, median) = self.split(node);
            node = parent;
            value = median;
        }
    }

    /// Divides an overfull node around its median. The left half stays in
    /// place, the right half moves into a fresh sibling, and the median is
    /// handed back for insertion into the parent.
    fn split(&mut self, node: NodeId) -> (NodeId, i64) {
        let split_index = self.nodes.get(node).values.len() / 2;
        let median = self.nodes.get(node).values[split_index];

        // A splitting root grows the tree by one level.
        let parent = self.nodes.get(node).parent;
        let parent = match parent {
            Some(parent) => parent,
            None => {
                let parent = self.nodes.alloc(Node::default());
                self.nodes.get_mut(parent).children.push(node);
                self.nodes.get_mut(node).parent = Some(parent);
                parent
            }
        };

        let current = self.nodes.get_mut(node);
        let right_values = current.values.split_off(split_index + 1);
        current.values.truncate(split_index);
        // Children outnumber values by one, so their split point is offset.
        let right_children = if current.is_leaf() {
            Vec::new()
        } else {
            current.children.split_off(split_index + 1)
        };

        let sibling = self.nodes.alloc(Node {
            values: right_values,
            children: right_children,
            parent: Some(parent),
        });
        for i in 0..self.nodes.get(sibling).children.len() {
            let child = self.nodes.get(sibling).children[i];
            self.nodes.get_mut(child).parent = Some(sibling);
        }

        let idx = self.nodes.index_in_parent(node);
        self.nodes.get_mut(parent).children.insert(idx + 1, sibling);

        (parent, median)
    }

    /// Deletes a value, rebalancing underfull nodes on the way up.
    pub fn delete(&mut self, value: i64) -> Result<()> {
        if value < 0 {
            return Err(Error::InvalidValue(value));
        }

        let outcome = self.search(value);
        if !outcome.found {
            return Err(Error::NotFound(value));
        }
        let mut node = outcome.node;

        if self.nodes.get(node).is_leaf() {
            let current = self.nodes.get_mut(node);
            let idx = current
                .values
                .binary_search(&value)
                .expect("value was just found");
            current.values.remove(idx);
        } else {
            // A separator cannot be removed in place. Overwrite it with its
            // in-order predecessor and remove that from its leaf instead.
            let idx = self
                .nodes
                .get(node)
                .values
                .binary_search(&value)
                .expect("value was just found");
            let mut leaf = self.nodes.get(node).children[idx];
            while !self.nodes.get(leaf).is_leaf() {
                leaf = *self
                    .nodes
                    .get(leaf)
                    .children
                    .last()
                    .expect("an internal node has children");
            }
            let predecessor = self
                .nodes
                .get_mut(leaf)
                .values
                .pop()
                .expect("predecessor leaf must hold a value");
            self.nodes.get_mut(node).values[idx] = predecessor;
            node = leaf;
        }

        self.balance(node);
        Ok(())
    }

    /// Restores the occupancy invariant after a removal, climbing the parent
    /// chain for as long as merges keep pulling separators out of parents.
    fn balance(&mut self, mut node: NodeId) {
        let min_occupancy = self.min_occupancy();

        loop {
            let current = self.nodes.get(node);
            if !current.is_underflow(min_occupancy) {
                return;
            }
            // An underfull root is a terminal state: it may hold any number
            // of values down to zero.
            let Some(parent) = current.parent else { return };

            let left = self.nodes.left_neighbor(node);
            let right = self.nodes.right_neighbor(node);

            if let Some(left) = left.filter(|&l| self.nodes.get(l).values.len() > min_occupancy) {
                self.rotate_from_left(node, left, parent);
            } else if let Some(right) =
                right.filter(|&r| self.nodes.get(r).values.len() > min_occupancy)
            {
                self.rotate_from_right(node, right, parent);
            } else {
                self.merge(node, parent);
                if self.nodes.get(node).parent.is_none() {
                    // The merge consumed the old root.
                    return;
                }
            }

            // Only a merge can underflow the parent; a rotation leaves its
            // occupancy unchanged and the next check falls through.
            node = parent;
        }
    }

    /// Moves the parent separator down into `node` and the left neighbor's
    /// greatest value up into the vacated parent slot.
    fn rotate_from_left(&mut self, node: NodeId, left: NodeId, parent: NodeId) {
        let sep_idx = self.nodes.index_in_parent(node) - 1;
        let separator = self.nodes.get(parent).values[sep_idx];
        let moved = self
            .nodes
            .get_mut(left)
            .values
            .pop()
            .expect("donor holds more than min_occupancy values");

        if !self.nodes.get(left).is_leaf() {
            let child = self
                .nodes
                .get_mut(left)
                .children
                .pop()
                .expect("an internal node has children");
            self.nodes.get_mut(node).children.insert(0, child);
            self.nodes.get_mut(child).parent = Some(node);
        }

        self.nodes.get_mut(node).values.insert(0, separator);
        self.nodes.get_mut(parent).values[sep_idx] = moved;
    }

    /// Mirror image of `rotate_from_left`, borrowing from the right.
    fn rotate_from_right(&mut self, node: NodeId, right: NodeId, parent: NodeId) {
        let sep_idx = self.nodes.index_in_parent(node);
        let separator = self.nodes.get(parent).values[sep_idx];
        let moved = self.nodes.get_mut(right).values.remove(0);

        if !self.nodes.get(right).is_leaf() {
            let child = self.nodes.get_mut(right).children.remove(0);
            self.nodes.get_mut(node).children.push(child);
            self.nodes.get_mut(child).parent = Some(node);
        }

        self.nodes.get_mut(node).values.push(separator);
        self.nodes.get_mut(parent).values[sep_idx] = moved;
    }

    /// Combines `node`, a neighbor and their separator into a single node.
    /// The left neighbor is preferred; `node` survives either way. May
    /// collapse the root and shrink the tree by one level.
    fn merge(&mut self, node: NodeId, parent: NodeId) {
        if let Some(left) = self.nodes.left_neighbor(node) {
            let sep_idx = self.nodes.index_in_parent(node) - 1;
            let separator = self.nodes.get(parent).values[sep_idx];

            let consumed = self.nodes.free(left);
            for &child in &consumed.children {
                self.nodes.get_mut(child).parent = Some(node);
            }

            let current = self.nodes.get_mut(node);
            let expected = consumed.values.len() + 1 + current.values.len();
            let mut values = consumed.values;
            values.push(separator);
            values.append(&mut current.values);
            debug_assert_eq!(values.len(), expected, "merge must not lose values");
            current.values = values;

            let mut children = consumed.children;
            children.append(&mut current.children);
            current.children = children;

            let parent_node = self.nodes.get_mut(parent);
            parent_node.values.remove(sep_idx);
            parent_node.children.remove(sep_idx);
        } else {
            let right = self
                .nodes
                .right_neighbor(node)
                .expect("a non-root node has a neighbor");
            let sep_idx = self.nodes.index_in_parent(node);
            let separator = self.nodes.get(parent).values[sep_idx];

            let consumed = self.nodes.free(right);
            for &child in &consumed.children {
                self.nodes.get_mut(child).parent = Some(node);
            }

            let current = self.nodes.get_mut(node);
            let expected = current.values.len() + 1 + consumed.values.len();
            current.values.push(separator);
            current.values.extend(consumed.values);
            debug_assert_eq!(current.values.len(), expected, "merge must not lose values");
            current.children.extend(consumed.children);

            let parent_node = self.nodes.get_mut(parent);
            parent_node.values.remove(sep_idx);
            parent_node.children.remove(sep_idx + 1);
        }

        // A root drained of its last separator is discarded and the merged
        // node takes its place.
        if parent == self.root && self.nodes.get(parent).values.is_empty() {
            self.nodes.free(parent);
            self.nodes.get_mut(node).parent = None;
            self.root = node;
        }
    }

    /// All values currently in the tree, ascending.
    pub fn in_order(&self) -> Vec<i64> {
        fn walk(tree: &Tree, id: NodeId, out: &mut Vec<i64>) {
            let node = tree.nodes.get(id);
            if node.is_leaf() {
                out.extend_from_slice(&node.values);
                return;
            }
            for (i, &child) in node.children.iter().enumerate() {
                walk(tree, child, out);
                if i < node.values.len() {
                    out.push(node.values[i]);
                }
            }
        }

        let mut out = Vec::new();
        walk(self, self.root, &mut out);
        out
    }

    /// Number of values in the tree.
    pub fn len(&self) -> usize {
        fn count(tree: &Tree, id: NodeId) -> usize {
            let node = tree.nodes.get(id);
            node.values.len()
                + node
                    .children
                    .iter()
                    .map(|&child| count(tree, child))
                    .sum::<usize>()
        }

        count(self, self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.get(self.root).values.is_empty()
    }

    /// Distance from the root to a leaf. A lone root has height zero.
    pub fn height(&self) -> usize {
        let mut node = self.root;
        let mut height = 0;
        while !self.nodes.get(node).is_leaf() {
            node = self.nodes.get(node).children[0];
            height += 1;
        }
        height
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn fmt_node(
            tree: &Tree,
            f: &mut fmt::Formatter<'_>,
            id: NodeId,
            depth: usize,
        ) -> fmt::Result {
            let node = tree.nodes.get(id);
            writeln!(f, "{:indent$}{:?}", "", node.values, indent = depth * 2)?;
            for &child in &node.children {
                fmt_node(tree, f, child, depth + 1)?;
            }
            Ok(())
        }

        writeln!(f, "Tree(fan_out = {})", self.fan_out)?;
        fmt_node(self, f, self.root, 1)
    }
}

/// Result of a descent through the tree.
///
/// `node` is the node holding the value when `found`, otherwise the leaf
/// where the descent bottomed out. `access_count` is the number of nodes
/// visited, the in-memory stand-in for page accesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOutcome {
    pub found: bool,
    pub node: NodeId,
    pub access_count: usize,
}

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The value is negative and can never be a member.
    InvalidValue(i64),
    /// Insert of a value the tree already holds.
    Duplicate(i64),
    /// Delete of a value the tree does not hold.
    NotFound(i64),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidValue(value) => {
                write!(f, "value {value} is not a non-negative integer")
            }
            Error::Duplicate(value) => write!(f, "value {value} is already in the tree"),
            Error::NotFound(value) => write!(f, "value {value} does not exist in the tree"),
        }
    }
}

impl std::error::Error for Error {}
