use std::fmt;

use crate::tree::{self, Tree};

/// A recorded tree operation.
///
/// `Display` renders the human-readable title shown next to each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Reset { fan_out: usize },
    Insert(i64),
    Delete(i64),
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Reset { fan_out } => write!(f, "Reset with k = {fan_out}"),
            Op::Insert(value) => write!(f, "Insert {value}"),
            Op::Delete(value) => write!(f, "Delete {value}"),
        }
    }
}

/// The ordered log of every operation applied to a tree.
///
/// The log owns no tree state; any prior state can be reconstructed by
/// replaying a prefix of the log against a fresh tree.
#[derive(Debug, Default, Clone)]
pub struct History {
    ops: Vec<Op>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Rebuilds the tree as it was after step `step` by replaying records
    /// `0..=step` against a fresh tree.
    pub fn replay(&self, step: usize) -> Result<Tree> {
        if step >= self.ops.len() {
            return Err(Error::InvalidStep(step));
        }

        let mut tree = None;
        for op in &self.ops[..=step] {
            match *op {
                Op::Reset { fan_out } => tree = Some(Tree::new(fan_out)),
                Op::Insert(value) => tree.as_mut().ok_or(Error::MissingReset)?.insert(value)?,
                Op::Delete(value) => tree.as_mut().ok_or(Error::MissingReset)?.delete(value)?,
            }
        }
        tree.ok_or(Error::MissingReset)
    }
}

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// The requested step lies past the end of the log.
    InvalidStep(usize),
    /// The replayed prefix mutates a tree before any `Reset` created one.
    MissingReset,
    Tree(tree::Error),
}

impl From<tree::Error> for Error {
    fn from(err: tree::Error) -> Self {
        Self::Tree(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidStep(step) => write!(f, "step {step} is not in the history"),
            Error::MissingReset => write!(f, "history does not begin with a reset"),
            Error::Tree(err) => write!(f, "replay failed: {err}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorded() -> History {
        let mut history = History::new();
        history.push(Op::Reset { fan_out: 2 });
        history.push(Op::Insert(10));
        history.push(Op::Insert(20));
        history.push(Op::Insert(30));
        history.push(Op::Delete(20));
        history
    }

    #[test]
    fn replay_full_log() {
        let tree = recorded().replay(4).unwrap();
        assert_eq!(tree.in_order(), [10, 30]);
        assert_eq!(tree.fan_out(), 2);
    }

    #[test]
    fn replay_prefix() {
        let history = recorded();

        let after_reset = history.replay(0).unwrap();
        assert!(after_reset.is_empty());

        let after_inserts = history.replay(3).unwrap();
        assert_eq!(after_inserts.in_order(), [10, 20, 30]);
    }

    #[test]
    fn replay_out_of_range() {
        let history = recorded();
        assert!(matches!(history.replay(5), Err(Error::InvalidStep(5))));
    }

    #[test]
    fn replay_without_reset() {
        let mut history = History::new();
        history.push(Op::Insert(10));
        assert!(matches!(history.replay(0), Err(Error::MissingReset)));
    }

    #[test]
    fn replay_surfaces_tree_errors() {
        let mut history = History::new();
        history.push(Op::Reset { fan_out: 2 });
        history.push(Op::Insert(10));
        history.push(Op::Insert(10));

        let result = history.replay(2);
        assert!(matches!(
            result,
            Err(Error::Tree(tree::Error::Duplicate(10)))
        ));
    }

    #[test]
    fn later_reset_starts_over() {
        let mut history = recorded();
        history.push(Op::Reset { fan_out: 3 });
        history.push(Op::Insert(7));

        let tree = history.replay(history.len() - 1).unwrap();
        assert_eq!(tree.in_order(), [7]);
        assert_eq!(tree.fan_out(), 3);
    }

    #[test]
    fn titles() {
        assert_eq!(Op::Reset { fan_out: 2 }.to_string(), "Reset with k = 2");
        assert_eq!(Op::Insert(5).to_string(), "Insert 5");
        assert_eq!(Op::Delete(5).to_string(), "Delete 5");
    }
}
