//! An in-memory multi-way search tree with a configurable fan-out, plus the
//! layers around it: an operation log with prefix replay, input parsing and
//! Graphviz rendering.

pub mod history;
pub mod input;
pub mod tree;
pub mod viz;
