//! Scene module: the node tree the engine drives.
//!
//! This module contains:
//! - [`Node`]: A tree element, owning its children
//! - [`NodeCore`]: Name, children, signals and engine handle of a node
//! - [`Behavior`]: The per-element `enter`/`exit`/`input`/`draw` hooks
//!
//! Every dispatch pass is post-order: a node's children, in insertion
//! order, are handled before the node itself.

mod behavior;
mod node;
mod signal;

pub use behavior::Behavior;
pub use node::{Node, NodeCore};
pub use signal::Callback;
