//! Behavior: what a node does at each point of its life.

use std::any::Any;

use super::node::NodeCore;
use crate::error::Result;
use crate::event::Event;
use crate::terminal::Surface;

/// Hooks run by the scene tree on one node.
///
/// Every hook defaults to doing nothing, so a concrete element only
/// implements the ones it needs. Hooks get the node's own [`NodeCore`]
/// (name, children, signals, engine handle) alongside `self`.
///
/// Errors returned by a hook propagate out of the dispatch pass that ran
/// it and on to the engine's caller.
pub trait Behavior: Any {
    /// The node was attached to a parent, or installed as a scene.
    fn enter(&mut self, node: &mut NodeCore) -> Result<()> {
        let _ = node;
        Ok(())
    }

    /// The node is being detached. Its children have already exited.
    fn exit(&mut self, node: &mut NodeCore) -> Result<()> {
        let _ = node;
        Ok(())
    }

    /// An event reached the node. Its children have already seen it.
    fn input(&mut self, node: &mut NodeCore, event: &Event) -> Result<()> {
        let _ = (node, event);
        Ok(())
    }

    /// Paint the node. Its children have already painted.
    fn draw(&mut self, node: &NodeCore, surface: &mut dyn Surface) -> Result<()> {
        let _ = (node, surface);
        Ok(())
    }
}
