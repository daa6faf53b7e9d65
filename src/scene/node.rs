//! Node: one element of the scene tree.
//!
//! A [`Node`] pairs the structural part every element shares ([`NodeCore`]:
//! name, owned children, signals, engine handle) with a boxed
//! [`Behavior`]. Children are kept in insertion order and every traversal
//! visits them in that order, descendants before the node itself.

use std::any::Any;
use std::fmt;
use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;

use super::behavior::Behavior;
use super::signal::Signals;
use crate::engine::EngineHandle;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::logging::Logger;
use crate::terminal::Surface;

/// Path separator for [`NodeCore::get_node`].
const PATH_SEPARATOR: char = '.';

/// Structural state shared by every node.
pub struct NodeCore {
    /// Unique among siblings.
    name: String,
    /// Owned children, in insertion order.
    children: IndexMap<String, Node>,
    /// Registered signals and their subscribers.
    signals: Signals,
    /// Back-reference to the engine. Never owning.
    engine: EngineHandle,
    /// Counter for generated child names.
    next_id: u64,
}

impl NodeCore {
    fn new(name: String) -> Self {
        Self {
            name,
            children: IndexMap::new(),
            signals: Signals::default(),
            engine: EngineHandle::detached(),
            next_id: 0,
        }
    }

    /// This node's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle to the engine running this tree.
    pub const fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    /// The session logger, reached through the engine handle.
    pub fn logger(&self) -> Logger {
        self.engine.logger()
    }

    pub(crate) fn set_engine(&mut self, engine: EngineHandle) {
        self.engine = engine;
    }

    /// Attach a new child and run its `enter` hook.
    ///
    /// Without a `name` the child gets a generated one (`_0`, `_1`, ...)
    /// that does not collide with any sibling. The child inherits this
    /// node's engine handle before `enter` runs. If `enter` fails, whatever
    /// the child attached exits and the child is dropped, leaving the tree
    /// as it was.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateName`] if a sibling already has `name`, or the
    /// error returned by the child's `enter` hook.
    pub fn add_child<B: Behavior>(&mut self, name: Option<&str>, behavior: B) -> Result<&mut Node> {
        let name = match name {
            Some(name) if self.children.contains_key(name) => {
                return Err(Error::DuplicateName {
                    parent: self.name.clone(),
                    name: name.to_owned(),
                });
            }
            Some(name) => name.to_owned(),
            None => self.generate_name(),
        };

        let mut child = Node::new(name.clone(), behavior);
        child.core.engine = self.engine.clone();
        child.enter()?;

        self.logger().debug(format_args!("added node '{name}' to '{}'", self.name));
        let (index, _) = self.children.insert_full(name, child);
        Ok(&mut self.children[index])
    }

    /// Detach a child, running `exit` on its subtree deepest-first.
    ///
    /// The child is dropped even if one of the `exit` hooks fails.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchChild`] if there is no child called `name`, or the
    /// first error returned by an `exit` hook.
    pub fn remove_child(&mut self, name: &str) -> Result<()> {
        let mut child = self.children.shift_remove(name).ok_or_else(|| Error::NoSuchChild {
            parent: self.name.clone(),
            name: name.to_owned(),
        })?;

        child.dispatch_exit()?;
        self.logger().debug(format_args!("'{}' removed child '{name}'", self.name));
        Ok(())
    }

    fn generate_name(&mut self) -> String {
        loop {
            let candidate = format!("_{}", self.next_id);
            self.next_id += 1;
            if !self.children.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    /// Direct child by name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Direct child by name, mutably.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children.get_mut(name)
    }

    /// Children in traversal order.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.values()
    }

    /// Names of the children in traversal order.
    pub fn child_names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Resolve a dot-separated path of child names, e.g. `"panel.menu"`.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchChild`] naming the first segment that did not resolve.
    pub fn get_node(&self, path: &str) -> Result<&Node> {
        let mut segments = path.split(PATH_SEPARATOR);
        let head = segments.next().unwrap_or_default();
        let mut node = self.lookup(head)?;
        for segment in segments {
            node = node.core.lookup(segment)?;
        }
        Ok(node)
    }

    /// Mutable form of [`NodeCore::get_node`].
    ///
    /// # Errors
    ///
    /// Same as [`NodeCore::get_node`].
    pub fn get_node_mut(&mut self, path: &str) -> Result<&mut Node> {
        let mut segments = path.split(PATH_SEPARATOR);
        let head = segments.next().unwrap_or_default();
        let mut node = self.lookup_mut(head)?;
        for segment in segments {
            node = node.core.lookup_mut(segment)?;
        }
        Ok(node)
    }

    /// Like [`NodeCore::get_node`], but a missing node is `None`.
    pub fn find_node(&self, path: &str) -> Option<&Node> {
        self.get_node(path).ok()
    }

    fn lookup(&self, name: &str) -> Result<&Node> {
        self.children.get(name).ok_or_else(|| Error::NoSuchChild {
            parent: self.name.clone(),
            name: name.to_owned(),
        })
    }

    fn lookup_mut(&mut self, name: &str) -> Result<&mut Node> {
        let parent = &self.name;
        self.children.get_mut(name).ok_or_else(|| Error::NoSuchChild {
            parent: parent.clone(),
            name: name.to_owned(),
        })
    }

    /// Declare a signal carrying payloads of type `P`.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateSignal`] if `signal` is already registered here.
    pub fn register_signal<P: 'static>(&mut self, signal: &str) -> Result<()> {
        self.signals.register::<P>(&self.name, signal)?;
        self.logger().debug(format_args!("'{}' registered '{signal}'", self.name));
        Ok(())
    }

    /// Subscribe `callback` to a registered signal. Subscribers run in the
    /// order they were connected.
    ///
    /// # Errors
    ///
    /// [`Error::UnregisteredSignal`] if `signal` was never registered, or
    /// [`Error::SignalPayload`] if it carries a type other than `P`.
    pub fn connect<P: 'static>(
        &mut self,
        signal: &str,
        callback: impl FnMut(&P) -> Result<()> + 'static,
    ) -> Result<()> {
        self.signals.connect::<P>(&self.name, signal, Box::new(callback))?;
        self.logger().debug(format_args!("connected to '{signal}' in '{}'", self.name));
        Ok(())
    }

    /// Call every subscriber of `signal` with `payload`, synchronously.
    ///
    /// # Errors
    ///
    /// Same as [`NodeCore::connect`], plus the first error a subscriber
    /// returns; later subscribers are not called.
    pub fn emit<P: 'static>(&mut self, signal: &str, payload: &P) -> Result<()> {
        self.signals.emit(&self.name, signal, payload)?;
        self.logger().debug(format_args!("'{}' emitted '{signal}'", self.name));
        Ok(())
    }

    /// Whether `signal` is registered on this node.
    pub fn has_signal(&self, signal: &str) -> bool {
        self.signals.is_registered(signal)
    }

    /// Number of subscribers connected to `signal`.
    pub fn subscriber_count(&self, signal: &str) -> usize {
        self.signals.subscriber_count(signal)
    }
}

impl fmt::Debug for NodeCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCore")
            .field("name", &self.name)
            .field("children", &self.children.values().collect::<Vec<_>>())
            .field("signals", &self.signals.names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// A scene-tree element: shared structure plus a behaviour.
///
/// Dereferences to its [`NodeCore`].
pub struct Node {
    core: NodeCore,
    behavior: Box<dyn Behavior>,
}

impl Node {
    /// A detached node. Attach nodes to a tree with [`NodeCore::add_child`].
    pub fn new(name: impl Into<String>, behavior: impl Behavior) -> Self {
        Self::from_boxed(name, Box::new(behavior))
    }

    /// A detached node from an already boxed behaviour.
    pub fn from_boxed(name: impl Into<String>, behavior: Box<dyn Behavior>) -> Self {
        Self {
            core: NodeCore::new(name.into()),
            behavior,
        }
    }

    /// The behaviour, if it is a `T`.
    pub fn behavior<T: Behavior>(&self) -> Option<&T> {
        let behavior: &dyn Any = &*self.behavior;
        behavior.downcast_ref()
    }

    /// The behaviour, mutably, if it is a `T`.
    pub fn behavior_mut<T: Behavior>(&mut self) -> Option<&mut T> {
        let behavior: &mut dyn Any = &mut *self.behavior;
        behavior.downcast_mut()
    }

    /// Run this node's own `enter` hook.
    ///
    /// If the hook fails, children it already attached exit deepest-first
    /// before the hook's error is returned. The node itself gets no `exit`.
    pub(crate) fn enter(&mut self) -> Result<()> {
        let entered = self.behavior.enter(&mut self.core);
        if entered.is_err() {
            for child in self.core.children.values_mut() {
                let _ = child.dispatch_exit();
            }
        }
        entered
    }

    /// Run `exit` on every descendant, deepest first, then on this node.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first hook error.
    pub fn dispatch_exit(&mut self) -> Result<()> {
        for child in self.core.children.values_mut() {
            child.dispatch_exit()?;
        }
        self.behavior.exit(&mut self.core)
    }

    /// Deliver `event` to every descendant, deepest first, then to this node.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first hook error.
    pub fn dispatch_input(&mut self, event: &Event) -> Result<()> {
        for child in self.core.children.values_mut() {
            child.dispatch_input(event)?;
        }
        self.behavior.input(&mut self.core, event)
    }

    /// Paint every descendant, deepest first, then this node, so a parent
    /// paints over its children.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first hook error.
    pub fn dispatch_draw(&mut self, surface: &mut dyn Surface) -> Result<()> {
        for child in self.core.children.values_mut() {
            child.dispatch_draw(surface)?;
        }
        self.behavior.draw(&self.core, surface)
    }
}

impl Deref for Node {
    type Target = NodeCore;

    fn deref(&self) -> &NodeCore {
        &self.core
    }
}

impl DerefMut for Node {
    fn deref_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.core, f)
    }
}
