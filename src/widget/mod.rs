//! Widgets: ready-made behaviours for common scene elements.
//!
//! - [`Container`]: Groups children, does nothing itself
//! - [`Label`]: Text at a position
//! - [`Menu`]: Selectable options, confirmed through a signal
//! - [`Frame`]: A box outline drawn over its children

mod frame;
mod label;
mod menu;

pub use frame::Frame;
pub use label::Label;
pub use menu::{Menu, Selected};

use crate::scene::Behavior;

/// A behaviour with no hooks, for grouping nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Container;

impl Behavior for Container {}
