//! # Stagehand
//!
//! A retained-mode scene-graph engine for terminal user interfaces.
//!
//! An application registers named scenes with an [`Engine`] and starts one
//! of them. Each scene is a tree of [`Node`]s; every node carries a
//! [`Behavior`] with `enter`/`exit`/`input`/`draw` hooks and a table of
//! typed signals its ancestors can subscribe to.
//!
//! ## Core Concepts
//!
//! - **Post-order dispatch**: children draw and receive input before their
//!   parent, so a parent paints decorations over its children and acts as
//!   the fallback for input they ignore
//! - **Signals**: a node announces what happened ("an option was selected")
//!   without knowing who listens
//! - **Scoped terminal session**: the [`Window`] restores the terminal on
//!   every exit path and only writes the cells that changed each frame
//! - **Deferred requests**: nodes ask for a quit or a scene switch through
//!   their [`EngineHandle`]; the engine applies it between dispatch passes
//!
//! ## Example
//!
//! ```rust,no_run
//! use stagehand::widget::{Menu, Selected};
//! use stagehand::{Behavior, Engine, Logger, NodeCore, Result};
//!
//! struct MainMenu;
//!
//! impl Behavior for MainMenu {
//!     fn enter(&mut self, node: &mut NodeCore) -> Result<()> {
//!         node.add_child(Some("menu"), Menu::new(["play", "quit"]))?;
//!
//!         let engine = node.engine().clone();
//!         node.get_node_mut("menu")?.connect(Menu::SELECTED, move |selected: &Selected| {
//!             if selected.option == "quit" {
//!                 engine.quit();
//!             }
//!             Ok(())
//!         })
//!     }
//! }
//!
//! let mut engine = Engine::new(Logger::new("demo"));
//! engine.register("main", || MainMenu)?;
//! engine.start("main")?;
//! # Ok::<(), stagehand::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod buffer;
pub mod engine;
pub mod error;
pub mod event;
pub mod layout;
pub mod logging;
pub mod scene;
pub mod terminal;
pub mod timer;
pub mod widget;

// Re-exports for convenience
pub use buffer::{Buffer, Cell, CellFlags};
pub use engine::{Engine, EngineConfig, EngineHandle};
pub use error::{Error, Result};
pub use event::{Event, Key, KeyCode, KeyModifiers};
pub use layout::Rect;
pub use logging::Logger;
pub use scene::{Behavior, Node, NodeCore};
pub use terminal::{
    Backend, Colour, CrosstermBackend, Surface, TestBackend, Window, WindowConfig,
};
pub use timer::Timer;
