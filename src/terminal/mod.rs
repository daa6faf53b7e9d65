//! Terminal module: the window session and the devices under it.
//!
//! This module contains:
//! - [`Window`]: A scoped session with buffered, diffed output
//! - [`Surface`]: What draw hooks paint on
//! - [`Backend`]: The device seam, with [`CrosstermBackend`] and [`TestBackend`]
//! - [`Colour`] and [`ColourPairs`]: Colours and their pair slots
//! - [`OutputBuffer`]: Escape-sequence accumulator for one flush

mod backend;
mod colour;
mod crossterm_backend;
mod interrupt;
mod output;
mod surface;
mod test_backend;
mod window;

pub use backend::Backend;
pub use colour::{Colour, ColourPairs};
pub use crossterm_backend::CrosstermBackend;
pub use output::OutputBuffer;
pub use surface::Surface;
pub use test_backend::TestBackend;
pub use window::{Window, WindowConfig};
