//! Rendering module
//!
//! Produces backend-agnostic triangle lists and text labels from the game
//! state. A host uploads `Frame::vertices` (see `vertex::as_bytes`) and draws
//! the labels with its own font stack.

pub mod frame;
pub mod shapes;
pub mod vertex;

pub use frame::{Frame, Surface, TextAlign, TextLabel, render};
pub use vertex::Vertex;
