//! Keyboard shortcuts

mod bindings;
mod shortcuts;

pub use bindings::*;
pub use shortcuts::*;
