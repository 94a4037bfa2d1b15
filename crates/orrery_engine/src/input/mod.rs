//! Pointer input

pub mod picking;

pub use picking::PointerState;
