//! Pointer gesture tracking.

pub mod tracker;

pub use tracker::{GestureHandler, GestureTracker};
