//! Paint model shared between drawables and renderers.
//!
//! Scope:
//! - blend color representation (linear, straight alpha)

pub mod color;

pub use color::Color;
