//! Mosaic engine crate.
//!
//! Batches many small textured units into one vertex buffer and one index
//! buffer per [`mesh::Composite`], keeps them in sync with the GPU one dirty
//! byte range at a time, and draws each composite with a single indexed call.

pub mod backend;
pub mod device;
pub mod drawable;
pub mod logging;
pub mod mesh;
pub mod paint;
