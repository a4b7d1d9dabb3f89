//! Composite meshes: many small units batched into one vertex buffer and one
//! index buffer, kept in sync with the GPU one dirty byte range at a time.

use glam::Mat4;

use crate::backend::MeshBackend;

mod composite;
mod dirty;
mod error;
mod layout;
mod range;
mod sync;
mod unit;
mod update;

pub use composite::{Composite, CompositeId};
pub use dirty::{BufferTarget, DirtyQueue, DirtyRegion};
pub use error::MeshError;
pub use layout::{FLOAT_BYTES, INDEX_BYTES, OPACITY_SIZE, POSITION_SIZE, RGB_SIZE, UV_SIZE, VertexLayout};
pub use range::DrawRangeQueue;
pub use sync::{DrawSpan, select_strategy};
pub use unit::{Quad, Unit};

/// Operations shared by batched meshes.
pub trait Batch {
    /// Moves `unit` into the batch and returns its position.
    fn add_unit(&mut self, unit: Unit) -> Result<usize, MeshError>;

    /// Re-linearizes the index buffer so buffer position `i` holds the unit
    /// whose order is `i`.
    fn reorder(&mut self) -> Result<(), MeshError>;

    /// Rebuilds the combined CPU buffers and uploads them in full.
    fn generate_buffer<B: MeshBackend>(&mut self, backend: &mut B);

    /// Per-frame update: rewrites changed attribute ranges and queues them.
    fn draw(&mut self);

    /// Flushes queued ranges and issues one indexed draw.
    fn render<B: MeshBackend>(&mut self, backend: &mut B, target: &mut B::Target<'_>, view_projection: Mat4);

    /// Drops every unit, keeping GPU objects for reuse.
    fn clear(&mut self);
}

impl Batch for Composite {
    fn add_unit(&mut self, unit: Unit) -> Result<usize, MeshError> {
        self.insert_unit(unit)
    }

    fn reorder(&mut self) -> Result<(), MeshError> {
        self.relink_indices()
    }

    fn generate_buffer<B: MeshBackend>(&mut self, backend: &mut B) {
        self.build_buffers(backend);
    }

    fn draw(&mut self) {
        self.update_attributes();
    }

    fn render<B: MeshBackend>(&mut self, backend: &mut B, target: &mut B::Target<'_>, view_projection: Mat4) {
        self.flush_and_draw(backend, target, view_projection);
    }

    fn clear(&mut self) {
        self.reset();
    }
}
