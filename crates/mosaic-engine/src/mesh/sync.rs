//! Dirty-region flush, draw-range resolution and the single draw call.

use glam::Mat4;

use crate::backend::{BackendCaps, DrawCall, DrawStrategy, GpuHandles, MeshBackend, UploadMode};

use super::composite::Composite;
use super::dirty::BufferTarget;
use super::MeshError;

/// Index span of one draw over units `from..=to`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DrawSpan {
    pub index_count: u32,
    /// Byte offset of the first index.
    pub index_byte_offset: u64,
}

/// Picks the draw path, best first.
pub fn select_strategy(caps: BackendCaps, handles: &GpuHandles) -> DrawStrategy {
    if caps.buffer_objects && handles.has_buffers() {
        if caps.vertex_array_cache && handles.vertex_array.is_some() {
            DrawStrategy::VertexArray
        } else {
            DrawStrategy::BufferObjects
        }
    } else {
        DrawStrategy::ClientArrays
    }
}

impl Composite {
    /// Index span covering units `from..=to` in buffer order.
    ///
    /// Relies on the index ranges of those units being contiguous, which
    /// insertion and `reorder` maintain.
    pub fn draw_span(&self, from: usize, to: usize) -> Result<DrawSpan, MeshError> {
        let unit_count = self.units.len();
        if from > to || to >= unit_count {
            return Err(MeshError::InvalidDrawRange { from, to, unit_count });
        }

        let first = &self.units[from];
        let last = &self.units[to];
        Ok(DrawSpan {
            index_count: (last.index_offset() - first.index_offset() + last.index_count()) as u32,
            index_byte_offset: first.index_data_offset() as u64,
        })
    }

    /// Pops the next override pair, falling back per endpoint to the default
    /// range. A pair that does not describe a valid range is discarded.
    fn resolve_range(&mut self) -> (usize, usize) {
        let (default_from, default_to) = self.default_range;
        let from = self.ranges.pop_or(default_from);
        let to = self.ranges.pop_or(default_to);

        if from > to || to >= self.units.len() {
            log::warn!(
                "composite {}: draw range [{from}, {to}] invalid for {} units, drawing [{default_from}, {default_to}]",
                self.id().get(),
                self.units.len(),
            );
            return self.default_range;
        }
        (from, to)
    }

    fn flush_regions<B: MeshBackend>(&mut self, backend: &mut B, caps: BackendCaps) {
        let mode = if caps.mapped_upload {
            UploadMode::Mapped
        } else {
            UploadMode::SubData
        };

        let vertex_bytes: &[u8] = bytemuck::cast_slice(&self.vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(&self.indices);

        for region in self.dirty.iter() {
            let source = match region.target {
                BufferTarget::Vertex => vertex_bytes,
                BufferTarget::Index => index_bytes,
            };
            match source.get(region.byte_range()) {
                Some(bytes) => backend.write_region(&self.handles, region, bytes, mode),
                None => log::warn!(
                    "composite {}: dropping {:?} region {:?} outside a {}-byte buffer",
                    self.id().get(),
                    region.target,
                    region.byte_range(),
                    source.len(),
                ),
            }
        }
    }

    pub(super) fn flush_and_draw<B: MeshBackend>(
        &mut self,
        backend: &mut B,
        target: &mut B::Target<'_>,
        view_projection: Mat4,
    ) {
        if self.units.is_empty() || !self.drawable().is_visible() {
            return;
        }
        if self.needs_generation {
            self.warn_stale("render");
            return;
        }

        let (from, to) = self.resolve_range();
        let caps = backend.caps();

        if caps.buffer_objects && self.handles.has_buffers() {
            self.flush_regions(backend, caps);
        }
        // client arrays read the CPU buffers directly; nothing to upload
        self.dirty.clear();

        let span = match self.draw_span(from, to) {
            Ok(span) => span,
            Err(e) => {
                log::warn!("composite {}: {e}", self.id().get());
                return;
            }
        };

        let call = DrawCall {
            strategy: select_strategy(caps, &self.handles),
            handles: &self.handles,
            layout: self.layout,
            vertex_data: bytemuck::cast_slice(&self.vertices),
            index_data: bytemuck::cast_slice(&self.indices),
            texture: Some(self.texture()),
            mvp: view_projection * *self.drawable().model_matrix(),
            index_count: span.index_count,
            index_byte_offset: span.index_byte_offset,
        };
        backend.draw(target, &call);
    }
}
