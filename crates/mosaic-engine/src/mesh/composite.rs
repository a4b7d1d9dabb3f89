use std::sync::atomic::{AtomicU64, Ordering};

use crate::backend::{GpuHandles, MeshBackend, TextureHandle};
use crate::drawable::{Drawable, DrawableState};

use super::dirty::{DirtyQueue, DirtyRegion};
use super::layout::{FLOAT_BYTES, INDEX_BYTES, OPACITY_SIZE, POSITION_SIZE, RGB_SIZE, VertexLayout};
use super::range::DrawRangeQueue;
use super::unit::{Quad, Unit};
use super::MeshError;

/// Largest vertex count addressable with 16-bit indices.
const MAX_VERTICES: usize = u16::MAX as usize + 1;

/// Identity of a composite, used as the non-owning back-reference on units.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeId(u64);

impl CompositeId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Many units packed into one vertex buffer and one index buffer, drawn with
/// a single indexed draw call.
///
/// Typical frame:
///
/// ```ignore
/// composite.draw();                                  // detect changes
/// composite.render(&mut backend, &mut pass, vp);     // flush + one draw
/// ```
///
/// Structural changes (`add_unit`, `clear`) leave the buffers stale until the
/// next `generate_buffer`; per-frame operations skip stale buffers.
#[derive(Debug)]
pub struct Composite {
    id: CompositeId,
    drawable: Drawable,
    texture: TextureHandle,

    pub(super) units: Vec<Unit>,

    // CPU copies of the combined buffers
    pub(super) vertices: Vec<f32>,
    pub(super) indices: Vec<u16>,
    pub(super) layout: VertexLayout,

    pub(super) handles: GpuHandles,
    pub(super) dirty: DirtyQueue,
    pub(super) ranges: DrawRangeQueue,
    pub(super) default_range: (usize, usize),

    // aggregate counters, floats per attribute and u16 elements
    vertex_count: usize,
    position_size: usize,
    uv_size: usize,
    opacity_size: usize,
    rgb_size: usize,
    index_size: usize,

    pub(super) needs_generation: bool,
    stale_warned: bool,
}

impl Composite {
    pub fn new(texture: TextureHandle) -> Self {
        Self::with_capacity(texture, 0)
    }

    /// Creates a composite with room for `capacity` units.
    pub fn with_capacity(texture: TextureHandle, capacity: usize) -> Self {
        Self {
            id: CompositeId::next(),
            drawable: Drawable::new(),
            texture,
            units: Vec::with_capacity(capacity),
            vertices: Vec::new(),
            indices: Vec::new(),
            layout: VertexLayout::default(),
            handles: GpuHandles::default(),
            dirty: DirtyQueue::with_capacity(capacity),
            ranges: DrawRangeQueue::new(),
            default_range: (0, 0),
            vertex_count: 0,
            position_size: 0,
            uv_size: 0,
            opacity_size: 0,
            rgb_size: 0,
            index_size: 0,
            needs_generation: true,
            stale_warned: false,
        }
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> CompositeId {
        self.id
    }

    /// Composite-level drawable: parent opacity/colour and the model matrix
    /// applied to the whole batch.
    #[inline]
    pub fn drawable(&self) -> &Drawable {
        &self.drawable
    }

    #[inline]
    pub fn drawable_mut(&mut self) -> &mut Drawable {
        &mut self.drawable
    }

    #[inline]
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    #[inline]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    #[inline]
    pub fn unit(&self, index: usize) -> Option<&Unit> {
        self.units.get(index)
    }

    #[inline]
    pub fn unit_mut(&mut self, index: usize) -> Option<&mut Unit> {
        self.units.get_mut(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.index_size
    }

    /// Aggregate float counts `(position, uv, opacity, rgb)`.
    #[inline]
    pub fn attribute_sizes(&self) -> (usize, usize, usize, usize) {
        (self.position_size, self.uv_size, self.opacity_size, self.rgb_size)
    }

    /// Combined CPU vertex buffer (empty before generation).
    #[inline]
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Combined CPU index buffer (empty before generation).
    #[inline]
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    #[inline]
    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    #[inline]
    pub fn handles(&self) -> &GpuHandles {
        &self.handles
    }

    /// Regions waiting for the next render.
    #[inline]
    pub fn dirty(&self) -> &DirtyQueue {
        &self.dirty
    }

    /// Full draw range set by the last generation.
    #[inline]
    pub fn default_range(&self) -> (usize, usize) {
        self.default_range
    }

    /// `true` until buffers reflect the current set of units.
    #[inline]
    pub fn needs_generation(&self) -> bool {
        self.needs_generation
    }

    // ── insertion ─────────────────────────────────────────────────────────

    pub(super) fn insert_unit(&mut self, mut unit: Unit) -> Result<usize, MeshError> {
        let vertex_count = unit.vertex_count();
        if self.vertex_count + vertex_count > MAX_VERTICES {
            return Err(MeshError::IndexOverflow {
                base: self.vertex_count,
                vertex_count,
            });
        }

        unit.bias_indices(self.vertex_count);
        unit.index_base = self.vertex_count;
        unit.order = self.units.len();
        unit.parent = Some(self.id);

        unit.position_offset = self.position_size * FLOAT_BYTES;
        unit.uv_offset = self.uv_size * FLOAT_BYTES;
        unit.opacity_offset = self.opacity_size * FLOAT_BYTES;
        unit.rgb_offset = self.rgb_size * FLOAT_BYTES;
        unit.index_offset = self.index_size;
        unit.index_data_offset = self.index_size * INDEX_BYTES;

        self.vertex_count += vertex_count;
        self.position_size += vertex_count * POSITION_SIZE;
        self.uv_size += unit.uvs().len();
        self.opacity_size += vertex_count * OPACITY_SIZE;
        self.rgb_size += vertex_count * RGB_SIZE;
        self.index_size += unit.index_count();

        self.units.push(unit);
        self.needs_generation = true;

        Ok(self.units.len() - 1)
    }

    /// Builds a unit from raw geometry and inserts it.
    pub fn add_unit_with_data(
        &mut self,
        positions: Vec<f32>,
        uvs: Vec<f32>,
        indices: Vec<u16>,
    ) -> Result<usize, MeshError> {
        let unit = Unit::from_geometry(positions, uvs, indices)?;
        self.insert_unit(unit)
    }

    /// Builds a quad unit against this composite's texture and inserts it.
    pub fn add_unit_with_quad(&mut self, quad: &Quad) -> Result<usize, MeshError> {
        let unit = Unit::from_quad(quad, self.texture);
        self.insert_unit(unit)
    }

    // ── generation ────────────────────────────────────────────────────────

    pub(super) fn build_buffers<B: MeshBackend>(&mut self, backend: &mut B) {
        self.layout = VertexLayout::new(self.position_size, self.uv_size, self.opacity_size, self.rgb_size);

        // opacity and rgb start at zero; the DRAW request below fills them
        self.vertices.clear();
        self.vertices.resize(self.layout.total_floats(), 0.0);
        self.indices.clear();
        self.indices.resize(self.index_size, 0);

        for unit in &mut self.units {
            self.indices[unit.index_elements()].copy_from_slice(unit.indices());
            self.vertices[unit.position_floats()].copy_from_slice(unit.positions());
            self.vertices[unit.uv_floats(&self.layout)].copy_from_slice(unit.uvs());
            unit.drawable_mut().add_state(DrawableState::DRAW);
        }

        self.default_range = (0, self.units.len().saturating_sub(1));

        let caps = backend.caps();
        if caps.buffer_objects && !self.units.is_empty() {
            backend.upload_buffers(
                &mut self.handles,
                bytemuck::cast_slice(&self.vertices),
                bytemuck::cast_slice(&self.indices),
            );
            if caps.vertex_array_cache {
                backend.build_vertex_array(&mut self.handles, &self.layout);
            }
        }

        // queued regions described the replaced buffers
        self.dirty.clear();
        self.needs_generation = false;
        self.stale_warned = false;

        log::debug!(
            "composite {}: generated {} units, {} vertices, {} vertex bytes, {} indices",
            self.id.get(),
            self.units.len(),
            self.vertex_count,
            self.layout.vertex_bytes,
            self.index_size,
        );
    }

    // ── reordering ────────────────────────────────────────────────────────

    /// Assigns the logical draw position of the unit at `slot`. Takes effect on
    /// the next `reorder`.
    pub fn set_unit_order(&mut self, slot: usize, order: usize) -> Result<(), MeshError> {
        let unit_count = self.units.len();
        let unit = self
            .units
            .get_mut(slot)
            .ok_or(MeshError::UnitOutOfRange { index: slot, unit_count })?;
        unit.order = order;
        Ok(())
    }

    pub(super) fn relink_indices(&mut self) -> Result<(), MeshError> {
        let unit_count = self.units.len();

        let mut taken = vec![false; unit_count];
        for (slot, unit) in self.units.iter().enumerate() {
            let order = unit.order;
            if order >= unit_count || taken[order] {
                return Err(MeshError::InvalidOrder {
                    slot,
                    order,
                    unit_count,
                });
            }
            taken[order] = true;
        }

        // every swap parks one unit in its final slot
        for slot in 0..unit_count {
            while self.units[slot].order != slot {
                let target = self.units[slot].order;
                self.units.swap(slot, target);
            }
        }

        let mut index_offset = 0;
        for unit in &mut self.units {
            unit.index_offset = index_offset;
            unit.index_data_offset = index_offset * INDEX_BYTES;
            index_offset += unit.index_count();
        }

        if !self.needs_generation && !self.indices.is_empty() {
            for unit in &self.units {
                self.indices[unit.index_elements()].copy_from_slice(unit.indices());
            }
            self.dirty.push(DirtyRegion::index(0..self.indices.len()));
        }

        log::debug!("composite {}: reordered {} units", self.id.get(), unit_count);
        Ok(())
    }

    // ── draw range ────────────────────────────────────────────────────────

    /// Restricts one upcoming render to units `from..=to`.
    pub fn push_draw_range(&mut self, from: usize, to: usize) -> Result<(), MeshError> {
        let unit_count = self.units.len();
        if from > to || to >= unit_count {
            return Err(MeshError::InvalidDrawRange { from, to, unit_count });
        }
        self.ranges.push_range(from, to);
        Ok(())
    }

    // ── teardown ──────────────────────────────────────────────────────────

    pub(super) fn reset(&mut self) {
        self.units.clear();
        self.vertices.clear();
        self.indices.clear();
        self.layout = VertexLayout::default();
        self.dirty.clear();
        self.ranges.clear();
        self.default_range = (0, 0);

        self.vertex_count = 0;
        self.position_size = 0;
        self.uv_size = 0;
        self.opacity_size = 0;
        self.rgb_size = 0;
        self.index_size = 0;

        self.needs_generation = true;
        self.stale_warned = false;
    }

    /// Frees the GPU buffers and drops the composite with all of its units.
    pub fn release<B: MeshBackend>(mut self, backend: &mut B) {
        backend.release(&mut self.handles);
        log::debug!("composite {}: released", self.id.get());
    }

    /// Logs once per generation that per-frame work was skipped.
    pub(super) fn warn_stale(&mut self, operation: &str) {
        if !self.stale_warned {
            log::warn!(
                "composite {}: {operation} skipped, buffers are stale; call generate_buffer",
                self.id.get()
            );
            self.stale_warned = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::{Call, RecordingBackend};
    use crate::mesh::{Batch, BufferTarget};

    /// Triangle fan over `n` vertices: `n - 2` triangles, vertex `i` at `(i, i, 0)`.
    fn fan(n: usize) -> Unit {
        let positions = (0..n).flat_map(|i| [i as f32, i as f32, 0.0]).collect();
        let uvs = (0..n).flat_map(|i| [i as f32 * 0.125, 0.5]).collect();
        let indices = (1..n - 1).flat_map(|i| [0, i as u16, i as u16 + 1]).collect();
        Unit::from_geometry(positions, uvs, indices).unwrap()
    }

    fn texture() -> TextureHandle {
        TextureHandle::new(7, 64, 64)
    }

    fn composite_with(sizes: &[usize]) -> Composite {
        let mut c = Composite::new(texture());
        for &n in sizes {
            c.add_unit(fan(n)).unwrap();
        }
        c
    }

    /// Asserts `(offset, len)` pairs, taken in order, exactly tile `[0, total)`.
    fn assert_tiles(mut spans: Vec<(usize, usize)>, total: usize) {
        spans.sort();
        let mut cursor = 0;
        for (offset, len) in spans {
            assert_eq!(offset, cursor);
            cursor += len;
        }
        assert_eq!(cursor, total);
    }

    // ── insertion ─────────────────────────────────────────────────────────

    #[test]
    fn insertion_assigns_orders_and_parent() {
        let c = composite_with(&[4, 3, 5]);
        for (i, unit) in c.units().iter().enumerate() {
            assert_eq!(unit.order(), i);
            assert_eq!(unit.parent(), Some(c.id()));
        }
    }

    #[test]
    fn offsets_tile_every_attribute_region() {
        let sizes = [4, 3, 7, 4, 6];
        let c = composite_with(&sizes);

        let vertex_count: usize = c.units().iter().map(Unit::vertex_count).sum();
        assert_eq!(vertex_count, sizes.iter().sum::<usize>());
        assert_eq!(c.vertex_count(), vertex_count);

        let (pos, uv, opacity, rgb) = c.attribute_sizes();
        let units = c.units();
        assert_tiles(
            units.iter().map(|u| (u.position_offset(), u.vertex_count() * 12)).collect(),
            pos * FLOAT_BYTES,
        );
        assert_tiles(
            units.iter().map(|u| (u.uv_offset(), u.uvs().len() * 4)).collect(),
            uv * FLOAT_BYTES,
        );
        assert_tiles(
            units.iter().map(|u| (u.opacity_offset(), u.vertex_count() * 4)).collect(),
            opacity * FLOAT_BYTES,
        );
        assert_tiles(
            units.iter().map(|u| (u.rgb_offset(), u.vertex_count() * 12)).collect(),
            rgb * FLOAT_BYTES,
        );
        assert_tiles(
            units.iter().map(|u| (u.index_data_offset(), u.index_count() * 2)).collect(),
            c.index_count() * INDEX_BYTES,
        );
    }

    #[test]
    fn indices_are_biased_exactly_once() {
        let c = composite_with(&[4, 3, 5]);
        let mut base = 0;
        for unit in c.units() {
            assert_eq!(unit.index_base(), base);
            for &i in unit.indices() {
                let i = i as usize;
                assert!(i >= unit.index_base() && i < unit.index_base() + unit.vertex_count());
            }
            base += unit.vertex_count();
        }
        // first index of every fan is its own vertex 0
        assert_eq!(c.units()[1].indices()[0], 4);
        assert_eq!(c.units()[2].indices()[0], 7);
    }

    #[test]
    fn overflow_is_rejected_and_leaves_composite_unchanged() {
        let mut c = Composite::new(texture());
        let big = 60_000;
        let positions = vec![0.0; big * 3];
        let uvs = vec![0.0; big * 2];
        c.add_unit(Unit::from_geometry(positions, uvs, vec![0, 1, 2]).unwrap())
            .unwrap();

        let err = c.add_unit(fan(6_000)).unwrap_err();
        assert_eq!(
            err,
            MeshError::IndexOverflow {
                base: 60_000,
                vertex_count: 6_000
            }
        );
        assert_eq!(c.len(), 1);
        assert_eq!(c.vertex_count(), 60_000);

        // exactly filling the 16-bit range is fine
        assert!(c.add_unit(fan(5_536)).is_ok());
        assert_eq!(c.units()[1].indices().iter().max(), Some(&u16::MAX));
    }

    #[test]
    fn add_unit_with_data_validates_geometry() {
        let mut c = Composite::new(texture());
        let err = c.add_unit_with_data(vec![0.0; 9], vec![0.0; 6], vec![0, 1, 5]);
        assert!(matches!(err, Err(MeshError::InvalidGeometry(_))));
        assert!(c.is_empty());
    }

    #[test]
    fn quad_units_use_composite_texture_size() {
        let mut c = Composite::new(texture());
        let quad = Quad::new(32.0, 32.0).with_texels(32.0, 0.0, 32.0, 32.0);
        c.add_unit_with_quad(&quad).unwrap();
        assert_eq!(c.units()[0].uvs(), &[0.5, 0.0, 0.5, 0.5, 1.0, 0.5, 1.0, 0.0]);
    }

    #[test]
    fn insertion_after_generation_marks_buffers_stale() {
        let mut backend = RecordingBackend::new();
        let mut c = composite_with(&[4]);
        c.generate_buffer(&mut backend);
        assert!(!c.needs_generation());
        c.add_unit(fan(3)).unwrap();
        assert!(c.needs_generation());
    }

    // ── generation ────────────────────────────────────────────────────────

    #[test]
    fn generation_concatenates_attributes_in_fixed_order() {
        let mut backend = RecordingBackend::new();
        let mut c = composite_with(&[4, 3]);
        c.generate_buffer(&mut backend);

        let mut expected: Vec<f32> = Vec::new();
        for u in c.units() {
            expected.extend_from_slice(u.positions());
        }
        for u in c.units() {
            expected.extend_from_slice(u.uvs());
        }
        expected.extend(std::iter::repeat_n(0.0, 7)); // opacity
        expected.extend(std::iter::repeat_n(0.0, 21)); // rgb
        assert_eq!(c.vertices(), expected.as_slice());

        let indices: Vec<u16> = c.units().iter().flat_map(|u| u.indices().to_vec()).collect();
        assert_eq!(c.indices(), indices.as_slice());

        assert_eq!(c.layout().uv_offset, 7 * 3 * 4);
        assert_eq!(c.default_range(), (0, 1));
    }

    #[test]
    fn generation_uploads_full_buffers_and_caches_vertex_array() {
        let mut backend = RecordingBackend::new();
        let mut c = composite_with(&[4, 4]);
        c.generate_buffer(&mut backend);

        assert_eq!(
            backend.calls,
            vec![
                Call::Upload {
                    vertex_bytes: 8 * 9 * 4,
                    index_bytes: 12 * 2
                },
                Call::BuildVertexArray,
            ]
        );
        assert!(c.handles().has_buffers());
        assert!(c.handles().vertex_array.is_some());
        assert_eq!(backend.vertex_mem, bytemuck::cast_slice::<f32, u8>(c.vertices()));
        assert_eq!(backend.index_mem, bytemuck::cast_slice::<u16, u8>(c.indices()));
    }

    #[test]
    fn generation_without_buffer_objects_stays_on_cpu() {
        let caps = crate::backend::BackendCaps {
            buffer_objects: false,
            vertex_array_cache: false,
            mapped_upload: false,
        };
        let mut backend = RecordingBackend::with_caps(caps);
        let mut c = composite_with(&[4]);
        c.generate_buffer(&mut backend);
        assert!(backend.calls.is_empty());
        assert!(!c.handles().has_buffers());
        assert_eq!(c.vertices().len(), 4 * 9);
    }

    #[test]
    fn generation_drops_pending_regions() {
        let mut backend = RecordingBackend::new();
        let mut c = composite_with(&[4]);
        c.generate_buffer(&mut backend);
        c.draw();
        assert!(!c.dirty().is_empty());
        c.generate_buffer(&mut backend);
        assert!(c.dirty().is_empty());
        assert!(c.units()[0].drawable().check_state(DrawableState::DRAW));
    }

    // ── reordering ────────────────────────────────────────────────────────

    #[test]
    fn reorder_moves_index_data_to_logical_positions() {
        let mut backend = RecordingBackend::new();
        let mut c = composite_with(&[4, 3, 5]);
        c.generate_buffer(&mut backend);

        let before: Vec<Vec<u16>> = c.units().iter().map(|u| u.indices().to_vec()).collect();
        let mut before_sorted = c.indices().to_vec();
        before_sorted.sort();

        c.set_unit_order(0, 2).unwrap();
        c.set_unit_order(1, 0).unwrap();
        c.set_unit_order(2, 1).unwrap();
        c.reorder().unwrap();

        for (i, unit) in c.units().iter().enumerate() {
            assert_eq!(unit.order(), i);
        }
        let expected: Vec<u16> = [&before[1], &before[2], &before[0]]
            .into_iter()
            .flatten()
            .copied()
            .collect();
        assert_eq!(c.indices(), expected.as_slice());

        let mut after_sorted = c.indices().to_vec();
        after_sorted.sort();
        assert_eq!(after_sorted, before_sorted);

        // contiguous in buffer order
        let mut cursor = 0;
        for unit in c.units() {
            assert_eq!(unit.index_offset(), cursor);
            assert_eq!(unit.index_data_offset(), cursor * INDEX_BYTES);
            cursor += unit.index_count();
        }

        assert_eq!(c.dirty().len(), 1);
        let region = c.dirty().as_slice()[0];
        assert_eq!(region.target, BufferTarget::Index);
        assert_eq!(region.byte_range(), 0..c.index_count() * INDEX_BYTES);
    }

    #[test]
    fn reorder_keeps_vertex_data_in_place() {
        let mut backend = RecordingBackend::new();
        let mut c = composite_with(&[4, 3]);
        c.generate_buffer(&mut backend);
        let vertices = c.vertices().to_vec();
        let position_offsets: Vec<usize> = c.units().iter().map(Unit::position_offset).collect();

        c.set_unit_order(0, 1).unwrap();
        c.set_unit_order(1, 0).unwrap();
        c.reorder().unwrap();

        assert_eq!(c.vertices(), vertices.as_slice());
        assert_eq!(c.units()[0].position_offset(), position_offsets[1]);
        assert_eq!(c.units()[1].position_offset(), position_offsets[0]);
    }

    #[test]
    fn reorder_rejects_duplicate_orders() {
        let mut c = composite_with(&[4, 3, 5]);
        c.set_unit_order(2, 0).unwrap();
        assert_eq!(
            c.reorder(),
            Err(MeshError::InvalidOrder {
                slot: 2,
                order: 0,
                unit_count: 3
            })
        );
        assert_eq!(c.units()[0].vertex_count(), 4);
        assert_eq!(c.units()[2].vertex_count(), 5);
    }

    #[test]
    fn reorder_before_generation_only_relinks_offsets() {
        let mut backend = RecordingBackend::new();
        let mut c = composite_with(&[4, 3]);
        c.set_unit_order(0, 1).unwrap();
        c.set_unit_order(1, 0).unwrap();
        c.reorder().unwrap();
        assert!(c.dirty().is_empty());

        c.generate_buffer(&mut backend);
        let expected: Vec<u16> = c.units().iter().flat_map(|u| u.indices().to_vec()).collect();
        assert_eq!(c.indices(), expected.as_slice());
        assert_eq!(c.indices()[0], 4);
    }

    #[test]
    fn set_unit_order_checks_slot() {
        let mut c = composite_with(&[4]);
        assert_eq!(
            c.set_unit_order(3, 0),
            Err(MeshError::UnitOutOfRange {
                index: 3,
                unit_count: 1
            })
        );
    }

    // ── clear / release ───────────────────────────────────────────────────

    #[test]
    fn cleared_composite_matches_a_fresh_one() {
        let mut backend = RecordingBackend::new();
        let mut reused = composite_with(&[4, 7, 3]);
        reused.generate_buffer(&mut backend);
        reused.draw();
        reused.push_draw_range(0, 1).unwrap();
        reused.clear();

        assert!(reused.is_empty());
        assert_eq!(reused.vertex_count(), 0);
        assert_eq!(reused.index_count(), 0);
        assert_eq!(reused.attribute_sizes(), (0, 0, 0, 0));
        assert!(reused.dirty().is_empty());
        assert!(reused.handles().has_buffers());

        let fresh = composite_with(&[5, 3]);
        for n in [5, 3] {
            reused.add_unit(fan(n)).unwrap();
        }
        for (a, b) in reused.units().iter().zip(fresh.units()) {
            assert_eq!(a.order(), b.order());
            assert_eq!(a.indices(), b.indices());
            assert_eq!(a.position_offset(), b.position_offset());
            assert_eq!(a.uv_offset(), b.uv_offset());
            assert_eq!(a.opacity_offset(), b.opacity_offset());
            assert_eq!(a.rgb_offset(), b.rgb_offset());
            assert_eq!(a.index_data_offset(), b.index_data_offset());
        }
        assert_eq!(reused.attribute_sizes(), fresh.attribute_sizes());
    }

    #[test]
    fn release_frees_gpu_objects() {
        let mut backend = RecordingBackend::new();
        let mut c = composite_with(&[4]);
        c.generate_buffer(&mut backend);
        c.release(&mut backend);
        assert_eq!(backend.calls.last(), Some(&Call::Release));
        assert!(backend.vertex_mem.is_empty());
    }

    #[test]
    fn composite_ids_are_unique() {
        let a = Composite::new(texture());
        let b = Composite::new(texture());
        assert_ne!(a.id(), b.id());
    }
}
