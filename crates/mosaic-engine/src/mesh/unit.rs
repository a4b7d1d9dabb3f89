use std::ops::Range;

use glam::Vec2;

use crate::backend::TextureHandle;
use crate::drawable::Drawable;

use super::composite::CompositeId;
use super::layout::{FLOAT_BYTES, INDEX_BYTES, OPACITY_SIZE, POSITION_SIZE, RGB_SIZE, UV_SIZE, VertexLayout};
use super::MeshError;

/// Axis-aligned textured rectangle template.
///
/// Y points up. Corners are emitted top-left, bottom-left, bottom-right,
/// top-right, and `texels` is `(x, y, width, height)` in texture pixels with
/// the origin at the texture's top-left.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quad {
    pub width: f32,
    pub height: f32,
    pub center: Vec2,
    pub texels: [f32; 4],
}

impl Quad {
    pub const INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

    /// Quad covering a `width` × `height` texel area from the texture origin,
    /// centered on the local origin.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            center: Vec2::ZERO,
            texels: [0.0, 0.0, width, height],
        }
    }

    pub fn with_center(mut self, center: Vec2) -> Self {
        self.center = center;
        self
    }

    pub fn with_texels(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.texels = [x, y, width, height];
        self
    }

    pub fn positions(&self) -> [f32; 12] {
        let hw = self.width * 0.5;
        let hh = self.height * 0.5;
        let (l, r) = (self.center.x - hw, self.center.x + hw);
        let (b, t) = (self.center.y - hh, self.center.y + hh);
        [
            l, t, 0.0, //
            l, b, 0.0, //
            r, b, 0.0, //
            r, t, 0.0, //
        ]
    }

    pub fn uvs(&self, texture_width: f32, texture_height: f32) -> [f32; 8] {
        let tw = texture_width.max(1.0);
        let th = texture_height.max(1.0);
        let [x, y, w, h] = self.texels;
        let (u0, u1) = (x / tw, (x + w) / tw);
        let (v0, v1) = (y / th, (y + h) / th);
        [
            u0, v0, //
            u0, v1, //
            u1, v1, //
            u1, v0, //
        ]
    }
}

/// One sub-mesh packed into a composite.
///
/// Born positions and UVs are local-space and never change after creation.
/// Indices are local until insertion, when they are biased once by the
/// composite's vertex count so they address the shared vertex buffer.
///
/// Vertex attribute offsets are byte offsets relative to the start of their
/// attribute region; the composite's [`VertexLayout`] turns them into absolute
/// positions. Position offsets are absolute as well since that region starts
/// at byte 0.
#[derive(Debug, Clone)]
pub struct Unit {
    drawable: Drawable,

    positions: Vec<f32>,
    uvs: Vec<f32>,
    indices: Vec<u16>,
    vertex_count: usize,

    pub(super) order: usize,
    pub(super) parent: Option<CompositeId>,

    pub(super) position_offset: usize,
    pub(super) uv_offset: usize,
    pub(super) opacity_offset: usize,
    pub(super) rgb_offset: usize,
    pub(super) index_data_offset: usize,
    pub(super) index_offset: usize,
    pub(super) index_base: usize,
}

impl Unit {
    /// Creates a unit from raw local geometry.
    ///
    /// Positions are `xyz` triples, UVs `uv` pairs (one per vertex) and indices
    /// describe a triangle list over the unit's own vertices.
    pub fn from_geometry(positions: Vec<f32>, uvs: Vec<f32>, indices: Vec<u16>) -> Result<Self, MeshError> {
        if positions.len() % POSITION_SIZE != 0 {
            return Err(MeshError::InvalidGeometry(format!(
                "position length {} is not a multiple of {POSITION_SIZE}",
                positions.len()
            )));
        }

        let vertex_count = positions.len() / POSITION_SIZE;

        if uvs.len() != vertex_count * UV_SIZE {
            return Err(MeshError::InvalidGeometry(format!(
                "{} uv floats for {vertex_count} vertices",
                uvs.len()
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::InvalidGeometry(format!(
                "index count {} is not a whole number of triangles",
                indices.len()
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::InvalidGeometry(format!(
                "index {bad} out of range for {vertex_count} vertices"
            )));
        }

        Ok(Self {
            drawable: Drawable::new(),
            positions,
            uvs,
            indices,
            vertex_count,
            order: 0,
            parent: None,
            position_offset: 0,
            uv_offset: 0,
            opacity_offset: 0,
            rgb_offset: 0,
            index_data_offset: 0,
            index_offset: 0,
            index_base: 0,
        })
    }

    /// Creates a textured quad unit.
    pub fn from_quad(quad: &Quad, texture: TextureHandle) -> Self {
        Self {
            drawable: Drawable::new(),
            positions: quad.positions().to_vec(),
            uvs: quad.uvs(texture.width as f32, texture.height as f32).to_vec(),
            indices: Quad::INDICES.to_vec(),
            vertex_count: 4,
            order: 0,
            parent: None,
            position_offset: 0,
            uv_offset: 0,
            opacity_offset: 0,
            rgb_offset: 0,
            index_data_offset: 0,
            index_offset: 0,
            index_base: 0,
        }
    }

    // ── drawable ──────────────────────────────────────────────────────────

    #[inline]
    pub fn drawable(&self) -> &Drawable {
        &self.drawable
    }

    #[inline]
    pub fn drawable_mut(&mut self) -> &mut Drawable {
        &mut self.drawable
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    #[inline]
    pub fn uvs(&self) -> &[f32] {
        &self.uvs
    }

    /// Index data; biased by [`Unit::index_base`] once inserted.
    #[inline]
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    // ── placement ─────────────────────────────────────────────────────────

    /// Logical draw position inside the owning composite.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Owning composite, if inserted.
    #[inline]
    pub fn parent(&self) -> Option<CompositeId> {
        self.parent
    }

    #[inline]
    pub fn position_offset(&self) -> usize {
        self.position_offset
    }

    #[inline]
    pub fn uv_offset(&self) -> usize {
        self.uv_offset
    }

    #[inline]
    pub fn opacity_offset(&self) -> usize {
        self.opacity_offset
    }

    #[inline]
    pub fn rgb_offset(&self) -> usize {
        self.rgb_offset
    }

    /// Byte offset of this unit's indices in the combined index buffer.
    #[inline]
    pub fn index_data_offset(&self) -> usize {
        self.index_data_offset
    }

    /// Element offset of this unit's indices in the combined index buffer.
    #[inline]
    pub fn index_offset(&self) -> usize {
        self.index_offset
    }

    /// Vertex count preceding this unit at insertion; added to every index.
    #[inline]
    pub fn index_base(&self) -> usize {
        self.index_base
    }

    // ── float ranges in the combined buffers ──────────────────────────────

    pub(super) fn position_floats(&self) -> Range<usize> {
        let start = self.position_offset / FLOAT_BYTES;
        start..start + self.positions.len()
    }

    pub(super) fn uv_floats(&self, layout: &VertexLayout) -> Range<usize> {
        let start = (layout.uv_offset + self.uv_offset) / FLOAT_BYTES;
        start..start + self.uvs.len()
    }

    pub(super) fn opacity_floats(&self, layout: &VertexLayout) -> Range<usize> {
        let start = (layout.opacity_offset + self.opacity_offset) / FLOAT_BYTES;
        start..start + self.vertex_count * OPACITY_SIZE
    }

    pub(super) fn rgb_floats(&self, layout: &VertexLayout) -> Range<usize> {
        let start = (layout.rgb_offset + self.rgb_offset) / FLOAT_BYTES;
        start..start + self.vertex_count * RGB_SIZE
    }

    pub(super) fn index_elements(&self) -> Range<usize> {
        let start = self.index_data_offset / INDEX_BYTES;
        start..start + self.indices.len()
    }

    /// Adds `base` to every index. Caller guarantees the result fits in u16.
    pub(super) fn bias_indices(&mut self, base: usize) {
        let base = base as u32;
        for index in &mut self.indices {
            *index = (*index as u32 + base) as u16;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (Vec<f32>, Vec<f32>, Vec<u16>) {
        (
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn from_geometry_derives_vertex_count() {
        let (p, uv, i) = triangle();
        let unit = Unit::from_geometry(p, uv, i).unwrap();
        assert_eq!(unit.vertex_count(), 3);
        assert_eq!(unit.index_count(), 3);
        assert_eq!(unit.parent(), None);
    }

    #[test]
    fn from_geometry_rejects_partial_vertex() {
        let (mut p, uv, i) = triangle();
        p.pop();
        assert!(matches!(
            Unit::from_geometry(p, uv, i),
            Err(MeshError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn from_geometry_rejects_uv_mismatch() {
        let (p, mut uv, i) = triangle();
        uv.truncate(4);
        assert!(Unit::from_geometry(p, uv, i).is_err());
    }

    #[test]
    fn from_geometry_rejects_out_of_range_index() {
        let (p, uv, _) = triangle();
        assert!(Unit::from_geometry(p, uv, vec![0, 1, 3]).is_err());
    }

    #[test]
    fn from_geometry_rejects_partial_triangle() {
        let (p, uv, _) = triangle();
        assert!(Unit::from_geometry(p, uv, vec![0, 1]).is_err());
    }

    // ── quad ──────────────────────────────────────────────────────────────

    #[test]
    fn quad_positions_are_centered() {
        let q = Quad::new(4.0, 2.0);
        assert_eq!(
            q.positions(),
            [-2.0, 1.0, 0.0, -2.0, -1.0, 0.0, 2.0, -1.0, 0.0, 2.0, 1.0, 0.0]
        );
    }

    #[test]
    fn quad_uvs_map_texels_to_unit_range() {
        let q = Quad::new(32.0, 16.0).with_texels(32.0, 16.0, 32.0, 16.0);
        assert_eq!(
            q.uvs(64.0, 32.0),
            [0.5, 0.5, 0.5, 1.0, 1.0, 1.0, 1.0, 0.5]
        );
    }

    #[test]
    fn quad_unit_has_four_vertices_two_triangles() {
        let unit = Unit::from_quad(&Quad::new(8.0, 8.0), TextureHandle::new(0, 8, 8));
        assert_eq!(unit.vertex_count(), 4);
        assert_eq!(unit.indices(), &Quad::INDICES);
        assert_eq!(unit.uvs().len(), 8);
    }
}
