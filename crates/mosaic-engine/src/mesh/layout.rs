//! Attribute sizes and the combined vertex buffer layout.
//!
//! The combined vertex buffer is not interleaved. Each attribute owns one
//! contiguous region, in this fixed order:
//!
//! ```text
//! [positions xyz][uvs uv][opacities a][rgbs rgb]
//! ```
//!
//! Every unit occupies a disjoint sub-range of each region.

/// Floats per vertex position.
pub const POSITION_SIZE: usize = 3;
/// Floats per vertex texture coordinate.
pub const UV_SIZE: usize = 2;
/// Floats per vertex opacity.
pub const OPACITY_SIZE: usize = 1;
/// Floats per vertex color.
pub const RGB_SIZE: usize = 3;

pub const FLOAT_BYTES: usize = std::mem::size_of::<f32>();
pub const INDEX_BYTES: usize = std::mem::size_of::<u16>();

/// Byte offsets of each attribute region inside the combined vertex buffer.
///
/// Positions always start at byte 0.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct VertexLayout {
    pub uv_offset: usize,
    pub opacity_offset: usize,
    pub rgb_offset: usize,
    pub vertex_bytes: usize,
}

impl VertexLayout {
    /// Builds the layout from aggregate float counts per attribute.
    pub fn new(position_floats: usize, uv_floats: usize, opacity_floats: usize, rgb_floats: usize) -> Self {
        let uv_offset = position_floats * FLOAT_BYTES;
        let opacity_offset = uv_offset + uv_floats * FLOAT_BYTES;
        let rgb_offset = opacity_offset + opacity_floats * FLOAT_BYTES;
        Self {
            uv_offset,
            opacity_offset,
            rgb_offset,
            vertex_bytes: rgb_offset + rgb_floats * FLOAT_BYTES,
        }
    }

    #[inline]
    pub fn total_floats(&self) -> usize {
        self.vertex_bytes / FLOAT_BYTES
    }

    #[inline]
    pub fn position_bytes(&self) -> usize {
        self.uv_offset
    }

    #[inline]
    pub fn uv_bytes(&self) -> usize {
        self.opacity_offset - self.uv_offset
    }

    #[inline]
    pub fn opacity_bytes(&self) -> usize {
        self.rgb_offset - self.opacity_offset
    }

    #[inline]
    pub fn rgb_bytes(&self) -> usize {
        self.vertex_bytes - self.rgb_offset
    }
}
