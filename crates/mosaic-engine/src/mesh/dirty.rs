use std::ops::Range;

use super::layout::{FLOAT_BYTES, INDEX_BYTES};

/// GPU buffer a region belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Vertex,
    Index,
}

/// Byte range of a combined CPU buffer that must reach the GPU.
///
/// The source bytes are not captured here; they are read from the composite's
/// CPU buffer at flush time, so a region always uploads the latest contents.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DirtyRegion {
    pub target: BufferTarget,
    pub offset: usize, // bytes
    pub length: usize, // bytes
}

impl DirtyRegion {
    /// Region covering `floats` (float indices) of the vertex buffer.
    #[inline]
    pub fn vertex(floats: Range<usize>) -> Self {
        Self {
            target: BufferTarget::Vertex,
            offset: floats.start * FLOAT_BYTES,
            length: floats.len() * FLOAT_BYTES,
        }
    }

    /// Region covering `elements` (u16 indices) of the index buffer.
    #[inline]
    pub fn index(elements: Range<usize>) -> Self {
        Self {
            target: BufferTarget::Index,
            offset: elements.start * INDEX_BYTES,
            length: elements.len() * INDEX_BYTES,
        }
    }

    #[inline]
    pub fn byte_range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// Unbounded queue of pending regions, drained once per render.
#[derive(Debug, Default)]
pub struct DirtyQueue {
    regions: Vec<DirtyRegion>,
}

impl DirtyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            regions: Vec::with_capacity(capacity),
        }
    }

    /// Enqueues `region`. Empty regions are dropped.
    #[inline]
    pub fn push(&mut self, region: DirtyRegion) {
        if region.length > 0 {
            self.regions.push(region);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[DirtyRegion] {
        &self.regions
    }

    pub fn iter(&self) -> impl Iterator<Item = &DirtyRegion> {
        self.regions.iter()
    }

    /// Total bytes pending upload.
    pub fn pending_bytes(&self) -> usize {
        self.regions.iter().map(|r| r.length).sum()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.regions.clear();
    }
}
