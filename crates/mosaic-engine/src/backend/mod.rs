//! GPU backend contract for composite meshes.
//!
//! A composite never talks to a graphics API directly. It describes what it
//! needs (full uploads, partial region writes, one indexed draw) and a
//! [`MeshBackend`] carries it out. Backends advertise what they can do through
//! [`BackendCaps`]; capabilities choose the draw path but never change the
//! geometry that ends up on screen.

use glam::Mat4;

use crate::mesh::{DirtyRegion, VertexLayout};

#[cfg(test)]
pub(crate) mod recording;
pub mod wgpu_backend;

pub use wgpu_backend::{WgpuBackend, WgpuBackendConfig};

/// Backend buffer object id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Backend cached vertex-array state id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexArrayId(pub u32);

/// Opaque texture handle plus its size in texels.
///
/// Texture creation and loading belong to the backend or the caller; the
/// composite only forwards the handle to the draw call and uses the size to
/// map quad texels to UVs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureHandle {
    pub id: u32,
    pub width: u32,
    pub height: u32,
}

impl TextureHandle {
    #[inline]
    pub const fn new(id: u32, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }
}

/// GPU objects owned by one composite. `None` means not generated yet.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GpuHandles {
    pub vertex: Option<BufferId>,
    pub index: Option<BufferId>,
    pub vertex_array: Option<VertexArrayId>,
}

impl GpuHandles {
    #[inline]
    pub fn has_buffers(&self) -> bool {
        self.vertex.is_some() && self.index.is_some()
    }
}

/// What the backend supports.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BackendCaps {
    /// GPU-resident vertex/index buffers. Without them every draw streams the
    /// CPU arrays.
    pub buffer_objects: bool,
    /// Vertex binding state can be recorded once and replayed.
    pub vertex_array_cache: bool,
    /// Partial writes go through a mapped staging range instead of a
    /// sub-range upload call.
    pub mapped_upload: bool,
}

impl Default for BackendCaps {
    fn default() -> Self {
        Self {
            buffer_objects: true,
            vertex_array_cache: true,
            mapped_upload: false,
        }
    }
}

/// How a dirty region reaches GPU memory.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UploadMode {
    /// Map the target range, copy, unmap.
    Mapped,
    /// Sub-range upload call.
    SubData,
}

/// Draw path chosen for one render.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawStrategy {
    /// Replay cached vertex-array state; no attribute rebinding.
    VertexArray,
    /// Bind vertex/index buffer objects and set attribute pointers.
    BufferObjects,
    /// Point attributes straight at the CPU arrays.
    ClientArrays,
}

/// One indexed triangle-list draw over a composite's buffers.
#[derive(Debug, Clone)]
pub struct DrawCall<'a> {
    pub strategy: DrawStrategy,
    pub handles: &'a GpuHandles,
    pub layout: VertexLayout,
    /// CPU vertex buffer bytes (read by `ClientArrays`).
    pub vertex_data: &'a [u8],
    /// CPU index buffer bytes (read by `ClientArrays`).
    pub index_data: &'a [u8],
    pub texture: Option<TextureHandle>,
    pub mvp: Mat4,
    pub index_count: u32,
    /// Byte offset of the first index.
    pub index_byte_offset: u64,
}

impl DrawCall<'_> {
    /// First index as an element position.
    #[inline]
    pub fn first_index(&self) -> u32 {
        (self.index_byte_offset / crate::mesh::INDEX_BYTES as u64) as u32
    }
}

/// Graphics backend executing composite requests.
///
/// Calls arrive on the thread that owns the rendering context, in frame order.
pub trait MeshBackend {
    /// Per-frame destination of draw calls (a render pass, a command list...).
    type Target<'a>;

    fn caps(&self) -> BackendCaps;

    /// Creates the vertex and index buffers on first use (or re-creates them in
    /// place) and uploads their full contents.
    fn upload_buffers(&mut self, handles: &mut GpuHandles, vertex: &[u8], index: &[u8]);

    /// Records vertex binding state for `handles` so later draws skip it.
    fn build_vertex_array(&mut self, handles: &mut GpuHandles, layout: &VertexLayout);

    /// Writes `bytes` into the region of an existing buffer.
    fn write_region(&mut self, handles: &GpuHandles, region: &DirtyRegion, bytes: &[u8], mode: UploadMode);

    /// Binds according to `call.strategy` and issues exactly one indexed draw.
    fn draw(&mut self, target: &mut Self::Target<'_>, call: &DrawCall<'_>);

    /// Frees every GPU object in `handles` and resets them to `None`.
    fn release(&mut self, handles: &mut GpuHandles);
}
