//! In-memory backend recording every request, for tests.

use super::{
    BackendCaps, BufferId, DrawCall, DrawStrategy, GpuHandles, MeshBackend, TextureHandle, UploadMode,
    VertexArrayId,
};
use crate::mesh::{BufferTarget, DirtyRegion, VertexLayout};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Upload { vertex_bytes: usize, index_bytes: usize },
    BuildVertexArray,
    WriteRegion { region: DirtyRegion, mode: UploadMode },
    Draw {
        strategy: DrawStrategy,
        index_count: u32,
        first_index: u32,
        byte_offset: u64,
        texture: Option<TextureHandle>,
    },
    Release,
}

/// Mirrors GPU buffer contents so tests can compare them with the CPU copies.
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub caps: BackendCaps,
    pub calls: Vec<Call>,
    pub vertex_mem: Vec<u8>,
    pub index_mem: Vec<u8>,
    next_id: u32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_caps(caps: BackendCaps) -> Self {
        Self {
            caps,
            ..Self::default()
        }
    }

    pub fn writes(&self) -> Vec<DirtyRegion> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::WriteRegion { region, .. } => Some(*region),
                _ => None,
            })
            .collect()
    }

    pub fn draws(&self) -> Vec<&Call> {
        self.calls.iter().filter(|c| matches!(c, Call::Draw { .. })).collect()
    }

    pub fn last_draw(&self) -> Option<&Call> {
        self.calls.iter().rev().find(|c| matches!(c, Call::Draw { .. }))
    }

    fn id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl MeshBackend for RecordingBackend {
    type Target<'a> = ();

    fn caps(&self) -> BackendCaps {
        self.caps
    }

    fn upload_buffers(&mut self, handles: &mut GpuHandles, vertex: &[u8], index: &[u8]) {
        if handles.vertex.is_none() {
            handles.vertex = Some(BufferId(self.id()));
        }
        if handles.index.is_none() {
            handles.index = Some(BufferId(self.id()));
        }
        self.vertex_mem = vertex.to_vec();
        self.index_mem = index.to_vec();
        self.calls.push(Call::Upload {
            vertex_bytes: vertex.len(),
            index_bytes: index.len(),
        });
    }

    fn build_vertex_array(&mut self, handles: &mut GpuHandles, _layout: &VertexLayout) {
        handles.vertex_array = Some(VertexArrayId(self.id()));
        self.calls.push(Call::BuildVertexArray);
    }

    fn write_region(&mut self, _handles: &GpuHandles, region: &DirtyRegion, bytes: &[u8], mode: UploadMode) {
        let mem = match region.target {
            BufferTarget::Vertex => &mut self.vertex_mem,
            BufferTarget::Index => &mut self.index_mem,
        };
        mem[region.byte_range()].copy_from_slice(bytes);
        self.calls.push(Call::WriteRegion { region: *region, mode });
    }

    fn draw(&mut self, _target: &mut (), call: &DrawCall<'_>) {
        self.calls.push(Call::Draw {
            strategy: call.strategy,
            index_count: call.index_count,
            first_index: call.first_index(),
            byte_offset: call.index_byte_offset,
            texture: call.texture,
        });
    }

    fn release(&mut self, handles: &mut GpuHandles) {
        *handles = GpuHandles::default();
        self.vertex_mem.clear();
        self.index_mem.clear();
        self.calls.push(Call::Release);
    }
}
