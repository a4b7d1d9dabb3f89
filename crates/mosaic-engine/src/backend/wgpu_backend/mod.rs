//! wgpu implementation of [`MeshBackend`].
//!
//! Strategy mapping:
//! - buffer objects: one vertex and one index buffer per composite, the four
//!   attribute regions bound as four slices of the vertex buffer;
//! - vertex-array cache: render bundles recorded per draw range and texture,
//!   a few per composite, dropped whenever the composite regenerates;
//! - client arrays: transient buffers built from the CPU copies on every draw.
//!
//! Mapped uploads go through `Queue::write_buffer_with` (a staging view
//! written in place), the other mode through `Queue::write_buffer`.

use std::borrow::Cow;
use std::collections::HashMap;
use std::ops::Range;

use anyhow::Result;
use wgpu::util::DeviceExt;

mod bundle;
mod pipeline;
mod texture;

pub use texture::checkerboard;

use bundle::{BUNDLE_CACHE_LIMIT, BundleCache, BundleKey};
use pipeline::{MeshPipeline, TransformUniform, slot_ranges};
use texture::TextureEntry;

use super::{
    BackendCaps, BufferId, DrawCall, DrawStrategy, GpuHandles, MeshBackend, TextureHandle, UploadMode,
    VertexArrayId,
};
use crate::mesh::{BufferTarget, DirtyRegion, VertexLayout};

const ALIGN: usize = wgpu::COPY_BUFFER_ALIGNMENT as usize;

/// Backend configuration.
///
/// The capability switches can only take features away; they exist to force
/// the slower draw paths for comparison and testing.
#[derive(Debug, Clone)]
pub struct WgpuBackendConfig {
    /// Color format of the render passes composites are drawn into.
    pub target_format: wgpu::TextureFormat,

    /// Keep composite geometry in GPU buffers.
    pub buffer_objects: bool,

    /// Record render bundles per draw range (requires `buffer_objects`).
    pub vertex_array_cache: bool,

    /// Upload dirty regions through mapped staging views instead of
    /// `write_buffer` (requires `buffer_objects`).
    pub mapped_upload: bool,

    /// Prefix for GPU object labels.
    pub label: String,
}

impl Default for WgpuBackendConfig {
    fn default() -> Self {
        Self {
            target_format: wgpu::TextureFormat::Rgba8UnormSrgb,
            buffer_objects: true,
            vertex_array_cache: true,
            mapped_upload: false,
            label: "mosaic".to_owned(),
        }
    }
}

impl WgpuBackendConfig {
    pub fn caps(&self) -> BackendCaps {
        BackendCaps {
            buffer_objects: self.buffer_objects,
            vertex_array_cache: self.buffer_objects && self.vertex_array_cache,
            mapped_upload: self.buffer_objects && self.mapped_upload,
        }
    }
}

/// Cached binding state of one composite.
struct VertexArrayState {
    vertex: BufferId,
    index: BufferId,
    layout: VertexLayout,
    bundles: BundleCache<wgpu::RenderBundle>,
}

struct TransformSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Composite backend drawing into a `wgpu::RenderPass`.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: WgpuBackendConfig,

    pipeline: MeshPipeline,
    sampler: wgpu::Sampler,
    white: TextureEntry,
    textures: HashMap<u32, TextureEntry>,

    buffers: HashMap<BufferId, wgpu::Buffer>,
    // index buffers are u16 but writes must be 4-byte aligned
    index_shadows: HashMap<BufferId, Vec<u8>>,
    vertex_arrays: HashMap<VertexArrayId, VertexArrayState>,
    // keyed by the composite's vertex buffer
    transforms: HashMap<BufferId, TransformSlot>,

    next_id: u32,
    warned_unknown_texture: bool,
}

impl WgpuBackend {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, config: WgpuBackendConfig) -> Result<Self> {
        let pipeline = MeshPipeline::new(device, config.target_format, &config.label);
        let sampler = texture::create_sampler(device, &format!("{} sampler", config.label));
        let white = texture::create_texture(
            device,
            queue,
            &pipeline.texture_layout,
            &sampler,
            &[255; 4],
            (1, 1),
            &format!("{} white texture", config.label),
        )?;

        log::debug!("{}: mesh backend ready, caps {:?}", config.label, config.caps());

        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            config,
            pipeline,
            sampler,
            white,
            textures: HashMap::new(),
            buffers: HashMap::new(),
            index_shadows: HashMap::new(),
            vertex_arrays: HashMap::new(),
            transforms: HashMap::new(),
            next_id: 0,
            warned_unknown_texture: false,
        })
    }

    #[inline]
    pub fn config(&self) -> &WgpuBackendConfig {
        &self.config
    }

    /// Uploads tightly packed RGBA8 pixels and returns a handle composites can
    /// bind.
    pub fn create_texture(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<TextureHandle> {
        let id = self.next_id();
        let entry = texture::create_texture(
            &self.device,
            &self.queue,
            &self.pipeline.texture_layout,
            &self.sampler,
            pixels,
            (width, height),
            &format!("{} texture {id}", self.config.label),
        )?;
        self.textures.insert(id, entry);
        Ok(TextureHandle::new(id, width, height))
    }

    /// Number of render bundles currently cached across all composites.
    pub fn cached_bundles(&self) -> usize {
        self.vertex_arrays.values().map(|s| s.bundles.len()).sum()
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Writes `bytes` to `id`, growing the buffer when it is too small.
    fn store(&mut self, id: Option<BufferId>, bytes: &[u8], usage: wgpu::BufferUsages, kind: &str) -> BufferId {
        let data = padded(bytes);

        if let Some(id) = id {
            if let Some(buffer) = self.buffers.get(&id) {
                if buffer.size() >= data.len() as u64 {
                    self.queue.write_buffer(buffer, 0, &data);
                    return id;
                }
            }
        }

        let id = match id {
            Some(id) => id,
            None => BufferId(self.next_id()),
        };
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} {kind} buffer {}", self.config.label, id.0)),
            contents: &data,
            usage: usage | wgpu::BufferUsages::COPY_DST,
        });
        self.buffers.insert(id, buffer);
        id
    }

    fn write_transform(&mut self, vertex: BufferId, mvp: glam::Mat4) {
        if !self.transforms.contains_key(&vertex) {
            let label = format!("{} transform {}", self.config.label, vertex.0);
            let (buffer, bind_group) = self.pipeline.transform_binding(&self.device, &label);
            self.transforms.insert(vertex, TransformSlot { buffer, bind_group });
        }
        if let Some(slot) = self.transforms.get(&vertex) {
            self.queue
                .write_buffer(&slot.buffer, 0, bytemuck::bytes_of(&TransformUniform::new(mvp)));
        }
    }

    fn texture_bind_group(&self, texture: Option<TextureHandle>) -> &wgpu::BindGroup {
        texture
            .and_then(|t| self.textures.get(&t.id))
            .map_or(&self.white.bind_group, |entry| &entry.bind_group)
    }

    fn check_texture(&mut self, texture: Option<TextureHandle>) {
        if let Some(t) = texture {
            if !self.textures.contains_key(&t.id) && !self.warned_unknown_texture {
                log::warn!("{}: unknown texture id {}, drawing untextured", self.config.label, t.id);
                self.warned_unknown_texture = true;
            }
        }
    }

    // ── draw paths ────────────────────────────────────────────────────────

    /// Replays (recording on first use) the bundle for this draw. Returns
    /// `false` when no cached state exists for `call`.
    fn execute_bundle(&mut self, pass: &mut wgpu::RenderPass<'_>, call: &DrawCall<'_>, indices: Range<u32>) -> bool {
        let Some(vao) = call.handles.vertex_array else { return false };
        let Some(vertex) = self.vertex_arrays.get(&vao).map(|s| s.vertex) else { return false };

        self.write_transform(vertex, call.mvp);

        let key = BundleKey {
            first_index: indices.start,
            index_count: call.index_count,
            texture: call.texture.map(|t| t.id),
        };

        let cached = self
            .vertex_arrays
            .get_mut(&vao)
            .is_some_and(|s| s.bundles.touch(&key));
        if !cached {
            let Some(bundle) = self.record_bundle(vao, call.texture, indices) else { return false };
            if let Some(state) = self.vertex_arrays.get_mut(&vao) {
                state.bundles.insert(key, bundle);
            }
        }

        match self.vertex_arrays.get(&vao).and_then(|s| s.bundles.get(&key)) {
            Some(bundle) => {
                pass.execute_bundles(std::iter::once(bundle));
                true
            }
            None => false,
        }
    }

    fn record_bundle(
        &self,
        vao: VertexArrayId,
        texture: Option<TextureHandle>,
        indices: Range<u32>,
    ) -> Option<wgpu::RenderBundle> {
        let state = self.vertex_arrays.get(&vao)?;
        let vertex = self.buffers.get(&state.vertex)?;
        let index = self.buffers.get(&state.index)?;
        let transform = self.transforms.get(&state.vertex)?;

        let label = format!("{} bundle {}", self.config.label, vao.0);
        let mut encoder = self.device.create_render_bundle_encoder(&wgpu::RenderBundleEncoderDescriptor {
            label: Some(&label),
            color_formats: &[Some(self.pipeline.format)],
            sample_count: 1,
            ..Default::default()
        });

        encoder.set_pipeline(&self.pipeline.pipeline);
        encoder.set_bind_group(0, &transform.bind_group, &[]);
        encoder.set_bind_group(1, self.texture_bind_group(texture), &[]);
        for (slot, range) in slot_ranges(&state.layout).into_iter().enumerate() {
            encoder.set_vertex_buffer(slot as u32, vertex.slice(range));
        }
        encoder.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint16);
        encoder.draw_indexed(indices, 0, 0..1);

        Some(encoder.finish(&wgpu::RenderBundleDescriptor { label: Some(&label) }))
    }

    /// Binds the composite's GPU buffers. Returns `false` if they are missing.
    fn bind_buffers(&mut self, pass: &mut wgpu::RenderPass<'_>, call: &DrawCall<'_>) -> bool {
        let (Some(vertex_id), Some(index_id)) = (call.handles.vertex, call.handles.index) else {
            return false;
        };
        self.write_transform(vertex_id, call.mvp);

        let (Some(vertex), Some(index), Some(transform)) = (
            self.buffers.get(&vertex_id),
            self.buffers.get(&index_id),
            self.transforms.get(&vertex_id),
        ) else {
            return false;
        };

        pass.set_pipeline(&self.pipeline.pipeline);
        pass.set_bind_group(0, &transform.bind_group, &[]);
        pass.set_bind_group(1, self.texture_bind_group(call.texture), &[]);
        for (slot, range) in slot_ranges(&call.layout).into_iter().enumerate() {
            pass.set_vertex_buffer(slot as u32, vertex.slice(range));
        }
        pass.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint16);
        true
    }

    /// Streams the CPU copies through transient buffers.
    fn bind_client_arrays(&self, pass: &mut wgpu::RenderPass<'_>, call: &DrawCall<'_>) -> bool {
        if call.vertex_data.is_empty() || call.index_data.is_empty() {
            return false;
        }

        let label = &self.config.label;
        let vertex = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} client vertices")),
            contents: call.vertex_data,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} client indices")),
            contents: call.index_data,
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} client transform")),
            contents: bytemuck::bytes_of(&TransformUniform::new(call.mvp)),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let transform = self
            .pipeline
            .transform_bind_group(&self.device, &uniform, &format!("{label} client transform"));

        pass.set_pipeline(&self.pipeline.pipeline);
        pass.set_bind_group(0, &transform, &[]);
        pass.set_bind_group(1, self.texture_bind_group(call.texture), &[]);
        for (slot, range) in slot_ranges(&call.layout).into_iter().enumerate() {
            pass.set_vertex_buffer(slot as u32, vertex.slice(range));
        }
        pass.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint16);
        true
    }
}

impl MeshBackend for WgpuBackend {
    type Target<'a> = wgpu::RenderPass<'a>;

    fn caps(&self) -> BackendCaps {
        self.config.caps()
    }

    fn upload_buffers(&mut self, handles: &mut GpuHandles, vertex: &[u8], index: &[u8]) {
        let vertex_id = self.store(handles.vertex, vertex, wgpu::BufferUsages::VERTEX, "vertex");
        let index_id = self.store(handles.index, index, wgpu::BufferUsages::INDEX, "index");
        self.index_shadows.insert(index_id, padded(index).into_owned());

        for state in self.vertex_arrays.values_mut() {
            if state.vertex == vertex_id || state.index == index_id {
                state.bundles.clear();
            }
        }

        handles.vertex = Some(vertex_id);
        handles.index = Some(index_id);
    }

    fn build_vertex_array(&mut self, handles: &mut GpuHandles, layout: &VertexLayout) {
        let (Some(vertex), Some(index)) = (handles.vertex, handles.index) else {
            log::warn!("{}: vertex array requested before buffers exist", self.config.label);
            return;
        };

        let id = match handles.vertex_array {
            Some(id) => id,
            None => VertexArrayId(self.next_id()),
        };
        self.vertex_arrays.insert(
            id,
            VertexArrayState {
                vertex,
                index,
                layout: *layout,
                bundles: BundleCache::new(BUNDLE_CACHE_LIMIT),
            },
        );
        handles.vertex_array = Some(id);
    }

    fn write_region(&mut self, handles: &GpuHandles, region: &DirtyRegion, bytes: &[u8], mode: UploadMode) {
        let id = match region.target {
            BufferTarget::Vertex => handles.vertex,
            BufferTarget::Index => handles.index,
        };
        let Some(buffer) = id.and_then(|id| self.buffers.get(&id)) else {
            log::warn!("{}: {:?} region without a buffer", self.config.label, region.target);
            return;
        };

        let (offset, data) = match (region.target, id.and_then(|id| self.index_shadows.get_mut(&id))) {
            (BufferTarget::Index, Some(shadow)) => {
                let range = region.byte_range();
                if range.end > shadow.len() {
                    log::warn!("{}: index region {range:?} past buffer end", self.config.label);
                    return;
                }
                shadow[range.clone()].copy_from_slice(bytes);
                let aligned = align_range(range);
                (aligned.start, &shadow[aligned])
            }
            _ => (region.offset, bytes),
        };

        if (offset + data.len()) as u64 > buffer.size() {
            log::warn!("{}: region {:?} past buffer end", self.config.label, region.byte_range());
            return;
        }
        write_bytes(&self.queue, buffer, offset as u64, data, mode);
    }

    fn draw(&mut self, target: &mut wgpu::RenderPass<'_>, call: &DrawCall<'_>) {
        if call.index_count == 0 || call.layout.vertex_bytes == 0 {
            return;
        }
        self.check_texture(call.texture);

        let first = call.first_index();
        let indices = first..first + call.index_count;

        if call.strategy == DrawStrategy::VertexArray && self.execute_bundle(target, call, indices.clone()) {
            return;
        }

        let bound = match call.strategy {
            DrawStrategy::VertexArray | DrawStrategy::BufferObjects => self.bind_buffers(target, call),
            DrawStrategy::ClientArrays => self.bind_client_arrays(target, call),
        };
        if bound {
            target.draw_indexed(indices, 0, 0..1);
        }
    }

    fn release(&mut self, handles: &mut GpuHandles) {
        if let Some(id) = handles.vertex_array.take() {
            self.vertex_arrays.remove(&id);
        }
        if let Some(id) = handles.vertex.take() {
            self.buffers.remove(&id);
            self.transforms.remove(&id);
        }
        if let Some(id) = handles.index.take() {
            self.buffers.remove(&id);
            self.index_shadows.remove(&id);
        }
        log::debug!("{}: released composite buffers", self.config.label);
    }
}

fn write_bytes(queue: &wgpu::Queue, buffer: &wgpu::Buffer, offset: u64, bytes: &[u8], mode: UploadMode) {
    match mode {
        UploadMode::SubData => queue.write_buffer(buffer, offset, bytes),
        UploadMode::Mapped => {
            let Some(size) = wgpu::BufferSize::new(bytes.len() as u64) else { return };
            match queue.write_buffer_with(buffer, offset, size) {
                Some(mut view) => view.copy_from_slice(bytes),
                None => log::warn!("mapped write of {size} bytes at {offset} rejected"),
            }
        }
    }
}

/// Pads `bytes` with zeros to the copy alignment (and to at least one word).
fn padded(bytes: &[u8]) -> Cow<'_, [u8]> {
    if !bytes.is_empty() && bytes.len() % ALIGN == 0 {
        return Cow::Borrowed(bytes);
    }
    let len = bytes.len().div_ceil(ALIGN).max(1) * ALIGN;
    let mut out = bytes.to_vec();
    out.resize(len, 0);
    Cow::Owned(out)
}

/// Widens `range` outward to the copy alignment.
fn align_range(range: Range<usize>) -> Range<usize> {
    let start = range.start / ALIGN * ALIGN;
    let end = range.end.div_ceil(ALIGN) * ALIGN;
    start..end
}
