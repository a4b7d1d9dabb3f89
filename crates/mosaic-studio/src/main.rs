use anyhow::{Context, Result, bail};
use glam::{Mat4, Vec2};
use mosaic_engine::backend::wgpu_backend::checkerboard;
use mosaic_engine::backend::{WgpuBackend, WgpuBackendConfig};
use mosaic_engine::device::{Gpu, GpuInit};
use mosaic_engine::logging::{LoggingConfig, init_logging};
use mosaic_engine::mesh::{Batch, Composite, DirtyQueue, Quad};
use mosaic_engine::paint::Color;

const TEXTURE_SIZE: u32 = 64;
const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Row tints, cycled top to bottom.
const PALETTE: [[u8; 4]; 4] = [
    [255, 255, 255, 255],
    [255, 196, 128, 255],
    [128, 212, 255, 255],
    [196, 255, 160, 230],
];

/// Demo parameters, overridable from the command line.
#[derive(Debug, Clone)]
struct DemoConfig {
    columns: u32,
    rows: u32,
    cell: f32,
    frames: u32,
    mapped_upload: bool,
    render_bundles: bool,
    client_arrays: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            columns: 16,
            rows: 12,
            cell: 40.0,
            frames: 240,
            mapped_upload: false,
            render_bundles: true,
            client_arrays: false,
        }
    }
}

impl DemoConfig {
    fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut config = Self::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--frames" => config.frames = parse_next(&mut args, "--frames")?,
                "--columns" => config.columns = parse_next(&mut args, "--columns")?,
                "--rows" => config.rows = parse_next(&mut args, "--rows")?,
                "--mapped" => config.mapped_upload = true,
                "--no-bundles" => config.render_bundles = false,
                "--client-arrays" => config.client_arrays = true,
                other => bail!("unknown argument '{other}'"),
            }
        }
        Ok(config)
    }

    fn size(&self) -> (u32, u32) {
        (
            (self.columns as f32 * self.cell) as u32,
            (self.rows as f32 * self.cell) as u32,
        )
    }

    fn unit_count(&self) -> usize {
        (self.columns * self.rows) as usize
    }
}

fn parse_next(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<u32> {
    let value = args.next().with_context(|| format!("{flag} needs a value"))?;
    value
        .parse()
        .with_context(|| format!("{flag}: '{value}' is not a number"))
}

/// Upload traffic over the run.
#[derive(Debug, Default)]
struct FrameStats {
    frames: u64,
    regions: u64,
    bytes: u64,
}

impl FrameStats {
    fn record(&mut self, dirty: &DirtyQueue) {
        self.frames += 1;
        self.regions += dirty.len() as u64;
        self.bytes += dirty.pending_bytes() as u64;
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());
    let config = DemoConfig::from_args(std::env::args().skip(1))?;
    pollster::block_on(run(config))
}

async fn run(config: DemoConfig) -> Result<()> {
    let gpu = Gpu::new_headless(GpuInit::default()).await?;
    log::info!("rendering through {:?}", gpu.adapter_info().backend);
    let (width, height) = config.size();
    let target = gpu.create_target(width, height, TARGET_FORMAT);

    let mut backend = WgpuBackend::new(
        gpu.device(),
        gpu.queue(),
        WgpuBackendConfig {
            target_format: target.format(),
            buffer_objects: !config.client_arrays,
            vertex_array_cache: config.render_bundles,
            mapped_upload: config.mapped_upload,
            label: "studio".to_owned(),
        },
    )?;

    let pixels = checkerboard(TEXTURE_SIZE, 8, [235, 235, 235, 255], [30, 30, 40, 255]);
    let texture = backend
        .create_texture(&pixels, TEXTURE_SIZE, TEXTURE_SIZE)
        .context("failed to upload checkerboard")?;

    let mut composite = build_grid(&config, texture)?;
    composite.generate_buffer(&mut backend);

    let projection = Mat4::orthographic_rh(0.0, width as f32, 0.0, height as f32, -1.0, 1.0);
    let mut stats = FrameStats::default();

    for frame in 0..config.frames {
        animate(&mut composite, &config, frame)?;

        composite.draw();
        stats.record(composite.dirty());

        let mut gpu_frame = gpu.begin_frame();
        {
            let mut pass = gpu_frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("studio composite pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            composite.render(&mut backend, &mut pass, projection);
        }
        gpu.submit(gpu_frame);
    }

    let full_bytes = composite.layout().vertex_bytes as u64;
    let frames = stats.frames.max(1);
    log::info!(
        "{} frames, {} units: {:.1} regions and {} bytes uploaded per frame ({} byte vertex buffer), {} cached bundles",
        stats.frames,
        composite.len(),
        stats.regions as f64 / frames as f64,
        stats.bytes / frames,
        full_bytes,
        backend.cached_bundles(),
    );

    composite.release(&mut backend);
    Ok(())
}

/// One quad per grid cell, sampling alternating quadrants of the texture and
/// tinted per row.
fn build_grid(config: &DemoConfig, texture: mosaic_engine::backend::TextureHandle) -> Result<Composite> {
    let mut composite = Composite::with_capacity(texture, config.unit_count());
    let half = (TEXTURE_SIZE / 2) as f32;
    let side = config.cell * 0.8;

    for row in 0..config.rows {
        for col in 0..config.columns {
            let quad = Quad::new(side, side).with_texels((col % 2) as f32 * half, (row % 2) as f32 * half, half, half);
            let index = composite.add_unit_with_quad(&quad)?;

            let center = Vec2::new((col as f32 + 0.5) * config.cell, (row as f32 + 0.5) * config.cell);
            let [r, g, b, a] = PALETTE[row as usize % PALETTE.len()];
            if let Some(unit) = composite.unit_mut(index) {
                let drawable = unit.drawable_mut();
                drawable.set_position(center.extend(0.0));
                drawable.set_color(Color::from_u8(r, g, b, a));
            }
        }
    }

    log::info!(
        "grid: {} units, {} vertices, {} indices",
        composite.len(),
        composite.vertex_count(),
        composite.index_count()
    );
    Ok(composite)
}

/// Spins one column per frame, blinks the diagonal, pulses the whole batch and
/// periodically reverses draw order or draws only the top half.
fn animate(composite: &mut Composite, config: &DemoConfig, frame: u32) -> Result<()> {
    let t = frame as f32 / 60.0;
    let columns = config.columns as usize;
    let count = composite.len();

    let spinning = frame as usize % columns;
    for index in (spinning..count).step_by(columns) {
        if let Some(unit) = composite.unit_mut(index) {
            unit.drawable_mut().set_rotation(t * std::f32::consts::TAU);
        }
    }

    if frame % 30 == 0 {
        let visible = (frame / 30) % 2 == 0;
        for d in 0..config.rows.min(config.columns) as usize {
            if let Some(unit) = composite.unit_mut(d * columns + d) {
                unit.drawable_mut().set_visible(visible);
            }
        }
    }

    if frame % 20 == 0 {
        let pulse = 0.75 + 0.25 * (t * 2.0).cos();
        composite.drawable_mut().set_opacity(pulse);
    }

    if frame > 0 && frame % 120 == 0 {
        for slot in 0..count {
            composite.set_unit_order(slot, count - 1 - slot)?;
        }
        composite.reorder()?;
    }

    if frame % 45 == 0 && count > 1 {
        composite.push_draw_range(0, count / 2)?;
    }

    Ok(())
}
