//! Per-frame change detection.
//!
//! Only byte ranges owned by units whose drawable reported a change are
//! rewritten, and each rewrite queues exactly that range.

use glam::Vec3;

use crate::drawable::DrawableState;
use crate::paint::Color;

use super::composite::Composite;
use super::dirty::{DirtyQueue, DirtyRegion};
use super::layout::{POSITION_SIZE, RGB_SIZE, VertexLayout};
use super::unit::Unit;

impl Composite {
    /// Runs the draw step of the composite and every unit, rewriting the
    /// attribute ranges that changed.
    ///
    /// RGB is only rewritten on a unit or parent RGB change. A unit shown again
    /// keeps the RGB product from before it was hidden, even if the parent RGB
    /// changed meanwhile.
    pub(super) fn update_attributes(&mut self) {
        self.drawable_mut().draw();
        if !self.drawable().is_drawn() {
            return;
        }
        if self.needs_generation {
            self.warn_stale("draw");
            return;
        }

        let parent = self.drawable().blend_color();
        let parent_opacity = self.drawable().check_state(DrawableState::OPACITY_CHANGED);
        let parent_rgb = self.drawable().check_state(DrawableState::RGB_CHANGED);
        let layout = self.layout;

        for unit in &mut self.units {
            let was_drawn = unit.drawable().is_drawn();
            unit.drawable_mut().draw();
            let drawn = unit.drawable().is_drawn();

            let state = unit.drawable().state();
            let color = unit.drawable().blend_color().modulate(parent);

            if drawn && state.contains(DrawableState::TRANSFORM_CHANGED) {
                write_positions(&mut self.vertices, &mut self.dirty, unit);
            }

            // a visibility flip always rewrites opacity: zero when hidden
            let toggled = was_drawn != drawn;
            if toggled || (drawn && (parent_opacity || state.contains(DrawableState::OPACITY_CHANGED))) {
                let alpha = if drawn { color.a } else { 0.0 };
                write_opacity(&mut self.vertices, &mut self.dirty, &layout, unit, alpha);
            }

            if drawn && (parent_rgb || state.contains(DrawableState::RGB_CHANGED)) {
                write_rgb(&mut self.vertices, &mut self.dirty, &layout, unit, color);
            }
        }
    }
}

fn write_positions(vertices: &mut [f32], dirty: &mut DirtyQueue, unit: &Unit) {
    let range = unit.position_floats();
    let model = *unit.drawable().model_matrix();

    let born = unit.positions().chunks_exact(POSITION_SIZE);
    for (dst, src) in vertices[range.clone()].chunks_exact_mut(POSITION_SIZE).zip(born) {
        let p = model.transform_point3(Vec3::from_slice(src));
        dst.copy_from_slice(&p.to_array());
    }

    dirty.push(DirtyRegion::vertex(range));
}

fn write_opacity(vertices: &mut [f32], dirty: &mut DirtyQueue, layout: &VertexLayout, unit: &Unit, alpha: f32) {
    let range = unit.opacity_floats(layout);
    vertices[range.clone()].fill(alpha);
    dirty.push(DirtyRegion::vertex(range));
}

fn write_rgb(vertices: &mut [f32], dirty: &mut DirtyQueue, layout: &VertexLayout, unit: &Unit, color: Color) {
    let range = unit.rgb_floats(layout);
    let rgb = color.rgb();
    for dst in vertices[range.clone()].chunks_exact_mut(RGB_SIZE) {
        dst.copy_from_slice(&rgb);
    }
    dirty.push(DirtyRegion::vertex(range));
}
