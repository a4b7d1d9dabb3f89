use glam::{Mat4, Quat, Vec2, Vec3};

use crate::paint::Color;

use super::DrawableState;

/// Transform, blend color and state flags of one drawable element.
///
/// Setters only record requests (`UPDATE_*`). The matrix and the `*_CHANGED`
/// results are produced by [`Drawable::draw`], which owners call once per frame
/// before reading the results.
#[derive(Debug, Clone)]
pub struct Drawable {
    position: Vec3,
    rotation: f32, // radians about +Z
    scale: Vec2,
    blend_color: Color,
    model_matrix: Mat4,
    state: DrawableState,
}

impl Drawable {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            blend_color: Color::white(),
            model_matrix: Mat4::IDENTITY,
            state: DrawableState::DRAW,
        }
    }

    // ── transform ─────────────────────────────────────────────────────────

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.state.insert(DrawableState::UPDATE_TRANSFORM);
    }

    pub fn set_rotation(&mut self, radians: f32) {
        self.rotation = radians;
        self.state.insert(DrawableState::UPDATE_TRANSFORM);
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
        self.state.insert(DrawableState::UPDATE_TRANSFORM);
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    #[inline]
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Model matrix as of the last draw step.
    #[inline]
    pub fn model_matrix(&self) -> &Mat4 {
        &self.model_matrix
    }

    // ── color ─────────────────────────────────────────────────────────────

    pub fn set_opacity(&mut self, opacity: f32) {
        self.blend_color.a = opacity;
        self.state.insert(DrawableState::UPDATE_OPACITY);
    }

    pub fn set_rgb(&mut self, r: f32, g: f32, b: f32) {
        self.blend_color.r = r;
        self.blend_color.g = g;
        self.blend_color.b = b;
        self.state.insert(DrawableState::UPDATE_RGB);
    }

    pub fn set_color(&mut self, color: Color) {
        self.blend_color = color;
        self.state
            .insert(DrawableState::UPDATE_OPACITY | DrawableState::UPDATE_RGB);
    }

    #[inline]
    pub fn blend_color(&self) -> Color {
        self.blend_color
    }

    // ── visibility ────────────────────────────────────────────────────────

    pub fn set_visible(&mut self, visible: bool) {
        self.state.set(DrawableState::INVISIBLE, !visible);
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        !self.state.contains(DrawableState::INVISIBLE)
    }

    /// True when the last draw step drew this drawable.
    #[inline]
    pub fn is_drawn(&self) -> bool {
        self.state.contains(DrawableState::DRAW_CHANGED)
    }

    // ── state ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> DrawableState {
        self.state
    }

    /// Returns true if any of `flags` is set.
    #[inline]
    pub fn check_state(&self, flags: DrawableState) -> bool {
        self.state.intersects(flags)
    }

    #[inline]
    pub fn add_state(&mut self, flags: DrawableState) {
        self.state.insert(flags);
    }

    #[inline]
    pub fn clear_state(&mut self, flags: DrawableState) {
        self.state.remove(flags);
    }

    /// Per-frame draw step.
    ///
    /// Clears last frame's `*_CHANGED` results, then either marks the drawable
    /// as skipped (invisible) or consumes pending `UPDATE_*` requests into the
    /// matching `*_CHANGED` results. Requests raised while invisible stay
    /// pending until the drawable is drawn again.
    pub fn draw(&mut self) {
        self.state.remove(DrawableState::CHANGED);

        if self.state.contains(DrawableState::INVISIBLE) {
            self.state.remove(DrawableState::DRAW_CHANGED);
            return;
        }

        self.state.insert(DrawableState::DRAW_CHANGED);

        if self.state.contains(DrawableState::UPDATE_TRANSFORM) {
            self.model_matrix = Mat4::from_scale_rotation_translation(
                self.scale.extend(1.0),
                Quat::from_rotation_z(self.rotation),
                self.position,
            );
            self.state.remove(DrawableState::UPDATE_TRANSFORM);
            self.state.insert(DrawableState::TRANSFORM_CHANGED);
        }

        if self.state.contains(DrawableState::UPDATE_OPACITY) {
            self.state.remove(DrawableState::UPDATE_OPACITY);
            self.state.insert(DrawableState::OPACITY_CHANGED);
        }

        if self.state.contains(DrawableState::UPDATE_RGB) {
            self.state.remove(DrawableState::UPDATE_RGB);
            self.state.insert(DrawableState::RGB_CHANGED);
        }
    }
}

impl Default for Drawable {
    fn default() -> Self {
        Self::new()
    }
}
