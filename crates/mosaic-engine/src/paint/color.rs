/// Straight-alpha linear RGBA blend color.
///
/// Composite meshes keep opacity and RGB in separate vertex attribute regions,
/// so the two halves of a color are consumed independently:
/// - `a` feeds the opacity region (one float per vertex)
/// - `r`, `g`, `b` feed the RGB region (three floats per vertex)
///
/// The fragment shader premultiplies at output time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Creates a color from straight sRGB-encoded bytes (`0`–`255`).
    ///
    /// No transfer function is applied; bytes are divided by 255.
    #[inline]
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Component-wise product, used to combine a unit's blend color with its
    /// composite's.
    #[inline]
    pub fn modulate(self, parent: Color) -> Self {
        Self {
            r: self.r * parent.r,
            g: self.g * parent.g,
            b: self.b * parent.b,
            a: self.a * parent.a,
        }
    }

    #[inline]
    pub fn rgb(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

}

impl Default for Color {
    fn default() -> Self {
        Self::white()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_opaque_white() {
        assert_eq!(Color::default(), Color::new(1.0, 1.0, 1.0, 1.0));
    }

    #[test]
    fn modulate_is_component_wise() {
        let unit = Color::new(0.5, 1.0, 0.25, 0.5);
        let parent = Color::new(0.5, 0.5, 1.0, 0.5);
        assert_eq!(unit.modulate(parent), Color::new(0.25, 0.5, 0.25, 0.25));
    }

    #[test]
    fn modulate_with_white_is_identity() {
        let c = Color::new(0.2, 0.4, 0.6, 0.8);
        assert_eq!(c.modulate(Color::white()), c);
    }

    #[test]
    fn from_u8_divides_by_255() {
        assert_eq!(Color::from_u8(255, 0, 51, 255), Color::new(1.0, 0.0, 0.2, 1.0));
    }
}
