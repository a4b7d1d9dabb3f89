use bitflags::bitflags;

bitflags! {
    /// Per-drawable state bits.
    ///
    /// Two families live in the same word:
    /// - `UPDATE_*` are requests raised by setters and consumed by [`Drawable::draw`]
    /// - `*_CHANGED` are results of the most recent `draw` step and are valid until
    ///   the next one
    ///
    /// [`Drawable::draw`]: super::Drawable::draw
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct DrawableState: u32 {
        /// Drawable is excluded from drawing.
        const INVISIBLE         = 1 << 0;

        const UPDATE_TRANSFORM  = 1 << 1;
        const UPDATE_OPACITY    = 1 << 2;
        const UPDATE_RGB        = 1 << 3;

        /// Model matrix was recomputed by the last draw step.
        const TRANSFORM_CHANGED = 1 << 4;
        /// Blend alpha was applied by the last draw step.
        const OPACITY_CHANGED   = 1 << 5;
        /// Blend RGB was applied by the last draw step.
        const RGB_CHANGED       = 1 << 6;
        /// Set when the last draw step drew the drawable, cleared when it skipped it.
        const DRAW_CHANGED      = 1 << 7;

        /// Request a full property refresh on the next draw step.
        const DRAW = Self::UPDATE_TRANSFORM.bits()
            | Self::UPDATE_OPACITY.bits()
            | Self::UPDATE_RGB.bits();

        /// Results cleared at the start of every draw step.
        const CHANGED = Self::TRANSFORM_CHANGED.bits()
            | Self::OPACITY_CHANGED.bits()
            | Self::RGB_CHANGED.bits();
    }
}
