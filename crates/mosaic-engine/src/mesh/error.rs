use thiserror::Error;

/// Errors raised by structural composite operations.
///
/// Per-frame operations (`draw`, `render`) never fail; they log and fall back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Unit geometry does not describe whole vertices and triangles.
    #[error("invalid unit geometry: {0}")]
    InvalidGeometry(String),

    /// Biasing the unit's indices by the composite vertex count would leave
    /// the 16-bit index range.
    #[error("unit with {vertex_count} vertices does not fit after {base} existing vertices (16-bit indices)")]
    IndexOverflow { base: usize, vertex_count: usize },

    /// Unit orders do not form a permutation of `0..unit_count`.
    #[error("unit order {order} at slot {slot} is out of range or duplicated ({unit_count} units)")]
    InvalidOrder {
        slot: usize,
        order: usize,
        unit_count: usize,
    },

    #[error("unit {index} is out of range ({unit_count} units)")]
    UnitOutOfRange { index: usize, unit_count: usize },

    #[error("draw range [{from}, {to}] is invalid ({unit_count} units)")]
    InvalidDrawRange {
        from: usize,
        to: usize,
        unit_count: usize,
    },
}
