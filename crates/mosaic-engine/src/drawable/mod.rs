//! Drawable element model.
//!
//! A drawable carries a 2D transform (position, rotation about Z, scale), a
//! blend color and a small set of state flags. Composite meshes embed one per
//! unit and one for themselves, and read the per-frame `*_CHANGED` results to
//! decide which buffer regions need rewriting.

mod node;
mod state;

pub use node::Drawable;
pub use state::DrawableState;
