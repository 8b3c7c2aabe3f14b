//! Tree-to-spatial layout.
//!
//! A layout pass flattens the layout forest into a [`LevelMatrix`], then walks the levels
//! bottom-up. Each entry's x-coordinate is either its evenly spaced slot in the row or,
//! once its children have been placed, the midpoint of their extent. Placeholders take a
//! slot and report to their parent without producing a node.
//!
//! The pass itself, which talks to the render host, lives in [`crate::session`].

mod levels;
mod position;

pub use levels::*;
pub use position::*;
