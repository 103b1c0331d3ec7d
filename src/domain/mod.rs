//! Pure domain types with minimal dependencies
//!
//! Geometry, the widget snapshot of a slide, annotations and selection state.

pub mod annotation;
pub mod geometry;
pub mod selection;
pub mod widget;

pub use annotation::*;
pub use geometry::*;
pub use selection::*;
pub use widget::*;
