//! Annotation rendering module
//!
//! This module contains:
//! - Geometry calculations shared by the draw routines
//! - Bitmap text drawing and metrics
//! - Image rendering using tiny-skia

pub mod font;
pub mod geometry;
pub mod image;
