//! Callout annotation engine for tutorial screenshots
//!
//! Maps clicks onto recorded widget rectangles, routes arrows and lays out
//! labels around them, renders annotated slides and exports the deck.

pub mod annotations;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod layout;
pub mod render;
pub mod session;

pub use config::AnnotatorConfig;
pub use error::{AnnotationError, DataError, GeometryError};
