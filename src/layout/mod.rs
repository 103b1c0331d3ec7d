//! Placement of annotation geometry: arrow routing and text layout

pub mod router;
pub mod text;

pub use router::{AnchorRouter, Route, Sector, route_arrow};
pub use text::{LabelPlacement, TextMeasure, place_label};
