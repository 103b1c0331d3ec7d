//! Interactive annotation of a slide
//!
//! This module provides:
//! - Input messages (pointer, wheel, keys, pen changes)
//! - The `Annotator` state holding the armed tool and the live preview
//! - Message handlers that turn input into slide edits

pub mod handlers;
pub mod messages;
mod state;

pub use handlers::handle_draw_msg;
pub use messages::{DrawMsg, KeyPress, PointerAction};
pub use state::Annotator;
