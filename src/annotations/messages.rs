//! Input messages understood by the annotator
//!
//! Coordinates are in screen space, the annotator maps them onto the image.

use crate::domain::{AnnotationKind, PenSettings, Point, Size, WheelDirection};

/// Pointer actions on the displayed slide
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    /// Hover, rebuilds the preview
    Move(f32, f32),
    /// Click, confirms the preview or picks an annotation
    Press(f32, f32),
}

/// Keys the annotator reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    Escape,
    Delete,
    /// Ctrl+Z
    Undo,
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawMsg {
    /// Arm a drawing tool
    Arm(AnnotationKind),
    /// Back to picking annotations
    Disarm,
    /// Toggle between picking and the last armed tool
    ModeToggle,
    Pointer(PointerAction),
    Wheel(WheelDirection),
    Key(KeyPress),
    SetText(String),
    SetPen(PenSettings),
    SetFilled(bool),
    /// Nudge for kinds that can leave their target
    SetOffset(Point),
    /// Size of the widget showing the slide, `None` when shown 1:1
    Viewport(Option<Size>),
}
