//! Greedy word wrapping and arrow label placement

use crate::domain::{Point, Rect, Size};

use super::router::Sector;

/// Shown instead of an empty text box
pub const PLACEHOLDER: &str = "Write something here";

/// Margin around label text, and inset from the surface edge when relocating
pub const LABEL_MARGIN: f32 = 8.0;

/// Pixel metrics of whatever font draws the text
pub trait TextMeasure {
    /// Advance width of `text` in pixels
    fn measure(&self, text: &str) -> f32;

    fn line_height(&self) -> f32;

    fn wrap(&self, text: &str, max_width: f32) -> Vec<String> {
        wrap(text, max_width, |s| self.measure(s))
    }

    /// Size of the block the given lines occupy
    fn bounding_box(&self, lines: &[String]) -> Size {
        bounding_box(lines, self.line_height(), |s| self.measure(s))
    }
}

/// Break `text` into lines no wider than `max_width`
///
/// Tokens are whitespace-delimited and never split, so a single token wider
/// than `max_width` gets a line of its own. Empty text wraps the placeholder.
pub fn wrap(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let text = if text.trim().is_empty() {
        PLACEHOLDER
    } else {
        text
    };

    let mut lines = Vec::new();
    let mut line = String::new();
    for token in text.split_whitespace() {
        let candidate = format!("{line}{token} ");
        if !line.is_empty() && measure(&candidate) > max_width {
            lines.push(line.trim_end().to_string());
            line = format!("{token} ");
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line.trim_end().to_string());
    }
    lines
}

/// Widest line by `line_height` times the line count
pub fn bounding_box(lines: &[String], line_height: f32, measure: impl Fn(&str) -> f32) -> Size {
    let width = lines
        .iter()
        .map(|line| measure(line))
        .fold(0.0_f32, f32::max);
    Size::new(width, line_height * lines.len() as f32)
}

/// Where an arrow label ended up
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelPlacement {
    /// Filled background, text plus margin
    pub frame: Rect,
    /// Top-left of the first text line
    pub text_origin: Point,
    /// Arrow tail, moved along with a relocated label
    pub tail: Point,
    pub repositioned: bool,
}

/// Place a label of `text` size beyond the arrow tail
///
/// The label is pushed further along the arrow direction by half its own
/// extent. When the framed label leaves the surface it is moved once: into the
/// opposite vertical half, and against the left edge for left-pointing arrows
/// or the right edge otherwise. Tiny surfaces may still clip.
pub fn place_label(tail: Point, sector: Sector, text: Size, surface: Size) -> LabelPlacement {
    let (dx, dy) = sector.direction();
    let shifted = tail.offset(dx * text.width / 2.0, dy * text.height / 2.0);
    let origin = shifted.offset(-text.width / 2.0, -text.height / 2.0);
    let frame = framed(origin, text);

    let bounds = Rect::new(0.0, 0.0, surface.width, surface.height);
    if bounds.contains_rect(&frame) {
        return LabelPlacement {
            frame,
            text_origin: origin,
            tail,
            repositioned: false,
        };
    }

    let (new_y, tail_y) = if origin.y < surface.height / 2.0 {
        let y = surface.height - text.height - 2.0 * LABEL_MARGIN;
        (y, y)
    } else {
        let y = 2.0 * LABEL_MARGIN;
        (y, y + text.height)
    };
    let new_x = if sector.points_left() {
        LABEL_MARGIN
    } else {
        surface.width - text.width - 2.0 * LABEL_MARGIN
    };
    let origin = Point::new(new_x, new_y);
    log::debug!("Label moved from {frame:?} to {origin:?} to stay on the surface");

    LabelPlacement {
        frame: framed(origin, text),
        text_origin: origin,
        tail: Point::new(new_x + text.width / 2.0, tail_y),
        repositioned: true,
    }
}

fn framed(origin: Point, text: Size) -> Rect {
    Rect::new(
        origin.x - LABEL_MARGIN,
        origin.y - LABEL_MARGIN,
        text.width + 2.0 * LABEL_MARGIN,
        text.height + 2.0 * LABEL_MARGIN,
    )
}
