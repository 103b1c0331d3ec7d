//! Annotation entity: one callout placed over a slide
//!
//! Anchors are stored in image pixel space. They are derived from the target
//! widget, the slide's window offset and the user's helper points, and are
//! recomputed by [`Annotation::layout`] whenever one of those changes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rect, Size, map_range};
use super::widget::WidgetRef;
use crate::config::{AnnotatorConfig, PenColor};
use crate::error::{AnnotationError, GeometryError};
use crate::layout::{Sector, TextMeasure, place_label, route_arrow};
use crate::render::font::BitmapFont;

/// Padding added around every selection box
pub const BBOX_PADDING: f32 = 5.0;

/// Click cursor footprint drawn past the target's bottom-right corner
pub const CLICK_ICON: Size = Size::new(20.0, 30.0);

/// Length of a helper-driven arrow, at full deflection
pub const HELPER_ARROW_LENGTH: f32 = 90.0;

/// Inner padding of a text box
pub const TEXT_BOX_PADDING: f32 = 6.0;
/// Extra gap between text box lines
pub const TEXT_BOX_LINE_SPACING: f32 = 2.0;

/// What an annotation draws
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationKind {
    Rectangle,
    Circle,
    Arrow,
    #[default]
    ArrowWithText,
    TextBox,
    #[serde(rename = "Click")]
    ClickMark,
    /// Selection tool armed, never stored
    Selecting,
    /// An annotation is picked, never stored
    Selected,
}

/// Which helper points a kind reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Follows the free-moving optional anchor
    pub wants_opt_helper: bool,
    /// Can be nudged off the target by an offset
    pub wants_offset_helper: bool,
}

impl AnnotationKind {
    /// Kinds that can be placed and saved
    pub const DRAWABLE: [AnnotationKind; 6] = [
        AnnotationKind::Rectangle,
        AnnotationKind::Circle,
        AnnotationKind::Arrow,
        AnnotationKind::ArrowWithText,
        AnnotationKind::TextBox,
        AnnotationKind::ClickMark,
    ];

    pub const fn capabilities(self) -> Capabilities {
        use AnnotationKind::*;
        Capabilities {
            wants_opt_helper: matches!(self, Arrow | ArrowWithText | TextBox),
            wants_offset_helper: matches!(self, ClickMark | TextBox),
        }
    }

    pub const fn is_transient(self) -> bool {
        matches!(self, AnnotationKind::Selecting | AnnotationKind::Selected)
    }

    /// Tag used by `annotations_old.json`
    pub fn legacy_name(self) -> &'static str {
        match self {
            AnnotationKind::Rectangle => "rectangle",
            AnnotationKind::Circle => "circle",
            AnnotationKind::Arrow | AnnotationKind::ArrowWithText => "arrow",
            AnnotationKind::TextBox => "textBox",
            AnnotationKind::ClickMark => "clickMark",
            AnnotationKind::Selecting => "selecting",
            AnnotationKind::Selected => "selected",
        }
    }
}

/// Stroke and text style of one annotation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenSettings {
    pub color: PenColor,
    pub thickness: u32,
    #[serde(rename = "fontSize")]
    pub font_size: u32,
}

impl Default for PenSettings {
    fn default() -> Self {
        Self::from(&AnnotatorConfig::default())
    }
}

impl From<&AnnotatorConfig> for PenSettings {
    fn from(config: &AnnotatorConfig) -> Self {
        Self {
            color: config.pen_color,
            thickness: config.pen_thickness,
            font_size: config.font_size,
        }
    }
}

/// Inputs of layout that come from the slide rather than the annotation
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutContext {
    /// Render surface, labels are kept inside it
    pub surface: Size,
    pub wrap_columns: usize,
    /// Arrow text treated as "no label"
    pub label_placeholder: String,
}

impl LayoutContext {
    pub fn new(surface: Size) -> Self {
        Self::from_config(&AnnotatorConfig::default(), surface)
    }

    pub fn from_config(config: &AnnotatorConfig, surface: Size) -> Self {
        Self {
            surface,
            wrap_columns: config.label_wrap_columns,
            label_placeholder: config.label_placeholder.clone(),
        }
    }
}

/// Wrapped text and where it sits
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    /// Top-left of the first line
    pub origin: Point,
    /// Filled background
    pub frame: Rect,
    pub line_spacing: f32,
}

/// Padded selection box, corners normalized
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub top_left: Point,
    pub bottom_right: Point,
}

impl BoundingBox {
    /// Tight extent grown by [`BBOX_PADDING`]
    pub fn padded(extent: Rect) -> Self {
        let r = extent.expand(BBOX_PADDING);
        Self {
            top_left: r.top_left(),
            bottom_right: r.bottom_right(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.top_left, self.bottom_right)
    }

    pub fn area(&self) -> f32 {
        self.rect().area()
    }

    pub fn contains(&self, p: Point) -> bool {
        self.rect().contains_point(p)
    }
}

/// One placed annotation
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub kind: AnnotationKind,
    pub target: Arc<WidgetRef>,
    /// Tail for arrows, first corner or center otherwise
    pub anchor_start: Point,
    /// Head for arrows, opposite corner otherwise
    pub anchor_end: Point,
    pub pen: PenSettings,
    pub filled: bool,
    pub text: String,
    /// False while previewing, true once confirmed
    pub persistent: bool,
    /// Draw the selection frame
    pub highlighted: bool,
    /// User nudge applied to the target position
    pub offset: Point,
    /// Origin of the composite window the target was recorded in
    pub window_offset: Point,
    /// Free helper point: click position for arrows, far corner for text boxes
    pub optional_anchor: Point,
    text_block: Option<TextBlock>,
    sector: Option<Sector>,
    /// Router tail before the label moved it
    routed_tail: Option<Point>,
}

impl Annotation {
    pub fn new(
        kind: AnnotationKind,
        target: Arc<WidgetRef>,
        pen: PenSettings,
    ) -> Result<Self, AnnotationError> {
        if kind.is_transient() {
            return Err(AnnotationError::TransientKind(kind));
        }
        let rect = target.rect();
        Ok(Self {
            kind,
            anchor_start: rect.top_left(),
            anchor_end: rect.bottom_right(),
            optional_anchor: rect.center(),
            target,
            pen,
            filled: false,
            text: String::new(),
            persistent: false,
            highlighted: false,
            offset: Point::ZERO,
            window_offset: Point::ZERO,
            text_block: None,
            sector: None,
            routed_tail: None,
        })
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_filled(mut self, filled: bool) -> Self {
        self.filled = filled;
        self
    }

    pub fn set_offset(&mut self, offset: Point) {
        self.offset = offset;
    }

    pub fn set_optional_anchor(&mut self, anchor: Point) {
        self.optional_anchor = anchor;
    }

    /// Promote a preview; returns false if it was already persistent
    pub fn confirm(&mut self) -> bool {
        let changed = !self.persistent;
        self.persistent = true;
        changed
    }

    /// Target widget rectangle in image space
    pub fn target_rect(&self) -> Rect {
        let pos = self.target.position - self.window_offset + self.offset;
        Rect::from_origin_size(pos, self.target.size)
    }

    pub fn text_block(&self) -> Option<&TextBlock> {
        self.text_block.as_ref()
    }

    /// Routing sector, for arrows placed by the router
    pub fn sector(&self) -> Option<Sector> {
        self.sector
    }

    /// Recompute anchors (and text) from the target and helpers
    pub fn layout(&mut self, ctx: &LayoutContext) -> Result<(), GeometryError> {
        let target = self.target_rect();
        self.text_block = None;
        self.sector = None;
        self.routed_tail = None;

        match self.kind {
            AnnotationKind::Rectangle => {
                self.anchor_start = target.top_left();
                self.anchor_end = target.bottom_right();
            }
            AnnotationKind::Circle => {
                // Diameter is the start-end distance, so push the second anchor
                // out until the circle spans the widget diagonal
                self.anchor_start = target.center();
                self.anchor_end = target
                    .bottom_right()
                    .offset(target.width / 2.0, target.height / 2.0);
            }
            AnnotationKind::ClickMark => {
                self.anchor_start = target.bottom_right();
                self.anchor_end = target
                    .bottom_right()
                    .offset(CLICK_ICON.width, CLICK_ICON.height);
            }
            AnnotationKind::Arrow => {
                let c = target.center();
                let opt_x = map_range(
                    self.optional_anchor.x - c.x,
                    -target.width,
                    target.width,
                    -1.0,
                    1.0,
                )?
                .clamp(-1.0, 1.0);
                let opt_y = map_range(
                    self.optional_anchor.y - c.y,
                    -target.height,
                    target.height,
                    -1.0,
                    1.0,
                )?
                .clamp(-1.0, 1.0);
                let head = c.offset(opt_x * target.width / 2.0, opt_y * target.height / 2.0);
                self.anchor_end = head;
                self.anchor_start =
                    head.offset(HELPER_ARROW_LENGTH * opt_x, HELPER_ARROW_LENGTH * opt_y);
            }
            AnnotationKind::ArrowWithText => {
                let route = route_arrow(&target, self.optional_anchor)?;
                self.anchor_end = route.head;
                self.anchor_start = route.tail;
                self.sector = Some(route.sector);
                self.routed_tail = Some(route.tail);

                if self.has_label(ctx) {
                    let font = BitmapFont::new(self.pen.font_size);
                    let lines = font.wrap(&self.text, ctx.wrap_columns as f32 * font.advance());
                    let size = font.bounding_box(&lines);
                    let placed = place_label(route.tail, route.sector, size, ctx.surface);
                    self.anchor_start = placed.tail;
                    self.text_block = Some(TextBlock {
                        lines,
                        origin: placed.text_origin,
                        frame: placed.frame,
                        line_spacing: 0.0,
                    });
                }
            }
            AnnotationKind::TextBox => {
                let corner = target.top_left() + (self.optional_anchor - target.center());
                self.anchor_start = target.top_left();
                self.anchor_end = corner;

                let frame = Rect::from_corners(self.anchor_start, self.anchor_end);
                let font = BitmapFont::new(self.pen.font_size);
                let lines = font.wrap(&self.text, frame.width - TEXT_BOX_PADDING);
                self.text_block = Some(TextBlock {
                    lines,
                    origin: frame
                        .top_left()
                        .offset(TEXT_BOX_PADDING, TEXT_BOX_PADDING),
                    frame,
                    line_spacing: TEXT_BOX_LINE_SPACING,
                });
            }
            AnnotationKind::Selecting | AnnotationKind::Selected => {}
        }
        Ok(())
    }

    fn has_label(&self, ctx: &LayoutContext) -> bool {
        let text = self.text.trim();
        !text.is_empty() && text != ctx.label_placeholder
    }

    /// Arrow tip, on the target perimeter
    pub fn head(&self) -> Point {
        self.anchor_end
    }

    pub fn tail(&self) -> Point {
        self.anchor_start
    }

    /// Square the circle is drawn in: centered on the first anchor, side equal
    /// to the anchor distance
    pub fn circle_bounds(&self) -> Rect {
        let d = self.anchor_start.distance(self.anchor_end);
        Rect::new(
            self.anchor_start.x - d / 2.0,
            self.anchor_start.y - d / 2.0,
            d,
            d,
        )
    }

    /// Tight extent of everything this annotation draws, excluding highlights
    pub fn extent(&self) -> Rect {
        match self.kind {
            AnnotationKind::Circle => self.circle_bounds(),
            _ => {
                let anchors = Rect::from_corners(self.anchor_start, self.anchor_end);
                match (&self.text_block, self.kind) {
                    (Some(block), AnnotationKind::ArrowWithText) => anchors.union(&block.frame),
                    _ => anchors,
                }
            }
        }
    }

    pub fn compute_bounding_box(&self) -> BoundingBox {
        BoundingBox::padded(self.extent())
    }

    pub fn intersects_point(&self, p: Point) -> bool {
        self.compute_bounding_box().contains(p)
    }

    /// `[head.x, head.y, tail.x, tail.y]`, the legacy `direction_draw` field
    ///
    /// Routed arrows report the tail before label placement, so readers of the
    /// old format can redo the placement themselves.
    pub fn legacy_direction(&self) -> [f32; 4] {
        let head = self.head();
        let tail = self.routed_tail.unwrap_or_else(|| self.tail());
        [head.x, head.y, tail.x, tail.y]
    }
}
