use image::RgbaImage;

use crate::config::AnnotatorConfig;
use crate::domain::{
    Annotation, AnnotationKind, PenSettings, Point, SelectionCycler, Size, screen_to_image,
};
use crate::session::Slide;

/// Interactive state for annotating one slide at a time
///
/// Holds the tool, the pen and the live preview. The slide itself is passed
/// to every handler so the same annotator can move between slides.
#[derive(Clone, Debug)]
pub struct Annotator {
    pub(super) tool: Option<AnnotationKind>,
    pub(super) last_tool: AnnotationKind,
    pub(super) preview: Option<Annotation>,
    /// Last pointer position in image space
    pub(super) cursor: Option<Point>,
    pub(super) cycler: SelectionCycler,
    pub(super) selected: Option<usize>,
    pub(super) viewport: Option<Size>,
    pub pen: PenSettings,
    pub filled: bool,
    pub text: String,
    pub offset: Point,
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(&AnnotatorConfig::default())
    }
}

impl Annotator {
    pub fn new(config: &AnnotatorConfig) -> Self {
        Self {
            tool: None,
            last_tool: config.default_tool,
            preview: None,
            cursor: None,
            cycler: SelectionCycler::new(config.wheel_threshold),
            selected: None,
            viewport: None,
            pen: PenSettings::from(config),
            filled: config.filled,
            text: String::new(),
            offset: Point::ZERO,
        }
    }

    /// Armed kind, or `Selecting`/`Selected` when no tool is armed
    pub fn mode(&self) -> AnnotationKind {
        match (self.tool, self.selected) {
            (Some(kind), _) => kind,
            (None, Some(_)) => AnnotationKind::Selected,
            (None, None) => AnnotationKind::Selecting,
        }
    }

    pub fn tool(&self) -> Option<AnnotationKind> {
        self.tool
    }

    pub fn preview(&self) -> Option<&Annotation> {
        self.preview.as_ref()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn cycler(&self) -> &SelectionCycler {
        &self.cycler
    }

    /// Map a screen position onto `slide`'s image
    pub(super) fn to_image(&self, slide: &Slide, x: f32, y: f32) -> Option<Point> {
        let point = Point::new(x, y);
        let Some(viewport) = self.viewport else {
            return Some(point);
        };
        match screen_to_image(point, viewport, slide.image_size()) {
            Ok(p) => Some(p),
            Err(err) => {
                log::warn!("Ignoring pointer event: {err}");
                None
            }
        }
    }

    /// Rebuild the preview for the widget under the cursor
    pub(super) fn refresh_preview(&mut self, slide: &Slide) {
        self.preview = None;
        let (Some(kind), Some(cursor)) = (self.tool, self.cursor) else {
            return;
        };
        let target = match slide.select_widget(cursor, &self.cycler) {
            Ok(target) => target,
            Err(err) => {
                log::debug!("No preview: {err}");
                return;
            }
        };

        let mut ann = match Annotation::new(kind, target, self.pen) {
            Ok(ann) => ann.with_text(self.text.clone()).with_filled(self.filled),
            Err(err) => {
                log::warn!("Cannot preview {kind:?}: {err}");
                return;
            }
        };
        if kind.capabilities().wants_offset_helper {
            ann.set_offset(self.offset);
        }
        ann.set_optional_anchor(cursor);

        match slide.relayout(&mut ann) {
            Ok(()) => self.preview = Some(ann),
            Err(err) => log::debug!("No preview on '{}': {err}", ann.target.path),
        }
    }

    /// Render committed annotations with the preview on top
    pub fn frame<'a>(&self, slide: &'a mut Slide) -> &'a RgbaImage {
        slide.render(self.preview.as_ref())
    }
}
