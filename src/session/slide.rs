//! One annotatable screenshot with its widget snapshot and annotations

use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::config::AnnotatorConfig;
use crate::domain::{
    Annotation, LayoutContext, Point, SelectionCycler, Size, WidgetIndex, WidgetRef,
};
use crate::error::{AnnotationError, GeometryError};
use crate::render::image::draw_annotations_in_order;

/// How the exported deck presents a slide
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideLayout {
    #[default]
    Screenshot,
    Cover,
    Acknowledgements,
    Blank,
}

impl SlideLayout {
    pub fn name(self) -> &'static str {
        match self {
            SlideLayout::Screenshot => "Screenshot",
            SlideLayout::Cover => "Cover",
            SlideLayout::Acknowledgements => "Acknowledgements",
            SlideLayout::Blank => "Blank",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Slide {
    background: RgbaImage,
    widgets: WidgetIndex,
    /// Append order, which is also draw order
    annotations: Vec<Annotation>,
    /// Origin of the window the widget coordinates are relative to
    pub window_offset: Point,
    pub title: String,
    pub body: String,
    pub layout: SlideLayout,
    context: LayoutContext,
    rendered: Option<RgbaImage>,
}

impl Slide {
    pub fn new(background: RgbaImage, widgets: WidgetIndex) -> Self {
        let surface = Size::new(background.width() as f32, background.height() as f32);
        Self {
            background,
            widgets,
            annotations: Vec::new(),
            window_offset: Point::ZERO,
            title: String::new(),
            body: String::new(),
            layout: SlideLayout::default(),
            context: LayoutContext::new(surface),
            rendered: None,
        }
    }

    /// White page without widgets
    pub fn blank(size: Size) -> Self {
        let background = RgbaImage::from_pixel(
            size.width.max(1.0) as u32,
            size.height.max(1.0) as u32,
            Rgba([255, 255, 255, 255]),
        );
        let mut slide = Self::new(background, WidgetIndex::default());
        slide.layout = SlideLayout::Blank;
        slide
    }

    /// Same background and widgets, no annotations
    pub fn duplicate(&self) -> Self {
        let mut copy = Self::new(self.background.clone(), self.widgets.clone());
        copy.window_offset = self.window_offset;
        copy.title = self.title.clone();
        copy.body = self.body.clone();
        copy.layout = self.layout;
        copy.context = self.context.clone();
        copy
    }

    /// Pick up label wrapping and placeholder settings
    pub fn apply_config(&mut self, config: &AnnotatorConfig) {
        self.context = LayoutContext::from_config(config, self.image_size());
    }

    pub fn background(&self) -> &RgbaImage {
        &self.background
    }

    pub fn widgets(&self) -> &WidgetIndex {
        &self.widgets
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn image_size(&self) -> Size {
        Size::new(
            self.background.width() as f32,
            self.background.height() as f32,
        )
    }

    /// Lay out `annotation` against this slide without adding it
    pub fn relayout(&self, annotation: &mut Annotation) -> Result<(), GeometryError> {
        annotation.window_offset = self.window_offset;
        annotation.layout(&self.context)
    }

    /// Append an annotation on top of the others
    ///
    /// Nothing is added when its geometry cannot be computed.
    pub fn add_annotation(&mut self, mut annotation: Annotation) -> Result<usize, AnnotationError> {
        if annotation.kind.is_transient() {
            return Err(AnnotationError::TransientKind(annotation.kind));
        }
        self.relayout(&mut annotation)?;
        log::debug!(
            "Adding {:?} on '{}'",
            annotation.kind,
            annotation.target.path
        );
        self.annotations.push(annotation);
        self.rendered = None;
        Ok(self.annotations.len() - 1)
    }

    /// Drop the most recently added annotation
    pub fn remove_last(&mut self) -> Option<Annotation> {
        let removed = self.annotations.pop();
        if removed.is_some() {
            self.rendered = None;
        }
        removed
    }

    pub fn remove(&mut self, index: usize) -> Option<Annotation> {
        if index >= self.annotations.len() {
            return None;
        }
        self.rendered = None;
        Some(self.annotations.remove(index))
    }

    pub fn clear_annotations(&mut self) {
        self.annotations.clear();
        self.rendered = None;
    }

    /// Mark exactly one annotation (or none) as selected
    pub fn set_highlighted(&mut self, index: Option<usize>) {
        for (i, ann) in self.annotations.iter_mut().enumerate() {
            ann.highlighted = Some(i) == index;
        }
        self.rendered = None;
    }

    /// Indices of annotations under `p`, largest bounding box first
    ///
    /// Equal areas keep insertion order.
    pub fn hit_test_annotations(&self, p: Point) -> Vec<usize> {
        let mut hits: Vec<(usize, f32)> = self
            .annotations
            .iter()
            .enumerate()
            .filter(|(_, ann)| ann.intersects_point(p))
            .map(|(i, ann)| (i, ann.compute_bounding_box().area()))
            .collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1));
        hits.into_iter().map(|(i, _)| i).collect()
    }

    /// Widgets under an image point, outermost first
    pub fn hit_test_widgets(&self, p: Point) -> Vec<Arc<WidgetRef>> {
        self.widgets.find_at(p + self.window_offset)
    }

    /// The widget the cycler currently points at under `p`
    pub fn select_widget(
        &self,
        p: Point,
        cycler: &SelectionCycler,
    ) -> Result<Arc<WidgetRef>, AnnotationError> {
        self.widgets
            .select_at(p + self.window_offset, cycler.raw_depth())
    }

    /// Draw background, annotations in order, then the preview on top
    pub fn render(&mut self, preview: Option<&Annotation>) -> &RgbaImage {
        let mut img = self.background.clone();
        draw_annotations_in_order(&mut img, &self.annotations, preview);
        self.rendered.insert(img)
    }

    /// Render for export: committed annotations without selection frames
    pub fn render_plain(&self) -> RgbaImage {
        let mut img = self.background.clone();
        let plain: Vec<Annotation> = self
            .annotations
            .iter()
            .cloned()
            .map(|mut ann| {
                ann.highlighted = false;
                ann
            })
            .collect();
        draw_annotations_in_order(&mut img, &plain, None);
        img
    }

    /// Last rendered surface, or the bare background before any render
    pub fn last_render(&self) -> &RgbaImage {
        self.rendered.as_ref().unwrap_or(&self.background)
    }

    /// Scale the last rendered surface; no re-layout happens
    ///
    /// With `keep_aspect` the result fits inside `target` without distortion.
    /// A non-positive target returns the surface unscaled.
    pub fn resize(&self, target: Size, keep_aspect: bool) -> RgbaImage {
        let source = self.last_render();
        if target.width <= 0.0 || target.height <= 0.0 {
            return source.clone();
        }
        let (w, h) = if keep_aspect {
            let ratio = (target.width / source.width() as f32)
                .min(target.height / source.height() as f32);
            (
                source.width() as f32 * ratio,
                source.height() as f32 * ratio,
            )
        } else {
            (target.width, target.height)
        };
        imageops::resize(
            source,
            (w.round() as u32).max(1),
            (h.round() as u32).max(1),
            FilterType::Triangle,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnnotationKind, PenSettings};

    fn slide() -> Slide {
        let widgets = WidgetIndex::new(vec![
            WidgetRef::new("big", Point::new(0.0, 0.0), Size::new(190.0, 140.0)),
            WidgetRef::new("mid", Point::new(20.0, 20.0), Size::new(90.0, 60.0)),
            WidgetRef::new("small", Point::new(40.0, 40.0), Size::new(20.0, 10.0)),
        ]);
        Slide::new(RgbaImage::new(200, 150), widgets)
    }

    fn add(slide: &mut Slide, path: &str) -> usize {
        let target = slide.widgets().by_path(path).unwrap();
        let ann = Annotation::new(AnnotationKind::Rectangle, target, PenSettings::default()).unwrap();
        slide.add_annotation(ann).unwrap()
    }

    #[test]
    fn test_hit_test_orders_by_area() {
        let mut slide = slide();
        add(&mut slide, "mid");
        add(&mut slide, "small");
        add(&mut slide, "big");
        // Areas (padded) are big > mid > small regardless of insertion order
        assert_eq!(slide.hit_test_annotations(Point::new(45.0, 45.0)), [2, 0, 1]);
        assert!(slide.hit_test_annotations(Point::new(300.0, 300.0)).is_empty());
    }

    #[test]
    fn test_hit_test_ties_keep_insertion_order() {
        let mut slide = slide();
        add(&mut slide, "small");
        add(&mut slide, "small");
        assert_eq!(slide.hit_test_annotations(Point::new(45.0, 45.0)), [0, 1]);
    }

    #[test]
    fn test_window_offset_applies() {
        let mut slide = slide();
        slide.window_offset = Point::new(20.0, 20.0);
        let paths: Vec<_> = slide
            .hit_test_widgets(Point::new(25.0, 25.0))
            .iter()
            .map(|w| w.path.clone())
            .collect();
        assert_eq!(paths, ["big", "mid", "small"]);

        let idx = add(&mut slide, "small");
        let ann = &slide.annotations()[idx];
        assert_eq!(ann.window_offset, Point::new(20.0, 20.0));
        assert_eq!(ann.anchor_start, Point::new(20.0, 20.0));
    }

    #[test]
    fn test_failed_layout_adds_nothing() {
        let mut slide = Slide::new(
            RgbaImage::new(100, 100),
            WidgetIndex::new(vec![WidgetRef::new("line", Point::ZERO, Size::new(50.0, 0.0))]),
        );
        let target = slide.widgets().by_path("line").unwrap();
        let ann = Annotation::new(AnnotationKind::ArrowWithText, target, PenSettings::default()).unwrap();
        assert!(matches!(
            slide.add_annotation(ann),
            Err(AnnotationError::Geometry(GeometryError::DegenerateRect { .. }))
        ));
        assert!(slide.annotations().is_empty());
    }

    #[test]
    fn test_remove_last_and_select() {
        let mut slide = slide();
        add(&mut slide, "big");
        add(&mut slide, "small");
        slide.set_highlighted(Some(1));
        assert!(slide.annotations()[1].highlighted);
        assert_eq!(slide.remove_last().unwrap().target.path, "small");
        assert_eq!(slide.remove(0).unwrap().target.path, "big");
        assert!(slide.remove_last().is_none());
    }

    #[test]
    fn test_render_and_resize() {
        let mut slide = slide();
        add(&mut slide, "mid");
        let rendered = slide.render(None).clone();
        assert_ne!(rendered, *slide.background());

        let scaled = slide.resize(Size::new(100.0, 100.0), true);
        assert_eq!((scaled.width(), scaled.height()), (100, 75));
        let stretched = slide.resize(Size::new(100.0, 100.0), false);
        assert_eq!((stretched.width(), stretched.height()), (100, 100));
        let unscaled = slide.resize(Size::new(0.0, 50.0), false);
        assert_eq!((unscaled.width(), unscaled.height()), (200, 150));
    }

    #[test]
    fn test_plain_render_skips_selection() {
        let mut slide = slide();
        add(&mut slide, "mid");
        let plain = slide.render_plain();
        slide.set_highlighted(Some(0));
        assert_eq!(slide.render_plain(), plain);
        assert_ne!(*slide.render(None), plain);
    }

    #[test]
    fn test_duplicate_is_empty() {
        let mut slide = slide();
        slide.title = "Step".to_string();
        add(&mut slide, "mid");
        let copy = slide.duplicate();
        assert!(copy.annotations().is_empty());
        assert_eq!(copy.widgets().len(), 3);
        assert_eq!(copy.title, "Step");
    }
}
