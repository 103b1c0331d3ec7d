//! Image rendering for annotations using tiny-skia
//!
//! These functions draw annotations onto an RgbaImage in image pixel space.

use image::RgbaImage;
use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform,
};

use super::font::BitmapFont;
use super::geometry::{self, arrow, highlight, shape};
use crate::config::PenColor;
use crate::domain::{Annotation, AnnotationKind, Point, Rect, TextBlock};

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = (img.width(), img.height());
    let Some(size) = tiny_skia::IntSize::from_wh(w, h) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(img.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    // Copy back
    img.copy_from_slice(pixmap.data());
}

fn paint(color: PenColor) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn stroke(width: f32) -> Stroke {
    Stroke {
        width: width.max(1.0),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

/// Shaft from tail to head plus a closed triangular head on `head`
fn build_arrow_paths(head: Point, tail: Point) -> Option<(tiny_skia::Path, tiny_skia::Path)> {
    let (p1, p2) = arrow::head_points(head, tail)?;

    let mut shaft = PathBuilder::new();
    shaft.move_to(tail.x, tail.y);
    shaft.line_to(head.x, head.y);

    let mut tip = PathBuilder::new();
    tip.move_to(head.x, head.y);
    tip.line_to(p1.x, p1.y);
    tip.line_to(p2.x, p2.y);
    tip.close();

    Some((shaft.finish()?, tip.finish()?))
}

/// Build an ellipse path using cubic bezier curves
fn build_ellipse_path(cx: f32, cy: f32, rx: f32, ry: f32) -> Option<tiny_skia::Path> {
    let kx = rx * shape::BEZIER_K;
    let ky = ry * shape::BEZIER_K;

    let mut pb = PathBuilder::new();

    // Start at top
    pb.move_to(cx, cy - ry);

    // Top to right
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);

    // Right to bottom
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);

    // Bottom to left
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);

    // Left to top
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);

    pb.close();
    pb.finish()
}

fn build_rect_path(rect: &Rect) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(rect.x, rect.y);
    pb.line_to(rect.right(), rect.y);
    pb.line_to(rect.right(), rect.bottom());
    pb.line_to(rect.x, rect.bottom());
    pb.close();
    pb.finish()
}

fn build_polygon_path(points: &[Point]) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    pb.close();
    pb.finish()
}

/// Outline or fill a closed shape in the annotation's pen
fn draw_shape(pixmap: &mut Pixmap, path: &tiny_skia::Path, ann: &Annotation) {
    let paint = paint(ann.pen.color);
    if ann.filled {
        pixmap.fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);
    } else {
        pixmap.stroke_path(
            path,
            &paint,
            &stroke(ann.pen.thickness as f32),
            Transform::identity(),
            None,
        );
    }
}

fn fill_frame(pixmap: &mut Pixmap, frame: &Rect, color: PenColor) {
    if let Some(rect) = tiny_skia::Rect::from_xywh(frame.x, frame.y, frame.width, frame.height) {
        pixmap.fill_rect(rect, &paint(color), Transform::identity(), None);
    }
}

fn draw_arrow(pixmap: &mut Pixmap, ann: &Annotation) {
    let Some((shaft, tip)) = build_arrow_paths(ann.head(), ann.tail()) else {
        return;
    };
    let paint = paint(ann.pen.color);
    let width = ann.pen.thickness as f32;
    pixmap.stroke_path(&shaft, &paint, &stroke(width), Transform::identity(), None);
    pixmap.fill_path(&tip, &paint, FillRule::Winding, Transform::identity(), None);
    pixmap.stroke_path(&tip, &paint, &stroke(width), Transform::identity(), None);
}

fn draw_click_mark(pixmap: &mut Pixmap, at: Point) {
    let Some(path) = build_polygon_path(&geometry::cursor_polygon(at)) else {
        return;
    };
    pixmap.fill_path(
        &path,
        &paint(PenColor::WHITE),
        FillRule::Winding,
        Transform::identity(),
        None,
    );
    pixmap.stroke_path(
        &path,
        &paint(PenColor::BLACK),
        &stroke(1.5),
        Transform::identity(),
        None,
    );
}

/// Vector part of one annotation (everything but glyphs)
fn draw_shapes(pixmap: &mut Pixmap, ann: &Annotation) {
    match ann.kind {
        AnnotationKind::Rectangle => {
            let rect = Rect::from_corners(ann.anchor_start, ann.anchor_end);
            if let Some(path) = build_rect_path(&rect) {
                draw_shape(pixmap, &path, ann);
            }
        }
        AnnotationKind::Circle => {
            let b = ann.circle_bounds();
            let (cx, cy, rx, ry) = geometry::ellipse_from_bounds(b.x, b.y, b.right(), b.bottom());
            if let Some(path) = build_ellipse_path(cx, cy, rx, ry) {
                draw_shape(pixmap, &path, ann);
            }
        }
        AnnotationKind::Arrow => draw_arrow(pixmap, ann),
        AnnotationKind::ArrowWithText => {
            if let Some(block) = ann.text_block() {
                fill_frame(pixmap, &block.frame, ann.pen.color);
            }
            draw_arrow(pixmap, ann);
        }
        AnnotationKind::TextBox => {
            if let Some(block) = ann.text_block() {
                fill_frame(pixmap, &block.frame, ann.pen.color);
            }
        }
        AnnotationKind::ClickMark => draw_click_mark(pixmap, ann.anchor_start),
        AnnotationKind::Selecting | AnnotationKind::Selected => {}
    }
}

/// White outline of the target while previewing, green dashes when selected
fn draw_highlights(pixmap: &mut Pixmap, ann: &Annotation) {
    if !ann.persistent
        && ann.kind != AnnotationKind::Rectangle
        && let Some(path) = build_rect_path(&ann.target_rect())
    {
        pixmap.stroke_path(
            &path,
            &paint(PenColor::WHITE),
            &stroke(highlight::TARGET_WIDTH),
            Transform::identity(),
            None,
        );
    }

    if ann.highlighted
        && let Some(path) = build_rect_path(&ann.compute_bounding_box().rect())
    {
        let mut dashed = stroke(highlight::SELECTION_WIDTH);
        dashed.line_cap = LineCap::Butt;
        dashed.dash = StrokeDash::new(highlight::SELECTION_DASH.to_vec(), 0.0);
        pixmap.stroke_path(
            &path,
            &paint(PenColor::SELECTION),
            &dashed,
            Transform::identity(),
            None,
        );
    }
}

fn draw_text(img: &mut RgbaImage, block: &TextBlock, font_size: u32) {
    BitmapFont::new(font_size).draw_lines(
        img,
        block.origin,
        &block.lines,
        PenColor::BLACK,
        block.line_spacing,
    );
}

/// Draw one annotation: shapes, text, then highlights on top
pub fn draw_annotation(img: &mut RgbaImage, ann: &Annotation) {
    with_pixmap(img, |pixmap| draw_shapes(pixmap, ann));
    if let Some(block) = ann.text_block() {
        draw_text(img, block, ann.pen.font_size);
    }
    if !ann.persistent || ann.highlighted {
        with_pixmap(img, |pixmap| draw_highlights(pixmap, ann));
    }
}

/// Draw all annotations in order, later ones on top, then the optional preview
///
/// A preview is just one more annotation that is not persistent yet.
pub fn draw_annotations_in_order(
    img: &mut RgbaImage,
    annotations: &[Annotation],
    preview: Option<&Annotation>,
) {
    for ann in annotations.iter().chain(preview) {
        draw_annotation(img, ann);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{LayoutContext, PenSettings, Size, WidgetRef};
    use image::Rgba;

    const GREY: Rgba<u8> = Rgba([128, 128, 128, 255]);

    fn laid_out(kind: AnnotationKind, filled: bool) -> Annotation {
        let target = Arc::new(WidgetRef::new(
            "w",
            Point::new(40.0, 40.0),
            Size::new(60.0, 30.0),
        ));
        let mut ann = Annotation::new(kind, target, PenSettings::default())
            .unwrap()
            .with_filled(filled);
        ann.set_optional_anchor(Point::new(150.0, 100.0));
        ann.layout(&LayoutContext::new(Size::new(200.0, 150.0))).unwrap();
        ann.confirm();
        ann
    }

    #[test]
    fn test_filled_rectangle_covers_target() {
        let mut img = RgbaImage::from_pixel(200, 150, GREY);
        draw_annotations_in_order(&mut img, &[laid_out(AnnotationKind::Rectangle, true)], None);
        assert_eq!(img.get_pixel(70, 55).0, PenColor::default().to_rgba_u8());
        assert_eq!(*img.get_pixel(10, 10), GREY);
    }

    #[test]
    fn test_outline_leaves_inside_untouched() {
        let mut img = RgbaImage::from_pixel(200, 150, GREY);
        draw_annotations_in_order(&mut img, &[laid_out(AnnotationKind::Rectangle, false)], None);
        assert_eq!(*img.get_pixel(70, 55), GREY);
        assert_eq!(img.get_pixel(70, 40).0, PenColor::default().to_rgba_u8());
    }

    #[test]
    fn test_every_kind_draws_something() {
        for kind in AnnotationKind::DRAWABLE {
            let mut img = RgbaImage::from_pixel(200, 150, GREY);
            draw_annotation(&mut img, &laid_out(kind, false));
            assert!(img.pixels().any(|p| *p != GREY), "{kind:?} drew nothing");
        }
    }

    #[test]
    fn test_preview_outlines_target() {
        let mut preview = laid_out(AnnotationKind::ClickMark, false);
        preview.persistent = false;
        let mut img = RgbaImage::from_pixel(200, 150, GREY);
        draw_annotations_in_order(&mut img, &[], Some(&preview));
        assert_eq!(img.get_pixel(70, 40).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_selection_frame() {
        let mut ann = laid_out(AnnotationKind::ClickMark, false);
        ann.highlighted = true;
        let mut img = RgbaImage::from_pixel(200, 150, GREY);
        draw_annotation(&mut img, &ann);
        let bbox = ann.compute_bounding_box().rect();
        let green = (bbox.x as u32..bbox.right() as u32)
            .any(|x| img.get_pixel(x, bbox.y as u32).0 == [0, 255, 0, 255]);
        assert!(green);
    }
}
