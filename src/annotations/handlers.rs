//! Annotator message handlers
//!
//! Each handler returns true when the slide needs a redraw.

use super::messages::{DrawMsg, KeyPress, PointerAction};
use super::state::Annotator;
use crate::domain::{AnnotationKind, Point, WheelDirection};
use crate::session::Slide;

/// Apply one input message to the annotator and the slide it is working on
pub fn handle_draw_msg(annotator: &mut Annotator, slide: &mut Slide, msg: DrawMsg) -> bool {
    match msg {
        DrawMsg::Arm(kind) => arm(annotator, slide, kind),
        DrawMsg::Disarm => disarm(annotator, slide),
        DrawMsg::ModeToggle => match annotator.tool {
            Some(_) => disarm(annotator, slide),
            None => {
                let kind = annotator.last_tool;
                arm(annotator, slide, kind)
            }
        },
        DrawMsg::Pointer(action) => handle_pointer(annotator, slide, action),
        DrawMsg::Wheel(direction) => handle_wheel(annotator, slide, direction),
        DrawMsg::Key(key) => handle_key(annotator, slide, key),
        DrawMsg::SetText(text) => {
            annotator.text = text;
            refresh(annotator, slide)
        }
        DrawMsg::SetPen(pen) => {
            annotator.pen = pen;
            refresh(annotator, slide)
        }
        DrawMsg::SetFilled(filled) => {
            annotator.filled = filled;
            refresh(annotator, slide)
        }
        DrawMsg::SetOffset(offset) => {
            annotator.offset = offset;
            refresh(annotator, slide)
        }
        DrawMsg::Viewport(viewport) => {
            annotator.viewport = viewport;
            false
        }
    }
}

// ============================================================================
// Tool handlers
// ============================================================================

fn arm(annotator: &mut Annotator, slide: &mut Slide, kind: AnnotationKind) -> bool {
    if kind.is_transient() {
        log::warn!("{kind:?} is not a drawing tool");
        return false;
    }
    log::debug!("Armed {kind:?}");
    annotator.tool = Some(kind);
    annotator.last_tool = kind;
    unselect(annotator, slide);
    refresh(annotator, slide)
}

fn disarm(annotator: &mut Annotator, slide: &mut Slide) -> bool {
    annotator.tool = None;
    annotator.preview = None;
    annotator.cycler.reset();
    unselect(annotator, slide);
    true
}

fn unselect(annotator: &mut Annotator, slide: &mut Slide) {
    if annotator.selected.take().is_some() {
        slide.set_highlighted(None);
    }
}

fn refresh(annotator: &mut Annotator, slide: &Slide) -> bool {
    if annotator.tool.is_none() {
        return false;
    }
    annotator.refresh_preview(slide);
    true
}

// ============================================================================
// Pointer handlers
// ============================================================================

fn handle_pointer(annotator: &mut Annotator, slide: &mut Slide, action: PointerAction) -> bool {
    match action {
        PointerAction::Move(x, y) => {
            let Some(point) = annotator.to_image(slide, x, y) else {
                return false;
            };
            annotator.cursor = Some(point);
            // Moving starts over from the innermost widget
            annotator.cycler.reset();
            refresh(annotator, slide)
        }
        PointerAction::Press(x, y) => {
            let Some(point) = annotator.to_image(slide, x, y) else {
                return false;
            };
            if annotator.tool.is_none() {
                return pick(annotator, slide, point);
            }
            if annotator.cursor != Some(point) {
                annotator.cursor = Some(point);
                annotator.refresh_preview(slide);
            }
            commit(annotator, slide)
        }
    }
}

fn commit(annotator: &mut Annotator, slide: &mut Slide) -> bool {
    let Some(mut ann) = annotator.preview.take() else {
        return false;
    };
    ann.confirm();
    match slide.add_annotation(ann) {
        Ok(index) => {
            log::debug!("Committed annotation {index}");
            true
        }
        Err(err) => {
            log::warn!("Annotation not added: {err}");
            false
        }
    }
}

/// Select the top annotation under the pointer, or clear the selection
fn pick(annotator: &mut Annotator, slide: &mut Slide, point: Point) -> bool {
    let hit = slide.hit_test_annotations(point).first().copied();
    if hit == annotator.selected {
        return false;
    }
    annotator.selected = hit;
    slide.set_highlighted(hit);
    true
}

// ============================================================================
// Stack cycling
// ============================================================================

fn handle_wheel(annotator: &mut Annotator, slide: &mut Slide, direction: WheelDirection) -> bool {
    if annotator.tool.is_none() || !annotator.cycler.cycle_debounced(direction) {
        return false;
    }
    settle_and_refresh(annotator, slide)
}

fn step(annotator: &mut Annotator, slide: &mut Slide, delta: isize) -> bool {
    if annotator.tool.is_none() {
        return false;
    }
    annotator.cycler.cycle(delta);
    settle_and_refresh(annotator, slide)
}

fn settle_and_refresh(annotator: &mut Annotator, slide: &mut Slide) -> bool {
    if let Some(cursor) = annotator.cursor {
        let count = slide.hit_test_widgets(cursor).len();
        annotator.cycler.settle(count);
    }
    refresh(annotator, slide)
}

// ============================================================================
// Keyboard
// ============================================================================

fn handle_key(annotator: &mut Annotator, slide: &mut Slide, key: KeyPress) -> bool {
    match key {
        KeyPress::Escape => disarm(annotator, slide),
        KeyPress::Undo => {
            if slide.remove_last().is_none() {
                return false;
            }
            if annotator
                .selected
                .is_some_and(|i| i >= slide.annotations().len())
            {
                annotator.selected = None;
            }
            true
        }
        KeyPress::Delete => {
            let Some(index) = annotator.selected.take() else {
                return false;
            };
            slide.remove(index).is_some()
        }
        KeyPress::Up => step(annotator, slide, -1),
        KeyPress::Down => step(annotator, slide, 1),
        KeyPress::Left | KeyPress::Right => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Size, WidgetIndex, WidgetRef};
    use image::RgbaImage;

    fn slide() -> Slide {
        let widgets = WidgetIndex::new(vec![
            WidgetRef::new("big", Point::new(0.0, 0.0), Size::new(190.0, 140.0)),
            WidgetRef::new("mid", Point::new(20.0, 20.0), Size::new(90.0, 60.0)),
            WidgetRef::new("small", Point::new(40.0, 40.0), Size::new(20.0, 10.0)),
        ]);
        Slide::new(RgbaImage::new(200, 150), widgets)
    }

    fn send(annotator: &mut Annotator, slide: &mut Slide, msg: DrawMsg) -> bool {
        handle_draw_msg(annotator, slide, msg)
    }

    fn hover(annotator: &mut Annotator, slide: &mut Slide, x: f32, y: f32) {
        send(annotator, slide, DrawMsg::Pointer(PointerAction::Move(x, y)));
    }

    fn click(annotator: &mut Annotator, slide: &mut Slide, x: f32, y: f32) -> bool {
        send(annotator, slide, DrawMsg::Pointer(PointerAction::Press(x, y)))
    }

    fn preview_path(annotator: &Annotator) -> Option<String> {
        annotator.preview().map(|a| a.target.path.clone())
    }

    #[test]
    fn test_move_previews_and_press_commits() {
        let mut slide = slide();
        let mut annotator = Annotator::default();
        assert_eq!(annotator.mode(), AnnotationKind::Selecting);

        send(&mut annotator, &mut slide, DrawMsg::Arm(AnnotationKind::Rectangle));
        hover(&mut annotator, &mut slide, 45.0, 45.0);
        let preview = annotator.preview().unwrap();
        assert!(!preview.persistent);
        assert_eq!(preview.target.path, "small");
        assert!(slide.annotations().is_empty());

        assert!(click(&mut annotator, &mut slide, 45.0, 45.0));
        assert_eq!(slide.annotations().len(), 1);
        assert!(slide.annotations()[0].persistent);
        assert!(annotator.preview().is_none());
    }

    #[test]
    fn test_wheel_walks_outwards_after_threshold() {
        let mut slide = slide();
        let mut annotator = Annotator::default();
        send(&mut annotator, &mut slide, DrawMsg::Arm(AnnotationKind::Circle));
        hover(&mut annotator, &mut slide, 45.0, 45.0);

        for _ in 0..4 {
            assert!(!send(&mut annotator, &mut slide, DrawMsg::Wheel(WheelDirection::Down)));
        }
        assert!(send(&mut annotator, &mut slide, DrawMsg::Wheel(WheelDirection::Down)));
        assert_eq!(preview_path(&annotator).as_deref(), Some("mid"));

        // Past the outermost widget the depth stays put
        send(&mut annotator, &mut slide, DrawMsg::Key(KeyPress::Down));
        send(&mut annotator, &mut slide, DrawMsg::Key(KeyPress::Down));
        assert_eq!(preview_path(&annotator).as_deref(), Some("big"));
        send(&mut annotator, &mut slide, DrawMsg::Key(KeyPress::Up));
        assert_eq!(preview_path(&annotator).as_deref(), Some("mid"));

        // Moving starts from the innermost widget again
        hover(&mut annotator, &mut slide, 46.0, 45.0);
        assert_eq!(preview_path(&annotator).as_deref(), Some("small"));
    }

    #[test]
    fn test_undo_and_escape() {
        let mut slide = slide();
        let mut annotator = Annotator::default();
        send(&mut annotator, &mut slide, DrawMsg::Arm(AnnotationKind::ClickMark));
        click(&mut annotator, &mut slide, 45.0, 45.0);
        click(&mut annotator, &mut slide, 25.0, 25.0);
        assert_eq!(slide.annotations().len(), 2);

        assert!(send(&mut annotator, &mut slide, DrawMsg::Key(KeyPress::Undo)));
        assert_eq!(slide.annotations().len(), 1);
        assert_eq!(slide.annotations()[0].target.path, "small");

        send(&mut annotator, &mut slide, DrawMsg::Key(KeyPress::Escape));
        assert!(annotator.tool().is_none());
        assert!(annotator.preview().is_none());
        assert!(!send(&mut annotator, &mut slide, DrawMsg::Key(KeyPress::Left)));
    }

    #[test]
    fn test_pick_highlights_and_delete_removes() {
        let mut slide = slide();
        let mut annotator = Annotator::default();
        send(&mut annotator, &mut slide, DrawMsg::Arm(AnnotationKind::Rectangle));
        click(&mut annotator, &mut slide, 45.0, 45.0);
        click(&mut annotator, &mut slide, 25.0, 25.0);
        send(&mut annotator, &mut slide, DrawMsg::Disarm);

        // Both rectangles are under the point, the larger one wins
        assert!(click(&mut annotator, &mut slide, 45.0, 45.0));
        assert_eq!(annotator.selected(), Some(1));
        assert_eq!(annotator.mode(), AnnotationKind::Selected);
        assert!(slide.annotations()[1].highlighted);
        assert!(!slide.annotations()[0].highlighted);

        assert!(send(&mut annotator, &mut slide, DrawMsg::Key(KeyPress::Delete)));
        assert_eq!(slide.annotations().len(), 1);
        assert_eq!(slide.annotations()[0].target.path, "small");
        assert!(!send(&mut annotator, &mut slide, DrawMsg::Key(KeyPress::Delete)));
    }

    #[test]
    fn test_viewport_maps_screen_to_image() {
        let mut slide = slide();
        let mut annotator = Annotator::default();
        send(&mut annotator, &mut slide, DrawMsg::Viewport(Some(Size::new(100.0, 75.0))));
        send(&mut annotator, &mut slide, DrawMsg::Arm(AnnotationKind::Rectangle));
        hover(&mut annotator, &mut slide, 22.5, 22.5);
        assert_eq!(preview_path(&annotator).as_deref(), Some("small"));
    }

    #[test]
    fn test_mode_toggle_and_frame() {
        let mut slide = slide();
        let mut annotator = Annotator::default();
        send(&mut annotator, &mut slide, DrawMsg::ModeToggle);
        assert_eq!(annotator.tool(), Some(AnnotationKind::ArrowWithText));
        send(&mut annotator, &mut slide, DrawMsg::SetText("Press here".to_string()));
        hover(&mut annotator, &mut slide, 45.0, 45.0);
        let preview = annotator.preview().unwrap();
        assert!(preview.text_block().is_some());

        let background = slide.background().clone();
        assert_ne!(*annotator.frame(&mut slide), background);

        send(&mut annotator, &mut slide, DrawMsg::ModeToggle);
        assert!(annotator.tool().is_none());
        assert!(!send(&mut annotator, &mut slide, DrawMsg::Arm(AnnotationKind::Selected)));
    }
}
