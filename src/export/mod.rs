//! Writing a tutorial out as a bundle, and reading annotations back

pub mod html;
pub mod json;

use std::path::Path;

use anyhow::Context;

use crate::session::Tutorial;
pub use json::{AnnotationRecord, SlideRecord, TextDict, TutorialRecord};

pub const ANNOTATIONS_FILE: &str = "annotations.json";
pub const TEXT_DICT_FILE: &str = "text_dict_default.json";
pub const LEGACY_FILE: &str = "annotations_old.json";
pub const HTML_FILE: &str = "index.html";

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Write rendered slides, both JSON formats, the text dictionary and the HTML deck
pub fn export_bundle(tutorial: &Tutorial, dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    for (i, slide) in tutorial.slides().iter().enumerate() {
        let path = dir.join(json::image_name(i));
        slide
            .render_plain()
            .save(&path)
            .with_context(|| format!("Failed to save slide image: {}", path.display()))?;
    }

    let (record, texts) = json::build_records(tutorial)?;
    write_json(&dir.join(ANNOTATIONS_FILE), &record)?;
    write_json(&dir.join(TEXT_DICT_FILE), &texts)?;
    write_json(&dir.join(LEGACY_FILE), &json::legacy_document(tutorial))?;

    let html_path = dir.join(HTML_FILE);
    std::fs::write(&html_path, html::render_html(tutorial))
        .with_context(|| format!("Failed to write {}", html_path.display()))?;

    log::info!("Exported {} slides to {}", tutorial.len(), dir.display());
    Ok(())
}

/// Read `annotations.json` and the text dictionary next to it
pub fn read_annotations(path: &Path) -> anyhow::Result<(TutorialRecord, TextDict)> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read annotations: {}", path.display()))?;
    let record: TutorialRecord = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse annotations: {}", path.display()))?;

    let dict_path = path.with_file_name(TEXT_DICT_FILE);
    let texts = match std::fs::read_to_string(&dict_path) {
        Ok(raw) => serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse text dictionary: {}", dict_path.display()))?,
        Err(err) => {
            log::warn!(
                "No text dictionary at {} ({err}), using keys as text",
                dict_path.display()
            );
            TextDict::default()
        }
    };
    Ok((record, texts))
}

/// Restore annotations saved next to `path` onto a loaded tutorial
pub fn restore_annotations(tutorial: &mut Tutorial, path: &Path) -> anyhow::Result<usize> {
    let (record, texts) = read_annotations(path)?;
    json::restore(tutorial, &record, &texts)
        .with_context(|| format!("Failed to restore annotations from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnnotatorConfig;
    use crate::domain::{Annotation, AnnotationKind, PenSettings, Point, Size, WidgetIndex, WidgetRef};
    use crate::session::{Slide, SlideLayout, TutorialInfo};
    use image::RgbaImage;

    fn tutorial() -> Tutorial {
        let widgets = WidgetIndex::new(vec![WidgetRef::new(
            "Main/Apply",
            Point::new(20.0, 20.0),
            Size::new(40.0, 20.0),
        )]);
        let mut tutorial = Tutorial::new(TutorialInfo::default(), AnnotatorConfig::default());
        tutorial.push_step(1, Slide::new(RgbaImage::new(120, 80), widgets));
        tutorial
    }

    #[test]
    fn test_bundle_files_and_restore() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = tutorial();
        {
            let slide = source.slide_mut(0).unwrap();
            let target = slide.widgets().by_path("Main/Apply").unwrap();
            let ann = Annotation::new(AnnotationKind::ClickMark, target, PenSettings::default()).unwrap();
            slide.add_annotation(ann).unwrap();
        }
        export_bundle(&source, dir.path()).unwrap();

        for name in [ANNOTATIONS_FILE, TEXT_DICT_FILE, LEGACY_FILE, HTML_FILE, "slide_1.png"] {
            assert!(dir.path().join(name).exists(), "{name} missing");
        }
        let png = image::open(dir.path().join("slide_1.png")).unwrap();
        assert_eq!((png.width(), png.height()), (120, 80));

        let mut target = tutorial();
        let restored = restore_annotations(&mut target, &dir.path().join(ANNOTATIONS_FILE)).unwrap();
        assert_eq!(restored, 1);
        assert_eq!(target.slide(0).unwrap().annotations()[0].kind, AnnotationKind::ClickMark);
    }

    #[test]
    fn test_restore_after_page_operations() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = tutorial();
        source.insert_blank(1);
        source.add_covers();
        export_bundle(&source, dir.path()).unwrap();

        let mut target = tutorial();
        restore_annotations(&mut target, &dir.path().join(ANNOTATIONS_FILE)).unwrap();
        let codes: Vec<i64> = target.pages().iter().map(|p| p.slide_code()).collect();
        assert_eq!(codes, [-1, 1, -1, -1]);
        assert_eq!(target.slide(0).unwrap().layout, SlideLayout::Cover);
        assert_eq!(target.slide(2).unwrap().layout, SlideLayout::Blank);
        assert_eq!(target.slide(3).unwrap().layout, SlideLayout::Acknowledgements);
        assert_eq!(target.slide(1).unwrap().widgets().len(), 1);
    }

    #[test]
    fn test_missing_text_dict_uses_keys() {
        let dir = tempfile::tempdir().unwrap();
        export_bundle(&tutorial(), dir.path()).unwrap();
        std::fs::remove_file(dir.path().join(TEXT_DICT_FILE)).unwrap();

        let (_, texts) = read_annotations(&dir.path().join(ANNOTATIONS_FILE)).unwrap();
        assert!(texts.is_empty());
        let mut target = tutorial();
        restore_annotations(&mut target, &dir.path().join(ANNOTATIONS_FILE)).unwrap();
        assert_eq!(target.slide(0).unwrap().title, "slide_1_title");
    }
}
