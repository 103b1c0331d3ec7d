//! `annotations.json`, its text dictionary and the legacy flattened format

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::domain::{Annotation, AnnotationKind, PenSettings, Point};
use crate::error::{AnnotationError, DataError};
use crate::session::{SlideLayout, Tutorial, TutorialInfo};

/// `custom` marker for filled shapes
const CUSTOM_FILLED: &str = "filled";
/// Font size the legacy format writes for kinds without text
const LEGACY_FONT_SIZE: &str = "14";

/// Generated text key -> literal text, in insertion order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextDict(Map<String, Value>);

impl TextDict {
    /// Store `text` under `key` and hand the key back
    pub fn insert(&mut self, key: String, text: &str) -> String {
        self.0.insert(key.clone(), Value::String(text.to_string()));
        key
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Text behind `key`, or `key` itself when it is not a known key
    pub fn resolve<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key).unwrap_or(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(rename = "widgetPath")]
    pub widget_path: String,
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    pub offset: Point,
    pub optional: Point,
    #[serde(default)]
    pub custom: String,
    #[serde(rename = "penSettings")]
    pub pen_settings: PenSettings,
    /// Text key
    #[serde(default)]
    pub text: String,
}

impl AnnotationRecord {
    fn from_annotation(ann: &Annotation, text_key: String) -> Result<Self, AnnotationError> {
        if ann.kind.is_transient() {
            return Err(AnnotationError::TransientKind(ann.kind));
        }
        Ok(Self {
            widget_path: ann.target.path.clone(),
            kind: ann.kind,
            offset: ann.offset,
            optional: ann.optional_anchor,
            custom: if ann.filled {
                CUSTOM_FILLED.to_string()
            } else {
                String::new()
            },
            pen_settings: ann.pen,
            text: text_key,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SlideRecord {
    pub image_path: String,
    pub slide_code: i64,
    pub slide_layout: SlideLayout,
    /// Text key
    pub slide_title: String,
    /// Text key
    pub slide_desc: String,
    pub annotations: Vec<AnnotationRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TutorialRecord {
    #[serde(flatten)]
    pub info: TutorialInfo,
    pub slides: Vec<SlideRecord>,
}

pub fn image_name(index: usize) -> String {
    format!("slide_{}.png", index + 1)
}

fn slide_key(index: usize, field: &str) -> String {
    format!("slide_{}_{field}", index + 1)
}

fn annotation_key(slide: usize, index: usize) -> String {
    format!("slide_{}_annotation_{}", slide + 1, index + 1)
}

/// Build the `annotations.json` document and the text it refers to
pub fn build_records(tutorial: &Tutorial) -> Result<(TutorialRecord, TextDict), AnnotationError> {
    let mut texts = TextDict::default();
    let mut slides = Vec::with_capacity(tutorial.len());

    for (i, (slide, page)) in tutorial.slides().iter().zip(tutorial.pages()).enumerate() {
        let annotations = slide
            .annotations()
            .iter()
            .enumerate()
            .map(|(j, ann)| {
                let key = texts.insert(annotation_key(i, j), &ann.text);
                AnnotationRecord::from_annotation(ann, key)
            })
            .collect::<Result<Vec<_>, _>>()?;

        slides.push(SlideRecord {
            image_path: image_name(i),
            slide_code: page.slide_code(),
            slide_layout: slide.layout,
            slide_title: texts.insert(slide_key(i, "title"), &slide.title),
            slide_desc: texts.insert(slide_key(i, "desc"), &slide.body),
            annotations,
        });
    }

    let record = TutorialRecord {
        info: tutorial.info.clone(),
        slides,
    };
    Ok((record, texts))
}

/// Rebuild the deck, its texts and annotations from a saved document
///
/// Pages follow the document's slide codes and layouts, so inserted, duplicated
/// and cover pages come back. Returns the number of annotations restored.
pub fn restore(
    tutorial: &mut Tutorial,
    record: &TutorialRecord,
    texts: &TextDict,
) -> Result<usize, AnnotationError> {
    let pages: Vec<_> = record
        .slides
        .iter()
        .map(|saved| (saved.slide_code, saved.slide_layout))
        .collect();
    tutorial.rebuild_pages(&pages)?;

    let mut restored = 0;
    for (slide, saved) in tutorial.slides_mut().zip(&record.slides) {
        slide.title = texts.resolve(&saved.slide_title).to_string();
        slide.body = texts.resolve(&saved.slide_desc).to_string();

        for ann in &saved.annotations {
            let target = slide
                .widgets()
                .by_path(&ann.widget_path)
                .ok_or_else(|| DataError::UnknownWidget(ann.widget_path.clone()))?;
            let mut annotation = Annotation::new(ann.kind, target, ann.pen_settings)?
                .with_text(texts.resolve(&ann.text))
                .with_filled(ann.custom == CUSTOM_FILLED);
            annotation.set_offset(ann.offset);
            annotation.set_optional_anchor(ann.optional);
            annotation.confirm();
            slide.add_annotation(annotation)?;
            restored += 1;
        }
    }
    log::info!("Restored {restored} annotations");
    Ok(restored)
}

fn legacy_annotation(ann: &Annotation) -> Value {
    let path = ann.target.path.as_str();
    let color = ann.pen.color.to_legacy_string();
    let kind = ann.kind.legacy_name();
    match ann.kind {
        AnnotationKind::Rectangle => json!({
            "path": path,
            "type": kind,
            "color": color,
            "labelText": "",
            "fontSize": LEGACY_FONT_SIZE,
        }),
        AnnotationKind::ClickMark => json!({
            "path": path,
            "type": kind,
            "labelText": "",
            "fontSize": LEGACY_FONT_SIZE,
        }),
        AnnotationKind::Circle => json!({
            "path": path,
            "type": kind,
            "color": color,
            "center": [ann.anchor_start.x, ann.anchor_start.y],
            "labelText": "",
            "fontSize": LEGACY_FONT_SIZE,
        }),
        AnnotationKind::Arrow | AnnotationKind::ArrowWithText => json!({
            "path": path,
            "type": kind,
            "color": color,
            "labelText": ann.text,
            "fontSize": ann.pen.font_size,
            "direction_draw": ann.legacy_direction(),
        }),
        AnnotationKind::TextBox | AnnotationKind::Selecting | AnnotationKind::Selected => json!({
            "path": path,
            "type": kind,
            "color": color,
            "labelText": ann.text,
            "fontSize": ann.pen.font_size,
        }),
    }
}

/// `{"<n>": {slide_title, slide_text, annotations}}` with literal texts
pub fn legacy_document(tutorial: &Tutorial) -> Value {
    let mut doc = Map::new();
    for (i, slide) in tutorial.slides().iter().enumerate() {
        let annotations: Vec<Value> = slide.annotations().iter().map(legacy_annotation).collect();
        doc.insert(
            (i + 1).to_string(),
            json!({
                "slide_title": slide.title,
                "slide_text": slide.body,
                "annotations": annotations,
            }),
        );
    }
    Value::Object(doc)
}
