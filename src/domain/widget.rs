//! Widget rectangles recorded alongside each screenshot

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::geometry::{Point, Rect, Size};
use crate::error::{AnnotationError, DataError};

/// One UI element of the captured window
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WidgetRef {
    /// Unique hierarchical identifier
    pub path: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text: String,
    pub position: Point,
    pub size: Size,
}

impl WidgetRef {
    pub fn new(path: impl Into<String>, position: Point, size: Size) -> Self {
        Self {
            path: path.into(),
            name: String::new(),
            text: String::new(),
            position,
            size,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }
}

/// Widget snapshot of one slide, in enumeration order (parents before children)
#[derive(Clone, Debug, Default)]
pub struct WidgetIndex {
    widgets: Vec<Arc<WidgetRef>>,
}

impl WidgetIndex {
    pub fn new(widgets: Vec<WidgetRef>) -> Self {
        Self {
            widgets: widgets.into_iter().map(Arc::new).collect(),
        }
    }

    /// Build from a metadata document: a mapping of opaque key to widget record
    pub fn from_metadata(metadata: &Value) -> Result<Self, DataError> {
        let Some(entries) = metadata.as_object() else {
            return Err(DataError::InvalidField {
                key: "<root>".to_string(),
                field: "metadata",
                reason: "expected an object of widgets".to_string(),
            });
        };

        let mut widgets = Vec::with_capacity(entries.len());
        for (key, entry) in entries {
            widgets.push(parse_widget(key, entry)?);
        }
        log::debug!("Parsed {} widgets from metadata", widgets.len());
        Ok(Self::new(widgets))
    }

    /// Read and parse a metadata file
    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        let raw = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&raw)?;
        Self::from_metadata(&value)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<WidgetRef>> {
        self.widgets.iter()
    }

    /// Append another window's widgets after this one's
    pub fn extend(&mut self, other: WidgetIndex) {
        self.widgets.extend(other.widgets);
    }

    pub fn by_path(&self, path: &str) -> Option<Arc<WidgetRef>> {
        self.widgets.iter().find(|w| w.path == path).cloned()
    }

    /// Every widget whose rectangle contains `point`, in snapshot order
    pub fn find_at(&self, point: Point) -> Vec<Arc<WidgetRef>> {
        self.widgets
            .iter()
            .filter(|w| w.rect().contains_point(point))
            .cloned()
            .collect()
    }

    /// Pick one widget of the stack under `point`
    ///
    /// Depth 0 is the last (innermost) match; larger depths walk outwards.
    /// Out-of-range depths are clamped to the stack.
    pub fn select_at(
        &self,
        point: Point,
        depth_from_top: isize,
    ) -> Result<Arc<WidgetRef>, AnnotationError> {
        let mut matches = self.find_at(point);
        if matches.is_empty() {
            return Err(AnnotationError::NotFound {
                x: point.x,
                y: point.y,
            });
        }
        let last = matches.len() - 1;
        let depth = depth_from_top.clamp(0, last as isize) as usize;
        Ok(matches.swap_remove(last - depth))
    }

    /// Widget reaching furthest right (ties broken by the lower edge)
    pub fn bottom_right_widget(&self) -> Option<&WidgetRef> {
        let mut best: Option<&WidgetRef> = None;
        let (mut max_x, mut max_y) = (0.0_f32, 0.0_f32);
        for widget in &self.widgets {
            let rect = widget.rect();
            if rect.right() > max_x || (rect.right() == max_x && rect.bottom() > max_y) {
                max_x = rect.right();
                max_y = rect.bottom();
                best = Some(widget);
            }
        }
        best
    }
}

fn parse_widget(key: &str, entry: &Value) -> Result<WidgetRef, DataError> {
    let path = entry
        .get("path")
        .ok_or_else(|| missing(key, "path"))?
        .as_str()
        .ok_or_else(|| invalid(key, "path", "expected a string"))?
        .to_string();
    let position = parse_pair(key, "position", entry.get("position"))?;
    let size = parse_pair(key, "size", entry.get("size"))?;

    let text_field = |name: &str| {
        entry
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Ok(WidgetRef {
        path,
        name: text_field("name"),
        text: text_field("text"),
        position: position.into(),
        size: size.into(),
    })
}

fn parse_pair(key: &str, field: &'static str, value: Option<&Value>) -> Result<[f32; 2], DataError> {
    let value = value.ok_or_else(|| missing(key, field))?;
    let items = value
        .as_array()
        .filter(|items| items.len() == 2)
        .ok_or_else(|| invalid(key, field, "expected two numbers"))?;
    let mut pair = [0.0_f32; 2];
    for (slot, item) in pair.iter_mut().zip(items) {
        *slot = item
            .as_f64()
            .ok_or_else(|| invalid(key, field, "expected two numbers"))? as f32;
    }
    Ok(pair)
}

fn missing(key: &str, field: &'static str) -> DataError {
    DataError::MissingField {
        key: key.to_string(),
        field,
    }
}

fn invalid(key: &str, field: &'static str, reason: &str) -> DataError {
    DataError::InvalidField {
        key: key.to_string(),
        field,
        reason: reason.to_string(),
    }
}
