//! Configuration persistence for annotator settings

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::{AnnotationKind, Size};

/// Pen color, stored as `#rrggbb` like the export format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PenColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for PenColor {
    fn default() -> Self {
        // Orange, readable over both light and dark themes
        Self {
            r: 0xff,
            g: 0x80,
            b: 0x00,
        }
    }
}

impl PenColor {
    pub const BLACK: PenColor = PenColor { r: 0, g: 0, b: 0 };
    pub const WHITE: PenColor = PenColor {
        r: 255,
        g: 255,
        b: 255,
    };
    /// Selection frame
    pub const SELECTION: PenColor = PenColor { r: 0, g: 255, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    /// `"r, g, b"`, used by the legacy export
    pub fn to_legacy_string(self) -> String {
        format!("{}, {}, {}", self.r, self.g, self.b)
    }
}

impl fmt::Display for PenColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for PenColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6 && hex.is_ascii())
            .ok_or_else(|| format!("expected #rrggbb, got '{s}'"))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("bad color '{s}': {e}"))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for PenColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PenColor> for String {
    fn from(c: PenColor) -> Self {
        c.to_string()
    }
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Tool armed when a session starts
    pub default_tool: AnnotationKind,
    pub pen_color: PenColor,
    pub pen_thickness: u32,
    pub font_size: u32,
    /// Fill rectangles and circles instead of outlining them
    pub filled: bool,
    /// Same-direction wheel ticks needed for one selection step
    pub wheel_threshold: u32,
    /// Arrow label width, in glyph advances
    pub label_wrap_columns: usize,
    /// Size of inserted blank and cover pages
    pub blank_page_size: Size,
    /// Back cover entries, title to text
    pub acknowledgements: BTreeMap<String, String>,
    /// Arrow label text that counts as "no label"
    pub label_placeholder: String,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            default_tool: AnnotationKind::ArrowWithText,
            pen_color: PenColor::default(),
            pen_thickness: 2,
            font_size: 14,
            filled: false,
            wheel_threshold: 5,
            label_wrap_columns: 40,
            blank_page_size: Size::new(900.0, 530.0),
            acknowledgements: BTreeMap::new(),
            label_placeholder: "Add text to accompany an arrow here.".to_string(),
        }
    }
}

impl AnnotatorConfig {
    /// Directory name under the platform config dir
    pub const ID: &'static str = "slidemark";

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(_) => Self::default(),
            None => {
                log::warn!("No config directory on this platform, using defaults");
                Self::default()
            }
        }
    }

    /// Load a specific file, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        match Self::read(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::default_path() else {
            log::error!("Could not determine config directory for saving");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {:?}", err);
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw).with_context(|| format!("writing {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pen_color_hex() {
        let color: PenColor = "#1a2B3c".parse().unwrap();
        assert_eq!(color, PenColor::new(0x1a, 0x2b, 0x3c));
        assert_eq!(color.to_string(), "#1a2b3c");
        assert_eq!(color.to_legacy_string(), "26, 43, 60");
        assert!("1a2b3c".parse::<PenColor>().is_err());
        assert!("#12345".parse::<PenColor>().is_err());
        assert!("#gg0000".parse::<PenColor>().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AnnotatorConfig =
            serde_json::from_str(r##"{"pen_color": "#00ff00", "wheel_threshold": 3}"##).unwrap();
        assert_eq!(config.pen_color, PenColor::new(0, 255, 0));
        assert_eq!(config.wheel_threshold, 3);
        assert_eq!(config.font_size, 14);
        assert_eq!(config.blank_page_size, Size::new(900.0, 530.0));
    }

    #[test]
    fn test_save_and_load_from() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = AnnotatorConfig::default();
        config.filled = true;
        config
            .acknowledgements
            .insert("Funding".to_string(), "Thanks to everyone".to_string());
        config.save_to(&path).unwrap();
        assert_eq!(AnnotatorConfig::load_from(&path), config);
    }

    #[test]
    fn test_broken_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(AnnotatorConfig::load_from(&path), AnnotatorConfig::default());
    }
}
