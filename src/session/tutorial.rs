//! A recorded tutorial: the ordered slide deck and where each page came from

use std::path::{Path, PathBuf};

use anyhow::Context;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

use super::slide::{Slide, SlideLayout};
use crate::config::AnnotatorConfig;
use crate::domain::WidgetIndex;
use crate::error::DataError;

pub const DEFAULT_TITLE: &str = "Add a title here";
pub const DEFAULT_BODY: &str = "Write a description here";
pub const COVER_BODY: &str = " - Add the author's name  and institution here";
pub const ACKNOWLEDGEMENTS_TITLE: &str = "Acknowledgements";
pub const ACKNOWLEDGEMENTS_BODY: &str = " - Add the acknowledgements here";

/// Header fields of a recording session
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorialInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub desc: String,
}

/// One captured window of a step, paths relative to the feed file
#[derive(Clone, Debug, Deserialize)]
struct WindowFeed {
    window: String,
    metadata: String,
}

#[derive(Clone, Debug, Deserialize)]
struct TutorialFeed {
    #[serde(flatten)]
    info: TutorialInfo,
    steps: Vec<Vec<WindowFeed>>,
}

/// Where a page of the deck came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageSource {
    /// Recorded step, numbered from 1
    Step(usize),
    /// Inserted by the author
    Blank,
}

impl PageSource {
    /// Code written to the export: the step number, or -1 for inserted pages
    pub fn slide_code(self) -> i64 {
        match self {
            PageSource::Step(n) => n as i64,
            PageSource::Blank => -1,
        }
    }
}

/// A step that could not be turned into a slide
#[derive(Debug)]
pub struct SkippedStep {
    pub step: usize,
    pub error: DataError,
}

/// Outcome of loading a feed
#[derive(Debug, Default)]
pub struct LoadReport {
    pub skipped: Vec<SkippedStep>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Tutorial {
    pub info: TutorialInfo,
    slides: Vec<Slide>,
    /// Parallel to `slides`
    pages: Vec<PageSource>,
    config: AnnotatorConfig,
}

impl Tutorial {
    pub fn new(info: TutorialInfo, config: AnnotatorConfig) -> Self {
        Self {
            info,
            slides: Vec::new(),
            pages: Vec::new(),
            config,
        }
    }

    /// Load a recording feed; steps that fail are skipped and reported
    pub fn load(path: &Path, config: &AnnotatorConfig) -> anyhow::Result<(Self, LoadReport)> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read tutorial: {}", path.display()))?;
        let feed: TutorialFeed = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse tutorial: {}", path.display()))?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        let mut tutorial = Self::new(feed.info, config.clone());
        let mut report = LoadReport::default();
        for (i, windows) in feed.steps.iter().enumerate() {
            let step = i + 1;
            match load_step(&dir, windows) {
                Ok(slide) => tutorial.push_step(step, slide),
                Err(error) => {
                    log::warn!("Skipping step {step}: {error}");
                    report.skipped.push(SkippedStep { step, error });
                }
            }
        }
        log::info!(
            "Loaded '{}': {} slides, {} steps skipped",
            tutorial.info.title,
            tutorial.slides.len(),
            report.skipped.len()
        );
        Ok((tutorial, report))
    }

    /// Append a recorded step with the default texts
    pub fn push_step(&mut self, step: usize, mut slide: Slide) {
        slide.title = DEFAULT_TITLE.to_string();
        slide.body = DEFAULT_BODY.to_string();
        slide.apply_config(&self.config);
        self.slides.push(slide);
        self.pages.push(PageSource::Step(step));
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn slide_mut(&mut self, index: usize) -> Option<&mut Slide> {
        self.slides.get_mut(index)
    }

    pub fn slides_mut(&mut self) -> impl Iterator<Item = &mut Slide> {
        self.slides.iter_mut()
    }

    pub fn pages(&self) -> &[PageSource] {
        &self.pages
    }

    fn blank_slide(&self, layout: SlideLayout, title: &str, body: &str) -> Slide {
        let mut slide = Slide::blank(self.config.blank_page_size);
        slide.layout = layout;
        slide.title = title.to_string();
        slide.body = body.to_string();
        slide.apply_config(&self.config);
        slide
    }

    fn insert(&mut self, index: usize, slide: Slide, source: PageSource) {
        let index = index.min(self.slides.len());
        self.slides.insert(index, slide);
        self.pages.insert(index, source);
    }

    /// Insert an empty white page at `index` (clamped to the end)
    pub fn insert_blank(&mut self, index: usize) {
        let slide = self.blank_slide(SlideLayout::Blank, "", "");
        self.insert(index, slide, PageSource::Blank);
    }

    /// Insert a copy of page `index` right before it, without annotations
    pub fn duplicate_page(&mut self, index: usize) -> bool {
        let Some(slide) = self.slides.get(index) else {
            return false;
        };
        let mut copy = slide.duplicate();
        copy.title.clear();
        copy.body.clear();
        let source = self.pages[index];
        self.insert(index, copy, source);
        true
    }

    pub fn remove_page(&mut self, index: usize) -> Option<Slide> {
        if index >= self.slides.len() {
            return None;
        }
        self.pages.remove(index);
        Some(self.slides.remove(index))
    }

    /// Replace the deck with pages described by `(slide code, layout)` pairs
    ///
    /// Code -1 makes an empty page of the given layout. Code `n` copies the
    /// first page recorded from step `n`, without texts or annotations.
    pub fn rebuild_pages(&mut self, pages: &[(i64, SlideLayout)]) -> Result<(), DataError> {
        let mut slides = Vec::with_capacity(pages.len());
        let mut sources = Vec::with_capacity(pages.len());
        for &(code, layout) in pages {
            let (mut slide, source) = if code == PageSource::Blank.slide_code() {
                (self.blank_slide(layout, "", ""), PageSource::Blank)
            } else {
                let source = usize::try_from(code)
                    .ok()
                    .map(PageSource::Step)
                    .and_then(|source| {
                        self.pages
                            .iter()
                            .position(|&p| p == source)
                            .map(|i| (i, source))
                    });
                let Some((index, source)) = source else {
                    return Err(DataError::InvalidField {
                        key: code.to_string(),
                        field: "SlideCode",
                        reason: "no recorded step with this number".to_string(),
                    });
                };
                (self.slides[index].duplicate(), source)
            };
            slide.title.clear();
            slide.body.clear();
            slide.layout = layout;
            slides.push(slide);
            sources.push(source);
        }
        log::debug!("Rebuilt deck: {} pages from {}", slides.len(), self.slides.len());
        self.slides = slides;
        self.pages = sources;
        Ok(())
    }

    pub fn has_covers(&self) -> bool {
        self.slides.iter().any(|s| s.layout == SlideLayout::Cover)
    }

    /// Cover page first, acknowledgements page last
    pub fn add_covers(&mut self) {
        let cover = self.blank_slide(SlideLayout::Cover, DEFAULT_TITLE, COVER_BODY);
        self.insert(0, cover, PageSource::Blank);
        let back = self.blank_slide(
            SlideLayout::Acknowledgements,
            ACKNOWLEDGEMENTS_TITLE,
            ACKNOWLEDGEMENTS_BODY,
        );
        let end = self.slides.len();
        self.insert(end, back, PageSource::Blank);
    }
}

fn open_image(path: &Path) -> Result<RgbaImage, DataError> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| DataError::Image {
            path: path.to_path_buf(),
            source,
        })
}

/// Composite the windows of one step into a single slide
///
/// Later windows are drawn at the position of their first widget.
fn load_step(dir: &Path, windows: &[WindowFeed]) -> Result<Slide, DataError> {
    let Some((first, rest)) = windows.split_first() else {
        return Err(DataError::InvalidField {
            key: "steps".to_string(),
            field: "window",
            reason: "step has no windows".to_string(),
        });
    };

    let resolve = |rel: &str| -> PathBuf { dir.join(rel) };
    let mut widgets = WidgetIndex::from_file(&resolve(&first.metadata))?;
    let mut image = open_image(&resolve(&first.window))?;

    for window in rest {
        let extra = WidgetIndex::from_file(&resolve(&window.metadata))?;
        let overlay = open_image(&resolve(&window.window))?;
        let origin = extra.iter().next().map(|w| w.position).unwrap_or_default();
        imageops::overlay(&mut image, &overlay, origin.x as i64, origin.y as i64);
        log::debug!("Composited {} at {:?}", window.window, origin);
        widgets.extend(extra);
    }

    Ok(Slide::new(fit_to_widgets(image, &widgets), widgets))
}

/// Rescale a screenshot whose pixel width differs from the widget coordinate space
fn fit_to_widgets(image: RgbaImage, widgets: &WidgetIndex) -> RgbaImage {
    let Some(edge) = widgets.bottom_right_widget().map(|w| w.rect().right()) else {
        return image;
    };
    let width = image.width() as f32;
    if edge <= 0.0 || edge == width {
        return image;
    }
    let height = image.height() as f32 * edge / width;
    log::debug!("Rescaling screenshot from {width} to {edge} px wide");
    imageops::resize(
        &image,
        edge.round() as u32,
        (height.round() as u32).max(1),
        FilterType::Triangle,
    )
}
