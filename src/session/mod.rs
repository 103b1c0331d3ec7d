//! Slides and the tutorial deck they belong to
//!
//! This module contains:
//! - `Slide`: one screenshot with its widgets and annotations
//! - `Tutorial`: the loaded recording and its page list

pub mod slide;
pub mod tutorial;

pub use slide::{Slide, SlideLayout};
pub use tutorial::{LoadReport, PageSource, SkippedStep, Tutorial, TutorialInfo};
