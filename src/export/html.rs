//! Printable HTML deck

use std::collections::BTreeMap;

use super::json::image_name;
use crate::session::{Slide, SlideLayout, Tutorial};

const STYLE: &str = r#"
.slide, .cover, .backCover {
    align-content: center;
}
.containerImage {
    text-align: center;
}
.slideImage {
    width: 95%;
    height: auto;
}
.slideTitle, .coverTitle, .backCoverTitle, .coverAuthor, .coverDate {
    text-align: center;
    font-size: 2.5rem;
}
.slideDescription {
    text-align: justify;
    font-size: 1.5rem;
}
.coverDescription {
    font-size: 1.5rem;
}
.coverAcknowledgements {
    list-style: none;
}
@media print {
    .slide, .cover, .backCover {
        height: 99%;
        align-content: center;
        page-break-after: always;
    }
    body {
        height: 21cm;
        width: 29.7cm;
    }
}
@page {
    size: 29.7cm 21cm;
}
"#;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' => out.push_str("<br>"),
            _ => out.push(c),
        }
    }
    out
}

fn cover(out: &mut String, title: &str, author: &str, date: &str, desc: &str) {
    out.push_str(&format!(
        r#"<div class="cover">
<h1 class="coverTitle">{}</h1>
<h3 class="coverAuthor">{}</h3>
<h3 class="coverDate">{}</h3>
<h3 class="coverDescription">{}</h3>
</div>
"#,
        escape(title),
        escape(author),
        escape(date),
        escape(desc)
    ));
}

fn back_cover(out: &mut String, title: &str, acknowledgements: &BTreeMap<String, String>) {
    let items: String = acknowledgements
        .iter()
        .map(|(who, what)| {
            format!(
                "<li><h2><strong>{}</strong><br>{}</h2></li>",
                escape(who),
                escape(what)
            )
        })
        .collect();
    out.push_str(&format!(
        r#"<div class="backCover">
<h1 class="coverTitle">{}</h1>
<ul class="coverAcknowledgements">{}</ul>
</div>
"#,
        escape(title),
        items
    ));
}

fn slide(out: &mut String, slide: &Slide, image: &str) {
    out.push_str(&format!(
        r#"<div class="slide">
<h1 class="slideTitle">{}</h1>
<div class="containerImage"><img class="slideImage" src="{}"></div>
<h3 class="slideDescription">{}</h3>
</div>
"#,
        escape(&slide.title),
        escape(image),
        escape(&slide.body)
    ));
}

/// The whole deck
///
/// Cover and acknowledgements pages of the tutorial render as covers. Without
/// them, a cover from the tutorial header and a back cover from the configured
/// acknowledgements frame the slides.
pub fn render_html(tutorial: &Tutorial) -> String {
    let info = &tutorial.info;
    let acknowledgements = &tutorial.config().acknowledgements;
    let has_layout = |layout: SlideLayout| tutorial.slides().iter().any(|s| s.layout == layout);

    let mut body = String::new();
    if !has_layout(SlideLayout::Cover) {
        cover(&mut body, &info.title, &info.author, &info.date, &info.desc);
    }
    for (i, page) in tutorial.slides().iter().enumerate() {
        match page.layout {
            SlideLayout::Cover => cover(&mut body, &page.title, &info.author, &info.date, &page.body),
            SlideLayout::Acknowledgements => back_cover(&mut body, &page.title, acknowledgements),
            SlideLayout::Screenshot | SlideLayout::Blank => slide(&mut body, page, &image_name(i)),
        }
    }
    if !has_layout(SlideLayout::Acknowledgements) {
        back_cover(&mut body, "Acknowledgements", acknowledgements);
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{}</title>
<style>{}</style>
</head>
<body>
{}</body>
</html>
"#,
        escape(&info.title),
        STYLE,
        body
    )
}
