//! Bitmap text using the 8x8 `font8x8` glyphs, scaled to the pen font size

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgba, RgbaImage};

use crate::config::PenColor;
use crate::domain::Point;
use crate::layout::TextMeasure;

/// Glyph cell edge in font units
const GLYPH: u32 = 8;
/// Line pitch in font units, two rows of leading
const LINE: u32 = 10;

/// A font8x8 face scaled to roughly `font_size` pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitmapFont {
    scale: u32,
}

impl BitmapFont {
    pub fn new(font_size: u32) -> Self {
        let scale = (font_size as f32 / GLYPH as f32).round().max(1.0) as u32;
        Self { scale }
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Horizontal advance of one glyph
    pub fn advance(&self) -> f32 {
        (GLYPH * self.scale) as f32
    }

    /// Draw `lines` top-down starting at `origin`, `spacing` extra pixels between lines
    pub fn draw_lines(
        &self,
        img: &mut RgbaImage,
        origin: Point,
        lines: &[String],
        color: PenColor,
        spacing: f32,
    ) {
        let pitch = self.line_height() + spacing;
        for (i, line) in lines.iter().enumerate() {
            let y = origin.y + pitch * i as f32;
            self.draw_line(img, origin.x.round() as i32, y.round() as i32, line, color);
        }
    }

    fn draw_line(&self, img: &mut RgbaImage, x: i32, y: i32, text: &str, color: PenColor) {
        let scale = self.scale as i32;
        let [r, g, b, a] = color.to_rgba_u8();
        let ink = Rgba([r, g, b, a]);
        let mut cursor_x = x;
        for ch in text.chars() {
            let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
                cursor_x += GLYPH as i32 * scale;
                continue;
            };
            for (row_idx, row) in glyph.iter().enumerate() {
                let bits = *row;
                for col_idx in 0..GLYPH as i32 {
                    if (bits >> col_idx) & 1 == 0 {
                        continue;
                    }
                    let px = cursor_x + col_idx * scale;
                    let py = y + row_idx as i32 * scale;
                    fill_block(img, px, py, scale, ink);
                }
            }
            cursor_x += GLYPH as i32 * scale;
        }
    }
}

impl TextMeasure for BitmapFont {
    fn measure(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance()
    }

    fn line_height(&self) -> f32 {
        (LINE * self.scale) as f32
    }
}

fn fill_block(img: &mut RgbaImage, x: i32, y: i32, size: i32, ink: Rgba<u8>) {
    for sy in 0..size {
        for sx in 0..size {
            let (tx, ty) = (x + sx, y + sy);
            if tx >= 0 && ty >= 0 && (tx as u32) < img.width() && (ty as u32) < img.height() {
                img.put_pixel(tx as u32, ty as u32, ink);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_follows_font_size() {
        assert_eq!(BitmapFont::new(14).scale(), 2);
        assert_eq!(BitmapFont::new(8).scale(), 1);
        assert_eq!(BitmapFont::new(2).scale(), 1);
        assert_eq!(BitmapFont::new(24).scale(), 3);
    }

    #[test]
    fn test_metrics() {
        let font = BitmapFont::new(14);
        assert_eq!(font.measure("abc"), 48.0);
        assert_eq!(font.line_height(), 20.0);
        assert_eq!(font.measure(""), 0.0);
    }

    #[test]
    fn test_draw_inks_pixels_inside_the_block() {
        let mut img = RgbaImage::from_pixel(40, 20, Rgba([255, 255, 255, 255]));
        let font = BitmapFont::new(8);
        font.draw_lines(&mut img, Point::new(2.0, 2.0), &["H".to_string()], PenColor::BLACK, 0.0);

        let inked: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 == [0, 0, 0, 255])
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!inked.is_empty());
        assert!(inked.iter().all(|&(x, y)| (2..10).contains(&x) && (2..10).contains(&y)));
    }

    #[test]
    fn test_draw_clips_at_edges() {
        let mut img = RgbaImage::new(4, 4);
        let font = BitmapFont::new(16);
        font.draw_lines(&mut img, Point::new(-6.0, -6.0), &["WW".to_string()], PenColor::WHITE, 2.0);
    }
}
