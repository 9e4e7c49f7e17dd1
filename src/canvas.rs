//! Raster drawing primitives used by the chart renderer.
//!
//! All drawing clips silently at the image border.

use image::{Rgb, RgbImage};

use crate::font::{GLYPH_ADVANCE, GLYPH_HEIGHT, glyph, text_width};

pub(crate) const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub(crate) const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub(crate) const GRID: Rgb<u8> = Rgb([220, 220, 220]);
pub(crate) const KEYFRAME_RED: Rgb<u8> = Rgb([255, 0, 0]);

pub(crate) struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, WHITE),
        }
    }

    pub(crate) fn width(&self) -> u32 {
        self.image.width()
    }

    pub(crate) fn into_image(self) -> RgbImage {
        self.image
    }

    fn put(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        if x >= 0 && y >= 0 && (x as u32) < self.image.width() && (y as u32) < self.image.height() {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    pub(crate) fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgb<u8>) {
        for dy in 0..height as i64 {
            for dx in 0..width as i64 {
                self.put(x + dx, y + dy, color);
            }
        }
    }

    pub(crate) fn stroke_rect(&mut self, x: i64, y: i64, width: u32, height: u32, color: Rgb<u8>) {
        let (right, bottom) = (x + width as i64 - 1, y + height as i64 - 1);
        self.line(x, y, right, y, 1, color);
        self.line(x, bottom, right, bottom, 1, color);
        self.line(x, y, x, bottom, 1, color);
        self.line(right, y, right, bottom, 1, color);
    }

    /// Bresenham line with a square pen of `thickness` pixels.
    pub(crate) fn line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, thickness: u32, color: Rgb<u8>) {
        let offset = (thickness as i64 - 1) / 2;
        let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
        let (step_x, step_y) = (if x0 < x1 { 1 } else { -1 }, if y0 < y1 { 1 } else { -1 });
        let (mut x, mut y, mut error) = (x0, y0, dx + dy);

        loop {
            self.fill_rect(x - offset, y - offset, thickness, thickness, color);
            if x == x1 && y == y1 {
                break;
            }
            let doubled = 2 * error;
            if doubled >= dy {
                error += dy;
                x += step_x;
            }
            if doubled <= dx {
                error += dx;
                y += step_y;
            }
        }
    }

    /// Vertical dashed line from `top` to `bottom`.
    pub(crate) fn dashed_vline(&mut self, x: i64, top: i64, bottom: i64, dash: u32, color: Rgb<u8>) {
        let dash = dash.max(1) as i64;
        let mut y = top;
        while y <= bottom {
            let end = (y + dash - 1).min(bottom);
            self.line(x, y, x, end, 1, color);
            y += dash * 2;
        }
    }

    /// Horizontal dashed line from `left` to `right`.
    pub(crate) fn dashed_hline(&mut self, left: i64, right: i64, y: i64, dash: u32, color: Rgb<u8>) {
        let dash = dash.max(1) as i64;
        let mut x = left;
        while x <= right {
            let end = (x + dash - 1).min(right);
            self.line(x, y, end, y, 2, color);
            x += dash * 2;
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`, each font pixel
    /// `scale` pixels wide.
    pub(crate) fn text(&mut self, x: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let scale_i = scale as i64;
        for (position, character) in text.chars().enumerate() {
            let origin_x = x + position as i64 * (GLYPH_ADVANCE * scale) as i64;
            for (column, bits) in glyph(character).iter().enumerate() {
                for row in 0..GLYPH_HEIGHT {
                    if bits & (1u8 << row) != 0 {
                        self.fill_rect(
                            origin_x + column as i64 * scale_i,
                            y + row as i64 * scale_i,
                            scale,
                            scale,
                            color,
                        );
                    }
                }
            }
        }
    }

    /// Draw `text` rotated 90° counter-clockwise, reading bottom to top, with
    /// the bottom-left corner of the first glyph at `(x, y)`.
    pub(crate) fn text_vertical(&mut self, x: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let scale_i = scale as i64;
        for (position, character) in text.chars().enumerate() {
            let origin_y = y - position as i64 * (GLYPH_ADVANCE * scale) as i64;
            for (column, bits) in glyph(character).iter().enumerate() {
                for row in 0..GLYPH_HEIGHT {
                    if bits & (1u8 << row) != 0 {
                        self.fill_rect(
                            x + row as i64 * scale_i,
                            origin_y - (column as i64 + 1) * scale_i,
                            scale,
                            scale,
                            color,
                        );
                    }
                }
            }
        }
    }

    /// Draw `text` horizontally centred on `center_x`.
    pub(crate) fn text_centered(&mut self, center_x: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
        let width = (text_width(text) * scale) as i64;
        self.text(center_x - width / 2, y, text, scale, color);
    }
}

/// Pixel size of `text` at `scale`.
pub(crate) fn text_size(text: &str, scale: u32) -> (u32, u32) {
    (text_width(text) * scale, GLYPH_HEIGHT * scale)
}
