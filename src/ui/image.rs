//! Decorative side panel.
//!
//! The image is scaled once at startup; each terminal cell then shows two
//! vertically stacked pixels using an upper half block.

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::RgbImage;
use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};
use std::path::Path;

pub struct DecorativeImage {
    pixels: RgbImage,
}

impl DecorativeImage {
    pub fn load(path: &Path, width: u32, height: u32) -> Result<Self> {
        let source = image::open(path)
            .with_context(|| format!("Failed to load image {}", path.display()))?;
        let pixels = source
            .resize_exact(width, height, FilterType::Lanczos3)
            .to_rgb8();
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Terminal columns needed to show the image at its native size.
    pub fn columns(&self) -> u16 {
        self.width().min(u16::MAX as u32) as u16
    }

    fn sample(&self, x: u32, y: u32) -> Color {
        let [r, g, b] = self.pixels.get_pixel(x, y).0;
        Color::Rgb(r, g, b)
    }
}

impl Widget for &DecorativeImage {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let (w, h) = (self.width(), self.height());
        let rows = area.height as u32 * 2;

        for cy in 0..area.height {
            let top = (cy as u32 * 2) * h / rows;
            let bottom = ((cy as u32 * 2 + 1) * h / rows).min(h - 1);

            for cx in 0..area.width {
                let px = (cx as u32 * w / area.width as u32).min(w - 1);
                if let Some(cell) = buf.cell_mut((area.x + cx, area.y + cy)) {
                    cell.set_symbol("▀")
                        .set_fg(self.sample(px, top))
                        .set_bg(self.sample(px, bottom));
                }
            }
        }
    }
}
