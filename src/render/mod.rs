use anyhow::{Context, Result};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::aggregation::format_percentage;
use crate::types::{AggregatedResult, Window};

pub mod text;

pub const COLUMNS: u32 = 3;
pub const CELL_WIDTH: u32 = 280;
pub const CELL_HEIGHT: u32 = 50;
/// Anything below this many nines is drawn red.
pub const RED_THRESHOLD: f64 = 99.0;

pub const GREEN: Rgb<u8> = Rgb([10, 200, 10]);
pub const RED: Rgb<u8> = Rgb([200, 55, 55]);
pub const GREY: Rgb<u8> = Rgb([128, 128, 128]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellColor {
    Red,
    Grey,
    Green,
}

impl CellColor {
    pub fn for_value(value: f64) -> Self {
        // The threshold check runs first, so no-data (0.0) cells come out red
        // and the grey arm is never taken.
        if value < RED_THRESHOLD {
            CellColor::Red
        } else if value == 0.0 {
            CellColor::Grey
        } else {
            CellColor::Green
        }
    }

    pub fn rgb(&self) -> Rgb<u8> {
        match self {
            CellColor::Red => RED,
            CellColor::Grey => GREY,
            CellColor::Green => GREEN,
        }
    }
}

/// Fixed-column grid sized to hold every result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
    pub cell_width: u32,
    pub cell_height: u32,
}

impl GridLayout {
    pub fn for_count(count: usize) -> Self {
        let rows = (count as u32).div_ceil(COLUMNS);
        Self {
            columns: COLUMNS,
            rows,
            cell_width: CELL_WIDTH,
            cell_height: CELL_HEIGHT,
        }
    }

    pub fn width(&self) -> u32 {
        self.columns * self.cell_width
    }

    pub fn height(&self) -> u32 {
        self.rows * self.cell_height
    }

    /// `(column, row)` of each of the first `count` cells, filling rows left to right.
    pub fn positions(&self, count: usize) -> Vec<(u32, u32)> {
        let mut positions = Vec::with_capacity(count);
        let (mut c, mut r) = (0, 0);
        for _ in 0..count {
            positions.push((c, r));
            c += 1;
            if c >= self.columns {
                c = 0;
                r += 1;
            }
            if r >= self.rows {
                r = 0;
            }
        }
        positions
    }

    /// Pixel origin of the cell at `(column, row)`.
    pub fn origin(&self, column: u32, row: u32) -> (u32, u32) {
        (column * self.cell_width, row * self.cell_height)
    }
}

/// Results in drawing order: ascending by label, byte-wise.
pub fn sorted_by_label(results: &[AggregatedResult]) -> Vec<&AggregatedResult> {
    let mut sorted: Vec<&AggregatedResult> = results.iter().collect();
    sorted.sort_by(|a, b| a.label.cmp(&b.label));
    sorted
}

pub fn render_grid(results: &[AggregatedResult], window: Window) -> RgbImage {
    let layout = GridLayout::for_count(results.len());
    debug!(
        "rendering {} grid: {} cells, {} rows",
        window,
        results.len(),
        layout.rows
    );

    let mut img = RgbImage::from_pixel(layout.width(), layout.height(), WHITE);
    let sorted = sorted_by_label(results);
    for (result, (column, row)) in sorted.iter().zip(layout.positions(sorted.len())) {
        let value = result.value(window);
        debug!("{}: {}", result.label, value);

        let (x, y) = layout.origin(column, row);
        let cell = Rect::at(x as i32, y as i32).of_size(layout.cell_width, layout.cell_height);
        draw_filled_rect_mut(&mut img, cell, CellColor::for_value(value).rgb());
        draw_hollow_rect_mut(&mut img, cell, BLACK);
        text::draw_text(&mut img, x + 10, y + 10, &result.label, BLACK);
        text::draw_text(&mut img, x + 50, y + 25, &format_percentage(value), BLACK);
    }
    img
}

pub fn image_path(dir: &Path, window: Window) -> PathBuf {
    dir.join(format!("{}.png", window))
}

/// Write the grid to `{dir}/{window}.png`, replacing any previous run's file.
pub fn save_png(img: &RgbImage, dir: &Path, window: Window) -> Result<PathBuf> {
    let path = image_path(dir, window);
    img.save_with_format(&path, ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
