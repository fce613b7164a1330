//! Chart rendering for an indicator series.
//!
//! The PNG renderer draws three stacked panels: price with moving average,
//! RSI with 70/30 reference lines, and MACD with signal line and histogram.
//! A panel whose columns were never calculated is left blank.

mod png;

use std::path::{Path, PathBuf};

use anyhow::Result;
use image::{Rgb, RgbImage};
use serde::Deserialize;

use crate::models::Series;

pub use self::png::PngChartRenderer;

/// Common color definitions
pub mod colors {
    use image::Rgb;

    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    pub const LIGHT_GRAY: Rgb<u8> = Rgb([200, 200, 200]);
    pub const HISTOGRAM_GRAY: Rgb<u8> = Rgb([191, 191, 191]);
    pub const BLUE: Rgb<u8> = Rgb([31, 119, 180]);
    pub const ORANGE: Rgb<u8> = Rgb([255, 127, 14]);
    pub const RED: Rgb<u8> = Rgb([214, 39, 40]);
    pub const GREEN: Rgb<u8> = Rgb([44, 160, 44]);
    pub const MACD_BLUE: Rgb<u8> = Rgb([0, 0, 255]);
    pub const SIGNAL_RED: Rgb<u8> = Rgb([255, 0, 0]);
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 1000,
        }
    }
}

/// Panels in top-to-bottom order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Price,
    Rsi,
    Macd,
}

impl Panel {
    pub const ALL: [Panel; 3] = [Panel::Price, Panel::Rsi, Panel::Macd];

    pub fn slot(self) -> u32 {
        match self {
            Panel::Price => 0,
            Panel::Rsi => 1,
            Panel::Macd => 2,
        }
    }

    /// Whether `series` carries the columns this panel draws.
    pub fn is_available(self, series: &Series) -> bool {
        match self {
            Panel::Price => true,
            Panel::Rsi => series.rsi().is_some(),
            Panel::Macd => series.macd_line().is_some() && series.signal_line().is_some(),
        }
    }
}

/// Panels that will be drawn for `series`.
pub fn panels_for(series: &Series) -> Vec<Panel> {
    Panel::ALL
        .into_iter()
        .filter(|panel| panel.is_available(series))
        .collect()
}

/// `{ticker}_{period}_stock_indicators.png`
pub fn default_filename(ticker: &str, period: &str) -> String {
    format!("{}_{}_stock_indicators.png", ticker, period)
}

/// Renders an indicator series to an image file.
pub trait ChartRenderer: Send + Sync {
    /// Writes the chart and returns the path it was saved to. With no
    /// `output`, the file lands in the working directory under
    /// [`default_filename`].
    fn render(
        &self,
        series: &Series,
        ticker: &str,
        period: &str,
        output: Option<&Path>,
    ) -> Result<PathBuf>;
}

/// Helper function to put a pixel given signed coordinates, clipping to the image
pub fn put_pixel_clipped(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u64) < img.width() as u64 && (y as u64) < img.height() as u64 {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Draws a straight line (Bresenham)
pub fn draw_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x0, mut y0) = from;
    let (x1, y1) = to;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_pixel_clipped(img, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Draws a dashed horizontal line
pub fn draw_dashed_horizontal(img: &mut RgbImage, y: i64, x1: i64, x2: i64, dash: i64, color: Rgb<u8>) {
    let (start, end) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
    let dash = dash.max(1);
    for x in start..=end {
        if ((x - start) / dash) % 2 == 0 {
            put_pixel_clipped(img, x, y, color);
        }
    }
}

/// Fills the rectangle spanned by two corners
pub fn fill_rect(img: &mut RgbImage, a: (i64, i64), b: (i64, i64), color: Rgb<u8>) {
    let (x0, x1) = (a.0.min(b.0), a.0.max(b.0));
    let (y0, y1) = (a.1.min(b.1), a.1.max(b.1));
    for y in y0..=y1 {
        for x in x0..=x1 {
            put_pixel_clipped(img, x, y, color);
        }
    }
}

/// Draws a one pixel rectangle outline
pub fn draw_rect_outline(img: &mut RgbImage, a: (i64, i64), b: (i64, i64), color: Rgb<u8>) {
    draw_line(img, (a.0, a.1), (b.0, a.1), color);
    draw_line(img, (b.0, a.1), (b.0, b.1), color);
    draw_line(img, (b.0, b.1), (a.0, b.1), color);
    draw_line(img, (a.0, b.1), (a.0, a.1), color);
}
