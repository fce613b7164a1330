use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use tracing::{debug, info};

use crate::chart::{
    colors, default_filename, draw_dashed_horizontal, draw_line, draw_rect_outline, fill_rect,
    panels_for, ChartConfig, ChartRenderer, Panel,
};
use crate::models::Series;

const PANEL_SLOTS: u32 = 3;
const MARGIN: i64 = 40;
const PANEL_GAP: i64 = 30;
const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_OVERSOLD: f64 = 30.0;

/// Pixel rectangle of one panel's plotting area.
#[derive(Debug, Clone, Copy)]
struct Frame {
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
}

impl Frame {
    fn for_slot(config: &ChartConfig, slot: u32) -> Self {
        let width = config.width as i64;
        let height = config.height as i64;
        let slot_height = (height - 2 * MARGIN - (PANEL_SLOTS as i64 - 1) * PANEL_GAP) / PANEL_SLOTS as i64;
        let top = MARGIN + slot as i64 * (slot_height + PANEL_GAP);

        Self {
            left: MARGIN,
            top,
            right: width - MARGIN,
            bottom: top + slot_height,
        }
    }

    fn x(&self, index: usize, len: usize) -> i64 {
        if len <= 1 {
            return (self.left + self.right) / 2;
        }
        self.left + ((self.right - self.left) as f64 * index as f64 / (len - 1) as f64).round() as i64
    }

    fn y(&self, value: f64, scale: &Scale) -> i64 {
        let t = (value - scale.min) / (scale.max - scale.min);
        self.bottom - ((self.bottom - self.top) as f64 * t).round() as i64
    }
}

/// Value range mapped onto a panel's height.
#[derive(Debug, Clone, Copy)]
struct Scale {
    min: f64,
    max: f64,
}

impl Scale {
    fn fixed(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Range covering every finite value in `columns`, padded by 5%.
    fn fit<'a, I>(columns: I) -> Self
    where
        I: IntoIterator<Item = &'a [Option<f64>]>,
    {
        let (min, max) = columns
            .into_iter()
            .flat_map(|column| column.iter().flatten().copied())
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

        if !min.is_finite() {
            return Self::fixed(-1.0, 1.0);
        }
        let pad = if max > min { (max - min) * 0.05 } else { min.abs().max(1.0) * 0.05 };
        Self::fixed(min - pad, max + pad)
    }
}

/// Writes the indicator chart as a PNG image.
pub struct PngChartRenderer {
    config: ChartConfig,
}

impl PngChartRenderer {
    pub fn new(config: ChartConfig) -> Self {
        Self { config }
    }

    /// Draws the chart in memory.
    pub fn draw(&self, series: &Series) -> RgbImage {
        let mut img = RgbImage::from_pixel(self.config.width, self.config.height, colors::WHITE);

        for panel in panels_for(series) {
            let frame = Frame::for_slot(&self.config, panel.slot());
            draw_rect_outline(
                &mut img,
                (frame.left, frame.top),
                (frame.right, frame.bottom),
                colors::LIGHT_GRAY,
            );

            match panel {
                Panel::Price => self.draw_price(&mut img, &frame, series),
                Panel::Rsi => self.draw_rsi(&mut img, &frame, series),
                Panel::Macd => self.draw_macd(&mut img, &frame, series),
            }
            debug!("Drew {:?} panel", panel);
        }

        img
    }

    fn draw_price(&self, img: &mut RgbImage, frame: &Frame, series: &Series) {
        let closes: Vec<Option<f64>> = series.closes().map(Some).collect();
        let mut columns: Vec<&[Option<f64>]> = vec![closes.as_slice()];
        if let Some(ma) = series.moving_average() {
            columns.push(ma);
        }
        let scale = Scale::fit(columns.iter().copied());

        plot_line(img, frame, &scale, &closes, colors::BLUE);
        if let Some(ma) = series.moving_average() {
            plot_line(img, frame, &scale, ma, colors::ORANGE);
        }
    }

    fn draw_rsi(&self, img: &mut RgbImage, frame: &Frame, series: &Series) {
        let Some(rsi) = series.rsi() else { return };
        let scale = Scale::fixed(0.0, 100.0);

        draw_dashed_horizontal(img, frame.y(RSI_OVERBOUGHT, &scale), frame.left, frame.right, 6, colors::RED);
        draw_dashed_horizontal(img, frame.y(RSI_OVERSOLD, &scale), frame.left, frame.right, 6, colors::GREEN);
        plot_line(img, frame, &scale, rsi, colors::ORANGE);
    }

    fn draw_macd(&self, img: &mut RgbImage, frame: &Frame, series: &Series) {
        let (Some(macd), Some(signal), Some(histogram)) =
            (series.macd_line(), series.signal_line(), series.macd_histogram())
        else {
            return;
        };

        let zero = [Some(0.0)];
        let scale = Scale::fit([macd, signal, &histogram[..], &zero[..]]);
        let zero_y = frame.y(0.0, &scale);

        // histogram first so the lines stay visible on top
        let len = histogram.len();
        let half_bar = if len > 1 {
            (((frame.right - frame.left) as f64 / (len - 1) as f64) * 0.4).floor() as i64
        } else {
            2
        };
        for (i, value) in histogram.iter().enumerate() {
            if let Some(v) = value.filter(|v| v.is_finite()) {
                let x = frame.x(i, len);
                fill_rect(
                    img,
                    (x - half_bar, zero_y),
                    (x + half_bar, frame.y(v, &scale)),
                    colors::HISTOGRAM_GRAY,
                );
            }
        }

        draw_line(img, (frame.left, zero_y), (frame.right, zero_y), colors::LIGHT_GRAY);
        plot_line(img, frame, &scale, macd, colors::MACD_BLUE);
        plot_line(img, frame, &scale, signal, colors::SIGNAL_RED);
    }
}

/// Connects consecutive defined points; undefined or NaN values break the line.
fn plot_line(img: &mut RgbImage, frame: &Frame, scale: &Scale, values: &[Option<f64>], color: Rgb<u8>) {
    let len = values.len();
    let mut prev: Option<(i64, i64)> = None;

    for (i, value) in values.iter().enumerate() {
        match value.filter(|v| v.is_finite()) {
            Some(v) => {
                let point = (frame.x(i, len), frame.y(v, scale));
                match prev {
                    Some(p) => draw_line(img, p, point, color),
                    None => draw_line(img, point, point, color),
                }
                prev = Some(point);
            }
            None => prev = None,
        }
    }
}

impl ChartRenderer for PngChartRenderer {
    fn render(
        &self,
        series: &Series,
        ticker: &str,
        period: &str,
        output: Option<&Path>,
    ) -> Result<PathBuf> {
        let path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(default_filename(ticker, period)));

        let img = self.draw(series);
        img.save(&path)
            .with_context(|| format!("Failed to save chart to {}", path.display()))?;

        info!("Chart saved as {}", path.display());
        Ok(path)
    }
}
