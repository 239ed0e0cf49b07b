//! PNG line chart of cumulative rewards, drawn with the `image` crate.

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

use crate::{Result, error::Error, ports::RewardsChart};

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 600;
const MARGIN: i32 = 50;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([60, 60, 60]);
const ZERO_LINE: Rgb<u8> = Rgb([200, 200, 200]);
const SERIES: Rgb<u8> = Rgb([31, 119, 180]);

/// Renders the series as a single polyline on fixed axes.
///
/// The x axis spans the recorded updates, the y axis spans the series range
/// (always including zero).
#[derive(Debug, Clone, Copy)]
pub struct PngRewardsChart {
    width: u32,
    height: u32,
}

impl Default for PngRewardsChart {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
        }
    }
}

impl PngRewardsChart {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(2 * MARGIN as u32 + 2),
            height: height.max(2 * MARGIN as u32 + 2),
        }
    }

    fn plot(&self, series: &[f64]) -> RgbImage {
        let mut img = RgbImage::from_pixel(self.width, self.height, BACKGROUND);
        let (left, top) = (MARGIN, MARGIN);
        let right = self.width as i32 - MARGIN;
        let bottom = self.height as i32 - MARGIN;

        let lo = series.iter().copied().fold(0.0_f64, f64::min);
        let hi = series.iter().copied().fold(0.0_f64, f64::max);
        let span = if hi > lo { hi - lo } else { 1.0 };
        let last = series.len().saturating_sub(1).max(1) as f64;

        let to_x = |i: usize| left + ((i as f64 / last) * f64::from(right - left)).round() as i32;
        let to_y = |v: f64| bottom - (((v - lo) / span) * f64::from(bottom - top)).round() as i32;

        let zero = to_y(0.0);
        draw_line(&mut img, left, zero, right, zero, ZERO_LINE);
        draw_line(&mut img, left, top, left, bottom, AXIS);
        draw_line(&mut img, left, bottom, right, bottom, AXIS);

        let mut points = series.iter().enumerate().map(|(i, &v)| (to_x(i), to_y(v)));
        if let Some(mut prev) = points.next() {
            for point in points {
                draw_line(&mut img, prev.0, prev.1, point.0, point.1, SERIES);
                prev = point;
            }
            if series.len() == 1 {
                draw_line(&mut img, prev.0, prev.1, right, prev.1, SERIES);
            }
        }
        img
    }
}

impl RewardsChart for PngRewardsChart {
    fn render(&self, cumulative: &[f64]) -> Result<Vec<u8>> {
        let img = self.plot(cumulative);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| Error::ChartRender {
                message: e.to_string(),
            })?;
        Ok(buf.into_inner())
    }
}

/// Draw a line using Bresenham's algorithm
fn draw_line(img: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        if x >= 0 && x < img.width() as i32 && y >= 0 && y < img.height() as i32 {
            img.put_pixel(x as u32, y as u32, color);
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn test_render_produces_png() {
        let bytes = PngRewardsChart::default()
            .render(&[0.0, 1.0, 0.0, -1.0, 2.0])
            .unwrap();
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_series_pixels_are_drawn() {
        let chart = PngRewardsChart::new(200, 150);
        let img = chart.plot(&[0.0, 3.0]);
        assert!(img.pixels().any(|p| *p == SERIES));
        assert_eq!(img.dimensions(), (200, 150));
    }

    #[test]
    fn test_single_point_and_flat_series() {
        let chart = PngRewardsChart::default();
        assert!(chart.render(&[0.0]).is_ok());
        assert!(chart.render(&[0.0, 0.0, 0.0]).is_ok());
    }
}
