//! Log-log rank/frequency plot
//!
//! Counts are sorted descending and drawn as ln(count) against ln(rank + 1),
//! so a Zipfian corpus shows up as a roughly straight line. Axis titles and
//! a legend naming the archive are drawn with 8x8 bitmap glyphs.

use crate::error::FreqResult;
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{ImageFormat, Rgb, RgbImage};
use std::path::Path;
use tracing::info;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;
const MARGIN: u32 = 50;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([40, 40, 40]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const SERIES: Rgb<u8> = Rgb([31, 119, 180]);
const TEXT: Rgb<u8> = Rgb([0, 0, 0]);

const X_TITLE: &str = "Sorted items in log scale";
const Y_TITLE: &str = "Frequency in log scale";
const GLYPH: i64 = 8;

/// Render `counts` (any order) to a PNG at `path`, replacing any existing file.
/// `legend` names the series, usually the archive's file stem.
pub fn plot_frequencies(counts: &[u64], legend: &str, path: &Path) -> FreqResult<()> {
    info!("Num of unique items: {}", counts.len());

    let points = log_log_points(counts);
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);

    let (x_max, y_min, y_max) = bounds(&points);
    let x_span = if x_max > 0.0 { x_max } else { 1.0 };
    let y_span = if y_max > y_min { y_max - y_min } else { 1.0 };

    let plot_w = (WIDTH - 2 * MARGIN) as f64;
    let plot_h = (HEIGHT - 2 * MARGIN) as f64;
    let to_pixel = |(x, y): (f64, f64)| -> (i64, i64) {
        let px = MARGIN as f64 + x / x_span * plot_w;
        let py = (HEIGHT - MARGIN) as f64 - (y - y_min) / y_span * plot_h;
        (px.round() as i64, py.round() as i64)
    };

    // Grid at whole natural-log units
    for gx in 1..=(x_span.floor() as i64) {
        let (px, _) = to_pixel((gx as f64, y_min));
        draw_line(&mut img, (px, MARGIN as i64), (px, (HEIGHT - MARGIN) as i64), GRID);
    }
    for gy in (y_min.ceil() as i64)..=(y_min + y_span).floor() as i64 {
        let (_, py) = to_pixel((0.0, gy as f64));
        draw_line(&mut img, (MARGIN as i64, py), ((WIDTH - MARGIN) as i64, py), GRID);
    }

    let origin = (MARGIN as i64, (HEIGHT - MARGIN) as i64);
    draw_line(&mut img, origin, ((WIDTH - MARGIN) as i64, origin.1), AXIS);
    draw_line(&mut img, origin, (origin.0, MARGIN as i64), AXIS);

    let mut previous: Option<(i64, i64)> = None;
    for &point in &points {
        let current = to_pixel(point);
        match previous {
            Some(prev) if prev != current => draw_line(&mut img, prev, current, SERIES),
            Some(_) => {}
            None => draw_line(&mut img, current, current, SERIES),
        }
        previous = Some(current);
    }

    draw_titles(&mut img);
    if !points.is_empty() {
        draw_legend(&mut img, legend);
    }

    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Legend text for an archive: its file stem.
pub fn archive_legend(archive: &Path) -> String {
    archive
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// (ln(rank + 1), ln(count)) for counts sorted descending; zero counts have
/// no logarithm and are dropped.
fn log_log_points(counts: &[u64]) -> Vec<(f64, f64)> {
    let mut sorted: Vec<u64> = counts.iter().copied().filter(|&c| c > 0).collect();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted
        .iter()
        .enumerate()
        .map(|(rank, &count)| (((rank + 1) as f64).ln(), (count as f64).ln()))
        .collect()
}

/// (max x, min y, max y); x always starts at 0 (rank 0).
fn bounds(points: &[(f64, f64)]) -> (f64, f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    points.iter().fold(
        (f64::MIN, f64::MAX, f64::MIN),
        |(x_max, y_min, y_max), &(x, y)| (x_max.max(x), y_min.min(y), y_max.max(y)),
    )
}

/// Bresenham line, clipped to the canvas.
fn draw_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_clipped(img, x, y, color);
        if x == to.0 && y == to.1 {
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

fn put_clipped(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn text_width(text: &str, scale: i64) -> i64 {
    text.chars().count() as i64 * GLYPH * scale
}

/// Axis titles: centred under the x axis, and reading bottom-to-top left of
/// the y axis.
fn draw_titles(img: &mut RgbImage) {
    let (w, h, m) = (WIDTH as i64, HEIGHT as i64, MARGIN as i64);
    let x_width = text_width(X_TITLE, 2);
    draw_text(img, X_TITLE, ((w - x_width) / 2, h - m + 14), 2, false);
    let y_width = text_width(Y_TITLE, 2);
    draw_text(img, Y_TITLE, (m - 36, (h + y_width) / 2), 2, true);
}

/// Legend in the top-right corner of the plot area: a series swatch and the
/// archive name.
fn draw_legend(img: &mut RgbImage, name: &str) {
    let (w, m) = (WIDTH as i64, MARGIN as i64);
    let swatch = 20;
    let left = (w - m - 10 - text_width(name, 1) - swatch - 8).max(m + 10);
    let mid = m + 10 + GLYPH / 2;
    draw_line(img, (left, mid), (left + swatch, mid), SERIES);
    draw_text(img, name, (left + swatch + 8, m + 10), 1, false);
}

/// Blit `text` with 8x8 glyphs scaled by `scale`. Horizontal text starts at
/// its top-left corner; vertical text is rotated a quarter turn
/// counter-clockwise and starts at its bottom-left corner. Characters
/// without a glyph leave a blank cell.
fn draw_text(img: &mut RgbImage, text: &str, origin: (i64, i64), scale: i64, vertical: bool) {
    for (i, ch) in text.chars().enumerate() {
        let glyph = BASIC_FONTS.get(ch).unwrap_or([0; 8]);
        let pen = i as i64 * GLYPH * scale;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let (gx, gy) = (col * scale, row as i64 * scale);
                for dy in 0..scale {
                    for dx in 0..scale {
                        let (x, y) = if vertical {
                            (origin.0 + gy + dy, origin.1 - pen - gx - dx)
                        } else {
                            (origin.0 + pen + gx + dx, origin.1 + gy + dy)
                        };
                        put_clipped(img, x, y, TEXT);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_log_points_sorted_descending() {
        let points = log_log_points(&[1, 10, 0, 100]);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].0, 0.0);
        assert!((points[0].1 - 100f64.ln()).abs() < 1e-12);
        assert!(points.windows(2).all(|w| w[0].1 >= w[1].1));
        assert!(points.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_plot_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2_gram_counts_test_100.0%.png");
        plot_frequencies(&[50, 20, 20, 5, 1, 1, 1], "test", &path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
        assert!(img.pixels().any(|p| *p == SERIES));
    }

    #[test]
    fn test_plot_empty_counts_draws_axes_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        plot_frequencies(&[], "empty", &path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert!(img.pixels().any(|p| *p == AXIS));
        assert!(!img.pixels().any(|p| *p == SERIES));
    }

    #[test]
    fn test_draw_line_clips() {
        let mut img = RgbImage::from_pixel(4, 4, BACKGROUND);
        draw_line(&mut img, (-3, -3), (10, 10), SERIES);
        assert_eq!(*img.get_pixel(0, 0), SERIES);
        assert_eq!(*img.get_pixel(3, 3), SERIES);
    }

    fn text_pixels(img: &RgbImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) -> usize {
        ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
            .filter(|&(x, y)| *img.get_pixel(x, y) == TEXT)
            .count()
    }

    #[test]
    fn test_plot_has_axis_titles_and_legend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2_gram_counts_test_100.0%.png");
        plot_frequencies(&[50, 20, 5, 1], "2_gram_counts_test_100.0%", &path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        // x title below the axis, y title left of it
        assert!(text_pixels(&img, 0..WIDTH, HEIGHT - MARGIN + 1..HEIGHT) > 0);
        assert!(text_pixels(&img, 0..MARGIN, 0..HEIGHT) > 0);
        // legend inside the top-right of the plot area
        assert!(text_pixels(&img, WIDTH / 2..WIDTH - MARGIN, MARGIN..MARGIN + 20) > 0);
    }

    #[test]
    fn test_empty_plot_keeps_titles_without_legend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        plot_frequencies(&[], "empty", &path).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert!(text_pixels(&img, 0..WIDTH, HEIGHT - MARGIN + 1..HEIGHT) > 0);
        assert_eq!(text_pixels(&img, MARGIN + 1..WIDTH - MARGIN, MARGIN..MARGIN + 20), 0);
    }

    #[test]
    fn test_archive_legend_is_stem() {
        assert_eq!(
            archive_legend(Path::new("cache/2_gram_counts_wiki_0.1%.npz")),
            "2_gram_counts_wiki_0.1%"
        );
    }

    #[test]
    fn test_draw_text_vertical_reads_upwards() {
        let mut img = RgbImage::from_pixel(16, 16, BACKGROUND);
        draw_text(&mut img, "-", (0, 15), 1, true);
        let lit: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == TEXT)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!lit.is_empty());
        // a horizontal dash turns into a vertical stroke in one column
        assert!(lit.iter().all(|&(x, _)| x == lit[0].0));
        assert!(lit.iter().all(|&(_, y)| y >= 8));
    }
}
