//! The monster plot: two random eyes and a wavy mouth.
//!
//! Mostly useful for checking that uploads work end to end.

use crate::encode::Figure;
use crate::error::Result;
use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

const CANVAS: u32 = 480;
const MARGIN: u32 = 48;
const EYE_RADIUS: f64 = 10.0;
const MOUTH_POINTS: usize = 100;
const MOUTH_HALF_WIDTH: f64 = 1.0;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Face features in plot coordinates (both axes span `0.0..=1.0`).
#[derive(Debug, Clone, PartialEq)]
pub struct MonsterPlot {
    pub eyes: [(f64, f64); 2],
    /// Angular frequency of the mouth curve
    pub mouth_frequency: f64,
    pub mouth_phase: f64,
}

impl MonsterPlot {
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let mut eye = || (rng.gen_range(0.25..0.75), rng.gen_range(0.7..0.9));
        let eyes = [eye(), eye()];
        Self {
            eyes,
            mouth_frequency: rng.gen_range(1.0..10.0),
            mouth_phase: rng.gen_range(0.0..2.0 * PI),
        }
    }

    pub fn random() -> Self {
        Self::generate(&mut rand::thread_rng())
    }

    /// Same seed, same monster.
    pub fn from_seed(seed: u64) -> Self {
        Self::generate(&mut StdRng::seed_from_u64(seed))
    }

    pub fn mouth_y(&self, x: f64) -> f64 {
        0.2 + 0.1 * (self.mouth_frequency * x + self.mouth_phase).sin()
    }

    pub fn draw(&self) -> RgbaImage {
        let mut canvas = RgbaImage::from_pixel(CANVAS, CANVAS, BACKGROUND);
        draw_frame(&mut canvas);

        for &(x, y) in &self.eyes {
            let (px, py) = to_pixel(x, y);
            fill_disc(&mut canvas, px, py, EYE_RADIUS);
        }

        let points: Vec<(f64, f64)> = (0..MOUTH_POINTS)
            .map(|i| {
                let x = i as f64 / (MOUTH_POINTS - 1) as f64;
                to_pixel(x, self.mouth_y(x))
            })
            .collect();
        for pair in points.windows(2) {
            draw_segment(&mut canvas, pair[0], pair[1]);
        }

        canvas
    }
}

impl Figure for MonsterPlot {
    fn render(self: Box<Self>) -> Result<RgbaImage> {
        Ok(self.draw())
    }
}

fn plot_span() -> f64 {
    f64::from(CANVAS - 2 * MARGIN)
}

/// Plot coordinates to pixel coordinates; y grows upwards in the plot.
fn to_pixel(x: f64, y: f64) -> (f64, f64) {
    let left = f64::from(MARGIN);
    let bottom = f64::from(CANVAS - MARGIN);
    (left + x * plot_span(), bottom - y * plot_span())
}

fn draw_frame(canvas: &mut RgbaImage) {
    let (lo, hi) = (MARGIN, CANVAS - MARGIN);
    for i in lo..=hi {
        canvas.put_pixel(i, lo, INK);
        canvas.put_pixel(i, hi, INK);
        canvas.put_pixel(lo, i, INK);
        canvas.put_pixel(hi, i, INK);
    }
}

fn fill_disc(canvas: &mut RgbaImage, cx: f64, cy: f64, radius: f64) {
    let (w, h) = canvas.dimensions();
    let x0 = (cx - radius).floor().max(0.0) as u32;
    let y0 = (cy - radius).floor().max(0.0) as u32;
    let x1 = ((cx + radius).ceil() as u32).min(w - 1);
    let y1 = ((cy + radius).ceil() as u32).min(h - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = f64::from(x) - cx;
            let dy = f64::from(y) - cy;
            if dx * dx + dy * dy <= radius * radius {
                canvas.put_pixel(x, y, INK);
            }
        }
    }
}

fn draw_segment(canvas: &mut RgbaImage, from: (f64, f64), to: (f64, f64)) {
    let length = (to.0 - from.0).hypot(to.1 - from.1);
    let steps = length.ceil().max(1.0) as usize;
    for step in 0..=steps {
        let t = step as f64 / steps as f64;
        let x = from.0 + (to.0 - from.0) * t;
        let y = from.1 + (to.1 - from.1) * t;
        fill_disc(canvas, x, y, MOUTH_HALF_WIDTH);
    }
}
