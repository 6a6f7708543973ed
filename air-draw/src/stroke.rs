use crate::tracking::{Point, TrackedPoint};
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, Canvas};

/// Coverage value of an inked pixel
pub const INKED: Luma<u8> = Luma([255]);

/// Canvas appearance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeStyle {
    /// Width of connected segments in pixels
    pub width: u32,
    /// Radius of the dot drawn when a stroke starts
    pub dot_radius: i32,
    /// Color the canvas is cleared to
    pub background: Rgb<u8>,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 5,
            dot_radius: 2,
            background: Rgb([255, 255, 255]),
        }
    }
}

/// Pen memory between ticks. `None` is pen up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PenState {
    pub last_point: Option<Point>,
}

impl PenState {
    pub fn is_down(&self) -> bool {
        self.last_point.is_some()
    }
}

/// Turns a stream of tracked points into strokes on a persistent canvas
///
/// - `None` lifts the pen without drawing.
/// - A point with the pen up draws a dot and puts the pen down.
/// - A point with the pen down draws a round-capped segment from the last point.
///
/// Alongside the colored canvas it keeps a coverage mask of every pixel that
/// has been inked, so ink in the background color still shows when overlaid.
pub struct StrokeRenderer {
    canvas: RgbImage,
    coverage: GrayImage,
    pen: PenState,
    style: StrokeStyle,
}

impl StrokeRenderer {
    pub fn new(width: u32, height: u32, style: StrokeStyle) -> Self {
        Self {
            canvas: RgbImage::from_pixel(width, height, style.background),
            coverage: GrayImage::new(width, height),
            pen: PenState::default(),
            style,
        }
    }

    pub fn feed(&mut self, point: TrackedPoint, color: Rgb<u8>) {
        let _span = tracing::debug_span!("feed").entered();

        let Some(point) = point else {
            self.pen.last_point = None;
            return;
        };

        match self.pen.last_point {
            None => {
                let center = (point.x, point.y);
                draw_filled_circle_mut(&mut self.canvas, center, self.style.dot_radius, color);
                draw_filled_circle_mut(&mut self.coverage, center, self.style.dot_radius, INKED);
            }
            Some(last) => {
                let radius = (self.style.width / 2) as i32;
                draw_round_segment(&mut self.canvas, last, point, radius, color);
                draw_round_segment(&mut self.coverage, last, point, radius, INKED);
            }
        }

        self.pen.last_point = Some(point);
    }

    /// Repaint the canvas to the background color and lift the pen.
    pub fn clear(&mut self) {
        for px in self.canvas.pixels_mut() {
            *px = self.style.background;
        }
        for px in self.coverage.pixels_mut() {
            *px = Luma([0]);
        }
        self.pen = PenState::default();
    }

    /// Reallocate the canvas at a new size. Drawings are discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas = RgbImage::from_pixel(width, height, self.style.background);
        self.coverage = GrayImage::new(width, height);
        self.pen = PenState::default();
    }

    pub fn canvas(&self) -> &RgbImage {
        &self.canvas
    }

    /// Nonzero wherever ink has been laid down since the last clear
    pub fn coverage(&self) -> &GrayImage {
        &self.coverage
    }

    pub fn pen(&self) -> PenState {
        self.pen
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }
}

/// Thick line with round caps and joins: disks stamped at most one pixel apart
fn draw_round_segment<C: Canvas>(canvas: &mut C, from: Point, to: Point, radius: i32, color: C::Pixel) {
    let dx = (to.x - from.x) as f32;
    let dy = (to.y - from.y) as f32;
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i32;

    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = (from.x as f32 + dx * t).round() as i32;
        let y = (from.y as f32 + dy * t).round() as i32;
        draw_filled_circle_mut(canvas, (x, y), radius, color);
    }
}
