use super::types::Point;
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::morphology::{grayscale_dilate, grayscale_erode, Mask};

/// Morphological opening: `iterations` erosions with `kernel`, then as many
/// dilations.
///
/// Erosion drops speckle noise; dilation grows the surviving regions back to
/// roughly their original extent. Pixels outside the image never erode a
/// region, so blobs cut off by the frame edge keep their edge side.
pub fn open(mask: &mut GrayImage, kernel: &Mask, iterations: u32) {
    let _span = tracing::debug_span!("opening").entered();

    for _ in 0..iterations {
        *mask = grayscale_erode(mask, kernel);
    }
    for _ in 0..iterations {
        *mask = grayscale_dilate(mask, kernel);
    }
}

/// Spatial moments of a closed polygon, computed with Green's theorem
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// Moments of the polygon through `points`, closed from last to first.
    /// Orientation is normalized so `m00` is the non-negative enclosed area.
    pub fn of_polygon(points: &[imageproc::point::Point<i32>]) -> Self {
        let Some(last) = points.last() else {
            return Self { m00: 0.0, m10: 0.0, m01: 0.0 };
        };

        let (mut a, mut mx, mut my) = (0.0f64, 0.0f64, 0.0f64);
        let (mut x0, mut y0) = (last.x as f64, last.y as f64);
        for p in points {
            let (x1, y1) = (p.x as f64, p.y as f64);
            let cross = x0 * y1 - x1 * y0;
            a += cross;
            mx += (x0 + x1) * cross;
            my += (y0 + y1) * cross;
            x0 = x1;
            y0 = y1;
        }

        let sign = if a < 0.0 { -1.0 } else { 1.0 };
        Self {
            m00: sign * a / 2.0,
            m10: sign * mx / 6.0,
            m01: sign * my / 6.0,
        }
    }

    /// `(M10 / M00, M01 / M00)` truncated to pixels; `None` for zero area
    pub fn centroid(&self) -> Option<Point> {
        if self.m00 == 0.0 {
            return None;
        }
        Some(Point::new(
            (self.m10 / self.m00) as i32,
            (self.m01 / self.m00) as i32,
        ))
    }
}

/// Outermost borders of the foreground regions in `mask`
///
/// Holes and anything nested inside a hole are skipped. Order is raster order
/// of each border's first pixel: top to bottom, then left to right.
///
/// The border follower only starts an outer border after a background pixel,
/// so the mask is traced inside a one pixel frame of background. Regions
/// touching the left edge (or filling the whole mask) are then still found.
pub fn external_contours(mask: &GrayImage) -> Vec<Contour<i32>> {
    let _span = tracing::debug_span!("contours").entered();

    let mut framed = GrayImage::new(mask.width() + 2, mask.height() + 2);
    image::imageops::replace(&mut framed, mask, 1, 1);

    find_contours::<i32>(&framed)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|mut c| {
            for p in &mut c.points {
                p.x -= 1;
                p.y -= 1;
            }
            c
        })
        .collect()
}

/// Moments of the external contour with the largest area, if that area is
/// strictly above `min_area`
///
/// Ties keep the first contour in enumeration order, so the topmost-then-
/// leftmost region wins among equal areas.
pub fn largest_region(mask: &GrayImage, min_area: f64) -> Option<Moments> {
    let mut best: Option<Moments> = None;
    let mut max_area = 0.0;

    for contour in external_contours(mask) {
        let moments = Moments::of_polygon(&contour.points);
        if moments.m00 > max_area && moments.m00 > min_area {
            max_area = moments.m00;
            best = Some(moments);
        }
    }

    best
}
