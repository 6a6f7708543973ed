use crate::profile::{ColorProfile, Hsv, MAX_HUE};
use image::{GrayImage, Luma, RgbImage};

/// Mask value for pixels inside the profile bounds
pub const MASK_ON: u8 = 255;

/// Convert one RGB pixel to 8-bit HSV
///
/// Hue is halved so it fits a byte (0..180), saturation is scaled to 0..=255
/// relative to the value channel. Grays (max == min) have hue and saturation 0.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = (max - min) as f32;

    if max == 0 {
        return Hsv::new(0, 0, 0);
    }
    let s = (255.0 * diff / max as f32).round() as u8;
    if max == min {
        return Hsv::new(0, s, max);
    }

    let (r, g, b) = (r as f32, g as f32, b as f32);
    let degrees = if max as f32 == r {
        60.0 * (g - b) / diff
    } else if max as f32 == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };

    let mut h = (degrees / 2.0).round() as i32;
    if h < 0 {
        h += MAX_HUE as i32;
    }
    if h >= MAX_HUE as i32 {
        h -= MAX_HUE as i32;
    }

    Hsv::new(h as u8, s, max)
}

/// Threshold `frame` against the profile bounds into `mask`
///
/// `mask` is reallocated only when its dimensions differ from the frame, so a
/// mask kept across ticks is reused at a fixed resolution.
pub fn threshold_into(frame: &RgbImage, profile: &ColorProfile, mask: &mut GrayImage) {
    let _span = tracing::debug_span!("threshold").entered();

    if mask.dimensions() != frame.dimensions() {
        let (width, height) = frame.dimensions();
        *mask = GrayImage::new(width, height);
    }

    for (src, dst) in frame.pixels().zip(mask.pixels_mut()) {
        let hsv = rgb_to_hsv(src[0], src[1], src[2]);
        *dst = Luma([if profile.contains(hsv) { MASK_ON } else { 0 }]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileRegistry;
    use image::Rgb;

    #[test]
    fn primaries_map_to_halved_degrees() {
        assert_eq!(rgb_to_hsv(255, 0, 0), Hsv::new(0, 255, 255));
        assert_eq!(rgb_to_hsv(0, 255, 0), Hsv::new(60, 255, 255));
        assert_eq!(rgb_to_hsv(0, 0, 255), Hsv::new(120, 255, 255));
        assert_eq!(rgb_to_hsv(255, 255, 0), Hsv::new(30, 255, 255));
    }

    #[test]
    fn grays_have_no_hue_or_saturation() {
        assert_eq!(rgb_to_hsv(0, 0, 0), Hsv::new(0, 0, 0));
        assert_eq!(rgb_to_hsv(128, 128, 128), Hsv::new(0, 0, 128));
        assert_eq!(rgb_to_hsv(255, 255, 255), Hsv::new(0, 0, 255));
    }

    #[test]
    fn magenta_side_of_red_wraps_into_range() {
        // Slightly blue red: negative hue wraps to the top of the circle
        let hsv = rgb_to_hsv(255, 0, 20);
        assert!(hsv.h > 170, "hue {}", hsv.h);
    }

    #[test]
    fn threshold_marks_only_matching_pixels() {
        let registry = ProfileRegistry::builtin();
        let red = registry.lookup("red").unwrap();

        let mut frame = RgbImage::from_pixel(4, 2, Rgb([128, 128, 128]));
        frame.put_pixel(1, 0, Rgb([220, 30, 30]));
        frame.put_pixel(3, 1, Rgb([30, 30, 220]));

        let mut mask = GrayImage::new(0, 0);
        threshold_into(&frame, red, &mut mask);

        assert_eq!(mask.dimensions(), (4, 2));
        let on: Vec<(u32, u32)> = mask
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] == MASK_ON)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert_eq!(on, vec![(1, 0)]);
    }
}
