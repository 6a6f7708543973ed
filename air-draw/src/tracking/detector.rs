use super::contour;
use super::hsv;
use super::types::{Detector, TrackedPoint};
use crate::profile::ColorProfile;
use image::{GrayImage, RgbImage};
use imageproc::morphology::Mask;

/// Tuning for [`HsvDetector`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    /// Regions with a contour area at or below this (px²) are treated as noise
    pub min_area: f64,
    /// Radius of the disk used for erosion and dilation (2 gives a 5x5 disk)
    pub kernel_radius: u8,
    /// Erosions (and then dilations) applied per frame
    pub iterations: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_area: 500.0,
            kernel_radius: 2,
            iterations: 2,
        }
    }
}

/// Color-threshold tracker
///
/// Per frame: threshold in HSV, open the mask, take the largest external
/// contour above `min_area` and return its centroid. Nothing carries over
/// between frames except the mask buffer, which is reused while the frame
/// size stays the same.
pub struct HsvDetector {
    config: DetectorConfig,
    kernel: Mask,
    mask: GrayImage,
}

impl HsvDetector {
    pub fn new(config: DetectorConfig) -> Self {
        tracing::debug!(
            "HSV detector: min_area={}, kernel_radius={}, iterations={}",
            config.min_area,
            config.kernel_radius,
            config.iterations
        );

        Self {
            kernel: Mask::disk(config.kernel_radius),
            config,
            mask: GrayImage::new(0, 0),
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}

impl Default for HsvDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

impl Detector for HsvDetector {
    fn detect(&mut self, frame: &RgbImage, profile: &ColorProfile) -> TrackedPoint {
        let _span = tracing::debug_span!("detect", profile = %profile.name).entered();

        if frame.width() == 0 || frame.height() == 0 {
            // Nothing was thresholded, so there is no mask to show either
            self.mask = GrayImage::new(0, 0);
            return None;
        }

        hsv::threshold_into(frame, profile, &mut self.mask);
        contour::open(&mut self.mask, &self.kernel, self.config.iterations);

        contour::largest_region(&self.mask, self.config.min_area)?.centroid()
    }

    fn last_mask(&self) -> Option<&GrayImage> {
        (self.mask.width() > 0).then_some(&self.mask)
    }
}
