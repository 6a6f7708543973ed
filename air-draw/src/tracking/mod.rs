pub mod contour;
mod detector;
pub mod hsv;
pub mod types;

pub use detector::{DetectorConfig, HsvDetector};
pub use types::{Detector, Point, TrackedPoint};

/// Create the default tracker (HSV threshold + opening + largest contour)
pub fn create_default_detector(config: DetectorConfig) -> Box<dyn Detector> {
    Box::new(HsvDetector::new(config))
}
