use crate::profile::ColorProfile;
use image::{GrayImage, RgbImage};

/// Pixel coordinate of a tracked object, inside the frame it was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Result of one detection: `None` means nothing was found this frame.
pub type TrackedPoint = Option<Point>;

/// Trait for single-object color trackers
/// Allows swapping the segmentation strategy without touching the renderer.
pub trait Detector {
    /// Locate the tracked object in a frame
    ///
    /// # Arguments
    /// * `frame` - Input RGB frame
    /// * `profile` - Active color profile supplying the HSV bounds
    ///
    /// # Returns
    /// * Centroid of the object, or `None` when nothing large enough matches
    fn detect(&mut self, frame: &RgbImage, profile: &ColorProfile) -> TrackedPoint;

    /// Binary mask produced by the most recent `detect` call, for debug views
    fn last_mask(&self) -> Option<&GrayImage> {
        None
    }
}
