use crate::compose::{self, View};
use crate::error::Result;
use crate::profile::{ColorProfile, ProfileRegistry};
use crate::stroke::{StrokeRenderer, StrokeStyle};
use crate::tracking::{Detector, TrackedPoint};
use image::RgbImage;

/// One drawing session: the active profile, the tracker and the canvas
///
/// Ticks must be applied one at a time and in capture order; profile switches
/// and clears happen between ticks.
pub struct Whiteboard {
    registry: ProfileRegistry,
    active: usize,
    detector: Box<dyn Detector>,
    renderer: StrokeRenderer,
}

impl Whiteboard {
    pub fn new(
        registry: ProfileRegistry,
        initial_profile: &str,
        detector: Box<dyn Detector>,
        style: StrokeStyle,
        (width, height): (u32, u32),
    ) -> Result<Self> {
        let active = registry.position(initial_profile)?;
        tracing::info!(
            "Whiteboard {}x{}, profiles: {}",
            width,
            height,
            registry.names().join(", ")
        );

        Ok(Self {
            registry,
            active,
            detector,
            renderer: StrokeRenderer::new(width, height, style),
        })
    }

    /// Detect in `frame` with the active profile and feed the result to the
    /// renderer. Returns the tracked point.
    pub fn tick(&mut self, frame: &RgbImage) -> TrackedPoint {
        if frame.width() == 0 || frame.height() == 0 {
            return None;
        }

        if frame.dimensions() != self.renderer.dimensions() {
            let (width, height) = frame.dimensions();
            tracing::warn!(
                "Frame size changed to {}x{}, resetting canvas",
                width,
                height
            );
            self.renderer.resize(width, height);
        }

        let profile = &self.registry.as_slice()[self.active];
        let point = self.detector.detect(frame, profile);
        self.renderer.feed(point, profile.draw_color);
        point
    }

    /// Switch the active profile by name. Always clears the canvas first.
    pub fn set_profile(&mut self, name: &str) -> Result<&ColorProfile> {
        let index = self.registry.position(name)?;
        Ok(self.activate(index))
    }

    /// Switch the active profile by registry position
    pub fn select_index(&mut self, index: usize) -> Option<&ColorProfile> {
        if index >= self.registry.len() {
            return None;
        }
        Some(self.activate(index))
    }

    fn activate(&mut self, index: usize) -> &ColorProfile {
        self.renderer.clear();
        self.active = index;
        let profile = &self.registry.as_slice()[index];
        tracing::info!("Color changed to {} - canvas cleared", profile.name);
        profile
    }

    pub fn clear(&mut self) {
        self.renderer.clear();
        tracing::info!("Canvas cleared");
    }

    pub fn profile(&self) -> &ColorProfile {
        &self.registry.as_slice()[self.active]
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    pub fn renderer(&self) -> &StrokeRenderer {
        &self.renderer
    }

    /// Status line for the operator, after a tick returned `point`
    pub fn status(&self, point: TrackedPoint) -> String {
        match point {
            Some(p) => format!("Drawing - object detected at ({}, {})", p.x, p.y),
            None => format!("Ready - move {} object in view to draw", self.profile().name),
        }
    }

    /// Build the image handed to the display sink for this tick
    pub fn compose(&self, mut frame: RgbImage, view: View) -> Result<RgbImage> {
        match view {
            View::Overlay => {
                compose::overlay_ink(&mut frame, self.renderer.canvas(), self.renderer.coverage())?;
                Ok(frame)
            }
            View::Canvas => Ok(self.renderer.canvas().clone()),
            View::Mask => Ok(self
                .detector
                .last_mask()
                .map(compose::mask_to_rgb)
                .unwrap_or(frame)),
        }
    }
}
