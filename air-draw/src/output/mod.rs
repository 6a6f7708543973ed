mod loopback;
mod window;

pub use loopback::V4L2Output;
pub use window::WindowOutput;

use crate::controls::Command;
use anyhow::Result;
use image::RgbImage;

/// Trait for output destinations
pub trait OutputSink {
    /// Write a composited frame to the output
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;

    /// Get the expected output resolution
    fn resolution(&self) -> (u32, u32);

    /// Operator commands gathered since the last call (key presses etc.)
    fn poll_commands(&mut self) -> Vec<Command> {
        Vec::new()
    }

    /// Show a one-line status to the operator
    fn show_status(&mut self, _status: &str) {}

    /// False once the operator has closed the output
    fn is_open(&self) -> bool {
        true
    }
}
