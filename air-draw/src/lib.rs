//! Air drawing from a webcam: track a colored object and turn its path into
//! strokes on a canvas overlaid on the live video.
//!
//! Per tick the pipeline is `frame -> Detector -> TrackedPoint -> StrokeRenderer`.
//! [`session::Whiteboard`] owns both halves plus the active [`profile::ColorProfile`];
//! camera capture and display sinks live in [`capture`] and [`output`].

pub mod capture;
pub mod compose;
pub mod controls;
pub mod error;
pub mod output;
pub mod profile;
pub mod session;
pub mod stroke;
pub mod tracking;

pub use error::{Error, Result};
pub use profile::{ColorProfile, Hsv, ProfileRegistry};
pub use session::Whiteboard;
pub use stroke::{PenState, StrokeRenderer, StrokeStyle};
pub use tracking::{Detector, DetectorConfig, HsvDetector, Point, TrackedPoint};
