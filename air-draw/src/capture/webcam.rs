use super::CaptureSource;
use anyhow::{bail, Context, Result};
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;

/// Consecutive failed reads after which the camera is considered gone
const MAX_CONSECUTIVE_FAILURES: u32 = 90;

pub struct WebcamCapture {
    camera: Camera,
    width: u32,
    height: u32,
    failures: u32,
}

impl WebcamCapture {
    /// Open the camera as close as possible to the requested size and rate.
    /// The stream may settle on a different resolution; `resolution()`
    /// reports the one actually delivered.
    pub fn new(device_index: u32, width: u32, height: u32, fps: u32) -> Result<Self> {
        tracing::info!(
            "Initializing webcam {} at {}x{} @ {} fps",
            device_index,
            width,
            height,
            fps
        );

        let index = CameraIndex::Index(device_index);
        let format = CameraFormat::new(Resolution::new(width, height), FrameFormat::MJPEG, fps);
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));

        let mut camera = Camera::new(index, requested)
            .context("Failed to open camera")?;

        camera.open_stream()
            .context("Failed to open camera stream")?;

        let actual = camera.resolution();
        tracing::info!(
            "Webcam initialized: {} ({}x{} @ {} fps)",
            camera.info().human_name(),
            actual.width(),
            actual.height(),
            camera.frame_rate()
        );

        Ok(Self {
            camera,
            width: actual.width(),
            height: actual.height(),
            failures: 0,
        })
    }

    fn read(&mut self) -> Result<RgbImage> {
        let frame = self
            .camera
            .frame()
            .context("Failed to capture frame")?;

        let decoded = frame.decode_image::<RgbFormat>()
            .context("Failed to decode frame")?;

        Ok(decoded)
    }
}

impl CaptureSource for WebcamCapture {
    fn capture_frame(&mut self) -> Result<Option<RgbImage>> {
        match self.read() {
            Ok(frame) => {
                self.failures = 0;
                Ok(Some(frame))
            }
            Err(e) => {
                self.failures += 1;
                if self.failures >= MAX_CONSECUTIVE_FAILURES {
                    bail!("Camera stopped delivering frames: {e:#}");
                }
                tracing::warn!("Skipping frame: {:#}", e);
                Ok(None)
            }
        }
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
