use super::OutputSink;
use anyhow::{Context, Result};
use image::RgbImage;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use v4l::video::Output;
use v4l::{Device, Format, FourCC};

/// Writes composited frames to a v4l2loopback device as YUYV, so the drawing
/// shows up as a virtual webcam in other applications.
pub struct V4L2Output {
    file: File,
    width: u32,
    height: u32,
    yuyv: Vec<u8>,
}

impl V4L2Output {
    pub fn new<P: AsRef<Path>>(device_path: P, width: u32, height: u32) -> Result<Self> {
        let path = device_path.as_ref();
        tracing::info!(
            "Opening v4l2loopback device at {} ({}x{})",
            path.display(),
            width,
            height
        );

        // Announce the format to readers before the first frame lands
        let device = Device::with_path(path)
            .with_context(|| format!("Failed to open v4l2 device at {}", path.display()))?;
        let format = Format::new(width, height, FourCC::new(b"YUYV"));
        let applied = Output::set_format(&device, &format)
            .with_context(|| format!("Failed to set YUYV {}x{} on {}", width, height, path.display()))?;
        tracing::debug!("v4l2loopback format: {:?}", applied);
        drop(device);

        let file = File::options()
            .write(true)
            .open(path)
            .with_context(|| format!("Failed to open v4l2loopback device at {}", path.display()))?;

        tracing::info!("v4l2loopback device opened successfully");

        Ok(Self {
            file,
            width,
            height,
            yuyv: Vec::with_capacity((width * height * 2) as usize),
        })
    }
}

/// Pack an RGB frame as YUV422 (YUYV) into `out`, reusing its allocation
///
/// Each horizontal pixel pair shares one chroma sample. An odd last column is
/// paired with itself.
fn rgb_to_yuyv(rgb_image: &RgbImage, out: &mut Vec<u8>) {
    let width = rgb_image.width() as usize;
    out.clear();
    if width == 0 {
        return;
    }

    for row in rgb_image.as_raw().chunks_exact(width * 3) {
        let pairs = row.chunks_exact(6);
        let odd = pairs.remainder();
        for pair in pairs {
            push_pair(out, &pair[..3], &pair[3..]);
        }
        if !odd.is_empty() {
            push_pair(out, odd, odd);
        }
    }
}

fn push_pair(out: &mut Vec<u8>, left: &[u8], right: &[u8]) {
    let (y0, u0, v0) = full_range_yuv(left);
    let (y1, u1, v1) = full_range_yuv(right);
    out.extend_from_slice(&[y0, ((u0 + u1) / 2) as u8, y1, ((v0 + v1) / 2) as u8]);
}

/// BT.601 full range in 8-bit fixed point; chroma is returned unpacked for averaging
fn full_range_yuv(px: &[u8]) -> (u8, i32, i32) {
    let (r, g, b) = (px[0] as i32, px[1] as i32, px[2] as i32);
    let y = (77 * r + 150 * g + 29 * b + 128) >> 8;
    let u = ((-43 * r - 85 * g + 128 * b + 128) >> 8) + 128;
    let v = ((128 * r - 107 * g - 21 * b + 128) >> 8) + 128;
    (y.clamp(0, 255) as u8, u.clamp(0, 255), v.clamp(0, 255))
}

impl OutputSink for V4L2Output {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        let resized;
        let frame = if frame.dimensions() != (self.width, self.height) {
            resized = image::imageops::resize(
                frame,
                self.width,
                self.height,
                image::imageops::FilterType::Triangle,
            );
            &resized
        } else {
            frame
        };

        rgb_to_yuyv(frame, &mut self.yuyv);

        self.file
            .write_all(&self.yuyv)
            .context("Failed to write frame to v4l2loopback device")?;

        Ok(())
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
