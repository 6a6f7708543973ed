use crate::error::{Error, Result};
use image::{GrayImage, Rgb, RgbImage};

/// What the display sink is given each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum View {
    /// Live video with the ink painted on top
    #[default]
    Overlay,
    /// The canvas alone (plain whiteboard)
    Canvas,
    /// The post-opening detection mask
    Mask,
}

/// Paint the inked canvas pixels onto `frame`
///
/// A canvas pixel is copied where `coverage` is nonzero; everywhere else the
/// frame shows through, whatever color the canvas holds there.
pub fn overlay_ink(frame: &mut RgbImage, canvas: &RgbImage, coverage: &GrayImage) -> Result<()> {
    let _span = tracing::debug_span!("compose").entered();

    for size in [canvas.dimensions(), coverage.dimensions()] {
        if frame.dimensions() != size {
            return Err(Error::FrameSize {
                expected: size,
                actual: frame.dimensions(),
            });
        }
    }

    let inked = canvas.pixels().zip(coverage.pixels());
    for (dst, (ink, covered)) in frame.pixels_mut().zip(inked) {
        if covered[0] != 0 {
            *dst = *ink;
        }
    }

    Ok(())
}

/// Convert a binary mask to a grayscale RGB image for visualization
pub fn mask_to_rgb(mask: &GrayImage) -> RgbImage {
    RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        let value = mask.get_pixel(x, y)[0];
        Rgb([value, value, value])
    })
}
