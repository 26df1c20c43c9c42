use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{Interpolation, TargetSize};

/// Scale so the shorter edge equals `target_size`, keeping the aspect ratio.
/// Returns `(width, height)`. Halves round to even.
pub fn short_edge_dimensions(width: usize, height: usize, target_size: u32) -> (usize, usize) {
    let short_side = width.min(height).max(1);
    let percent = target_size as f64 / short_side as f64;

    let new_width = (width as f64 * percent).round_ties_even() as usize;
    let new_height = (height as f64 * percent).round_ties_even() as usize;
    (new_width.max(1), new_height.max(1))
}

/// Destination `(width, height)` for an image of the given size.
pub fn target_dimensions(width: usize, height: usize, target: TargetSize) -> (usize, usize) {
    match target {
        TargetSize::Short(size) => short_edge_dimensions(width, height, size),
        TargetSize::Exact { height, width } => (width as usize, height as usize),
    }
}

fn resize_alg(how: Interpolation) -> ResizeAlg {
    match how {
        Interpolation::Nearest => ResizeAlg::Nearest,
        Interpolation::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
        // Pillow's BICUBIC is the a = -0.5 cubic, i.e. Catmull-Rom
        Interpolation::Bicubic => ResizeAlg::Convolution(FilterType::CatmullRom),
        Interpolation::Lanczos => ResizeAlg::Convolution(FilterType::Lanczos3),
    }
}

fn pixel_type(channels: usize) -> Result<PixelType> {
    match channels {
        1 => Ok(PixelType::U8),
        2 => Ok(PixelType::U8x2),
        3 => Ok(PixelType::U8x3),
        4 => Ok(PixelType::U8x4),
        n => Err(Error::UnsupportedInput(format!(
            "{} channels (expected 1 to 4)",
            n
        ))),
    }
}

fn as_u32(arg: &'static str, value: usize) -> Result<u32> {
    match u32::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(Error::UnsupportedInput(format!("{} must be in 1..=u32::MAX, got {}", arg, value))),
    }
}

/// Resize an interleaved (row-major, channels last) 8-bit image. `data` is
/// handed to the source image without another copy.
pub fn resize_interleaved_u8(
    data: Vec<u8>,
    width: usize,
    height: usize,
    channels: usize,
    target_width: usize,
    target_height: usize,
    how: Interpolation,
) -> Result<Vec<u8>> {
    let pixel_type = pixel_type(channels)?;
    let resize_options = ResizeOptions::new().resize_alg(resize_alg(how));
    let mut resizer = Resizer::new();

    debug!(
        "Resizing {}x{}x{} -> {}x{} ({})",
        width, height, channels, target_width, target_height, how
    );

    let src_image = Image::from_vec_u8(
        as_u32("width", width)?,
        as_u32("height", height)?,
        data,
        pixel_type,
    )?;
    let mut dst_image = Image::new(
        as_u32("target width", target_width)?,
        as_u32("target height", target_height)?,
        pixel_type,
    );
    resizer.resize(&src_image, &mut dst_image, &resize_options)?;

    Ok(dst_image.into_vec())
}
