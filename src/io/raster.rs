use std::path::Path;

use image::ColorType;
use ndarray::{Array3, ArrayViewD, Axis};
use tracing::debug;

use crate::core::processing::axes::{move_axis, normalize_axis};
use crate::error::{Error, Result};

/// Decode an encoded image (PNG, JPEG) into an `H x W x C` 8-bit array.
///
/// Gray, gray+alpha, RGB and RGBA layouts are kept; other colour types are
/// converted to RGB or RGBA depending on whether they carry alpha.
pub fn decode_to_array(bytes: &[u8]) -> Result<Array3<u8>> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = (img.width() as usize, img.height() as usize);
    let color = img.color();

    let (channels, raw) = match color {
        ColorType::L8 => (1, img.into_luma8().into_raw()),
        ColorType::La8 => (2, img.into_luma_alpha8().into_raw()),
        c if c.has_alpha() => (4, img.into_rgba8().into_raw()),
        _ => (3, img.into_rgb8().into_raw()),
    };
    debug!("Decoded {:?} image {}x{} -> {} channels", color, width, height, channels);

    Ok(Array3::from_shape_vec((height, width, channels), raw)?)
}

/// Write a crafted float blob as an 8-bit PNG. Values are rounded and
/// clamped to `0..=255`.
pub fn save_blob_png(blob: ArrayViewD<'_, f32>, channel_axis: i64, path: &Path) -> Result<()> {
    let hwc = match blob.ndim() {
        2 => blob.insert_axis(Axis(2)).to_owned(),
        3 => move_axis(blob, normalize_axis(channel_axis, 3)?, 2),
        n => {
            return Err(Error::UnsupportedInput(format!(
                "cannot save a {}-dimensional blob as an image",
                n
            )));
        }
    };

    let (height, width, channels) = (hwc.shape()[0], hwc.shape()[1], hwc.shape()[2]);
    let color = match channels {
        1 => ColorType::L8,
        2 => ColorType::La8,
        3 => ColorType::Rgb8,
        4 => ColorType::Rgba8,
        n => {
            return Err(Error::UnsupportedInput(format!(
                "cannot save {} channels as an image",
                n
            )));
        }
    };
    let bytes: Vec<u8> = hwc
        .iter()
        .map(|&v| v.round().clamp(0.0, 255.0) as u8)
        .collect();

    image::save_buffer(path, &bytes, width as u32, height as u32, color)?;
    Ok(())
}
