use ndarray::{Array3, ArrayView3, ArrayViewD, Axis, Ix3};
use tracing::{debug, info, warn};

use crate::core::params::ResizerParams;
use crate::core::processing::axes::{move_axis, normalize_axis};
use crate::core::processing::resize::{resize_interleaved_u8, target_dimensions};
use crate::error::{Error, Result};
use crate::io::raster::decode_to_array;
use crate::types::{Interpolation, ResizedImage, TargetSize};

/// Resizes decoded image buffers to a configured size.
///
/// With an integer target the shorter edge is matched and the aspect ratio
/// kept; with `[height, width]` the output has exactly that size. The
/// resampling itself is delegated to `fast_image_resize`.
#[derive(Debug, Clone)]
pub struct ImageResizer {
    target_size: TargetSize,
    how: Interpolation,
    channel_axis: i64,
}

impl ImageResizer {
    /// Validate `params` and build a ready-to-call resizer.
    pub fn new(params: &ResizerParams) -> Result<Self> {
        warn!(
            "ImageResizer will be retired soon; decode and resize images before they reach the crafter"
        );

        let target_size = TargetSize::from_value(&params.target_size)?;
        let how: Interpolation = params.how.parse()?;
        normalize_axis(params.channel_axis, 3)?;

        info!(
            "ImageResizer ready: target_size={}, how={}, channel_axis={}",
            target_size, how, params.channel_axis
        );

        Ok(Self {
            target_size,
            how,
            channel_axis: params.channel_axis,
        })
    }

    pub fn target_size(&self) -> TargetSize {
        self.target_size
    }

    pub fn interpolation(&self) -> Interpolation {
        self.how
    }

    pub fn channel_axis(&self) -> i64 {
        self.channel_axis
    }

    /// Resize one image.
    ///
    /// A 2-D `blob` is a single-channel image and yields a 2-D result. Its
    /// axes are moved like a 3-D image's: a channel axis of `0` or `-2`
    /// transposes it before resizing and transposes the result back, and any
    /// axis outside `-2..=1` is an error. A 3-D `blob` holds its channels on
    /// the configured axis, and the result keeps them there.
    pub fn craft(&self, blob: ArrayViewD<'_, u8>) -> Result<ResizedImage> {
        match blob.ndim() {
            2 => {
                let axis = normalize_axis(self.channel_axis, 2)?;
                let moved = move_axis(blob, axis, 1);
                let gray = moved
                    .view()
                    .insert_axis(Axis(2))
                    .into_dimensionality::<Ix3>()?;
                let resized = self.resize_hwc(gray)?;
                let (height, width, _) = resized.dim();
                let plane = resized.into_shape((height, width))?.mapv(|v| v as f32).into_dyn();
                let blob = move_axis(plane.view(), 1, axis);
                Ok(ResizedImage { offset: 0, blob })
            }
            3 => {
                let axis = normalize_axis(self.channel_axis, 3)?;
                let hwc = move_axis(blob, axis, 2).into_dimensionality::<Ix3>()?;
                let resized = self.resize_hwc(hwc.view())?;
                self.finish(resized, axis)
            }
            n => Err(Error::UnsupportedInput(format!(
                "expected a 2-D or 3-D image, got {} dimensions",
                n
            ))),
        }
    }

    /// Decode an encoded image (PNG, JPEG) and resize it. The decoded
    /// buffer is channels-last; the result uses the configured channel axis.
    pub fn craft_encoded(&self, bytes: &[u8]) -> Result<ResizedImage> {
        let hwc = decode_to_array(bytes)?;
        let resized = self.resize_hwc(hwc.view())?;
        self.finish(resized, normalize_axis(self.channel_axis, 3)?)
    }

    fn resize_hwc(&self, hwc: ArrayView3<'_, u8>) -> Result<Array3<u8>> {
        let (height, width, channels) = hwc.dim();
        if height == 0 || width == 0 || channels == 0 {
            return Err(Error::UnsupportedInput(format!(
                "empty image of shape {:?}",
                hwc.shape()
            )));
        }
        let (target_width, target_height) = target_dimensions(width, height, self.target_size);
        debug!(
            "Original size: {}x{}, new size: {}x{}",
            width, height, target_width, target_height
        );

        let data = hwc.as_standard_layout().into_owned().into_raw_vec();
        let resized = resize_interleaved_u8(
            data,
            width,
            height,
            channels,
            target_width,
            target_height,
            self.how,
        )?;
        Ok(Array3::from_shape_vec((target_height, target_width, channels), resized)?)
    }

    fn finish(&self, hwc: Array3<u8>, channel_axis: usize) -> Result<ResizedImage> {
        let blob = move_axis(hwc.mapv(|v| v as f32).into_dyn().view(), 2, channel_axis);
        Ok(ResizedImage { offset: 0, blob })
    }
}
