//! End-to-end tests for the image resizing adapter.

use ndarray::{Array, Array3, Axis};
use serde_json::json;

use craftrank::{Error, ImageResizer, Interpolation, ResizerParams, TargetSize};

const ALL_HOWS: [&str; 4] = ["NEAREST", "BILINEAR", "BICUBIC", "LANCZOS"];

fn resizer(target_size: serde_json::Value, how: &str, channel_axis: i64) -> ImageResizer {
    ImageResizer::new(&ResizerParams {
        target_size,
        how: how.to_string(),
        channel_axis,
    })
    .unwrap()
}

fn gradient(height: usize, width: usize, channels: usize) -> Array3<u8> {
    Array::from_shape_fn((height, width, channels), |(y, x, c)| ((x * 7 + y * 3 + c * 40) % 256) as u8)
}

#[test]
fn shorter_edge_matches_integer_target() {
    for &(height, width) in &[(48, 64), (64, 48), (30, 90), (50, 50), (17, 23)] {
        for size in [8u32, 16, 31, 100] {
            for how in ALL_HOWS {
                let img = gradient(height, width, 3);
                let out = resizer(json!(size), how, -1).craft(img.view().into_dyn()).unwrap();
                let shape = out.blob.shape();
                let (h, w) = (shape[0], shape[1]);

                assert_eq!(h.min(w), size as usize, "{height}x{width} -> {size} ({how})");
                let expected_long =
                    (height.max(width) as f64 * size as f64 / height.min(width) as f64).round();
                assert!(
                    (h.max(w) as f64 - expected_long).abs() <= 1.0,
                    "{height}x{width} -> {h}x{w}"
                );
                assert_eq!(height >= width, h >= w, "orientation preserved");
                assert_eq!(shape[2], 3);
            }
        }
    }
}

#[test]
fn pair_target_is_exact() {
    for how in ALL_HOWS {
        let img = gradient(40, 90, 4);
        let out = resizer(json!([33, 12]), how, -1).craft(img.view().into_dyn()).unwrap();
        assert_eq!(out.blob.shape(), &[33, 12, 4]);
    }
}

#[test]
fn channels_stay_on_the_configured_axis() {
    let (height, width, channels) = (24usize, 36usize, 3usize);
    for axis in [-3i64, -2, -1, 0, 1, 2] {
        let resolved = axis.rem_euclid(3) as usize;
        let hwc = gradient(height, width, channels);
        let mut order: Vec<usize> = vec![0, 1];
        order.insert(resolved, 2);
        let input = hwc.view().into_dyn().permuted_axes(order).to_owned();
        assert_eq!(input.shape()[resolved], channels);

        let out = resizer(json!(12), "BILINEAR", axis).craft(input.view()).unwrap();
        assert_eq!(out.blob.ndim(), 3);
        assert_eq!(out.blob.shape()[resolved], channels, "axis {axis}");

        let mut spatial: Vec<usize> = out.blob.shape().to_vec();
        spatial.remove(resolved);
        assert_eq!(spatial, vec![12, 18], "axis {axis}");
    }
}

#[test]
fn channel_axis_does_not_change_pixel_values() {
    let hwc = gradient(20, 30, 3);
    let chw = hwc.view().permuted_axes([2, 0, 1]).to_owned();

    let last = resizer(json!(10), "BICUBIC", -1).craft(hwc.view().into_dyn()).unwrap();
    let first = resizer(json!(10), "BICUBIC", 0).craft(chw.view().into_dyn()).unwrap();

    let first_as_hwc = first.blob.view().permuted_axes(vec![1, 2, 0]).to_owned();
    assert_eq!(first_as_hwc, last.blob);
}

#[test]
fn output_is_float_and_offset_is_zero() {
    let img = Array3::<u8>::from_elem((10, 10, 3), 255);
    let out = resizer(json!(5), "LANCZOS", -1).craft(img.view().into_dyn()).unwrap();
    assert_eq!(out.offset, 0);
    assert!(out.blob.iter().all(|&v| v == 255.0f32));
}

#[test]
fn invalid_target_sizes_fail_at_construction() {
    for bad in [json!("224"), json!(2.5), json!([]), json!([1]), json!([1, 2, 3]), json!({"size": 3})] {
        let err = ImageResizer::new(&ResizerParams {
            target_size: bad.clone(),
            ..ResizerParams::default()
        })
        .unwrap_err();
        assert!(
            matches!(err, Error::InvalidArgument { arg: "target_size", .. }),
            "{bad}"
        );
    }
}

#[test]
fn params_load_from_json_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resizer.json");
    std::fs::write(&path, r#"{"target_size": [64, 32], "how": "nearest", "channel_axis": 0}"#).unwrap();

    let r = ImageResizer::new(&ResizerParams::from_json_file(&path).unwrap()).unwrap();
    assert_eq!(r.target_size(), TargetSize::Exact { height: 64, width: 32 });
    assert_eq!(r.interpolation(), Interpolation::Nearest);
    assert_eq!(r.channel_axis(), 0);
}

#[test]
fn encoded_images_are_decoded_then_resized() {
    let img = image::RgbaImage::from_fn(40, 20, |x, _| image::Rgba([x as u8, 0, 0, 255]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut bytes, image::ImageFormat::Png)
        .unwrap();

    let out = resizer(json!(10), "BILINEAR", 0)
        .craft_encoded(bytes.get_ref())
        .unwrap();
    assert_eq!(out.blob.shape(), &[4, 10, 20]);
    assert!(out.blob.index_axis(Axis(0), 3).iter().all(|&a| a == 255.0));
}
