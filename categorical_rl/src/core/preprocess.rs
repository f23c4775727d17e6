//! Raw RGB observation → 84×84 grayscale frame.
//!
//! With frame skipping, the observations of one agent step are first
//! max-pooled ([`max_pool`]) and their rewards summed and sign-clipped
//! ([`clip_reward`]).
//!
//! Luminance uses the ITU-R BT.601 weights rather than the Rec. 709 weights
//! of `image`'s own `grayscale`. The luminance plane is then resized with
//! `image::imageops::resize` and a triangle (linear) filter, which keeps a
//! constant image constant.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};

use super::error::C51Error;
use super::frame::{Frame, FRAME_HEIGHT, FRAME_PIXELS, FRAME_WIDTH};

const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// `image` treats `f32` samples as lying in `[0, 1]`.
const INTENSITY_SCALE: f32 = 255.0;

type LumaPlane = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Convert interleaved RGB (`height × width × 3`) into a preprocessed frame.
pub fn preprocess(rgb: &[u8], height: usize, width: usize) -> Result<Frame, C51Error> {
    if height == 0 || width == 0 {
        return Err(C51Error::invalid(
            "observation",
            format!("dimensions must be positive, got {}x{}", height, width),
        ));
    }
    let expected = height * width * 3;
    if rgb.len() != expected {
        return Err(C51Error::shape("rgb observation", expected, rgb.len()));
    }

    let luma = rgb_to_luminance(rgb);
    let resized = resize_plane(luma, height, width, FRAME_HEIGHT, FRAME_WIDTH)?;

    let pixels: Vec<u8> = resized
        .into_iter()
        .map(|v| v.round().clamp(0.0, 255.0) as u8)
        .collect();
    debug_assert_eq!(pixels.len(), FRAME_PIXELS);
    Frame::from_pixels(pixels)
}

/// Element-wise maximum over the raw observations seen during one skipped
/// step, removing sprite flicker between emulator frames.
pub fn max_pool(observations: &[&[u8]]) -> Result<Vec<u8>, C51Error> {
    let (first, rest) = observations
        .split_first()
        .ok_or_else(|| C51Error::invalid("observations", "at least one is required"))?;

    let mut pooled = first.to_vec();
    for obs in rest {
        if obs.len() != pooled.len() {
            return Err(C51Error::shape("pooled observation", pooled.len(), obs.len()));
        }
        for (p, &v) in pooled.iter_mut().zip(obs.iter()) {
            *p = (*p).max(v);
        }
    }
    Ok(pooled)
}

/// Sign-clip an accumulated reward to `{-1, 0, 1}`.
#[inline]
pub fn clip_reward(reward: f32) -> f32 {
    if reward > 0.0 {
        1.0
    } else if reward < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Per-pixel luminance of interleaved RGB data.
pub fn rgb_to_luminance(rgb: &[u8]) -> Vec<f32> {
    rgb.chunks_exact(3)
        .map(|px| LUMA_R * px[0] as f32 + LUMA_G * px[1] as f32 + LUMA_B * px[2] as f32)
        .collect()
}

fn dimension(what: &'static str, value: usize) -> Result<u32, C51Error> {
    u32::try_from(value)
        .map_err(|_| C51Error::invalid(what, format!("{} does not fit in u32", value)))
}

/// Resize a single-channel row-major plane of `[0, 255]` intensities.
pub fn resize_plane(
    plane: Vec<f32>,
    src_h: usize,
    src_w: usize,
    dst_h: usize,
    dst_w: usize,
) -> Result<Vec<f32>, C51Error> {
    let expected = src_h * src_w;
    if plane.len() != expected {
        return Err(C51Error::shape("luminance plane", expected, plane.len()));
    }
    let normalized: Vec<f32> = plane.into_iter().map(|v| v / INTENSITY_SCALE).collect();
    let (width, height) = (dimension("width", src_w)?, dimension("height", src_h)?);
    let image = LumaPlane::from_raw(width, height, normalized).ok_or_else(|| {
        C51Error::invalid("luminance plane", "buffer does not match its dimensions")
    })?;

    let resized = imageops::resize(
        &image,
        dimension("width", dst_w)?,
        dimension("height", dst_h)?,
        FilterType::Triangle,
    );
    Ok(resized
        .into_raw()
        .into_iter()
        .map(|v| v * INTENSITY_SCALE)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATARI_H: usize = 210;
    const ATARI_W: usize = 160;

    #[test]
    fn test_constant_image_stays_constant() {
        let rgb = vec![200u8; ATARI_H * ATARI_W * 3];
        let frame = preprocess(&rgb, ATARI_H, ATARI_W).unwrap();
        // 0.299 + 0.587 + 0.114 = 1.0
        assert!(frame.pixels().iter().all(|&p| p == 200));
    }

    #[test]
    fn test_luminance_weights() {
        let luma = rgb_to_luminance(&[255, 0, 0, 0, 255, 0, 0, 0, 255]);
        assert!((luma[0] - 76.245).abs() < 1e-3);
        assert!((luma[1] - 149.685).abs() < 1e-3);
        assert!((luma[2] - 29.07).abs() < 1e-3);
    }

    #[test]
    fn test_rejects_wrong_length() {
        let rgb = vec![0u8; 100];
        assert!(matches!(
            preprocess(&rgb, ATARI_H, ATARI_W),
            Err(C51Error::ShapeMismatch { .. })
        ));
        assert!(preprocess(&[], 0, ATARI_W).is_err());
    }

    #[test]
    fn test_max_pool_takes_elementwise_maximum() {
        let a = [1u8, 9, 3];
        let b = [4u8, 2, 3];
        let c = [0u8, 0, 7];
        assert_eq!(max_pool(&[&a[..], &b[..], &c[..]]).unwrap(), vec![4, 9, 7]);
        assert_eq!(max_pool(&[&a[..]]).unwrap(), a.to_vec());
    }

    #[test]
    fn test_max_pool_rejects_empty_and_ragged_input() {
        assert!(max_pool(&[]).is_err());
        assert!(matches!(
            max_pool(&[&[1u8, 2][..], &[1u8][..]]),
            Err(C51Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_clip_reward_keeps_sign() {
        assert_eq!(clip_reward(17.0), 1.0);
        assert_eq!(clip_reward(0.2), 1.0);
        assert_eq!(clip_reward(0.0), 0.0);
        assert_eq!(clip_reward(-3.0), -1.0);
    }

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-3, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_identity_resize() {
        let src: Vec<f32> = (0..16).map(|v| v as f32 * 10.0).collect();
        let out = resize_plane(src.clone(), 4, 4, 4, 4).unwrap();
        assert_close(&out, &src);
    }

    #[test]
    fn test_upscale_interpolates_between_pixels() {
        // 1x2 -> 1x4: pixel centres land at 0, 0.25, 0.75, 1 of the span.
        let out = resize_plane(vec![0.0, 100.0], 1, 2, 1, 4).unwrap();
        assert_close(&out, &[0.0, 25.0, 75.0, 100.0]);
    }

    #[test]
    fn test_resize_keeps_full_intensity_range() {
        let out = resize_plane(vec![255.0; 6 * 4], 6, 4, 3, 2).unwrap();
        assert_close(&out, &[255.0; 6]);
    }

    #[test]
    fn test_resize_rejects_wrong_plane_length() {
        assert!(matches!(
            resize_plane(vec![0.0; 5], 2, 3, 1, 1),
            Err(C51Error::ShapeMismatch { what: "luminance plane", .. })
        ));
    }

    #[test]
    fn test_vertical_gradient_is_monotonic() {
        let mut rgb = vec![0u8; ATARI_H * ATARI_W * 3];
        for row in 0..ATARI_H {
            let v = (row * 255 / (ATARI_H - 1)) as u8;
            for col in 0..ATARI_W {
                let i = (row * ATARI_W + col) * 3;
                rgb[i..i + 3].copy_from_slice(&[v, v, v]);
            }
        }
        let frame = preprocess(&rgb, ATARI_H, ATARI_W).unwrap();
        for row in 1..FRAME_HEIGHT {
            assert!(frame.get(row, 0) >= frame.get(row - 1, 0));
        }
        assert!(frame.get(0, 0) < 5);
        assert!(frame.get(FRAME_HEIGHT - 1, 0) > 250);
    }
}
