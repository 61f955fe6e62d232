//! Image preprocessing into the network's input format.
//!
//! Any decodable image is converted to 8-bit grayscale, resized to
//! 28x28 and normalized to [-1, 1], matching how the KMNIST training data
//! was fed to the network.

use candle_core::{Device, Tensor};
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};

use crate::error::{ClassifierError, Result};

/// Width and height of the network input.
pub const INPUT_SIZE: u32 = 28;
/// Number of values in one input image.
pub const INPUT_LEN: usize = (INPUT_SIZE * INPUT_SIZE) as usize;
pub const NORMALIZE_MEAN: f32 = 0.5;
pub const NORMALIZE_STD: f32 = 0.5;

/// Decode PNG or JPEG bytes.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// ITU-R 601-2 luma in 16-bit fixed point, rounded.
pub fn luma_601(r: u8, g: u8, b: u8) -> u8 {
    let weighted = r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000;
    (weighted >> 16) as u8
}

/// 8-bit grayscale with ITU-R 601-2 weights.
///
/// Grayscale inputs keep their values and alpha is ignored. Color goes
/// through [`luma_601`] rather than `to_luma8`, which uses Rec. 709.
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    match img {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_) => img.to_luma8(),
        _ => {
            let rgb = img.to_rgb8();
            GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                let [r, g, b] = rgb.get_pixel(x, y).0;
                Luma([luma_601(r, g, b)])
            })
        }
    }
}

/// Convert an image to normalized, row-major grayscale pixels.
///
/// The aspect ratio is not preserved.
pub fn to_input_pixels(img: &DynamicImage) -> Vec<f32> {
    let gray = to_grayscale(img);
    let resized = image::imageops::resize(&gray, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);

    resized
        .pixels()
        .map(|p| (p.0[0] as f32 / 255.0 - NORMALIZE_MEAN) / NORMALIZE_STD)
        .collect()
}

/// Wrap normalized pixels as a `(1, 1, 28, 28)` tensor.
pub fn to_tensor(pixels: &[f32], device: &Device) -> Result<Tensor> {
    if pixels.len() != INPUT_LEN {
        return Err(ClassifierError::InvalidInput(format!(
            "expected {} pixels, got {}",
            INPUT_LEN,
            pixels.len()
        )));
    }
    let size = INPUT_SIZE as usize;
    Ok(Tensor::from_slice(pixels, (1, 1, size, size), device)?)
}

/// Decode and preprocess in one step.
pub fn preprocess_bytes(bytes: &[u8]) -> Result<Vec<f32>> {
    let img = decode(bytes)?;
    tracing::debug!(
        width = img.width(),
        height = img.height(),
        "Decoded input image"
    );
    Ok(to_input_pixels(&img))
}
