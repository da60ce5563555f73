//! Image preprocessing shared by training and inference

use burn::tensor::{backend::Backend, Tensor, TensorData};
use image::{imageops::FilterType, DynamicImage, RgbImage};

use crate::error::{VisionError, VisionResult};

/// Decode an uploaded image, guessing the format from its content
pub fn decode(bytes: &[u8]) -> VisionResult<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| VisionError::Image(e.to_string()))
}

/// Resize to a square RGB image (nearest neighbour, aspect ratio ignored)
pub fn resize_rgb(image: &DynamicImage, size: u32) -> RgbImage {
    image.resize_exact(size, size, FilterType::Nearest).to_rgb8()
}

/// Scale an RGB image to [0, 1] in CHW layout
pub fn to_chw(rgb: &RgbImage) -> Vec<f32> {
    let (width, height) = rgb.dimensions();
    let num_pixels = (width * height) as usize;
    let mut data = vec![0.0f32; 3 * num_pixels];

    for (i, pixel) in rgb.pixels().enumerate() {
        data[i] = pixel[0] as f32 / 255.0;
        data[num_pixels + i] = pixel[1] as f32 / 255.0;
        data[2 * num_pixels + i] = pixel[2] as f32 / 255.0;
    }

    data
}

/// Full preprocessing for one image: resize, RGB, rescale, CHW
pub fn prepare(image: &DynamicImage, size: u32) -> Vec<f32> {
    to_chw(&resize_rgb(image, size))
}

/// Stack CHW buffers into a `[batch, 3, size, size]` tensor
pub fn batch_tensor<B: Backend>(
    pixels: Vec<f32>,
    batch: usize,
    size: usize,
    device: &B::Device,
) -> VisionResult<Tensor<B, 4>> {
    let expected = batch * 3 * size * size;
    if pixels.len() != expected {
        return Err(VisionError::Tensor(format!(
            "expected {} values for a batch of {}, got {}",
            expected,
            batch,
            pixels.len()
        )));
    }

    Ok(Tensor::from_data(
        TensorData::new(pixels, [batch, 3, size, size]),
        device,
    ))
}
