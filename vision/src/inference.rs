//! Single-image inference

use burn::tensor::backend::Backend;
use image::DynamicImage;

use crate::error::{VisionError, VisionResult};
use crate::network::ClassifierNet;
use crate::preprocess;

/// Run one image through the network and return its class probabilities
pub fn predict_probabilities<B: Backend>(
    net: &ClassifierNet<B>,
    image: &DynamicImage,
    image_size: usize,
    device: &B::Device,
) -> VisionResult<Vec<f32>> {
    let pixels = preprocess::prepare(image, image_size as u32);
    let input = preprocess::batch_tensor::<B>(pixels, 1, image_size, device)?;

    net.forward_probabilities(input)
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| VisionError::Tensor(format!("{:?}", e)))
}

/// Index and score of the best class
///
/// Ties resolve to the lowest index. NaN scores never win.
pub fn top_class(probabilities: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &score) in probabilities.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((index, score)),
        }
    }
    best
}
