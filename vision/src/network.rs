//! CNN architecture for crop and disease classification
//!
//! Three `Conv(3x3, valid) -> ReLU -> MaxPool(2x2)` blocks with 32, 64 and 128
//! filters, followed by a dense head with dropout. The network outputs logits;
//! use [`ClassifierNet::forward_probabilities`] for softmax scores.

use burn::{
    config::Config,
    module::Module,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        Dropout, DropoutConfig, Linear, LinearConfig, Relu,
    },
    tensor::{activation::softmax, backend::Backend, Tensor},
};

use crate::error::{VisionError, VisionResult};

/// Filters of the three convolutional blocks
pub const BLOCK_FILTERS: [usize; 3] = [32, 64, 128];

const KERNEL_SIZE: usize = 3;
const POOL_SIZE: usize = 2;

/// Configuration for [`ClassifierNet`]
#[derive(Config, Debug)]
pub struct ClassifierNetConfig {
    /// Number of output classes
    pub num_classes: usize,

    /// Square input resolution in pixels
    #[config(default = "224")]
    pub image_size: usize,

    /// Units of the hidden dense layer
    #[config(default = "128")]
    pub hidden_units: usize,

    /// Dropout rate before the output layer
    #[config(default = "0.3")]
    pub dropout: f64,
}

impl ClassifierNetConfig {
    /// Side length of the feature map after the last pooling layer
    pub fn feature_side(&self) -> usize {
        BLOCK_FILTERS.iter().fold(self.image_size, |side, _| {
            side.saturating_sub(KERNEL_SIZE - 1) / POOL_SIZE
        })
    }

    /// Number of inputs to the dense head
    pub fn flattened_features(&self) -> usize {
        let side = self.feature_side();
        BLOCK_FILTERS[BLOCK_FILTERS.len() - 1] * side * side
    }

    /// Reject configurations the layer stack cannot run
    pub fn validate(&self) -> VisionResult<()> {
        if self.num_classes == 0 {
            return Err(VisionError::InvalidConfig(
                "num_classes must be at least 1".to_string(),
            ));
        }
        if self.feature_side() == 0 {
            return Err(VisionError::InvalidConfig(format!(
                "image_size {} is too small for {} conv blocks",
                self.image_size,
                BLOCK_FILTERS.len()
            )));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(VisionError::InvalidConfig(format!(
                "dropout {} must lie in [0, 1)",
                self.dropout
            )));
        }
        Ok(())
    }

    /// Build a freshly initialised network
    pub fn init<B: Backend>(&self, device: &B::Device) -> ClassifierNet<B> {
        let conv = |channels: [usize; 2]| {
            Conv2dConfig::new(channels, [KERNEL_SIZE, KERNEL_SIZE]).init(device)
        };

        ClassifierNet {
            conv1: conv([3, BLOCK_FILTERS[0]]),
            conv2: conv([BLOCK_FILTERS[0], BLOCK_FILTERS[1]]),
            conv3: conv([BLOCK_FILTERS[1], BLOCK_FILTERS[2]]),
            pool: MaxPool2dConfig::new([POOL_SIZE, POOL_SIZE])
                .with_strides([POOL_SIZE, POOL_SIZE])
                .init(),
            fc1: LinearConfig::new(self.flattened_features(), self.hidden_units).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            fc2: LinearConfig::new(self.hidden_units, self.num_classes).init(device),
            activation: Relu::new(),
        }
    }
}

/// Sequential image classifier
#[derive(Module, Debug)]
pub struct ClassifierNet<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    conv3: Conv2d<B>,
    pool: MaxPool2d,
    fc1: Linear<B>,
    dropout: Dropout,
    fc2: Linear<B>,
    activation: Relu,
}

impl<B: Backend> ClassifierNet<B> {
    /// Forward pass
    ///
    /// # Arguments
    /// * `x` - Input of shape `[batch, 3, image_size, image_size]`, values in [0, 1]
    ///
    /// # Returns
    /// * Logits of shape `[batch, num_classes]`
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.block(&self.conv1, x);
        let x = self.block(&self.conv2, x);
        let x = self.block(&self.conv3, x);

        let [batch, channels, height, width] = x.dims();
        let x = x.reshape([batch, channels * height * width]);

        let x = self.activation.forward(self.fc1.forward(x));
        let x = self.dropout.forward(x);
        self.fc2.forward(x)
    }

    /// Forward pass followed by softmax over the class dimension
    pub fn forward_probabilities(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        softmax(self.forward(x), 1)
    }

    fn block(&self, conv: &Conv2d<B>, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.activation.forward(conv.forward(x));
        self.pool.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::CpuBackend;

    #[test]
    fn test_flattened_features_default_resolution() {
        // 224 -> 222/2 = 111 -> 109/2 = 54 -> 52/2 = 26
        let config = ClassifierNetConfig::new(7);
        assert_eq!(config.feature_side(), 26);
        assert_eq!(config.flattened_features(), 128 * 26 * 26);
    }

    #[test]
    fn test_validate_rejects_tiny_images() {
        assert!(ClassifierNetConfig::new(3).with_image_size(16).validate().is_err());
        assert!(ClassifierNetConfig::new(3).with_image_size(22).validate().is_ok());
        assert!(ClassifierNetConfig::new(0).validate().is_err());
    }

    #[test]
    fn test_output_shape() {
        let device = Default::default();
        let config = ClassifierNetConfig::new(6).with_image_size(32);
        let net = config.init::<CpuBackend>(&device);

        let input = Tensor::<CpuBackend, 4>::zeros([2, 3, 32, 32], &device);
        let output = net.forward_probabilities(input);

        assert_eq!(output.dims(), [2, 6]);
    }
}
