//! Convolutional network definition.

use candle_core::{Module, Tensor};
use candle_nn::{conv2d, linear, Conv2d, Conv2dConfig, Linear, VarBuilder};

use crate::labels::NUM_CLASSES;

/// Channels after `conv2` times the 7x7 map left after two 2x2 pools.
const FLATTENED: usize = 64 * 7 * 7;
const HIDDEN: usize = 128;

/// Two conv/pool blocks followed by two fully connected layers.
///
/// Parameter names (`conv1`, `conv2`, `fc1`, `fc2`) match the keys of the
/// PyTorch state dict the weights were saved from.
#[derive(Debug, Clone)]
pub struct ConvNet {
    conv1: Conv2d,
    conv2: Conv2d,
    fc1: Linear,
    fc2: Linear,
}

impl ConvNet {
    pub fn new(vb: VarBuilder) -> candle_core::Result<Self> {
        let cfg = Conv2dConfig {
            padding: 1,
            stride: 1,
            ..Default::default()
        };
        Ok(Self {
            conv1: conv2d(1, 32, 3, cfg, vb.pp("conv1"))?,
            conv2: conv2d(32, 64, 3, cfg, vb.pp("conv2"))?,
            fc1: linear(FLATTENED, HIDDEN, vb.pp("fc1"))?,
            fc2: linear(HIDDEN, NUM_CLASSES, vb.pp("fc2"))?,
        })
    }
}

impl Module for ConvNet {
    /// `(batch, 1, 28, 28)` in, `(batch, 10)` logits out.
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let xs = xs.apply(&self.conv1)?.relu()?.max_pool2d(2)?;
        let xs = xs.apply(&self.conv2)?.relu()?.max_pool2d(2)?;
        let xs = xs.flatten_from(1)?;
        let xs = xs.apply(&self.fc1)?.relu()?;
        xs.apply(&self.fc2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn test_forward_shape() {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let net = ConvNet::new(vb).unwrap();

        let input = Tensor::zeros((3, 1, 28, 28), DType::F32, &Device::Cpu).unwrap();
        let logits = net.forward(&input).unwrap();
        assert_eq!(logits.dims(), &[3, NUM_CLASSES]);
    }

    #[test]
    fn test_parameter_names() {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        ConvNet::new(vb).unwrap();

        let data = varmap.data().lock().unwrap();
        let mut names: Vec<&String> = data.keys().collect();
        names.sort();
        assert_eq!(
            names,
            [
                "conv1.bias",
                "conv1.weight",
                "conv2.bias",
                "conv2.weight",
                "fc1.bias",
                "fc1.weight",
                "fc2.bias",
                "fc2.weight"
            ]
        );
        assert_eq!(data["fc1.weight"].dims(), &[HIDDEN, FLATTENED]);
        assert_eq!(data["conv2.weight"].dims(), &[64, 32, 3, 3]);
    }
}
