// ============================================================
// Layer 6 — Pretrained Encoder Weights
// ============================================================
// Reads the normalised VGG-19 weights from a .safetensors file,
// once, at startup. Tensor names follow the layer's index in the
// sequential VGG definition:
//
//   0.weight  [3, 3, 1, 1]      0.bias  [3]
//   2.weight  [64, 3, 3, 3]     2.bias  [64]
//   5.weight  [64, 64, 3, 3]    ...
//   ...
//   29.weight [512, 256, 3, 3]  29.bias [512]
//
// Layers past index 30 (relu4_1) may be present and are ignored.
// Anything missing or malformed is a configuration error, and the
// run never starts with a partially loaded encoder.
//
// Reference: safetensors crate documentation

use std::{fs, path::Path};

use burn::{module::Param, nn::conv::Conv2d, prelude::*, tensor::TensorData};
use safetensors::{tensor::TensorView, Dtype, SafeTensors};

use crate::error::{PipelineError, PipelineResult};
use crate::ml::model::VggEncoder;

/// Fill `encoder` with the weights stored at `path`.
pub fn load_vgg_encoder<B: Backend>(
    mut encoder: VggEncoder<B>,
    path:        &Path,
    device:      &B::Device,
) -> PipelineResult<VggEncoder<B>> {
    let bytes = fs::read(path).map_err(|e| {
        PipelineError::config(format!("cannot read VGG weights '{}': {e}", path.display()))
    })?;
    let tensors = SafeTensors::deserialize(&bytes).map_err(|e| {
        PipelineError::config(format!("'{}' is not a safetensors file: {e}", path.display()))
    })?;

    for (index, conv) in encoder.layers_mut() {
        load_conv(conv, &tensors, index, device)?;
    }

    tracing::info!("Loaded VGG encoder weights from '{}'", path.display());
    Ok(encoder)
}

fn load_conv<B: Backend>(
    conv:    &mut Conv2d<B>,
    tensors: &SafeTensors<'_>,
    index:   usize,
    device:  &B::Device,
) -> PipelineResult<()> {
    let weight_shape = conv.weight.val().dims();
    let weight = read_f32(tensors, &format!("{index}.weight"), &weight_shape)?;
    conv.weight = Param::from_tensor(Tensor::<B, 4>::from_data(
        TensorData::new(weight, weight_shape),
        device,
    ));

    if let Some(bias) = conv.bias.as_mut() {
        let bias_shape = bias.val().dims();
        let values = read_f32(tensors, &format!("{index}.bias"), &bias_shape)?;
        *bias = Param::from_tensor(Tensor::<B, 1>::from_data(
            TensorData::new(values, bias_shape),
            device,
        ));
    }
    Ok(())
}

/// Fetch `name`, check dtype and shape, decode little-endian f32.
fn read_f32(tensors: &SafeTensors<'_>, name: &str, expected: &[usize]) -> PipelineResult<Vec<f32>> {
    let view: TensorView<'_> = tensors
        .tensor(name)
        .map_err(|_| PipelineError::config(format!("VGG weights are missing tensor '{name}'")))?;

    if view.dtype() != Dtype::F32 {
        return Err(PipelineError::config(format!(
            "tensor '{name}' has dtype {:?}, expected F32",
            view.dtype()
        )));
    }
    if view.shape() != expected {
        return Err(PipelineError::config(format!(
            "tensor '{name}' has shape {:?}, expected {:?}",
            view.shape(),
            expected
        )));
    }

    Ok(view
        .data()
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::scratch_dir;
    use burn::{backend::NdArray, tensor::ElementConversion};
    use safetensors::tensor::serialize;

    type TestBackend = NdArray;

    /// Every conv tensor of the encoder, filled with `index as f32`.
    fn vgg_file(dir: &Path, skip: Option<&str>) -> std::path::PathBuf {
        let device = <TestBackend as Backend>::Device::default();
        let mut encoder = VggEncoder::<TestBackend>::new(&device);

        let mut blobs: Vec<(String, Vec<usize>, Vec<u8>)> = Vec::new();
        for (index, conv) in encoder.layers_mut() {
            let w = conv.weight.val().dims().to_vec();
            let b = vec![w[0]];
            for (name, shape) in [(format!("{index}.weight"), w), (format!("{index}.bias"), b)] {
                let n: usize = shape.iter().product();
                let bytes = std::iter::repeat(index as f32)
                    .take(n)
                    .flat_map(f32::to_le_bytes)
                    .collect();
                blobs.push((name, shape, bytes));
            }
        }

        let views: Vec<(String, TensorView<'_>)> = blobs
            .iter()
            .filter(|(name, _, _)| Some(name.as_str()) != skip)
            .map(|(name, shape, bytes)| {
                (name.clone(), TensorView::new(Dtype::F32, shape.clone(), bytes).unwrap())
            })
            .collect();
        let path = dir.join("vgg.safetensors");
        fs::write(&path, serialize(views, &None).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_loads_every_layer() {
        let dir = scratch_dir("pretrained_ok");
        let path = vgg_file(&dir, None);
        let device = <TestBackend as Backend>::Device::default();

        let encoder = load_vgg_encoder(VggEncoder::<TestBackend>::new(&device), &path, &device).unwrap();
        let w: f32 = encoder.conv3_2.weight.val().mean().into_scalar().elem();
        let b: f32 = encoder.conv4_1.bias.as_ref().unwrap().val().mean().into_scalar().elem();
        assert_eq!(w, 19.0);
        assert_eq!(b, 29.0);
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let dir = scratch_dir("pretrained_missing");
        let device = <TestBackend as Backend>::Device::default();
        let err = load_vgg_encoder(VggEncoder::<TestBackend>::new(&device), &dir.join("none"), &device)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[test]
    fn test_missing_tensor_is_configuration_error() {
        let dir = scratch_dir("pretrained_partial");
        let path = vgg_file(&dir, Some("22.weight"));
        let device = <TestBackend as Backend>::Device::default();
        let err = load_vgg_encoder(VggEncoder::<TestBackend>::new(&device), &path, &device).unwrap_err();
        assert!(err.to_string().contains("22.weight"));
    }
}
