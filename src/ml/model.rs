// ============================================================
// Layer 5 — AdaIN Style-Transfer Network (Burn)
// ============================================================
// encoder  : normalised VGG-19 up to relu4_1, frozen
// AdaIN    : re-normalise content features to the style
//            features' channel means / stds
// decoder  : mirror of the encoder, nearest-neighbour upsampling
//
// Losses:
//   content = MSE(enc(dec(t))[relu4_1], t)        t = AdaIN target
//   style   = Σ_l MSE(mean(g_l), mean(s_l)) + MSE(std(g_l), std(s_l))
//             for l in relu1_1, relu2_1, relu3_1, relu4_1
//
// Convolutions use zero padding (Burn has no reflection pad).
//
// Reference: Huang & Belongie (2017) Arbitrary Style Transfer in
//            Real-time with Adaptive Instance Normalization
//            Burn Book §3 (Building Blocks)

use burn::{
    module::AutodiffModule,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        loss::{MseLoss, Reduction},
        pool::{MaxPool2d, MaxPool2dConfig},
        PaddingConfig2d,
    },
    prelude::*,
    tensor::{
        activation::relu,
        backend::AutodiffBackend,
        module::interpolate,
        ops::{InterpolateMode, InterpolateOptions},
    },
};

use crate::ml::network::{StyleLosses, StyleNetwork};

const EPS: f64 = 1e-5;

fn conv3x3<B: Backend>(channels: [usize; 2], device: &B::Device) -> Conv2d<B> {
    Conv2dConfig::new(channels, [3, 3])
        .with_padding(PaddingConfig2d::Explicit(1, 1))
        .init(device)
}

// ─── Encoder ──────────────────────────────────────────────────────────────────

#[derive(Module, Debug)]
pub struct VggEncoder<B: Backend> {
    pub conv0:   Conv2d<B>,
    pub conv1_1: Conv2d<B>,
    pub conv1_2: Conv2d<B>,
    pub conv2_1: Conv2d<B>,
    pub conv2_2: Conv2d<B>,
    pub conv3_1: Conv2d<B>,
    pub conv3_2: Conv2d<B>,
    pub conv3_3: Conv2d<B>,
    pub conv3_4: Conv2d<B>,
    pub conv4_1: Conv2d<B>,
    pub pool:    MaxPool2d,
}

/// Encoder features at relu1_1, relu2_1, relu3_1, relu4_1.
pub type EncoderFeatures<B> = [Tensor<B, 4>; 4];

impl<B: Backend> VggEncoder<B> {
    /// Randomly initialised; load pretrained weights before use.
    pub fn new(device: &B::Device) -> Self {
        Self {
            conv0:   Conv2dConfig::new([3, 3], [1, 1]).init(device),
            conv1_1: conv3x3([3, 64], device),
            conv1_2: conv3x3([64, 64], device),
            conv2_1: conv3x3([64, 128], device),
            conv2_2: conv3x3([128, 128], device),
            conv3_1: conv3x3([128, 256], device),
            conv3_2: conv3x3([256, 256], device),
            conv3_3: conv3x3([256, 256], device),
            conv3_4: conv3x3([256, 256], device),
            conv4_1: conv3x3([256, 512], device),
            pool:    MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
        }
    }

    /// Convolutions keyed by their position in the sequential
    /// normalised-VGG layer list (the pretrained file's naming).
    pub fn layers_mut(&mut self) -> [(usize, &mut Conv2d<B>); 10] {
        [
            (0, &mut self.conv0),
            (2, &mut self.conv1_1),
            (5, &mut self.conv1_2),
            (9, &mut self.conv2_1),
            (12, &mut self.conv2_2),
            (16, &mut self.conv3_1),
            (19, &mut self.conv3_2),
            (22, &mut self.conv3_3),
            (25, &mut self.conv3_4),
            (29, &mut self.conv4_1),
        ]
    }

    pub fn features(&self, x: Tensor<B, 4>) -> EncoderFeatures<B> {
        let r1 = relu(self.conv1_1.forward(self.conv0.forward(x)));

        let x = self.pool.forward(relu(self.conv1_2.forward(r1.clone())));
        let r2 = relu(self.conv2_1.forward(x));

        let x = self.pool.forward(relu(self.conv2_2.forward(r2.clone())));
        let r3 = relu(self.conv3_1.forward(x));

        let x = relu(self.conv3_2.forward(r3.clone()));
        let x = relu(self.conv3_3.forward(x));
        let x = self.pool.forward(relu(self.conv3_4.forward(x)));
        let r4 = relu(self.conv4_1.forward(x));

        [r1, r2, r3, r4]
    }

    pub fn encode(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let [_, _, _, r4] = self.features(x);
        r4
    }
}

// ─── Decoder ──────────────────────────────────────────────────────────────────

#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    pub conv4_1: Conv2d<B>,
    pub conv3_4: Conv2d<B>,
    pub conv3_3: Conv2d<B>,
    pub conv3_2: Conv2d<B>,
    pub conv3_1: Conv2d<B>,
    pub conv2_2: Conv2d<B>,
    pub conv2_1: Conv2d<B>,
    pub conv1_2: Conv2d<B>,
    pub conv1_1: Conv2d<B>,
}

impl<B: Backend> Decoder<B> {
    pub fn new(device: &B::Device) -> Self {
        Self {
            conv4_1: conv3x3([512, 256], device),
            conv3_4: conv3x3([256, 256], device),
            conv3_3: conv3x3([256, 256], device),
            conv3_2: conv3x3([256, 256], device),
            conv3_1: conv3x3([256, 128], device),
            conv2_2: conv3x3([128, 128], device),
            conv2_1: conv3x3([128, 64], device),
            conv1_2: conv3x3([64, 64], device),
            conv1_1: conv3x3([64, 3], device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = upsample(relu(self.conv4_1.forward(x)));

        let x = relu(self.conv3_4.forward(x));
        let x = relu(self.conv3_3.forward(x));
        let x = relu(self.conv3_2.forward(x));
        let x = upsample(relu(self.conv3_1.forward(x)));

        let x = relu(self.conv2_2.forward(x));
        let x = upsample(relu(self.conv2_1.forward(x)));

        let x = relu(self.conv1_2.forward(x));
        self.conv1_1.forward(x)
    }
}

fn upsample<B: Backend>(x: Tensor<B, 4>) -> Tensor<B, 4> {
    let [_, _, h, w] = x.dims();
    interpolate(
        x,
        [h * 2, w * 2],
        InterpolateOptions::new(InterpolateMode::Nearest),
    )
}

// ─── AdaIN ────────────────────────────────────────────────────────────────────

/// Per-sample, per-channel mean and std, shaped [N, C, 1, 1].
pub fn mean_std<B: Backend>(feat: Tensor<B, 4>) -> (Tensor<B, 4>, Tensor<B, 4>) {
    let [n, c, h, w] = feat.dims();
    let flat = feat.reshape([n, c, h * w]);
    let mean = flat.clone().mean_dim(2).reshape([n, c, 1, 1]);
    let std = flat.var(2).add_scalar(EPS).sqrt().reshape([n, c, 1, 1]);
    (mean, std)
}

pub fn adain<B: Backend>(content: Tensor<B, 4>, style: Tensor<B, 4>) -> Tensor<B, 4> {
    let (c_mean, c_std) = mean_std(content.clone());
    let (s_mean, s_std) = mean_std(style);
    (content - c_mean) / c_std * s_std + s_mean
}

// ─── Network ──────────────────────────────────────────────────────────────────

#[derive(Config, Debug)]
pub struct StyleTransferConfig {
    /// Blend between AdaIN target (1.0) and raw content features (0.0)
    #[config(default = 1.0)]
    pub alpha: f64,
}

impl StyleTransferConfig {
    /// Wrap a (pretrained) encoder, freeze it, and add a fresh decoder.
    pub fn init<B: Backend>(&self, encoder: VggEncoder<B>, device: &B::Device) -> StyleTransferNet<B> {
        StyleTransferNet {
            encoder: encoder.no_grad(),
            decoder: Decoder::new(device),
            alpha:   self.alpha,
        }
    }
}

#[derive(Module, Debug)]
pub struct StyleTransferNet<B: Backend> {
    pub encoder: VggEncoder<B>,
    pub decoder: Decoder<B>,
    pub alpha:   f64,
}

impl<B: Backend> StyleTransferNet<B> {
    pub fn losses(&self, content: Tensor<B, 4>, style: Tensor<B, 4>) -> StyleLosses<B> {
        let style_feats = self.encoder.features(style);
        let content_feat = self.encoder.encode(content);

        let target = adain(content_feat.clone(), style_feats[3].clone());
        let target = (target.mul_scalar(self.alpha) + content_feat.mul_scalar(1.0 - self.alpha))
            .detach();

        let stylised = self.decoder.forward(target.clone());
        let out_feats = self.encoder.features(stylised);

        let mse = MseLoss::new();
        let content = mse.forward(out_feats[3].clone(), target, Reduction::Mean);

        let [g1, g2, g3, g4] = out_feats;
        let [s1, s2, s3, s4] = style_feats;
        let style = style_term(&mse, g1, s1)
            + style_term(&mse, g2, s2)
            + style_term(&mse, g3, s3)
            + style_term(&mse, g4, s4);

        StyleLosses { content, style }
    }
}

/// Match channel means and stds of one feature level.
fn style_term<B: Backend>(mse: &MseLoss, out: Tensor<B, 4>, reference: Tensor<B, 4>) -> Tensor<B, 1> {
    let (o_mean, o_std) = mean_std(out);
    let (r_mean, r_std) = mean_std(reference.detach());
    mse.forward(o_mean, r_mean, Reduction::Mean) + mse.forward(o_std, r_std, Reduction::Mean)
}

impl<B: AutodiffBackend> StyleNetwork<B> for StyleTransferNet<B> {
    type Decoder = Decoder<B>;

    fn forward(&self, content: Tensor<B, 4>, style: Tensor<B, 4>) -> StyleLosses<B> {
        self.losses(content, style)
    }

    fn evaluate(
        &self,
        content: Tensor<B::InnerBackend, 4>,
        style:   Tensor<B::InnerBackend, 4>,
    ) -> StyleLosses<B::InnerBackend> {
        self.valid().losses(content, style)
    }

    fn decoder(&self) -> &Decoder<B> {
        &self.decoder
    }

    fn with_decoder(self, decoder: Decoder<B>) -> Self {
        Self { decoder, ..self }
    }
}
