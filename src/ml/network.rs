// ============================================================
// Layer 5 — Style Network Contract
// ============================================================
// The training loop only needs four things from a network:
//
//   forward()     — training mode, gradients tracked
//   evaluate()    — evaluation mode, inner backend, no gradients
//   decoder()     — the trainable part, for the optimiser and for
//                   checkpoint snapshots
//   with_decoder()— put an updated decoder back after a step
//
// Any architecture satisfying this can be trained; the AdaIN
// network in model.rs is the one the binary uses.

use burn::{module::AutodiffModule, prelude::*, tensor::backend::AutodiffBackend};

/// Unweighted content and style losses, each a single-element tensor.
#[derive(Debug, Clone)]
pub struct StyleLosses<B: Backend> {
    pub content: Tensor<B, 1>,
    pub style:   Tensor<B, 1>,
}

impl<B: Backend> StyleLosses<B> {
    /// Scale each loss by its configured weight.
    pub fn weighted(self, content_weight: f64, style_weight: f64) -> Self {
        Self {
            content: self.content.mul_scalar(content_weight),
            style:   self.style.mul_scalar(style_weight),
        }
    }

    pub fn total(&self) -> Tensor<B, 1> {
        self.content.clone() + self.style.clone()
    }
}

pub trait StyleNetwork<B: AutodiffBackend>: Module<B> {
    /// The trainable sub-network.
    type Decoder: AutodiffModule<B>;

    fn forward(&self, content: Tensor<B, 4>, style: Tensor<B, 4>) -> StyleLosses<B>;

    fn evaluate(
        &self,
        content: Tensor<B::InnerBackend, 4>,
        style:   Tensor<B::InnerBackend, 4>,
    ) -> StyleLosses<B::InnerBackend>;

    fn decoder(&self) -> &Self::Decoder;

    fn with_decoder(self, decoder: Self::Decoder) -> Self;
}
