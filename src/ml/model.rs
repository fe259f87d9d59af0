// ============================================================
// Layer 5 — Dense Autoencoder
// ============================================================
//   input → hidden → latent → hidden → input
//
// ReLU between layers, linear output, optional dropout after
// the first encoder layer.
//
// Reference: Burn Book §3 (Building Blocks)

use burn::{
    nn::{Dropout, DropoutConfig, Linear, LinearConfig, Relu},
    prelude::*,
};

/// Forward inference of a denoising autoencoder: noised batch in,
/// reconstruction of the same shape out.
///
/// Together with burn's `Module` (parameter enumeration via
/// `num_params`, device placement via `fork`) this is everything
/// the trainer needs from a model.
pub trait Reconstruct<B: Backend> {
    fn reconstruct(&self, input: Tensor<B, 2>) -> Tensor<B, 2>;
}

// Saved in the run sidecar; Config derives the serde impls.
#[derive(Config, Debug)]
pub struct DenseAutoencoderConfig {
    pub input_dim: usize,
    #[config(default = 64)]
    pub hidden_dim: usize,
    #[config(default = 16)]
    pub latent_dim: usize,
    #[config(default = 0.0)]
    pub dropout: f64,
}

impl DenseAutoencoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> DenseAutoencoder<B> {
        DenseAutoencoder {
            encoder_hidden: LinearConfig::new(self.input_dim, self.hidden_dim).init(device),
            encoder_latent: LinearConfig::new(self.hidden_dim, self.latent_dim).init(device),
            decoder_hidden: LinearConfig::new(self.latent_dim, self.hidden_dim).init(device),
            decoder_output: LinearConfig::new(self.hidden_dim, self.input_dim).init(device),
            dropout:        DropoutConfig::new(self.dropout).init(),
            activation:     Relu::new(),
        }
    }
}

/// Reference model shipped with the CLI: a symmetric dense
/// autoencoder  input → hidden → latent → hidden → input.
#[derive(Module, Debug)]
pub struct DenseAutoencoder<B: Backend> {
    pub encoder_hidden: Linear<B>,
    pub encoder_latent: Linear<B>,
    pub decoder_hidden: Linear<B>,
    pub decoder_output: Linear<B>,
    pub dropout:        Dropout,
    pub activation:     Relu,
}

impl<B: Backend> DenseAutoencoder<B> {
    /// [batch, input_dim] → [batch, latent_dim]
    pub fn encode(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.activation.forward(self.encoder_hidden.forward(input));
        // Dropout only fires on autodiff backends, i.e. during training passes.
        let x = self.dropout.forward(x);
        self.activation.forward(self.encoder_latent.forward(x))
    }

    /// [batch, latent_dim] → [batch, input_dim]
    pub fn decode(&self, latent: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.activation.forward(self.decoder_hidden.forward(latent));
        self.decoder_output.forward(x)
    }
}

impl<B: Backend> Reconstruct<B> for DenseAutoencoder<B> {
    fn reconstruct(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        self.decode(self.encode(input))
    }
}
