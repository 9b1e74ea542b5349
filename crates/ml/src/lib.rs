//! Small CPU neural-network toolkit: tensors, dense layers with hand-written
//! backward passes, optimisers, losses and streaming normalisation
//! statistics.

pub mod error;
pub mod loss;
pub mod nn;
pub mod optim;
pub mod stats;
pub mod tensor;

pub use error::MlError;
pub use loss::{entropy, log_softmax, mse, mse_grad, softmax};
pub use nn::{Dense, Frozen, Layer, Relu, Sequential};
pub use optim::{clip_grad_norm, Adam};
pub use stats::RunningMeanStd;
pub use tensor::Tensor;
