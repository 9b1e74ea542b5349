use crate::error::MlError;
use crate::tensor::Tensor;

// Trait representing a differentiable layer
pub trait Layer {
    fn forward(&self, x: &Tensor) -> Tensor;
    /// Returns the gradient w.r.t. the input and the parameter gradients, in
    /// the same order as [`Layer::params`].
    fn backward(&self, x: &Tensor, grad: &Tensor) -> (Tensor, Vec<Tensor>);
    fn params(&self) -> Vec<&Tensor> {
        Vec::new()
    }
    fn params_mut(&mut self) -> Vec<&mut Tensor> {
        Vec::new()
    }
    /// `(in_dim, out_dim)` for layers with a fixed width.
    fn dims(&self) -> Option<(usize, usize)> {
        None
    }
}

/// A fully connected layer, `y = W x + b`.
#[derive(Clone, Debug)]
pub struct Dense {
    /// `out_dim x in_dim` weight matrix.
    pub w: Tensor,
    pub b: Tensor,
    in_dim: usize,
    out_dim: usize,
}

impl Dense {
    pub fn new(weights: Vec<f32>, bias: Vec<f32>, in_dim: usize, out_dim: usize) -> Self {
        assert_eq!(weights.len(), in_dim * out_dim);
        assert_eq!(bias.len(), out_dim);
        Self {
            w: Tensor::from_vec(vec![out_dim, in_dim], weights),
            b: Tensor::from_vec(vec![out_dim], bias),
            in_dim,
            out_dim,
        }
    }

    /// Glorot-uniform weights, zero bias.
    pub fn xavier(in_dim: usize, out_dim: usize, rng: &mut fastrand::Rng) -> Self {
        let limit = (6.0f32 / (in_dim as f32 + out_dim as f32)).sqrt();
        let weights: Vec<f32> = (0..in_dim * out_dim)
            .map(|_| rng.f32() * 2.0 * limit - limit)
            .collect();
        let bias = vec![0.0; out_dim];
        Self::new(weights, bias, in_dim, out_dim)
    }

    #[must_use]
    pub fn forward(&self, x: &Tensor) -> Tensor {
        assert_eq!(x.len(), self.in_dim);
        let mut y = vec![0f32; self.out_dim];
        for (o, out) in y.iter_mut().enumerate() {
            let row = &self.w.data[o * self.in_dim..(o + 1) * self.in_dim];
            *out = self.b.data[o] + row.iter().zip(&x.data).map(|(w, v)| w * v).sum::<f32>();
        }
        Tensor::from_vec(vec![self.out_dim], y)
    }

    #[must_use]
    pub fn backward(&self, x: &Tensor, grad: &Tensor) -> (Tensor, Tensor, Tensor) {
        let mut grad_input = vec![0.0; self.in_dim];
        let mut grad_w = vec![0.0; self.in_dim * self.out_dim];
        let mut grad_b = vec![0.0; self.out_dim];
        for o in 0..self.out_dim {
            let go = grad.data[o];
            for i in 0..self.in_dim {
                grad_w[o * self.in_dim + i] += go * x.data[i];
                grad_input[i] += self.w.data[o * self.in_dim + i] * go;
            }
            grad_b[o] += go;
        }
        (
            Tensor::from_vec(vec![self.in_dim], grad_input),
            Tensor::from_vec(vec![self.out_dim, self.in_dim], grad_w),
            Tensor::from_vec(vec![self.out_dim], grad_b),
        )
    }

    #[must_use]
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    #[must_use]
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }
}

impl Layer for Dense {
    fn forward(&self, x: &Tensor) -> Tensor {
        Dense::forward(self, x)
    }
    fn backward(&self, x: &Tensor, grad: &Tensor) -> (Tensor, Vec<Tensor>) {
        let (dx, dw, db) = Dense::backward(self, x, grad);
        (dx, vec![dw, db])
    }
    fn params(&self) -> Vec<&Tensor> {
        vec![&self.w, &self.b]
    }
    fn params_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.w, &mut self.b]
    }
    fn dims(&self) -> Option<(usize, usize)> {
        Some((self.in_dim, self.out_dim))
    }
}

#[derive(Default, Clone, Copy, Debug)]
pub struct Relu;

impl Layer for Relu {
    fn forward(&self, x: &Tensor) -> Tensor {
        let data: Vec<f32> = x.data.iter().map(|&v| v.max(0.0)).collect();
        Tensor::from_vec(x.shape.clone(), data)
    }

    fn backward(&self, x: &Tensor, grad: &Tensor) -> (Tensor, Vec<Tensor>) {
        let data: Vec<f32> = x
            .data
            .iter()
            .zip(&grad.data)
            .map(|(&v, &g)| if v > 0.0 { g } else { 0.0 })
            .collect();
        (Tensor::from_vec(x.shape.clone(), data), Vec::new())
    }
}

pub struct Sequential {
    layers: Vec<Box<dyn Layer>>,
}

impl Default for Sequential {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequential {
    #[must_use]
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Dense layers of the given widths with a ReLU between each pair.
    ///
    /// `mlp(&[36, 128, 128, 8], rng)` builds `36 -> 128 -> 128 -> 8`.
    pub fn mlp(widths: &[usize], rng: &mut fastrand::Rng) -> Self {
        assert!(widths.len() >= 2, "an MLP needs at least input and output widths");
        let mut net = Self::new();
        for (i, pair) in widths.windows(2).enumerate() {
            if i > 0 {
                net.push(Relu);
            }
            net.push(Dense::xavier(pair[0], pair[1], rng));
        }
        net
    }

    pub fn push<L: Layer + 'static>(&mut self, layer: L) {
        self.layers.push(Box::new(layer));
    }

    /// Runs every layer, returning the output and the input of each layer
    /// followed by the output (what [`Sequential::backward`] needs).
    #[must_use]
    pub fn forward(&self, x: &Tensor) -> (Tensor, Vec<Tensor>) {
        let mut out = x.clone();
        let mut activations = vec![out.clone()];
        for layer in &self.layers {
            out = layer.forward(&out);
            activations.push(out.clone());
        }
        (out, activations)
    }

    /// Forward pass without keeping activations.
    #[must_use]
    pub fn predict(&self, x: &Tensor) -> Tensor {
        self.layers.iter().fold(x.clone(), |out, layer| layer.forward(&out))
    }

    /// Backpropagates `grad` (w.r.t. the output) and returns the input
    /// gradient and the parameter gradients ordered like [`Sequential::params`].
    #[must_use]
    pub fn backward(&self, activations: &[Tensor], grad: &Tensor) -> (Tensor, Vec<Tensor>) {
        let mut grad_out = grad.clone();
        let mut per_layer = Vec::with_capacity(self.layers.len());
        for (layer, activation) in self
            .layers
            .iter()
            .rev()
            .zip(activations.iter().rev().skip(1))
        {
            let (g_in, p) = layer.backward(activation, &grad_out);
            grad_out = g_in;
            per_layer.push(p);
        }
        let param_grads = per_layer.into_iter().rev().flatten().collect();
        (grad_out, param_grads)
    }

    #[must_use]
    pub fn params(&self) -> Vec<&Tensor> {
        self.layers.iter().flat_map(|l| l.params()).collect()
    }

    pub fn params_mut(&mut self) -> Vec<&mut Tensor> {
        let mut out = Vec::new();
        for layer in &mut self.layers {
            out.extend(layer.params_mut());
        }
        out
    }

    /// Zeroed tensors shaped like every parameter, for accumulating gradients.
    #[must_use]
    pub fn zero_grads(&self) -> Vec<Tensor> {
        self.params().into_iter().map(|p| Tensor::zeros(p.shape.clone())).collect()
    }

    #[must_use]
    pub fn input_dim(&self) -> Option<usize> {
        self.layers.iter().find_map(|l| l.dims()).map(|(i, _)| i)
    }

    #[must_use]
    pub fn output_dim(&self) -> Option<usize> {
        self.layers.iter().rev().find_map(|l| l.dims()).map(|(_, o)| o)
    }

    /// Clones every parameter tensor.
    #[must_use]
    pub fn state(&self) -> Vec<Tensor> {
        self.params().into_iter().cloned().collect()
    }

    /// Overwrites the parameters with tensors previously taken from [`Sequential::state`].
    ///
    /// # Errors
    ///
    /// Fails without touching the network when the count or any shape differs.
    pub fn load_state(&mut self, state: &[Tensor]) -> Result<(), MlError> {
        let mut params = self.params_mut();
        if params.len() != state.len() {
            return Err(MlError::ParamCount { expected: params.len(), found: state.len() });
        }
        for (p, s) in params.iter().zip(state) {
            if p.shape != s.shape {
                return Err(MlError::ShapeMismatch { expected: p.len(), found: s.len() });
            }
        }
        for (p, s) in params.iter_mut().zip(state) {
            p.data.clone_from(&s.data);
        }
        Ok(())
    }
}

/// A network whose parameters can be read but never changed.
///
/// There is no `params_mut`, no `DerefMut` and no way to get the inner
/// [`Sequential`] back, so no optimiser can ever hold its weights.
pub struct Frozen(Sequential);

impl Frozen {
    #[must_use]
    pub fn new(net: Sequential) -> Self {
        Self(net)
    }

    #[must_use]
    pub fn forward(&self, x: &Tensor) -> Tensor {
        self.0.predict(x)
    }

    #[must_use]
    pub fn params(&self) -> Vec<&Tensor> {
        self.0.params()
    }

    #[must_use]
    pub fn input_dim(&self) -> Option<usize> {
        self.0.input_dim()
    }

    #[must_use]
    pub fn output_dim(&self) -> Option<usize> {
        self.0.output_dim()
    }
}
