use crate::Tensor;

/// Mean squared error over all elements.
pub fn mse(pred: &Tensor, target: &Tensor) -> f32 {
    assert_eq!(pred.len(), target.len());
    let n = pred.len();
    let sum: f32 = pred
        .data
        .iter()
        .zip(&target.data)
        .map(|(&p, &t)| (p - t).powi(2))
        .sum();
    sum / n as f32
}

/// Gradient of [`mse`] with respect to `pred`.
pub fn mse_grad(pred: &Tensor, target: &Tensor) -> Tensor {
    assert_eq!(pred.len(), target.len());
    let n = pred.len() as f32;
    let data = pred
        .data
        .iter()
        .zip(&target.data)
        .map(|(&p, &t)| 2.0 * (p - t) / n)
        .collect();
    Tensor::from_vec(pred.shape.clone(), data)
}

/// Numerically stable `log(softmax(logits))`.
pub fn log_softmax(logits: &[f32]) -> Vec<f32> {
    let m = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let log_sum = logits.iter().map(|&v| (v - m).exp()).sum::<f32>().ln() + m;
    logits.iter().map(|&v| v - log_sum).collect()
}

pub fn softmax(logits: &[f32]) -> Vec<f32> {
    log_softmax(logits).into_iter().map(f32::exp).collect()
}

/// Entropy of the categorical distribution given by `probs`.
pub fn entropy(probs: &[f32]) -> f32 {
    -probs
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| p * p.ln())
        .sum::<f32>()
}
