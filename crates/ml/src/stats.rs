use crate::error::MlError;

/// Added to the variance before taking the square root in [`RunningMeanStd::normalize`].
pub const NORM_EPSILON: f64 = 1e-8;
/// Normalised values are clipped to `[-CLIP, CLIP]`.
pub const CLIP: f64 = 5.0;

/// Streaming per-dimension mean and variance.
///
/// Batches are merged with the parallel-variance formula of Chan et al.,
/// which only ever combines deltas against the running mean and therefore
/// stays stable over millions of single-sample updates.
#[derive(Clone, Debug)]
pub struct RunningMeanStd {
    mean: Vec<f64>,
    var: Vec<f64>,
    count: f64,
}

impl RunningMeanStd {
    /// Pseudo-count the estimator starts from.
    pub const INITIAL_COUNT: f64 = 1e-4;

    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self { mean: vec![0.0; dim], var: vec![1.0; dim], count: Self::INITIAL_COUNT }
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    #[must_use]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    #[must_use]
    pub fn var(&self) -> &[f64] {
        &self.var
    }

    #[must_use]
    pub fn count(&self) -> f64 {
        self.count
    }

    /// Merges a batch of samples (population statistics) into the estimate.
    ///
    /// # Errors
    ///
    /// Fails when any row's width differs from [`RunningMeanStd::dim`].
    pub fn update<R: AsRef<[f64]>>(&mut self, batch: &[R]) -> Result<(), MlError> {
        if batch.is_empty() {
            return Ok(());
        }
        let dim = self.dim();
        let n = batch.len() as f64;
        let mut batch_mean = vec![0.0; dim];
        for row in batch {
            let row = self.check(row.as_ref())?;
            for (m, v) in batch_mean.iter_mut().zip(row) {
                *m += v / n;
            }
        }
        let mut batch_var = vec![0.0; dim];
        for row in batch {
            for ((acc, v), m) in batch_var.iter_mut().zip(row.as_ref()).zip(&batch_mean) {
                *acc += (v - m).powi(2) / n;
            }
        }
        self.update_from_moments(&batch_mean, &batch_var, n)
    }

    /// Merges precomputed batch moments.
    ///
    /// # Errors
    ///
    /// Fails when either moment vector has the wrong width.
    pub fn update_from_moments(&mut self, batch_mean: &[f64], batch_var: &[f64], batch_count: f64) -> Result<(), MlError> {
        self.check(batch_mean)?;
        self.check(batch_var)?;
        let tot_count = self.count + batch_count;
        for i in 0..self.dim() {
            let delta = batch_mean[i] - self.mean[i];
            let m_a = self.var[i] * self.count;
            let m_b = batch_var[i] * batch_count;
            let m2 = m_a + m_b + delta * delta * self.count * batch_count / tot_count;
            self.mean[i] += delta * batch_count / tot_count;
            self.var[i] = m2 / tot_count;
        }
        self.count = tot_count;
        Ok(())
    }

    /// `(x - mean) / sqrt(var + 1e-8)`, clipped to `[-5, 5]`.
    ///
    /// # Errors
    ///
    /// Fails when `x` has the wrong width.
    pub fn normalize(&self, x: &[f64]) -> Result<Vec<f32>, MlError> {
        self.check(x)?;
        Ok(x.iter()
            .zip(self.mean.iter().zip(&self.var))
            .map(|(v, (m, var))| ((v - m) / (var + NORM_EPSILON).sqrt()).clamp(-CLIP, CLIP) as f32)
            .collect())
    }

    fn check<'a>(&self, x: &'a [f64]) -> Result<&'a [f64], MlError> {
        if x.len() == self.dim() {
            Ok(x)
        } else {
            Err(MlError::ShapeMismatch { expected: self.dim(), found: x.len() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_from_pseudo_count() {
        let rms = RunningMeanStd::new(3);
        assert_eq!(rms.mean(), &[0.0; 3]);
        assert_eq!(rms.var(), &[1.0; 3]);
        assert!((rms.count() - 1e-4).abs() < 1e-12);
    }

    #[test]
    fn rejects_wrong_width() {
        let mut rms = RunningMeanStd::new(2);
        assert_eq!(
            rms.update(&[vec![1.0, 2.0, 3.0]]),
            Err(MlError::ShapeMismatch { expected: 2, found: 3 })
        );
        assert!(rms.normalize(&[1.0]).is_err());
    }
}
