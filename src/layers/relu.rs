use crate::math::matrix::Matrix;

/// ReLU: `A = max(0, Z)`. Stateless; the pre-activation travels in a
/// [`ReluCache`] instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Relu;

/// Pre-activation retained for [`Relu::backward`].
#[derive(Debug, Clone, Copy)]
pub struct ReluCache<'a> {
    pre_activation: &'a Matrix,
}

impl Relu {
    pub fn forward<'a>(&self, z: &'a Matrix) -> (Matrix, ReluCache<'a>) {
        (z.map(|x| if x > 0.0 { x } else { 0.0 }), ReluCache { pre_activation: z })
    }

    /// `grad_output ⊙ [z > 0]`: zero wherever the cached pre-activation was
    /// ≤ 0, unchanged elsewhere.
    pub fn backward(&self, cache: &ReluCache<'_>, grad_output: &Matrix) -> Matrix {
        grad_output.zip_map(cache.pre_activation, |g, z| if z > 0.0 { g } else { 0.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_clamps_negatives() {
        let z = Matrix::from_rows(vec![vec![-1.0, 0.0, 2.5]]);
        let (a, _) = Relu.forward(&z);
        assert_eq!(a.data, vec![0.0, 0.0, 2.5]);
    }

    #[test]
    fn backward_masks_non_positive_pre_activations() {
        let z = Matrix::from_rows(vec![vec![-3.0, 0.0, 1e-6], vec![4.0, -0.5, 0.0]]);
        let (_, cache) = Relu.forward(&z);
        let grad = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![-4.0, 5.0, 6.0]]);
        let dz = Relu.backward(&cache, &grad);
        assert_eq!(dz.data, vec![0.0, 0.0, 3.0, -4.0, 0.0, 0.0]);
    }
}
