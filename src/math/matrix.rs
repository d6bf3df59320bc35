use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Serialize, Deserialize};
use std::ops::Mul;

/// Dense row-major matrix of `f32`.
///
/// Element `(i, j)` lives at `data[i * cols + j]`. Shape mismatches between
/// operands are programming errors and panic, as they always have here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f32>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Matrix {
        assert_eq!(
            data.len(),
            rows * cols,
            "Matrix::from_vec: {} values cannot fill a {}x{} matrix",
            data.len(), rows, cols
        );
        Matrix { rows, cols, data }
    }

    /// Builds a matrix from nested rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Matrix {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.into_iter().enumerate() {
            assert_eq!(row.len(), n_cols, "Matrix::from_rows: row {} has length {}, expected {}", i, row.len(), n_cols);
            data.extend(row);
        }
        Matrix { rows: n_rows, cols: n_cols, data }
    }

    /// He initialization: every entry is drawn from N(0, 1) and scaled by
    /// sqrt(2 / rows).
    ///
    /// Shape: (rows, cols). `rows` is the fan-in, matching the
    /// (in_dim, out_dim) layout of a Dense weight matrix.
    pub fn he<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let std_dev = (2.0 / rows as f64).sqrt();
        let data = (0..rows * cols)
            .map(|_| {
                let z: f64 = rng.sample(StandardNormal);
                (z * std_dev) as f32
            })
            .collect();
        Matrix { rows, cols, data }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.data[i * self.cols + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f32) {
        self.data[i * self.cols + j] = value;
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f32] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        (0..self.rows).map(move |i| self.row(i))
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                res.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f32) -> f32,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }

    /// Combines two same-shape matrices element by element.
    pub fn zip_map<F>(&self, other: &Matrix, functor: F) -> Matrix
    where
        F: Fn(f32, f32) -> f32,
    {
        self.assert_same_shape(other);
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().zip(&other.data).map(|(&a, &b)| functor(a, b)).collect(),
        }
    }

    pub fn scale(&self, factor: f32) -> Matrix {
        self.map(|x| x * factor)
    }

    /// `self -= factor * other`, in place.
    pub fn sub_scaled_assign(&mut self, other: &Matrix, factor: f32) {
        self.assert_same_shape(other);
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a -= factor * b;
        }
    }

    /// Matrix product `self · rhs`.
    pub fn matmul(&self, rhs: &Matrix) -> Matrix {
        if self.cols != rhs.rows {
            panic!(
                "Matrices are of incorrect sizes: {}x{} · {}x{}",
                self.rows, self.cols, rhs.rows, rhs.cols
            )
        }
        let n = rhs.cols;
        let mut res = Matrix::zeros(self.rows, n);
        for i in 0..self.rows {
            let out_row = &mut res.data[i * n..(i + 1) * n];
            for (k, &a) in self.row(i).iter().enumerate() {
                let rhs_row = &rhs.data[k * n..(k + 1) * n];
                for (o, &b) in out_row.iter_mut().zip(rhs_row) {
                    *o += a * b;
                }
            }
        }
        res
    }

    /// `selfᵀ · rhs` without materializing the transpose.
    pub fn t_matmul(&self, rhs: &Matrix) -> Matrix {
        if self.rows != rhs.rows {
            panic!(
                "Matrices are of incorrect sizes: ({}x{})ᵀ · {}x{}",
                self.rows, self.cols, rhs.rows, rhs.cols
            )
        }
        let n = rhs.cols;
        let mut res = Matrix::zeros(self.cols, n);
        for r in 0..self.rows {
            let rhs_row = rhs.row(r);
            for (i, &a) in self.row(r).iter().enumerate() {
                let out_row = &mut res.data[i * n..(i + 1) * n];
                for (o, &b) in out_row.iter_mut().zip(rhs_row) {
                    *o += a * b;
                }
            }
        }
        res
    }

    /// `self · rhsᵀ` without materializing the transpose.
    pub fn matmul_t(&self, rhs: &Matrix) -> Matrix {
        if self.cols != rhs.cols {
            panic!(
                "Matrices are of incorrect sizes: {}x{} · ({}x{})ᵀ",
                self.rows, self.cols, rhs.rows, rhs.cols
            )
        }
        let mut res = Matrix::zeros(self.rows, rhs.rows);
        for i in 0..self.rows {
            let lhs_row = self.row(i);
            for j in 0..rhs.rows {
                res.data[i * rhs.rows + j] = lhs_row.iter().zip(rhs.row(j)).map(|(a, b)| a * b).sum();
            }
        }
        res
    }

    /// Adds `row` to every row (bias broadcast).
    pub fn add_row(&self, row: &[f32]) -> Matrix {
        assert_eq!(row.len(), self.cols, "Matrix::add_row: row length {} does not match {} columns", row.len(), self.cols);
        let mut res = self.clone();
        for i in 0..res.rows {
            for (x, &b) in res.row_mut(i).iter_mut().zip(row) {
                *x += b;
            }
        }
        res
    }

    /// Sums over the row axis, yielding one value per column.
    pub fn sum_rows(&self) -> Vec<f32> {
        let mut sums = vec![0.0; self.cols];
        for row in self.iter_rows() {
            for (s, &x) in sums.iter_mut().zip(row) {
                *s += x;
            }
        }
        sums
    }

    /// Gathers the given rows, in order, into a new matrix.
    pub fn select_rows(&self, indices: &[usize]) -> Matrix {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        Matrix { rows: indices.len(), cols: self.cols, data }
    }

    /// Column index of the maximum of each row. Ties resolve to the lowest
    /// index.
    pub fn argmax_rows(&self) -> Vec<usize> {
        self.iter_rows().map(argmax).collect()
    }

    pub fn min_value(&self) -> Option<f32> {
        self.data.iter().copied().reduce(f32::min)
    }

    pub fn max_value(&self) -> Option<f32> {
        self.data.iter().copied().reduce(f32::max)
    }

    fn assert_same_shape(&self, other: &Matrix) {
        if self.rows != other.rows || self.cols != other.cols {
            panic!(
                "Matrices are of incorrect sizes: {}x{} vs {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )
        }
    }
}

/// Index of the first maximum element in a slice; 0 for an empty slice.
pub fn argmax(v: &[f32]) -> usize {
    let mut best = 0;
    for (i, &x) in v.iter().enumerate().skip(1) {
        if x > v[best] {
            best = i;
        }
    }
    best
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        self.matmul(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn sample() -> Matrix {
        Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])
    }

    #[test]
    fn matmul_matches_hand_computation() {
        let a = sample();
        let b = Matrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]);
        let c = &a * &b;
        assert_eq!(c, Matrix::from_rows(vec![vec![4.0, 5.0], vec![10.0, 11.0]]));
    }

    #[test]
    fn transposed_products_agree_with_explicit_transpose() {
        let a = sample();
        let b = Matrix::from_rows(vec![vec![0.5, -1.0, 2.0], vec![3.0, 0.0, -2.0]]);
        assert_eq!(a.t_matmul(&b), a.transpose().matmul(&b));
        assert_eq!(a.matmul_t(&b), a.matmul(&b.transpose()));
    }

    #[test]
    fn add_row_broadcasts_and_sum_rows_reduces() {
        let a = sample().add_row(&[1.0, 0.0, -1.0]);
        assert_eq!(a.data, vec![2.0, 2.0, 2.0, 5.0, 5.0, 5.0]);
        assert_eq!(a.sum_rows(), vec![7.0, 7.0, 7.0]);
    }

    #[test]
    fn argmax_prefers_first_maximum() {
        let m = Matrix::from_rows(vec![vec![0.2, 0.7, 0.7], vec![1.0, 1.0, 0.0]]);
        assert_eq!(m.argmax_rows(), vec![1, 0]);
    }

    #[test]
    fn select_rows_gathers_in_order() {
        let m = sample().select_rows(&[1, 0, 1]);
        assert_eq!(m.rows, 3);
        assert_eq!(m.row(0), &[4.0, 5.0, 6.0]);
        assert_eq!(m.row(1), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn he_init_is_seeded_and_scaled() {
        let a = Matrix::he(784, 16, &mut StdRng::seed_from_u64(3));
        let b = Matrix::he(784, 16, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);

        let n = a.data.len() as f64;
        let mean = a.data.iter().map(|&x| x as f64).sum::<f64>() / n;
        let var = a.data.iter().map(|&x| (x as f64 - mean).powi(2)).sum::<f64>() / n;
        // Expected variance 2/784 ≈ 0.00255.
        assert!((var - 2.0 / 784.0).abs() < 0.0005, "variance {}", var);
    }

    #[test]
    #[should_panic(expected = "incorrect sizes")]
    fn matmul_rejects_mismatched_shapes() {
        let _ = sample().matmul(&sample());
    }
}
