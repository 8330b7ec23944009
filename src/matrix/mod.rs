//! Dense Matrix Operations and Truncated SVD
//!
//! Row-major dense matrices plus the deterministic randomized range-finder
//! SVD backing the collaborative model.
//!
//! Functions:
//! - Matrix products (rayon-parallel over rows)
//! - Modified Gram-Schmidt orthonormalization
//! - Seeded Gaussian projection matrices (Box-Muller)
//! - `truncated_svd`: rank-k factorization `M ≈ U * V^T`
//!
//! The factorization is reproducible: the only randomness is the Gaussian
//! projection, drawn from a ChaCha8 stream with a caller-supplied seed.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::types::EPSILON;

/// Power iterations for the randomized range finder
const POWER_ITERATIONS: usize = 2;

/// Dense row-major matrix
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.cols + j] = value;
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.set(j, i, self.get(i, j));
            }
        }
        out
    }
}

/// Vector dot product
pub fn dot_product(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum()
}

/// Matrix product `a * b`, parallelized over the rows of `a`
pub fn mat_mul(a: &Matrix, b: &Matrix) -> Matrix {
    debug_assert_eq!(a.cols, b.rows);
    let mut out = Matrix::zeros(a.rows, b.cols);
    out.data
        .par_chunks_mut(b.cols)
        .enumerate()
        .for_each(|(i, out_row)| {
            let a_row = a.row(i);
            for (k, &a_ik) in a_row.iter().enumerate() {
                if a_ik == 0.0 {
                    continue;
                }
                let b_row = b.row(k);
                for (j, out_ij) in out_row.iter_mut().enumerate() {
                    *out_ij += a_ik * b_row[j];
                }
            }
        });
    out
}

/// Gaussian random matrix from a seeded ChaCha8 stream
///
/// Standard normal deviates via the Box-Muller transform; identical seeds
/// produce identical matrices across runs and platforms.
pub fn gaussian_matrix(rows: usize, cols: usize, seed: u64) -> Matrix {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let data = (0..rows * cols).map(|_| sample_normal(&mut rng)).collect();
    Matrix::from_vec(rows, cols, data)
}

/// Sample from the standard normal distribution using Box-Muller
fn sample_normal(rng: &mut ChaCha8Rng) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(EPSILON);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Orthonormalize the columns of `m` in place (modified Gram-Schmidt)
///
/// Columns that become numerically dependent are zeroed rather than
/// renormalized, so rank-deficient inputs stay deterministic.
pub fn orthonormalize_columns(m: &mut Matrix) {
    for j in 0..m.cols {
        for prev in 0..j {
            let mut proj = 0.0;
            for i in 0..m.rows {
                proj += m.get(i, j) * m.get(i, prev);
            }
            for i in 0..m.rows {
                let v = m.get(i, j) - proj * m.get(i, prev);
                m.set(i, j, v);
            }
        }
        let norm = (0..m.rows).map(|i| m.get(i, j).powi(2)).sum::<f64>().sqrt();
        if norm > EPSILON {
            for i in 0..m.rows {
                m.set(i, j, m.get(i, j) / norm);
            }
        } else {
            for i in 0..m.rows {
                m.set(i, j, 0.0);
            }
        }
    }
}

/// Truncated rank-k factorization `M ≈ U * V^T`
///
/// Randomized range-finder: project onto a seeded Gaussian sketch, refine
/// with a few power iterations, then read the factors off the orthonormal
/// basis. Returns `(U, V)` with `U` of shape rows×k and `V` of shape cols×k;
/// the caller is responsible for guarding `rank >= 1`.
pub fn truncated_svd(m: &Matrix, rank: usize, seed: u64) -> (Matrix, Matrix) {
    let k = rank.min(m.rows).min(m.cols);
    let mt = m.transpose();

    let omega = gaussian_matrix(m.cols, k, seed);
    let mut q = mat_mul(m, &omega);
    orthonormalize_columns(&mut q);

    for _ in 0..POWER_ITERATIONS {
        let mut z = mat_mul(&mt, &q);
        orthonormalize_columns(&mut z);
        q = mat_mul(m, &z);
        orthonormalize_columns(&mut q);
    }

    // B = Q^T * M is k×cols; V = B^T reconstructs M as Q * B
    let b = mat_mul(&q.transpose(), m);
    (q, b.transpose())
}
