//! Seeded matrix sources.
//!
//! Sources are deterministic for a given seed so runs and tests are
//! reproducible.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::matrix::Matrix;
use crate::scalar::Real;

/// Default seed for matrix sources.
pub const DEFAULT_SEED: u64 = 42;

/// Supplies an initialized N×N matrix.
pub trait MatrixSource<T> {
    /// Produces a matrix of order `order`.
    fn init(&mut self, order: usize) -> Matrix<T>;
}

/// Fills every cell uniformly from `[low, high)`.
#[derive(Clone, Debug)]
pub struct UniformSource<T> {
    rng: ChaCha8Rng,
    low: T,
    high: T,
}

impl<T: Real> UniformSource<T> {
    /// Creates a source sampling from `[-100, 100)`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_range(seed, T::lit(-100.0), T::lit(100.0))
    }

    /// Creates a source sampling from `[low, high)`.
    ///
    /// # Panics
    ///
    /// Panics if `low >= high`.
    #[must_use]
    pub fn with_range(seed: u64, low: T, high: T) -> Self {
        assert!(low < high, "empty sampling range");
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            low,
            high,
        }
    }
}

impl<T: Real> Default for UniformSource<T> {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl<T: Real> MatrixSource<T> for UniformSource<T> {
    fn init(&mut self, order: usize) -> Matrix<T> {
        let (low, high) = (self.low, self.high);
        let data = (0..order * order)
            .map(|_| self.rng.gen_range(low..high))
            .collect();
        Matrix::from_raw(order, data)
    }
}

/// A uniform source whose diagonal strictly dominates each row.
///
/// Strict diagonal dominance is preserved by elimination without pivoting,
/// so every pivot is nonzero. Used for large benches and property tests.
#[derive(Clone, Debug)]
pub struct DiagonallyDominantSource<T> {
    inner: UniformSource<T>,
}

impl<T: Real> DiagonallyDominantSource<T> {
    /// Creates a diagonally dominant source with off-diagonal values in
    /// `[-100, 100)`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: UniformSource::new(seed),
        }
    }
}

impl<T: Real> MatrixSource<T> for DiagonallyDominantSource<T> {
    fn init(&mut self, order: usize) -> Matrix<T> {
        let mut m = self.inner.init(order);
        for i in 0..order {
            let row = m.row_mut(i);
            let off_diagonal = row
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .fold(T::zero(), |acc, (_, v)| acc + v.abs());
            row[i] = off_diagonal + T::one();
        }
        m
    }
}
