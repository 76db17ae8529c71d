//! Random - Seedable Sampling
//!
//! Random tensors, permutations and sampling. The free functions draw from
//! a process-wide engine that seeds itself from OS entropy on first use;
//! [`seed`] makes every later draw reproducible. A [`RandomEngine`] can also
//! be owned directly for independent streams.
//!
//! # Example
//! ```rust
//! use tensorex_tensor::random;
//!
//! random::seed(7);
//! let a = random::rand(&[3], 0.0, 1.0).unwrap();
//! random::seed(7);
//! let b = random::rand(&[3], 0.0, 1.0).unwrap();
//! assert_eq!(a.to_vec(), b.to_vec());
//! ```
//!
//! @version 0.1.0
//! @author `tensorex` Development Team

use parking_lot::Mutex;
use rand::distributions::uniform::SampleUniform;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Binomial, Normal, StandardNormal, Uniform};

use tensorex_core::dtype::{Float, Numeric, Scalar};
use tensorex_core::error::{Error, Result};

use crate::creation::packed;
use crate::expr::{Expression, IntoExpression};
use crate::shape::numel;
use crate::tensor::Tensor;

// =============================================================================
// Engine
// =============================================================================

/// A random number engine producing tensors.
#[derive(Debug, Clone)]
pub struct RandomEngine {
    rng: StdRng,
}

impl RandomEngine {
    /// Creates an engine with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates an engine seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    fn sample_with<T: Scalar, D: Distribution<T>>(&mut self, shape: &[usize], dist: D) -> Tensor<T> {
        let data = (&mut self.rng).sample_iter(dist).take(numel(shape)).collect();
        packed(data, shape)
    }

    /// Uniform samples in `[lo, hi)`.
    pub fn rand<T>(&mut self, shape: &[usize], lo: T, hi: T) -> Result<Tensor<T>>
    where
        T: Float + SampleUniform,
    {
        if lo.is_nan() || hi.is_nan() || lo >= hi {
            return Err(Error::invalid_operation(format!(
                "rand() requires lo < hi, got [{lo:?}, {hi:?})"
            )));
        }
        Ok(self.sample_with(shape, Uniform::new(lo, hi)))
    }

    /// Normal samples with the given mean and standard deviation.
    pub fn randn<T>(&mut self, shape: &[usize], mean: T, std: T) -> Result<Tensor<T>>
    where
        T: Float,
        StandardNormal: Distribution<T>,
    {
        if std.is_nan() || std < T::ZERO {
            return Err(Error::invalid_operation(format!(
                "randn() requires a non-negative std, got {std:?}"
            )));
        }
        let dist = Normal::new(mean, std).map_err(|e| {
            Error::invalid_operation(format!("randn() with std {std:?}: {e}"))
        })?;
        Ok(self.sample_with(shape, dist))
    }

    /// Uniform integers in `[lo, hi)`, cast to `T`.
    pub fn randint<T: Numeric>(&mut self, shape: &[usize], lo: i64, hi: i64) -> Result<Tensor<T>> {
        if lo >= hi {
            return Err(Error::invalid_operation(format!(
                "randint() requires lo < hi, got [{lo}, {hi})"
            )));
        }
        let dist = Uniform::new(lo, hi);
        let data = (0..numel(shape))
            .map(|_| T::cast_from(dist.sample(&mut self.rng)))
            .collect();
        Ok(packed(data, shape))
    }

    /// Successes out of `n` trials with probability `p`, cast to `T`.
    pub fn binomial<T: Numeric>(&mut self, shape: &[usize], n: u64, p: f64) -> Result<Tensor<T>> {
        let dist = Binomial::new(n, p)
            .map_err(|e| Error::invalid_operation(format!("binomial() with p = {p}: {e}")))?;
        let data = (0..numel(shape))
            .map(|_| T::cast_from(dist.sample(&mut self.rng)))
            .collect();
        Ok(packed(data, shape))
    }

    /// A random ordering of `0..n`.
    pub fn permutation(&mut self, n: usize) -> Tensor<u64> {
        let mut data: Vec<u64> = (0..n as u64).collect();
        data.shuffle(&mut self.rng);
        packed(data, &[n])
    }

    /// Shuffles `t` in place along its first axis.
    pub fn shuffle<T: Scalar>(&mut self, t: &Tensor<T>) -> Result<()> {
        if t.ndim() == 0 {
            return Err(Error::invalid_operation("shuffle() requires at least one dimension"));
        }
        let mut order: Vec<isize> = (0..t.shape()[0] as isize).collect();
        order.shuffle(&mut self.rng);
        let shuffled = t.index_select(0, &order)?;
        t.copy_from(&shuffled)
    }

    /// `n` samples from the flattening of `e`, with or without replacement.
    pub fn choice<T, E>(&mut self, e: E, n: usize, replace: bool) -> Result<Tensor<T>>
    where
        T: Scalar,
        E: IntoExpression<Elem = T>,
    {
        let source = e.into_expr().eval()?.to_vec();
        if n > 0 && source.is_empty() {
            return Err(Error::EmptyTensor);
        }

        let data = if replace {
            (0..n)
                .map(|_| source[self.rng.gen_range(0..source.len())])
                .collect()
        } else {
            if n > source.len() {
                return Err(Error::invalid_operation(format!(
                    "choice() without replacement cannot draw {n} from {}",
                    source.len()
                )));
            }
            rand::seq::index::sample(&mut self.rng, source.len(), n)
                .into_iter()
                .map(|i| source[i])
                .collect()
        };
        Ok(packed(data, &[n]))
    }
}

// =============================================================================
// Process-Wide Engine
// =============================================================================

static ENGINE: Mutex<Option<RandomEngine>> = parking_lot::const_mutex(None);

fn with_engine<R>(f: impl FnOnce(&mut RandomEngine) -> R) -> R {
    let mut guard = ENGINE.lock();
    f(guard.get_or_insert_with(RandomEngine::from_entropy))
}

/// Reseeds the process-wide engine.
pub fn seed(value: u64) {
    tracing::debug!(seed = value, "reseeding random engine");
    *ENGINE.lock() = Some(RandomEngine::seeded(value));
}

/// Uniform samples in `[lo, hi)`.
pub fn rand<T>(shape: &[usize], lo: T, hi: T) -> Result<Tensor<T>>
where
    T: Float + SampleUniform,
{
    with_engine(|e| e.rand(shape, lo, hi))
}

/// Normal samples with the given mean and standard deviation.
pub fn randn<T>(shape: &[usize], mean: T, std: T) -> Result<Tensor<T>>
where
    T: Float,
    StandardNormal: Distribution<T>,
{
    with_engine(|e| e.randn(shape, mean, std))
}

/// Uniform integers in `[lo, hi)`, cast to `T`.
pub fn randint<T: Numeric>(shape: &[usize], lo: i64, hi: i64) -> Result<Tensor<T>> {
    with_engine(|e| e.randint(shape, lo, hi))
}

/// Successes out of `n` trials with probability `p`, cast to `T`.
pub fn binomial<T: Numeric>(shape: &[usize], n: u64, p: f64) -> Result<Tensor<T>> {
    with_engine(|e| e.binomial(shape, n, p))
}

/// A random ordering of `0..n`.
pub fn permutation(n: usize) -> Tensor<u64> {
    with_engine(|e| e.permutation(n))
}

/// Shuffles `t` in place along its first axis.
pub fn shuffle<T: Scalar>(t: &Tensor<T>) -> Result<()> {
    with_engine(|e| e.shuffle(t))
}

/// `n` samples from the flattening of `e`, with or without replacement.
pub fn choice<T, E>(e: E, n: usize, replace: bool) -> Result<Tensor<T>>
where
    T: Scalar,
    E: IntoExpression<Elem = T>,
{
    with_engine(|engine| engine.choice(e, n, replace))
}

// =============================================================================
// Tests
// =============================================================================
