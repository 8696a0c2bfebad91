//! # Randomness
//!
//! Operators run concurrently on many individuals, so every draw goes through the
//! thread-local generator of the `rand` crate. Nothing is shared between threads
//! and nothing needs locking.
//!
//! Algorithms that are useful to replay deterministically (cut-point crossovers,
//! index sampling) take any `R: Rng + ?Sized` instead, so tests can pass a seeded
//! `StdRng`.
//!
//! ## Example
//!
//! ```rust
//! use populus::rng::ThreadLocalRng;
//!
//! let value = ThreadLocalRng::gen_range(0.0..1.0);
//! assert!((0.0..1.0).contains(&value));
//!
//! let indices = ThreadLocalRng::sample_indices(10, 4).unwrap();
//! assert_eq!(indices.len(), 4);
//! ```

use rand::distributions::uniform::{SampleRange, SampleUniform};
use rand::rngs::ThreadRng;
use rand::seq::{index, SliceRandom};
use rand::{thread_rng, Rng};

use crate::error::{GeneticError, Result};

/// A thread-local random number generator that can be used without synchronization.
///
/// It uses the built-in `ThreadRng` from the `rand` crate, which is automatically
/// seeded from the system entropy and is thread-local.
pub struct ThreadLocalRng;

impl ThreadLocalRng {
    /// Returns a handle to the generator of the calling thread.
    pub fn rng() -> ThreadRng {
        thread_rng()
    }

    /// Generates a random number in the given range.
    ///
    /// # Panics
    ///
    /// Panics when the range is empty, like `Rng::gen_range`.
    pub fn gen_range<T, R>(range: R) -> T
    where
        T: SampleUniform,
        R: SampleRange<T>,
    {
        thread_rng().gen_range(range)
    }

    /// Bernoulli trial: `true` with the given probability.
    ///
    /// Probabilities outside `[0, 1]` are clamped; `NaN` never succeeds.
    pub fn bernoulli(probability: f64) -> bool {
        bernoulli(&mut thread_rng(), probability)
    }

    /// Draws `amount` distinct indices from `0..length`.
    pub fn sample_indices(length: usize, amount: usize) -> Result<Vec<usize>> {
        sample_indices(&mut thread_rng(), length, amount)
    }

    /// Shuffles the slice in place.
    pub fn shuffle<T>(items: &mut [T]) {
        items.shuffle(&mut thread_rng());
    }
}

/// Bernoulli trial on the supplied generator.
pub fn bernoulli<R>(rng: &mut R, probability: f64) -> bool
where
    R: Rng + ?Sized,
{
    if probability.is_nan() {
        return false;
    }
    rng.gen_bool(probability.clamp(0.0, 1.0))
}

/// Draws `amount` distinct indices from `0..length`, in random order.
///
/// # Errors
///
/// Returns `IllegalState` when more indices are requested than exist.
pub fn sample_indices<R>(rng: &mut R, length: usize, amount: usize) -> Result<Vec<usize>>
where
    R: Rng + ?Sized,
{
    if amount > length {
        return Err(GeneticError::IllegalState(format!(
            "Cannot draw {amount} distinct indices from a range of {length}"
        )));
    }
    Ok(index::sample(rng, length, amount).into_vec())
}

/// Draws two distinct indices from `lower..=upper` and returns them sorted.
pub fn sorted_pair<R>(rng: &mut R, lower: usize, upper: usize) -> Result<(usize, usize)>
where
    R: Rng + ?Sized,
{
    if upper <= lower {
        return Err(GeneticError::IllegalState(format!(
            "Cannot draw two distinct indices from [{lower}, {upper}]"
        )));
    }
    let picked = sample_indices(rng, upper - lower + 1, 2)?;
    let (a, b) = (lower + picked[0], lower + picked[1]);
    Ok((a.min(b), a.max(b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_bernoulli_extremes() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!((0..100).all(|_| bernoulli(&mut rng, 1.0)));
        assert!((0..100).all(|_| !bernoulli(&mut rng, 0.0)));
        assert!(!bernoulli(&mut rng, f64::NAN));
    }

    #[test]
    fn test_sample_indices_are_distinct() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let picked = sample_indices(&mut rng, 10, 6).unwrap();
            let unique: HashSet<_> = picked.iter().copied().collect();
            assert_eq!(unique.len(), 6);
            assert!(picked.iter().all(|&i| i < 10));
        }
    }

    #[test]
    fn test_sample_indices_rejects_oversized_requests() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sample_indices(&mut rng, 3, 4).is_err());
        assert!(ThreadLocalRng::sample_indices(0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_sorted_pair() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let (a, b) = sorted_pair(&mut rng, 2, 6).unwrap();
            assert!(a < b);
            assert!((2..=6).contains(&a) && (2..=6).contains(&b));
        }
        assert!(sorted_pair(&mut rng, 4, 4).is_err());
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut values: Vec<u32> = (0..20).collect();
        ThreadLocalRng::shuffle(&mut values);
        values.sort_unstable();
        assert_eq!(values, (0..20).collect::<Vec<_>>());
    }
}
