//! # Fitness Values
//!
//! The engine never assumes a concrete number type for fitness. Anything that can be
//! totally ordered and projected onto `f64` for statistics implements
//! [`FitnessValue`]. Implementations are provided for the primitive integers and
//! floats; floats are ordered with `total_cmp` and must be finite to be accepted.
//!
//! ```rust
//! use std::cmp::Ordering;
//! use populus::fitness::FitnessValue;
//!
//! assert_eq!(3_i64.compare(&5), Ordering::Less);
//! assert_eq!(2.5_f64.to_f64(), 2.5);
//! assert!(f64::NAN.validate().is_err());
//! ```

use std::cmp::Ordering;
use std::fmt::Debug;

use crate::error::{GeneticError, Result};

/// A totally ordered fitness grade.
pub trait FitnessValue: Clone + PartialOrd + Debug + Send + Sync + 'static {
    /// Total order between two grades. `Greater` means `self` is the larger grade;
    /// whether larger is better depends on the environment's mode.
    fn compare(&self, other: &Self) -> Ordering;

    /// Projection used for sums, means and deviations.
    fn to_f64(&self) -> f64;

    /// Rejects grades the engine cannot rank meaningfully.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

macro_rules! integer_fitness {
    ($($t:ty),*) => {
        $(
            impl FitnessValue for $t {
                fn compare(&self, other: &Self) -> Ordering {
                    self.cmp(other)
                }

                fn to_f64(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

integer_fitness!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! float_fitness {
    ($($t:ty),*) => {
        $(
            impl FitnessValue for $t {
                fn compare(&self, other: &Self) -> Ordering {
                    self.total_cmp(other)
                }

                fn to_f64(&self) -> f64 {
                    *self as f64
                }

                fn validate(&self) -> Result<()> {
                    if self.is_finite() {
                        Ok(())
                    } else {
                        Err(GeneticError::FitnessCalculation(format!(
                            "fitness must be finite, got {}",
                            self
                        )))
                    }
                }
            }
        )*
    };
}

float_fitness!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_ordering() {
        assert_eq!(10_u32.compare(&10), Ordering::Equal);
        assert_eq!((-4_i32).compare(&2), Ordering::Less);
        assert_eq!(7_usize.to_f64(), 7.0);
        assert!(i64::MIN.validate().is_ok());
    }

    #[test]
    fn test_float_ordering_is_total() {
        assert_eq!(1.0_f64.compare(&2.0), Ordering::Less);
        assert_eq!((-0.0_f64).compare(&0.0), Ordering::Less);
        assert_eq!(0.5_f32.compare(&0.5), Ordering::Equal);
    }

    #[test]
    fn test_float_validation() {
        assert!(1.0_f64.validate().is_ok());
        assert!(f64::INFINITY.validate().is_err());
        assert!(f32::NAN.validate().is_err());
        assert!(matches!(
            f64::NAN.validate(),
            Err(GeneticError::FitnessCalculation(_))
        ));
    }
}
