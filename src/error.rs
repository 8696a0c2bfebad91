//! # Error Types
//!
//! Every fallible operation of the engine reports a [`GeneticError`]. The variants
//! follow the failure families an evolutionary run can hit: invalid configuration,
//! lifecycle misuse, positional access out of range, gene values outside their
//! bounds, attempts to modify individuals that were already evaluated, and fitness
//! functions that produce unusable numbers.
//!
//! ## Examples
//!
//! Propagating errors with `?`:
//!
//! ```rust
//! use populus::breeding::Probability;
//! use populus::error::Result;
//!
//! fn crossover_rate() -> Result<Probability> {
//!     let rate = Probability::new(0.9)?;
//!     Ok(rate)
//! }
//!
//! assert!(crossover_rate().is_ok());
//! assert!(Probability::new(1.5).is_err());
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use populus::error::{GeneticError, OptionExt};
//!
//! fn find_best_candidate(candidates: &[i32]) -> populus::error::Result<i32> {
//!     candidates.iter().max().cloned().ok_or_else_genetic(||
//!         GeneticError::EmptyPopulation
//!     )
//! }
//!
//! assert!(find_best_candidate(&[]).is_err());
//! ```

use thiserror::Error;

/// Represents errors that can occur while configuring or running an evolutionary algorithm.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneticError {
    /// An operator, option or bound was configured with an invalid value.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An operation was attempted in a state that does not allow it.
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Positional access past the end of a population or gene sequence.
    #[error("Index {index} is out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A gene value was written outside of the gene's declared bounds.
    #[error("Bounds error: value is outside of the gene bounds - {0}")]
    OutOfBounds(String),

    /// The genes of an evaluated individual are frozen.
    #[error("Individual {0} has already been evaluated and can no longer be modified")]
    ImmutableIndividual(u64),

    /// Error that occurs when an empty population is encountered.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// Parents could not be recombined.
    #[error("Recombination error: {0}")]
    Recombination(String),

    /// Error that occurs when a fitness calculation fails.
    #[error("Fitness calculation error: {0}")]
    FitnessCalculation(String),
}

/// A specialized Result type for evolutionary operations.
///
/// ## Examples
///
/// ```rust
/// use populus::error::{GeneticError, Result};
///
/// fn may_fail() -> Result<i32> {
///     Ok(42)
/// }
/// ```
pub type Result<T> = std::result::Result<T, GeneticError>;

/// Extension trait for Option to convert to Result with a custom error.
///
/// ## Examples
///
/// ```rust
/// use populus::error::{GeneticError, OptionExt};
///
/// let value: Option<i32> = None;
/// let result = value.ok_or_else_genetic(|| GeneticError::EmptyPopulation);
/// assert_eq!(result, Err(GeneticError::EmptyPopulation));
/// ```
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T>` with the error produced by `f`.
    fn ok_or_else_genetic<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_genetic<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError,
    {
        self.ok_or_else(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = GeneticError::IndexOutOfBounds { index: 7, len: 3 };
        assert_eq!(error.to_string(), "Index 7 is out of bounds for length 3");

        let error = GeneticError::ImmutableIndividual(12);
        assert!(error.to_string().contains("12"));

        let error = GeneticError::Configuration("bad rate".to_string());
        assert_eq!(error.to_string(), "Configuration error: bad rate");
    }

    #[test]
    fn test_option_ext() {
        let some: Option<u8> = Some(3);
        assert_eq!(some.ok_or_else_genetic(|| GeneticError::EmptyPopulation), Ok(3));

        let none: Option<u8> = None;
        assert_eq!(
            none.ok_or_else_genetic(|| GeneticError::EmptyPopulation),
            Err(GeneticError::EmptyPopulation)
        );
    }
}
