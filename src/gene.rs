//! # Genes
//!
//! A gene is a single locus value. Genes are plain owned values: an individual owns
//! its `Vec<G>`, and copying a gene into another individual is a `clone`. Concrete
//! gene kinds live in [`crate::representation`].
//!
//! Bounded genes declare a half-open range `[lower, upper)`. Writing a value outside
//! it is rejected; [`Bounded::saturate`] is the explicit clamping operation used
//! where overflow is expected (differential perturbations).

use std::fmt::Debug;

use crate::error::Result;

/// A single locus value of a genome.
pub trait Gene: Clone + PartialEq + Debug + Send + Sync + 'static {
    /// Numeric reading of the gene, used by objectives and statistics.
    fn numeric(&self) -> f64;
}

/// A gene restricted to the half-open range `[lower, upper)`.
pub trait Bounded: Gene {
    type Value: Copy + PartialOrd + Debug;

    fn value(&self) -> Self::Value;

    /// Inclusive lower bound.
    fn lower(&self) -> Self::Value;

    /// Exclusive upper bound.
    fn upper(&self) -> Self::Value;

    /// Writes `value`, failing with `OutOfBounds` when it lies outside the range.
    fn set_value(&mut self, value: Self::Value) -> Result<()>;

    /// Sets the greatest representable value below `upper`.
    fn maximize(&mut self);

    /// Sets `lower`.
    fn minimize(&mut self);

    fn contains(&self, value: Self::Value) -> bool {
        value >= self.lower() && value < self.upper()
    }

    /// Writes `value`, replacing overflow with the nearest representable bound.
    ///
    /// Values that are neither in range nor comparable (NaN) are still rejected.
    fn saturate(&mut self, value: Self::Value) -> Result<()> {
        if value >= self.upper() {
            self.maximize();
            Ok(())
        } else if value < self.lower() {
            self.minimize();
            Ok(())
        } else {
            self.set_value(value)
        }
    }
}
