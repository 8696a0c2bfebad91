//! # Differential evolution
//!
//! Operators for real-valued differential evolution. Mutation builds donor
//! vectors from scaled population differences; recombination mixes each donor
//! with a randomly chosen target and keeps the better of trial and target, so
//! the replacement step of DE happens inside the recombinator.

pub mod mutation;
pub mod recombination;

pub use mutation::{BaseVector, DifferentialMutator};
pub use recombination::{BinomialRecombinator, ExponentialRecombinator};
