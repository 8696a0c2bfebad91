//! # Representations
//!
//! Concrete gene kinds with their generators and representation-specific
//! operators. Representation-independent crossovers live in
//! [`crate::breeding::crossover`].

pub mod binary;
pub mod integer;
pub mod permutation;
pub mod real;

pub use binary::{BinaryGene, BinaryGenerator, BitFlipMutator};
pub use integer::{IntegerGene, IntegerGenerator, RandomResetMutator};
pub use permutation::{PartiallyMappedCrossover, PermutationGene, PermutationGenerator, SwapMutator};
pub use real::{ArithmeticCrossover, RealGene, RealGenerator, UniformMutator};
