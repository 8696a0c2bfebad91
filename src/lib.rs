//! Population-based metaheuristics: genetic algorithms, differential evolution
//! and permutation search over owned, typed genes.

pub mod breeding;
pub mod caching;
pub mod differential;
pub mod environment;
pub mod error;
pub mod evolution;
pub mod fitness;
pub mod gene;
pub mod individual;
pub mod population;
pub mod representation;
pub mod rng;
pub mod selection;

// Re-export commonly used types for convenience
pub use error::{GeneticError, OptionExt, Result};
