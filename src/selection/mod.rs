//! # Selection
//!
//! Selectors decide which members of the population reproduce ([`Selector::parents`])
//! and which are carried over unchanged ([`Selector::survivors`]). They read the
//! population through the [`Context`](crate::breeding::Context) and return clones,
//! so the population itself is never modified by selection.

pub mod elitist;
pub mod selector;
pub mod tournament;

pub use elitist::ElitistSelector;
pub use selector::{best_among_random, Selector};
pub use tournament::TournamentSelector;
