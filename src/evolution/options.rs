//! # EvolutionOptions
//!
//! Run-level settings of an [`Algorithm`](crate::evolution::Algorithm): the
//! iteration cap and how much per-generation progress is logged.
//!
//! ## Example
//!
//! ```rust
//! use populus::evolution::options::{EvolutionOptions, LogLevel};
//!
//! let options = EvolutionOptions::builder()
//!     .max_iterations(200)
//!     .log_level(LogLevel::Minimal)
//!     .build();
//! assert_eq!(options.max_iterations(), 200);
//!
//! // Unbounded, silent.
//! let defaults = EvolutionOptions::default();
//! assert_eq!(defaults.max_iterations(), u32::MAX);
//! ```
//!
//! ## `LogLevel`
//!
//! - `Verbose`: iteration, best and mean fitness, stagnation count per generation.
//! - `Minimal`: iteration number per generation.
//! - `None`: no per-generation events. Start and finish are still logged.

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Verbose,
    Minimal,
    #[default]
    None,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvolutionOptions {
    max_iterations: u32,
    log_level: LogLevel,
}

impl EvolutionOptions {
    pub fn new(max_iterations: u32, log_level: LogLevel) -> Self {
        Self {
            max_iterations,
            log_level,
        }
    }

    /// Generations to run at most. `u32::MAX` stands for "no cap".
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn set_max_iterations(&mut self, max_iterations: u32) {
        self.max_iterations = max_iterations;
    }

    pub fn set_log_level(&mut self, log_level: LogLevel) {
        self.log_level = log_level;
    }

    /// Returns a builder for creating an `EvolutionOptions` instance.
    pub fn builder() -> EvolutionOptionsBuilder {
        EvolutionOptionsBuilder::default()
    }
}

impl Default for EvolutionOptions {
    fn default() -> Self {
        Self {
            max_iterations: u32::MAX,
            log_level: LogLevel::None,
        }
    }
}

/// Builder for `EvolutionOptions`.
#[derive(Debug, Clone, Default)]
pub struct EvolutionOptionsBuilder {
    max_iterations: Option<u32>,
    log_level: Option<LogLevel>,
}

impl EvolutionOptionsBuilder {
    pub fn max_iterations(mut self, value: u32) -> Self {
        self.max_iterations = Some(value);
        self
    }

    pub fn log_level(mut self, value: LogLevel) -> Self {
        self.log_level = Some(value);
        self
    }

    pub fn build(self) -> EvolutionOptions {
        let defaults = EvolutionOptions::default();
        EvolutionOptions {
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
            log_level: self.log_level.unwrap_or(defaults.log_level),
        }
    }
}
