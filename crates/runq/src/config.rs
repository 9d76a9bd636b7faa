//! Run queue configuration
//!
//! Geometry (highest priority, priorities per queue) is fixed at compile
//! time through the `RunQueue` const parameters. What remains here is
//! sized or tuned per instance.
//!
//! # Environment Variables
//!
//! - `RUNQ_MAX_ENTITIES` - entity handle capacity
//! - `RUNQ_FUZZ` - default window for fuzzed selection
//! - `RUNQ_SEED` - fuzz generator seed
//! - `RUNQ_STRICT` - panic on contract violations in release builds too

use runq_core::env::{env_get, env_get_bool};
use runq_core::rng::DEFAULT_SEED;

/// Default entity handle capacity
pub const DEFAULT_MAX_ENTITIES: usize = 65536;

/// Configuration for a run queue instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunqConfig {
    /// Number of entity handles the linkage arena covers
    pub max_entities: usize,

    /// Default fuzz window (0 or 1 = strict priority order)
    pub fuzz: usize,

    /// Seed for the fuzz generator
    pub seed: u64,

    /// Panic on contract violations even without debug assertions
    pub strict: bool,
}

impl Default for RunqConfig {
    fn default() -> Self {
        Self {
            max_entities: DEFAULT_MAX_ENTITIES,
            fuzz: 0,
            seed: DEFAULT_SEED,
            strict: false,
        }
    }
}

impl RunqConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by any `RUNQ_*` variables that are set
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            max_entities: env_get("RUNQ_MAX_ENTITIES", d.max_entities),
            fuzz: env_get("RUNQ_FUZZ", d.fuzz),
            seed: env_get("RUNQ_SEED", d.seed),
            strict: env_get_bool("RUNQ_STRICT", d.strict),
        }
    }

    /// Set entity handle capacity
    pub fn max_entities(mut self, n: usize) -> Self {
        self.max_entities = n;
        self
    }

    /// Set default fuzz window
    pub fn fuzz(mut self, fuzz: usize) -> Self {
        self.fuzz = fuzz;
        self
    }

    /// Set fuzz generator seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Escalate contract violations to panics
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = RunqConfig::new().max_entities(128).fuzz(4).seed(99).strict(true);
        assert_eq!(config.max_entities, 128);
        assert_eq!(config.fuzz, 4);
        assert_eq!(config.seed, 99);
        assert!(config.strict);
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("RUNQ_MAX_ENTITIES", "1024");
        std::env::set_var("RUNQ_FUZZ", "3");
        std::env::set_var("RUNQ_SEED", "not-a-number");
        let config = RunqConfig::from_env();
        std::env::remove_var("RUNQ_MAX_ENTITIES");
        std::env::remove_var("RUNQ_FUZZ");
        std::env::remove_var("RUNQ_SEED");

        assert_eq!(config.max_entities, 1024);
        assert_eq!(config.fuzz, 3);
        assert_eq!(config.seed, DEFAULT_SEED);
        assert!(!config.strict);
    }
}
