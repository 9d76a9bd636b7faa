//! # runq-core
//!
//! Core types for the priority run queue.
//!
//! This crate is platform-agnostic and holds no queue state of its own.
//! The run queue itself lives in the `runq` crate.
//!
//! ## Modules
//!
//! - `id` - Runnable entity handle
//! - `geometry` - Priority to queue index mapping, status word layout
//! - `bitmap` - Queue occupancy bitmap with word-granular scanning
//! - `rng` - Xorshift generator for fuzzed selection
//! - `error` - Error types
//! - `kprint` - Kernel-style leveled logging macros
//! - `env` - Environment variable utilities

pub mod id;
pub mod geometry;
pub mod bitmap;
pub mod rng;
pub mod error;
pub mod kprint;
pub mod env;

// Re-exports for convenience
pub use id::EntityId;
pub use geometry::{StatusWord, BITS_PER_WORD, MAX_PRIO, NUM_QUEUES, PRIORITIES_PER_QUEUE};
pub use bitmap::StatusBitmap;
pub use rng::FuzzRng;
pub use error::{RunqError, RunqResult};
pub use env::{env_get, env_get_bool, env_get_opt};
