//! # Bastion Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Scripted random sources for exact engine tests
//! - Fixture builders for common economy states
//! - Determinism test harness
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod rng;
pub mod strategies;

/// Re-export proptest for convenience.
pub use proptest;
