//! # Neon Bastion Development Tools
//!
//! Command-line tools for development:
//! - Catalog validation (hard errors plus balance-data lint warnings)
//! - Dumping the built-in catalog as RON

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod validate;
