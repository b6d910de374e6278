//! # CLI Command Implementations
//!
//! Each subcommand of `cochange-replicate` lives in its own file with:
//! - an `Args` struct deriving `clap::Args` for its options;
//! - an `execute` function that calls into the `cochange_replicate` library.

pub mod completions;
pub mod plan;
pub mod run;
