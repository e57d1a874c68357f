//! # testbed-core
//!
//! Core library for testbed-sync, the tool that keeps the testbed forks
//! in step with their upstreams and points their CI at a Cython snapshot.
//!
//! # Modules
//!
//! - [`config`] - Run configuration (organization, exclusions, CI config paths)
//! - [`rewrite`] - Snapshot pointer validation and substitution
//! - [`report`] - Error accumulation for the end-of-run summary

pub mod config;
pub mod error;
pub mod report;
pub mod rewrite;

pub use config::Config;
pub use error::{Error, Result};
pub use report::ErrorLog;
pub use rewrite::{CiConfigRewriter, MarkerCheck};
