//! Service layer for business logic with dependency injection.
//!
//! This module contains services that encapsulate business logic and accept
//! trait-based dependencies, enabling testing with mock implementations.

pub mod ci_config;
pub mod driver;
pub mod upstream;

#[cfg(test)]
pub mod test_mocks;

pub use ci_config::{ConfigOutcome, ConfigReport};
pub use driver::{DriverService, RepoReport, RepoResult, RunOptions};
pub use upstream::SyncOutcome;
