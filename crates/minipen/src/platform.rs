//! Platform adapters for the core ports.

pub mod cli;

#[cfg(feature = "browser")]
pub mod browser;
