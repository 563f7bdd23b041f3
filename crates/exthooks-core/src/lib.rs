//! # exthooks-core
//!
//! Core crate for the ExtHooks harness. Contains the configuration schema,
//! the unified error system, and the shared result alias.
//!
//! This crate has **no** internal dependencies on other ExtHooks crates and
//! does not talk to a browser.

pub mod config;
pub mod error;
pub mod result;

pub use config::HarnessConfig;
pub use error::{AppError, ErrorKind};
pub use result::AppResult;
