//! Utilities Module
//!
//! Hashing and encoding primitives, structured logging and configuration.

pub mod config;
pub mod crypto;
pub mod logging;

pub use crypto::*;
