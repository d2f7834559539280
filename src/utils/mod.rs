//! Shared utilities.
//!
//! - [`errors`]: application error type and HTTP mapping
//! - [`jwt`]: token creation and verification

pub mod errors;
pub mod jwt;
