//! Authentication and authorization extractors.

pub mod auth;
pub mod role;
