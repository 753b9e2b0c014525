//! Common utilities shared across the application.

pub mod error;
pub mod logging;
