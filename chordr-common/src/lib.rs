//! Shared types for the Chordr analysis backend
//!
//! Provides the common error type, the event bus used for job lifecycle
//! notifications, and configuration resolution shared by Chordr services.

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
