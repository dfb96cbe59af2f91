//! Infrastructure layer - external integrations and utilities.
//!
//! - Error types
//! - Remote store connection settings from the environment
//! - Platform dark-mode detection
//! - Listener registry used by the stores

pub mod config;
pub mod error;
pub mod observable;
pub mod platform;
