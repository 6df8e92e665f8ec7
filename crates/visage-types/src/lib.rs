//! # visage-types
//!
//! Shared types and configuration for the Visage face-similarity search
//! engine.
//!
//! ## Features
//! - Typed, immutable `Settings` with layered loading
//! - Distance metric and storage layout enums shared across crates
//! - Eager validation: a bad configuration fails at startup, not mid-query

pub mod config;
pub mod error;

pub use config::{DistanceMetric, Settings, StorageLayout};
pub use error::ConfigError;
