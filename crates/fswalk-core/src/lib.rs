//! Core types and traits for fswalk.
//!
//! This crate provides the portable data model shared by the native
//! enumeration backends and the caching layer: file metadata records,
//! attribute sets, enumeration options and error types.

mod config;
mod error;
mod metadata;
mod stats;

pub use config::{DepthMode, EnumerationOptions, EnumerationOptionsBuilder};
pub use error::WalkError;
pub use metadata::{FileAttributes, FileMetadata, Timestamps};
pub use stats::WalkStats;
