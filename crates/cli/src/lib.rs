//! # fallprep CLI
//!
//! Command-line interface and batch orchestration.
//!
//! Provides:
//! - configuration loading, CLI overrides and validation
//! - per-file batch processing on a bounded worker pool
//! - the align / check-sync / census / window / validate / info commands

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod pipeline;
