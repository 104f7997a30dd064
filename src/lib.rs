//! dashsync - Grafana dashboard reconciliation between SQLite and JSON
//!
//! This crate provides the core functionality for the `dashsync` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (dashboard rows, documents, tag sets)
//! - [`storage`] - SQLite database layer
//! - [`sync`] - JSON export/import, tag reconciliation and backups
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod sync;

pub use error::{Error, Result};
