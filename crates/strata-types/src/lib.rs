//! Shared domain types for the strata administration CLI.
//!
//! This crate contains the vocabulary shared by the dispatch core, the
//! infrastructure adapters and the binary: flag schemas, parsed arguments,
//! command outcomes, exit codes, configuration, and the error taxonomy.
//!
//! Zero I/O -- only serde, semver, uuid, chrono, thiserror.

pub mod command;
pub mod config;
pub mod error;
pub mod exit;
pub mod journal;
