//! Infrastructure layer for the strata CLI.
//!
//! Contains the filesystem-facing pieces the commands rely on: configuration
//! discovery and loading, SHA-256 file hashing, and the local journal folder
//! adapter (format, inspect, backup, verify).

pub mod config;
pub mod hash;
pub mod journal;
