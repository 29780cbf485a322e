//! Command registry and dispatch engine for the strata CLI.
//!
//! Services group commands; the [`registry::Registry`] holds every service in
//! declaration order; the [`dispatch::Dispatcher`] resolves a command line
//! against it, runs exactly one command, and maps the outcome to an
//! [`ExitStatus`](strata_types::exit::ExitStatus).
//!
//! This crate knows nothing about concrete commands. It depends only on
//! `strata-types`, `clap` (flag parsing) and `tracing`.

pub mod command;
pub mod dispatch;
pub mod flags;
pub mod registry;
pub mod service;
pub mod usage;
