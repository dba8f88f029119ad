//! `pin-archiver` - A Discord bot that archives pinned messages to Cloudflare D1
//!
//! Users pin a message through the `pin` context-menu command; the bot stores
//! the message's metadata as a row in a D1 database (reached only through the
//! Cloudflare HTTP API) and mirrors it into a log channel. The database and its
//! table are provisioned idempotently at startup.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    unsafe_code,
    unreachable_code,
    unreachable_patterns,
    unused_must_use,
    rustdoc::broken_intra_doc_links,
)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::dbg_macro,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unwrap_used,
    rust_2018_idioms,
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::result_large_err,
)]

// Note: `missing_docs` is set to `warn` instead of `deny` because macro-generated
// code (e.g., `poise::command`) doesn't include docs.

/// Discord bot interface - the `pin` command and framework setup
pub mod bot;
/// Cloudflare API client and shared request/response types
pub mod cloudflare;
/// Configuration loading from the environment and `config.toml`
pub mod config;
/// Core logic - provisioning, statement execution and pin handling
pub mod core;
/// sea-orm entity definitions for the remote tables
pub mod entities;
/// Unified error types and result handling
pub mod errors;

pub use errors::{Error, Result};

#[cfg(test)]
pub mod test_utils;
