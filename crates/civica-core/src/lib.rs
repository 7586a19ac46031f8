//! civica-core library.
//!
//! Issue lifecycle, assignment tracking, and dashboard synchronization for
//! the `civ` CLI. Storage, clock, and remote-store access are injected
//! behind traits so every store runs against an in-memory fake in tests.
//!
//! # Conventions
//!
//! - **Errors**: domain failures use [`Error`]; top-level wiring uses
//!   `anyhow::Result`.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `error!`, `debug!`).

pub mod clock;
pub mod config;
pub mod engine;
pub mod enrich;
pub mod error;
pub mod ledger;
pub mod model;
pub mod remote;
pub mod session;
pub mod storage;
pub mod sync;
pub mod tracking;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{Error, Result};
