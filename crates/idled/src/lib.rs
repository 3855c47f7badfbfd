//! idled library - exposes modules for testing.

pub mod cli;
pub mod config;
pub mod error;
pub mod interfaces;
pub mod power;
pub mod sentinel;
pub mod session;
pub mod tcp_table;

pub use error::{Result, SentinelError};
