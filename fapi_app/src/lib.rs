//! # fapi_app
//!
//! Shared utilities for applications built on the futures client

pub mod cli;
pub mod config_loader;
pub mod reporting;
pub mod shutdown_handler;
pub mod tracing_setup;
