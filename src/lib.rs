// ABOUTME: Library root for n8n-deploy - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod compose;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod manifest;
pub mod output;
pub mod remote;
pub mod shell;
pub mod ssh;
pub mod types;
