// ABOUTME: SSH client module for the remote deployment host.
// ABOUTME: Key-file or agent authentication with known_hosts verification.

mod client;
mod error;

pub use client::{CommandOutput, Session, SessionConfig};
pub use error::{Error, Result};
