//! A terminal playground for models served by a local Ollama server.
//!
//! The crate includes a CLI tool for chatting, asking questions about an
//! image and managing models. It can also be used as a library to drive
//! the same sessions from your own host apps.

#![deny(missing_docs)]

mod session;

pub use session::{Session, SessionBuilder};

/// Re-exports of [`little_ollama_core`] crate.
pub mod core {
    pub use little_ollama_core::*;
}

/// Re-exports of [`little_ollama_client`] crate.
pub mod client {
    pub use little_ollama_client::*;
}
