//! Data model and contracts shared by the little-ollama crates.
//!
//! This crate describes what flows between the shell, the session logic
//! and a model server: messages, requests, response fragments and the
//! aggregated result of one response. It also defines the traits that a
//! model server backend must implement.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to. Wire formats of a
//! particular server live in the backend crate.

#![deny(missing_docs)]

mod directory;
mod error;
mod provider;
mod request;
mod response;

pub use directory::*;
pub use error::*;
pub use provider::*;
pub use request::*;
pub use response::*;
