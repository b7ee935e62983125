//! Core logic of the playground: the chat session, its transcript, image
//! encoding and model selection.
//!
//! Nothing in here renders anything. A shell drives a [`ChatSession`],
//! prints what it returns and decides how to show failures.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

pub mod image_codec;
mod model_client;
pub mod models;
mod session;
pub mod transcript;

pub use image_codec::{
    ImageError, decode_image, encode_image, encode_image_bytes,
};
pub use session::{ChatSession, ChatSessionBuilder};
pub use transcript::Transcript;
