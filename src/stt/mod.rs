//! Speech-to-text transport
//!
//! The relay never decodes or transcribes audio itself; it forwards frames to
//! an STT engine and consumes the transcript stream the engine publishes.
//! The transport is abstracted behind [`SttBackend`] so the relay runs
//! against NATS in production and an in-process backend in tests and local
//! development.

mod backend;
mod memory;
mod messages;
mod nats;

pub use backend::{SttBackend, SttBackendFactory, SttSource};
pub use memory::MemoryStt;
pub use messages::{AudioFrameMessage, TranscriptMessage};
pub use nats::NatsStt;
