//! Relay client
//!
//! Client-side view of the relay protocol for capture tools: an idempotent
//! socket connection, a single session slot, and a typed event stream
//! (chunk, completed, error) the embedding application consumes.
//!
//! The accumulated transcript is server-authoritative: this client only
//! mirrors what the relay sends, it never concatenates chunks itself, and
//! the transcribing flag flips only on server acknowledgment.

mod handle;
mod state;

pub use handle::{relay_endpoint, AudioChunkSink, RelayClient};
pub use state::{ClientState, RelayEvent};
