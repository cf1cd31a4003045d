//! Wire codec for the exchange: request serialization and streaming
//! response decoding.
//!
//! Both halves implement the `tokio_util` codec traits so the connection
//! layer can drive them through `FramedWrite`/`FramedRead`:
//!
//! - [`RequestEncoder`]: one-shot serializer for the outgoing request
//! - [`ResponseDecoder`]: three-stage state machine (status line → header
//!   block → body) producing [`crate::protocol::ResponsePart`] items
//!
//! The decoder owns the parse position implicitly: consumed bytes are split
//! off the framing buffer at each stage boundary, so the cursor state is
//! exactly the enum stage plus whatever remains buffered.

mod request_encoder;
mod response_decoder;

pub use request_encoder::RequestEncoder;
pub use response_decoder::ResponseDecoder;
