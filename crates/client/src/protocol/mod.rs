//! Core protocol types for a single request/response exchange.
//!
//! This module defines the data that flows through an exchange and the error
//! taxonomy that terminates one:
//!
//! - **Inputs** ([`request`]): [`ExchangeRequest`] and its builder, carrying
//!   host, path, method, content, deadline and keep-alive selection.
//! - **Decoded stream** ([`response`]): [`ResponsePart`] items produced by
//!   the response decoder ([`StatusLine`], raw header block, body chunks,
//!   end-of-stream), plus the final [`ExchangeResult`] triple.
//! - **Errors** ([`error`]): [`ExchangeError`] at the exchange boundary with
//!   [`ParseError`]/[`SendError`] nested underneath, mirroring the
//!   read/write split of the codec layer.
//!
//! The result callback never sees the structured errors; it receives the
//! fixed `error_text` token of whichever failure terminated the exchange.

mod error;
mod request;
mod response;

pub use error::{ExchangeError, ParseError, SendError};
pub use request::{BuildError, ExchangeRequest, ExchangeRequestBuilder};
pub use response::{ExchangeResult, ResponsePart, StatusLine};
