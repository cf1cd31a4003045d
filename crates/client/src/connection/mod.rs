//! Exchange driving and connection lifecycle.
//!
//! # Components
//!
//! - [`HttpExchange`]: owns one exchange end to end:
//!   - resolves the host and connects in candidate order
//!   - writes the serialized request
//!   - reads status line, header block and body through the streaming
//!     decoder
//!   - races every stage against the exchange deadline
//!   - tears the connection down and delivers the single result
//!
//! A connection is created per exchange and never reused; keep-alive only
//! selects the header value written, it does not keep this client's
//! connection open.

mod http_exchange;

pub use http_exchange::HttpExchange;
