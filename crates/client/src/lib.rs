//! An asynchronous micro HTTP client implementation
//!
//! This crate performs a single HTTP request/response exchange over its own
//! TCP connection: resolve the host, connect, write the request, read and
//! parse the status line, the header block and the body, then deliver the
//! complete result (or an error) through a callback, exactly once,
//! regardless of which stage failed. The whole sequence races one
//! cancellable deadline.
//!
//! # Features
//!
//! - Asynchronous I/O using tokio; no stage blocks the thread
//! - Streaming response decoding through a staged state machine
//! - A single deadline covering the entire exchange
//! - Exactly-once result delivery through a by-value callback
//! - Concurrent exchanges with fully independent connections
//!
//! # Example
//!
//! ```no_run
//! use micro_client::connection::HttpExchange;
//! use micro_client::handler::make_callback;
//! use micro_client::protocol::ExchangeRequest;
//! use tracing::{info, Level};
//! use tracing_subscriber::FmtSubscriber;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Initialize logging
//!     let subscriber = FmtSubscriber::builder()
//!         .with_max_level(Level::INFO)
//!         .finish();
//!     tracing::subscriber::set_global_default(subscriber)
//!         .expect("setting default subscriber failed");
//!
//!     let request = ExchangeRequest::builder()
//!         .host("example.com")
//!         .path("/index.html")
//!         .method("GET")
//!         .timeout_secs(10)
//!         .build()
//!         .expect("invalid request");
//!
//!     let exchange = HttpExchange::new(tokio::runtime::Handle::current(), request);
//!     let join = exchange.spawn(make_callback(|result| {
//!         if result.is_success() {
//!             info!(headers = result.headers_text(), "exchange finished");
//!             println!("{}", result.body_text());
//!         } else {
//!             info!(error = result.error_text(), "exchange failed");
//!         }
//!     }));
//!
//!     join.await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`connection`]: The exchange driver owning socket, buffers and deadline
//! - [`protocol`]: Exchange inputs, decoded response parts, result and
//!   error types
//! - [`codec`]: Request serialization and streaming response decoding
//! - [`handler`]: The result callback seam toward an embedding host
//!
//! # Error Handling
//!
//! Failures terminate the exchange; there is no retry anywhere. The
//! callback receives a fixed error token (`ResolveFailed`, `ConnectFailed`,
//! `WriteFailed`, `MalformedStatusLine`, `ConnectionReset`, `Timeout`) as
//! `error_text`; an empty token signals success. Structured errors with
//! source chains ([`protocol::ExchangeError`]) stay on the logging side of
//! that boundary.
//!
//! # Limitations
//!
//! - Requests are written as HTTP/1.0; chunked transfer decoding is not
//!   implemented
//! - The body is read to end-of-stream; a `Content-Length` response header
//!   does not bound the read
//! - No TLS; `usessl`, explicit `port` and extra request headers are
//!   accepted but not honored (see
//!   [`protocol::ExchangeRequest::unsupported_options`])
//! - Connections are never reused; keep-alive only selects the written
//!   `Connection` header value

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
