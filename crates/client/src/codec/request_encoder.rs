//! Serializer for the outgoing request.
//!
//! The whole request is assembled into the write buffer in one pass: request
//! line, `Host`, `Content-Length` (only when a body is present), the
//! `Connection` header reflecting the keep-alive selection, the blank line
//! and the raw content bytes. The framing layer continues partial writes
//! until the buffer is drained or the socket errors.
//!
//! Requests are written as `HTTP/1.0`: the response side reads the body to
//! end-of-stream, and advertising a later protocol version would invite
//! chunked replies this client does not decode.

use crate::protocol::{ExchangeRequest, SendError};

use bytes::{BufMut, BytesMut};

use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;

/// Initial buffer size reserved for the request head
const INIT_REQUEST_SIZE: usize = 1024;

/// Encoder for [`ExchangeRequest`] implementing the [`Encoder`] trait.
#[derive(Debug)]
pub struct RequestEncoder;

impl Encoder<&ExchangeRequest> for RequestEncoder {
    type Error = SendError;

    fn encode(&mut self, request: &ExchangeRequest, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_REQUEST_SIZE + request.content().len());

        write!(FastWrite(dst), "{} {} HTTP/1.0\r\n", request.method(), request.path())?;
        write!(FastWrite(dst), "Host: {}\r\n", request.host())?;
        if !request.content().is_empty() {
            write!(FastWrite(dst), "Content-Length: {}\r\n", request.content().len())?;
        }
        let connection = if request.keep_alive() { "keep-alive" } else { "close" };
        write!(FastWrite(dst), "Connection: {connection}\r\n\r\n")?;

        dst.put_slice(request.content().as_bytes());
        Ok(())
    }
}

/// Fast writer implementation for writing to BytesMut.
///
/// Avoids the io::Write bounds checking on a buffer whose capacity was
/// already reserved above.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
