//! Streaming decoder for the HTTP response.
//!
//! The decoder is a three-stage state machine over the growing read buffer,
//! with no backward transitions:
//!
//! 1. **Status**: scan for the first CRLF and parse
//!    `HTTP/<version> <code> [reason]`. Anything else terminates the
//!    exchange as a malformed status line.
//! 2. **Headers**: accumulate until the blank line that ends the header
//!    block. Everything before the blank line is retained verbatim; header
//!    fields are deliberately not decoded.
//! 3. **Body**: drain buffered bytes as chunks until the peer closes the
//!    connection. End-of-stream here is the successful termination of the
//!    exchange; a `Content-Length` header, if present, does not bound the
//!    read. That limitation is inherited behavior, kept observable rather
//!    than silently corrected.
//!
//! End-of-stream while still in the status or header stage is a
//! connection-reset failure.

use bytes::{Buf, BytesMut};
use http::{StatusCode, Version};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, ResponsePart, StatusLine};

/// Decoder for HTTP responses implementing the [`Decoder`] trait.
///
/// Emits [`ResponsePart`] items strictly in protocol order. The current
/// stage is held in the decoder itself, so one instance serves exactly one
/// response and is discarded with its connection.
#[derive(Debug)]
pub struct ResponseDecoder {
    state: DecodeState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    Status,
    Headers,
    Body,
    Done,
}

impl ResponseDecoder {
    pub fn new() -> Self {
        Default::default()
    }

    fn decode_status(&mut self, src: &mut BytesMut) -> Result<Option<ResponsePart>, ParseError> {
        let Some(line_end) = find_crlf(src) else {
            return Ok(None);
        };

        let line = src.split_to(line_end + 2);
        let status_line = parse_status_line(&line[..line_end])?;
        trace!(code = status_line.status().as_u16(), "parsed status line");

        self.state = DecodeState::Headers;
        Ok(Some(ResponsePart::Status(status_line)))
    }

    fn decode_headers(&mut self, src: &mut BytesMut) -> Option<ResponsePart> {
        // a blank line directly after the status line is a valid, empty block
        let text = if src.len() >= 2 && &src[..2] == b"\r\n" {
            src.advance(2);
            String::new()
        } else {
            let blank = find_blank_line(src)?;
            // keep everything through the final header line's CRLF, then
            // drop the blank line itself
            let block = src.split_to(blank + 2);
            src.advance(2);
            String::from_utf8_lossy(&block).into_owned()
        };

        trace!(bytes = text.len(), "located end of header block");
        self.state = DecodeState::Body;
        Some(ResponsePart::Headers(text))
    }

    fn decode_body(&mut self, src: &mut BytesMut) -> Option<ResponsePart> {
        if src.is_empty() {
            return None;
        }
        let chunk = src.split_to(src.len()).freeze();
        Some(ResponsePart::Chunk(chunk))
    }
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self { state: DecodeState::Status }
    }
}

impl Decoder for ResponseDecoder {
    type Item = ResponsePart;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.state {
            DecodeState::Status => self.decode_status(src),
            DecodeState::Headers => Ok(self.decode_headers(src)),
            DecodeState::Body => Ok(self.decode_body(src)),
            DecodeState::Done => Ok(None),
        }
    }

    /// Called by the framing layer once the peer has closed the connection.
    ///
    /// In the body stage this is the natural end of the response; earlier
    /// stages treat it as the peer resetting mid-response.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(part) = self.decode(src)? {
            return Ok(Some(part));
        }

        match self.state {
            DecodeState::Status => Err(ParseError::unexpected_eof("status line")),
            DecodeState::Headers => Err(ParseError::unexpected_eof("header block")),
            DecodeState::Body => {
                self.state = DecodeState::Done;
                Ok(Some(ResponsePart::Eof))
            }
            DecodeState::Done => Ok(None),
        }
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|window| window == b"\r\n")
}

fn find_blank_line(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|window| window == b"\r\n\r\n")
}

fn parse_status_line(line: &[u8]) -> Result<StatusLine, ParseError> {
    let line = std::str::from_utf8(line).map_err(|_| ParseError::malformed_status_line("not valid utf-8"))?;
    let mut tokens = line.splitn(3, ' ');

    let version = match tokens.next() {
        Some("HTTP/1.0") => Version::HTTP_10,
        Some("HTTP/1.1") => Version::HTTP_11,
        other => return Err(ParseError::malformed_status_line(format!("unsupported version token {other:?}"))),
    };

    let code = tokens.next().ok_or_else(|| ParseError::malformed_status_line("missing status code"))?;
    ensure!(
        code.len() == 3 && code.bytes().all(|b| b.is_ascii_digit()),
        ParseError::malformed_status_line(format!("status code {code:?} is not numeric"))
    );

    // the guard above keeps this within StatusCode's accepted range
    let status = StatusCode::from_u16(code.parse::<u16>().unwrap())
        .map_err(|_| ParseError::malformed_status_line(format!("status code {code:?} out of range")))?;

    // the remaining token is the reason phrase, which carries no meaning here
    Ok(StatusLine::new(version, status))
}
