use bytes::Bytes;
use http::{StatusCode, Version};

use crate::protocol::ExchangeError;

/// Parsed first line of an HTTP response.
///
/// Only the version and the numeric code survive parsing; the reason phrase
/// carries no protocol meaning and is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLine {
    version: Version,
    status: StatusCode,
}

impl StatusLine {
    pub fn new(version: Version, status: StatusCode) -> Self {
        Self { version, status }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

/// One step of the decoded response stream.
///
/// The decoder emits these strictly in order: `Status`, then `Headers`, then
/// zero or more `Chunk`s, then `Eof` once the peer closes the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    /// The parsed status line
    Status(StatusLine),
    /// The raw header block, verbatim and undecoded, without the blank line
    Headers(String),
    /// A slice of body bytes
    Chunk(Bytes),
    /// End of stream while reading the body; terminates the exchange
    Eof,
}

impl ResponsePart {
    #[inline]
    pub fn is_status(&self) -> bool {
        matches!(self, ResponsePart::Status(_))
    }

    #[inline]
    pub fn is_headers(&self) -> bool {
        matches!(self, ResponsePart::Headers(_))
    }

    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, ResponsePart::Chunk(_))
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, ResponsePart::Eof)
    }

    /// Consumes the part and returns the body bytes if this is a `Chunk`
    pub fn into_chunk(self) -> Option<Bytes> {
        match self {
            ResponsePart::Chunk(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Final outcome of an exchange, produced exactly once.
///
/// An empty `error_text` signals success. On failure the text fields carry
/// whatever the failure policy allows, which for every current error kind is
/// nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeResult {
    error_text: String,
    headers_text: String,
    body_text: String,
}

impl ExchangeResult {
    pub fn success(headers_text: String, body_text: String) -> Self {
        Self { error_text: String::new(), headers_text, body_text }
    }

    pub fn failure(error: &ExchangeError) -> Self {
        Self { error_text: error.error_text().to_string(), headers_text: String::new(), body_text: String::new() }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.error_text.is_empty()
    }

    pub fn error_text(&self) -> &str {
        &self.error_text
    }

    pub fn headers_text(&self) -> &str {
        &self.headers_text
    }

    pub fn body_text(&self) -> &str {
        &self.body_text
    }

    /// Decomposes into the `(error, headers, body)` callback triple.
    pub fn into_parts(self) -> (String, String, String) {
        (self.error_text, self.headers_text, self.body_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ParseError;

    #[test]
    fn success_has_empty_error_text() {
        let result = ExchangeResult::success("Server: test\r\n".to_string(), "body".to_string());
        assert!(result.is_success());
        assert_eq!(result.error_text(), "");
        assert_eq!(result.headers_text(), "Server: test\r\n");
        assert_eq!(result.body_text(), "body");
    }

    #[test]
    fn failure_discards_partial_text() {
        let error = ExchangeError::from(ParseError::malformed_status_line("bad token"));
        let result = ExchangeResult::failure(&error);
        assert!(!result.is_success());

        let (error_text, headers_text, body_text) = result.into_parts();
        assert_eq!(error_text, "MalformedStatusLine");
        assert_eq!(headers_text, "");
        assert_eq!(body_text, "");
    }
}
