use std::io;
use std::time::Duration;
use thiserror::Error;

/// Terminal failure of an exchange.
///
/// Every variant maps onto exactly one of the fixed error texts reported
/// through the result callback (see [`ExchangeError::error_text`]). The
/// structured sources exist for logging only; they never cross the callback
/// boundary.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("name resolution failed: {source}")]
    Resolve {
        #[source]
        source: io::Error,
    },

    #[error("no endpoint reachable after {attempts} attempt(s)")]
    Connect { attempts: usize, source: Option<io::Error> },

    #[error("request write failed: {source}")]
    Write {
        #[from]
        source: SendError,
    },

    #[error("response read failed: {source}")]
    Read {
        #[from]
        source: ParseError,
    },

    #[error("deadline of {after:?} elapsed before completion")]
    Timeout { after: Duration },
}

impl ExchangeError {
    pub fn resolve(e: io::Error) -> Self {
        Self::Resolve { source: e }
    }

    pub fn connect(attempts: usize, source: Option<io::Error>) -> Self {
        Self::Connect { attempts, source }
    }

    pub fn timeout(after: Duration) -> Self {
        Self::Timeout { after }
    }

    /// The fixed token delivered as `error_text` through the callback.
    pub fn error_text(&self) -> &'static str {
        match self {
            Self::Resolve { .. } => "ResolveFailed",
            Self::Connect { .. } => "ConnectFailed",
            Self::Write { .. } => "WriteFailed",
            Self::Read { source } => source.error_text(),
            Self::Timeout { .. } => "Timeout",
        }
    }
}

/// Errors raised while decoding the response stream.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed status line: {reason}")]
    MalformedStatusLine { reason: String },

    #[error("peer closed the connection mid {stage}")]
    UnexpectedEof { stage: &'static str },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed_status_line<S: ToString>(reason: S) -> Self {
        Self::MalformedStatusLine { reason: reason.to_string() }
    }

    pub fn unexpected_eof(stage: &'static str) -> Self {
        Self::UnexpectedEof { stage }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    pub fn error_text(&self) -> &'static str {
        match self {
            Self::MalformedStatusLine { .. } => "MalformedStatusLine",
            Self::UnexpectedEof { .. } | Self::Io { .. } => "ConnectionReset",
        }
    }
}

/// Errors raised while encoding or writing the request.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
