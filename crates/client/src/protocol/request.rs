use std::time::Duration;

use http::Method;
use thiserror::Error;
use tracing::warn;

/// Inputs of a single exchange, immutable once built.
///
/// Values are assembled through [`ExchangeRequest::builder`]; validation
/// happens at [`ExchangeRequestBuilder::build`] so an embedding host gets a
/// typed error before any I/O is attempted.
#[derive(Debug, Clone)]
pub struct ExchangeRequest {
    host: String,
    path: String,
    method: Method,
    content: String,
    timeout: Duration,
    keep_alive: bool,
    unsupported: Vec<&'static str>,
}

impl ExchangeRequest {
    pub fn builder() -> ExchangeRequestBuilder {
        ExchangeRequestBuilder::new()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Host with a port suffix suitable for resolution.
    ///
    /// A port carried inside the host string is used verbatim; otherwise the
    /// default HTTP port is appended. An explicit `port()` builder option is
    /// not honored, see [`ExchangeRequest::unsupported_options`].
    pub fn authority(&self) -> String {
        if self.host.contains(':') { self.host.clone() } else { format!("{}:80", self.host) }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// Options that were accepted by the builder but have no effect.
    ///
    /// `port`, extra request `headers` and `usessl` are carried in the
    /// construction contract for forward compatibility only; a caller can
    /// inspect this list instead of discovering silently changed behavior.
    pub fn unsupported_options(&self) -> &[&'static str] {
        &self.unsupported
    }
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("host must be set")]
    MissingHost,

    #[error("invalid http method token: {token:?}")]
    InvalidMethod { token: String },
}

/// Builder for [`ExchangeRequest`].
#[derive(Debug)]
pub struct ExchangeRequestBuilder {
    host: Option<String>,
    path: String,
    method: String,
    content: String,
    timeout: Duration,
    keep_alive: bool,
    port: Option<u16>,
    headers: Vec<(String, String)>,
    use_ssl: bool,
}

impl ExchangeRequestBuilder {
    fn new() -> Self {
        Self {
            host: None,
            path: "/".to_string(),
            method: "GET".to_string(),
            content: String::new(),
            timeout: Duration::from_secs(30),
            keep_alive: false,
            port: None,
            headers: Vec::new(),
            use_ssl: false,
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn timeout_secs(mut self, seconds: u64) -> Self {
        self.timeout = Duration::from_secs(seconds);
        self
    }

    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Accepted for forward compatibility, not honored yet.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Accepted for forward compatibility, not honored yet.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Accepted for forward compatibility, not honored yet.
    pub fn use_ssl(mut self, use_ssl: bool) -> Self {
        self.use_ssl = use_ssl;
        self
    }

    pub fn build(self) -> Result<ExchangeRequest, BuildError> {
        let host = self.host.ok_or(BuildError::MissingHost)?;
        let method =
            Method::from_bytes(self.method.as_bytes()).map_err(|_| BuildError::InvalidMethod { token: self.method.clone() })?;

        let mut unsupported = Vec::new();
        if self.port.is_some() {
            unsupported.push("port");
        }
        if !self.headers.is_empty() {
            unsupported.push("headers");
        }
        if self.use_ssl {
            unsupported.push("usessl");
        }
        for option in &unsupported {
            warn!(option, "option accepted but not supported yet, ignoring");
        }

        Ok(ExchangeRequest {
            host,
            path: self.path,
            method,
            content: self.content,
            timeout: self.timeout,
            keep_alive: self.keep_alive,
            unsupported,
        })
    }
}
