//! Structured error type for proxycache.
//!
//! One variant per failure category from the request pipeline / cache engine /
//! acceptor, each carrying just enough context to render a [`crate::response`]
//! error body or a log line. Hand-written `Display`/`Error` impls, matching
//! the rest of this crate: no `thiserror`, since nothing else here pulls it in.

use std::fmt;
use std::io;

/// Errors surfaced by the proxy's request pipeline, cache engine, and acceptor.
#[derive(Debug)]
pub enum ProxyError {
    /// The request line did not match `METHOD SP URI SP HTTP/1.X CRLF`.
    MalformedRequest { cause: String },
    /// The request line parsed but named a method other than `GET`.
    UnsupportedMethod { method: String },
    /// The request URI was not a well-formed absolute-form `http://...` URI.
    MalformedUri { cause: String },
    /// The pass-through header block exceeded the configured line budget.
    HeaderOverflow,
    /// The assembled upstream request exceeded the configured line budget.
    UpstreamBuildOverflow,
    /// Could not establish a TCP connection to the origin host:port.
    OriginConnect { host: String, port: String, source: String },
    /// The connection to the origin was established but writing the request failed.
    OriginSend { source: String },
    /// Writing to the client failed partway through relaying the response.
    ClientWrite { source: String },
    /// Any other I/O failure (read errors, accept failures, etc.).
    Io { operation: String, source: String },
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::MalformedRequest { cause } => {
                write!(f, "malformed request: {}", cause)
            }
            ProxyError::UnsupportedMethod { method } => {
                write!(f, "unsupported method: {}", method)
            }
            ProxyError::MalformedUri { cause } => {
                write!(f, "malformed uri: {}", cause)
            }
            ProxyError::HeaderOverflow => write!(f, "request headers exceeded the line budget"),
            ProxyError::UpstreamBuildOverflow => {
                write!(f, "assembled upstream request exceeded the line budget")
            }
            ProxyError::OriginConnect { host, port, source } => {
                write!(f, "could not connect to origin {}:{}: {}", host, port, source)
            }
            ProxyError::OriginSend { source } => {
                write!(f, "failed sending request to origin: {}", source)
            }
            ProxyError::ClientWrite { source } => {
                write!(f, "failed writing to client: {}", source)
            }
            ProxyError::Io { operation, source } => {
                write!(f, "I/O error during {}: {}", operation, source)
            }
        }
    }
}

impl std::error::Error for ProxyError {}

impl From<io::Error> for ProxyError {
    fn from(err: io::Error) -> Self {
        ProxyError::Io {
            operation: "stream".to_string(),
            source: err.to_string(),
        }
    }
}

impl ProxyError {
    /// The status line's numeric code for [`crate::response::write_error`], or
    /// `None` for error kinds that never reach the client (disposed of
    /// silently instead).
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProxyError::MalformedRequest { .. }
            | ProxyError::MalformedUri { .. }
            | ProxyError::HeaderOverflow => Some(400),
            ProxyError::UnsupportedMethod { .. } => Some(501),
            ProxyError::UpstreamBuildOverflow => Some(500),
            ProxyError::OriginConnect { .. } | ProxyError::OriginSend { .. } => Some(503),
            ProxyError::ClientWrite { .. } | ProxyError::Io { .. } => None,
        }
    }

    /// Short reason phrase paired with [`ProxyError::status_code`].
    pub fn short_message(&self) -> &'static str {
        match self {
            ProxyError::MalformedRequest { .. }
            | ProxyError::MalformedUri { .. }
            | ProxyError::HeaderOverflow => "Bad Request",
            ProxyError::UnsupportedMethod { .. } => "Not Implemented",
            ProxyError::UpstreamBuildOverflow => "Internal Server Error",
            ProxyError::OriginConnect { .. } | ProxyError::OriginSend { .. } => {
                "Service Unavailable"
            }
            ProxyError::ClientWrite { .. } | ProxyError::Io { .. } => "",
        }
    }

    /// Longer explanatory phrase for the error body.
    pub fn long_message(&self) -> &'static str {
        match self {
            ProxyError::MalformedRequest { .. } => "Proxy received a malformed request",
            ProxyError::MalformedUri { .. } => "Proxy received a malformed request URI",
            ProxyError::HeaderOverflow => "Proxy received a request with too many headers",
            ProxyError::UnsupportedMethod { .. } => "Proxy does not implement this method",
            ProxyError::UpstreamBuildOverflow => "Proxy cannot generate an upstream request",
            ProxyError::OriginConnect { .. } => "Proxy cannot connect to the origin server",
            ProxyError::OriginSend { .. } => "Proxy cannot send the request to the origin server",
            ProxyError::ClientWrite { .. } | ProxyError::Io { .. } => "",
        }
    }

    /// The string that fills the `<cause>` slot of the error body.
    pub fn cause(&self) -> String {
        match self {
            ProxyError::MalformedRequest { cause } => cause.clone(),
            ProxyError::MalformedUri { cause } => cause.clone(),
            ProxyError::UnsupportedMethod { method } => method.clone(),
            ProxyError::HeaderOverflow => "header block".to_string(),
            ProxyError::UpstreamBuildOverflow => "upstream request".to_string(),
            ProxyError::OriginConnect { host, port, .. } => format!("{}:{}", host, port),
            ProxyError::OriginSend { .. } | ProxyError::ClientWrite { .. } | ProxyError::Io { .. } => {
                String::new()
            }
        }
    }
}
