//! Absolute-form HTTP URI parser.
//!
//! Splits on the literal `://`, requires an `http` scheme, splits the
//! remainder at the first `/` into authority and path, then splits the
//! authority at `:` into host and port. Each component is bounds-checked
//! against the configured length limits.

use crate::error_handling::ProxyError;

/// A parsed absolute-form URI: `host`, `port` (default `"80"`), `path`
/// (default `"/"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUri {
    pub host: String,
    pub port: String,
    pub path: String,
}

/// Parse `uri` (e.g. `http://example.com:8080/a/b`) into host/port/path.
///
/// Fails if `://` is absent, the scheme before it is not exactly `http`, or
/// any component exceeds its bound.
pub fn parse_uri(uri: &str, host_len: usize, port_len: usize) -> Result<ParsedUri, ProxyError> {
    let scheme_pos = uri.find("://").ok_or_else(|| ProxyError::MalformedUri {
        cause: "missing scheme separator '://'".to_string(),
    })?;
    let scheme = &uri[..scheme_pos];
    if scheme != "http" {
        return Err(ProxyError::MalformedUri {
            cause: format!("unsupported scheme '{}'", scheme),
        });
    }

    let rest = &uri[scheme_pos + 3..];
    let (authority, path) = match rest.find('/') {
        Some(slash) => (&rest[..slash], format!("/{}", &rest[slash + 1..])),
        None => (rest, "/".to_string()),
    };

    let (host, port) = match authority.find(':') {
        Some(colon) => (
            authority[..colon].to_string(),
            authority[colon + 1..].to_string(),
        ),
        None => (authority.to_string(), "80".to_string()),
    };

    if host.is_empty() {
        return Err(ProxyError::MalformedUri {
            cause: "empty host".to_string(),
        });
    }
    if host.len() > host_len {
        return Err(ProxyError::MalformedUri {
            cause: format!("host exceeds {} bytes", host_len),
        });
    }
    if port.len() > port_len {
        return Err(ProxyError::MalformedUri {
            cause: format!("port exceeds {} bytes", port_len),
        });
    }

    Ok(ParsedUri { host, port, path })
}

/// The canonical cache-key fingerprint for a parsed URI: `host:port path`.
pub fn fingerprint(parsed: &ParsedUri) -> String {
    format!("{}:{} {}", parsed.host, parsed.port, parsed.path)
}
