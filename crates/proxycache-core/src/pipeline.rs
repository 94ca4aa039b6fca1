//! Per-connection request/response pipeline.
//!
//! `handle_connection` is the only mutator of the cache engine and the state
//! machine: parse the request line, parse the URI,
//! read pass-through headers, consult the cache, and on miss build an
//! upstream request, dial the origin, stream the response back to the
//! client while teeing a bounded copy into the cache.
//!
//! Generic over the client and origin stream types (and how the origin is
//! dialed) so the whole state machine can be driven against in-memory
//! buffers in tests without opening a socket.

use std::io::{self, Read, Write};

use crate::cache::Cache;
use crate::config::Config;
use crate::error_handling::ProxyError;
use crate::headers;
use crate::response;
use crate::stream::LineReader;
use crate::uri::{self, ParsedUri};
use crate::utils::log_error;

/// Fixed User-Agent the proxy presents to origins, baked into the binary.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:10.0.3) Gecko/20120305 Firefox/10.0.3";

struct ParsedRequest {
    uri: ParsedUri,
    passthrough: Vec<u8>,
}

/// Drive one connection end to end. Never panics; any error is translated
/// into a best-effort HTTP error response (when the error kind has one) and
/// a single `log_error` line.
pub fn handle_connection<C, O, D>(mut client: C, cache: &Cache, config: &Config, dial: D)
where
    C: Read + Write,
    O: Read + Write,
    D: FnOnce(&str, &str) -> io::Result<O>,
{
    if let Err(err) = run(&mut client, cache, config, dial) {
        if let Some(code) = err.status_code() {
            response::write_error(
                &mut client,
                code,
                err.short_message(),
                err.long_message(),
                &err.cause(),
            );
        }
        log_error(&format!("{}", err));
    }
}

fn run<C, O, D>(client: &mut C, cache: &Cache, config: &Config, dial: D) -> Result<(), ProxyError>
where
    C: Read + Write,
    O: Read + Write,
    D: FnOnce(&str, &str) -> io::Result<O>,
{
    let parsed = read_request(client, config)?;
    let fingerprint = uri::fingerprint(&parsed.uri).into_bytes();

    if let Some(session) = cache.read_begin(&fingerprint) {
        client
            .write_all(session.bytes())
            .map_err(|e| ProxyError::ClientWrite { source: e.to_string() })?;
        return Ok(());
    }

    let upstream_request = build_upstream_request(&parsed, config)?;

    let host = parsed.uri.host.clone();
    let port = parsed.uri.port.clone();
    let mut origin = dial(&host, &port).map_err(|e| ProxyError::OriginConnect {
        host,
        port,
        source: e.to_string(),
    })?;

    origin
        .write_all(&upstream_request)
        .map_err(|e| ProxyError::OriginSend { source: e.to_string() })?;

    stream_and_tee(client, &mut origin, cache, &fingerprint, config)
}

/// READ_REQLINE + PARSE_URI + READ_HEADERS.
fn read_request<C: Read>(client: &mut C, config: &Config) -> Result<ParsedRequest, ProxyError> {
    let mut reader = LineReader::new(client, config.line_buffer_size);

    let req_line = reader.read_line(config.line_buffer_size)?;
    if req_line.is_empty() {
        return Err(ProxyError::MalformedRequest {
            cause: "connection closed before request line".to_string(),
        });
    }
    let (method, uri_str) = parse_request_line(&req_line)?;
    if method != "GET" {
        return Err(ProxyError::UnsupportedMethod { method });
    }
    let uri = uri::parse_uri(&uri_str, config.host_len, config.port_len)?;

    let header_budget = config.line_buffer_size.saturating_mul(16);
    let passthrough =
        headers::read_passthrough_headers(&mut reader, config.line_buffer_size, header_budget)?;

    Ok(ParsedRequest { uri, passthrough })
}

/// Parse `METHOD SP URI SP HTTP/1.X CRLF`; X must be `0` or `1`.
fn parse_request_line(line: &[u8]) -> Result<(String, String), ProxyError> {
    let text = std::str::from_utf8(line).map_err(|_| ProxyError::MalformedRequest {
        cause: "request line is not valid UTF-8".to_string(),
    })?;
    let trimmed = text.trim_end_matches(['\r', '\n']);
    let mut parts = trimmed.split(' ').filter(|s| !s.is_empty());

    let method = parts
        .next()
        .ok_or_else(|| ProxyError::MalformedRequest { cause: "missing method".to_string() })?;
    let uri = parts
        .next()
        .ok_or_else(|| ProxyError::MalformedRequest { cause: "missing uri".to_string() })?;
    let version = parts
        .next()
        .ok_or_else(|| ProxyError::MalformedRequest { cause: "missing version".to_string() })?;
    if parts.next().is_some() {
        return Err(ProxyError::MalformedRequest {
            cause: "too many tokens in request line".to_string(),
        });
    }

    let version_ok = version
        .strip_prefix("HTTP/1.")
        .map(|minor| minor == "0" || minor == "1")
        .unwrap_or(false);
    if !version_ok {
        return Err(ProxyError::MalformedRequest {
            cause: format!("unsupported version '{}'", version),
        });
    }

    Ok((method.to_string(), uri.to_string()))
}

/// BUILD_UPSTREAM_REQ: fixed headers the proxy supplies, then the
/// pass-through block, then a serializer-appended terminating CRLF, so an
/// empty pass-through block still yields a well-formed request.
fn build_upstream_request(parsed: &ParsedRequest, config: &Config) -> Result<Vec<u8>, ProxyError> {
    let mut req = Vec::new();
    req.extend_from_slice(format!("GET {} HTTP/1.0\r\n", parsed.uri.path).as_bytes());
    req.extend_from_slice(format!("Host: {}\r\n", parsed.uri.host).as_bytes());
    req.extend_from_slice(b"Connection: close\r\n");
    req.extend_from_slice(b"Proxy-Connection: close\r\n");
    req.extend_from_slice(format!("User-Agent: {}\r\n", USER_AGENT).as_bytes());
    req.extend_from_slice(&parsed.passthrough);
    req.extend_from_slice(b"\r\n");

    let upstream_budget = config.line_buffer_size.saturating_mul(16) + config.line_buffer_size;
    if req.len() > upstream_budget {
        return Err(ProxyError::UpstreamBuildOverflow);
    }
    Ok(req)
}

/// STREAM_AND_TEE + MAYBE_INSERT: relay the origin response line by line,
/// writing each line to the client immediately and appending to a scratch
/// buffer capped at `max_object_bytes`. Caches the full response (including
/// status line and headers) only if it never exceeded that cap.
fn stream_and_tee<C: Write, O: Read>(
    client: &mut C,
    origin: &mut O,
    cache: &Cache,
    fingerprint: &[u8],
    config: &Config,
) -> Result<(), ProxyError> {
    let mut reader = LineReader::new(origin, config.line_buffer_size);
    let mut scratch: Vec<u8> = Vec::new();
    let mut res_len: usize = 0;
    let mut over_budget = false;

    loop {
        let line = reader.read_line(config.line_buffer_size)?;
        if line.is_empty() {
            break;
        }
        client
            .write_all(&line)
            .map_err(|e| ProxyError::ClientWrite { source: e.to_string() })?;

        res_len += line.len();
        if !over_budget {
            if res_len <= config.max_object_bytes {
                scratch.extend_from_slice(&line);
            } else {
                over_budget = true;
                scratch = Vec::new();
            }
        }
    }

    if !over_budget && res_len <= config.max_object_bytes {
        cache.write(fingerprint, scratch);
    }
    Ok(())
}
