//! Request header rewriter.
//!
//! Reads client request headers line by line until the empty CRLF
//! terminator, dropping the hop-by-hop and identity headers the proxy
//! supplies itself (`Connection:`, `Proxy-Connection:`, `User-Agent:`,
//! `Host:`) and passing the rest through byte-for-byte. Prefix checks are
//! case-sensitive, matching the serialized field name exactly.

use crate::error_handling::ProxyError;
use crate::stream::LineReader;
use std::io::Read;

const DROPPED_PREFIXES: &[&[u8]] = &[
    b"Connection:",
    b"Proxy-Connection:",
    b"User-Agent:",
    b"Host:",
];

fn is_dropped(line: &[u8]) -> bool {
    DROPPED_PREFIXES.iter().any(|p| line.starts_with(p))
}

/// Read headers from `reader` until the blank `\r\n` terminator, returning
/// the concatenated pass-through lines (hop-by-hop/identity headers
/// stripped). Fails on premature end-of-stream or if the accumulated
/// pass-through block would exceed `max_bytes`.
pub fn read_passthrough_headers<R: Read>(
    reader: &mut LineReader<R>,
    line_budget: usize,
    max_bytes: usize,
) -> Result<Vec<u8>, ProxyError> {
    let mut out = Vec::new();
    loop {
        let line = reader.read_line(line_budget)?;
        if line.is_empty() {
            return Err(ProxyError::MalformedRequest {
                cause: "connection closed while reading headers".to_string(),
            });
        }
        if !is_dropped(&line) {
            if out.len() + line.len() > max_bytes {
                return Err(ProxyError::HeaderOverflow);
            }
            out.extend_from_slice(&line);
        }
        if line == b"\r\n" || line == b"\n" {
            break;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(data: &[u8]) -> LineReader<Cursor<Vec<u8>>> {
        LineReader::new(Cursor::new(data.to_vec()), 256)
    }

    #[test]
    fn drops_hop_by_hop_and_identity_headers() {
        let mut r = reader(b"Accept: text/plain\r\nUser-Agent: Foo\r\nHost: h\r\nConnection: keep-alive\r\nProxy-Connection: keep-alive\r\n\r\n");
        let out = read_passthrough_headers(&mut r, 256, 4096).unwrap();
        assert_eq!(out, b"Accept: text/plain\r\n".to_vec());
    }

    #[test]
    fn passes_through_everything_else_verbatim() {
        let mut r = reader(b"Accept: text/plain\r\nAccept-Language: en\r\n\r\n");
        let out = read_passthrough_headers(&mut r, 256, 4096).unwrap();
        assert_eq!(out, b"Accept: text/plain\r\nAccept-Language: en\r\n".to_vec());
    }

    #[test]
    fn empty_header_block_yields_empty_output() {
        let mut r = reader(b"\r\n");
        let out = read_passthrough_headers(&mut r, 256, 4096).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn fails_on_premature_eof() {
        let mut r = reader(b"Accept: text/plain\r\n");
        assert!(read_passthrough_headers(&mut r, 256, 4096).is_err());
    }

    #[test]
    fn fails_on_overflow() {
        let mut r = reader(b"Accept: text/plain\r\nAccept-Language: en\r\n\r\n");
        assert!(read_passthrough_headers(&mut r, 256, 10).is_err());
    }

    #[test]
    fn stripping_is_idempotent() {
        // Re-running the rewriter over its own output should change nothing.
        let mut r1 = reader(b"Accept: text/plain\r\nUser-Agent: Foo\r\nHost: h\r\n\r\n");
        let once = read_passthrough_headers(&mut r1, 256, 4096).unwrap();
        let mut second_input = once.clone();
        second_input.extend_from_slice(b"\r\n");
        let mut r2 = reader(&second_input);
        let twice = read_passthrough_headers(&mut r2, 256, 4096).unwrap();
        assert_eq!(once, twice);
    }
}
