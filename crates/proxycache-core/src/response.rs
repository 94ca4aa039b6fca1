//! Error responder.
//!
//! Writes a well-formed, minimal HTTP/1.0 error response: a status line, a
//! `Content-Type`/`Content-Length` pair, the blank terminator, and an HTML
//! body naming the code, short and long messages, and the offending cause —
//! the same four fields the original `clienterror` formats. Best-effort:
//! write failures here are swallowed since we are already on the error path.

use std::io::Write;

/// Render and write an error response for `code` to `client`. Never panics
/// and never propagates a write failure — there is nothing further to do
/// with a broken error path except give up quietly.
pub fn write_error<W: Write>(client: &mut W, code: u16, short: &str, long: &str, cause: &str) {
    let body = format!(
        "<!DOCTYPE html>\r\n\
         <html>\r\n\
         <head><title>Tiny Error</title></head>\r\n\
         <body bgcolor=\"ffffff\">\r\n\
         <h1>{code}: {short}</h1>\r\n\
         <p>{long}: {cause}</p>\r\n\
         <hr /><em>The Proxy Server</em>\r\n\
         </body></html>\r\n",
        code = code,
        short = short,
        long = long,
        cause = cause,
    );
    let head = format!(
        "HTTP/1.0 {} {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n",
        code,
        short,
        body.len(),
    );
    let _ = client.write_all(head.as_bytes());
    let _ = client.write_all(body.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_well_formed_status_line_and_content_length() {
        let mut buf = Vec::new();
        write_error(&mut buf, 400, "Bad Request", "Proxy received a malformed request", "POST /");
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("HTTP/1.0 400 Bad Request\r\n"));
        assert!(text.contains("Content-Type: text/html\r\n"));
        let header_end = text.find("\r\n\r\n").unwrap();
        let body_len: usize = text
            .lines()
            .find_map(|l| l.strip_prefix("Content-Length: "))
            .unwrap()
            .parse()
            .unwrap();
        let body = &text[header_end + 4..];
        assert_eq!(body.len(), body_len);
    }

    #[test]
    fn body_mentions_code_messages_and_cause() {
        let mut buf = Vec::new();
        write_error(&mut buf, 501, "Not Implemented", "Proxy does not implement this method", "POST");
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("501"));
        assert!(text.contains("Not Implemented"));
        assert!(text.contains("Proxy does not implement this method"));
        assert!(text.contains("POST"));
    }

    struct FailingWriter;
    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn swallows_write_failures() {
        let mut w = FailingWriter;
        write_error(&mut w, 503, "Service Unavailable", "cannot connect", "origin");
    }
}
