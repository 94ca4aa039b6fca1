//! Line-buffered stream reader.
//!
//! Wraps any `Read` endpoint with an internal buffer and exposes
//! byte-count-accurate `read_line`/`read_exact`. Both return raw byte
//! counts and treat the stream as arbitrary bytes (response bodies may
//! contain embedded NULs), never C-string semantics.

use std::io::{self, Read};

/// Buffered reader over one connection's byte stream.
///
/// `read_line` returns at most `max` bytes up to and including the next
/// `\n`; `read_exact` copies out exactly `n` bytes. Both refill the internal
/// buffer from the underlying stream only when it runs dry, so a single
/// `TcpStream::read` call can serve many short lines.
pub struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
    len: usize,
    block_size: usize,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R, block_size: usize) -> Self {
        LineReader {
            inner,
            buf: vec![0u8; block_size],
            pos: 0,
            len: 0,
            block_size,
        }
    }

    fn refill(&mut self) -> io::Result<usize> {
        self.pos = 0;
        self.len = self.inner.read(&mut self.buf[..self.block_size])?;
        Ok(self.len)
    }

    /// Read up to `max` bytes terminated by `\n` (inclusive), or up to
    /// end-of-stream. Returns the line (without a trailing terminator
    /// guarantee beyond what the stream actually sent) and its length.
    /// An empty return with `Ok(0)` means orderly end-of-stream.
    pub fn read_line(&mut self, max: usize) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(max.min(256));
        loop {
            if self.pos == self.len {
                if self.refill()? == 0 {
                    break;
                }
            }
            let avail = &self.buf[self.pos..self.len];
            let remaining = max.saturating_sub(out.len());
            if remaining == 0 {
                break;
            }
            let take = avail.len().min(remaining);
            if let Some(nl) = avail[..take].iter().position(|&b| b == b'\n') {
                out.extend_from_slice(&avail[..=nl]);
                self.pos += nl + 1;
                break;
            } else {
                out.extend_from_slice(&avail[..take]);
                self.pos += take;
                if out.len() >= max {
                    break;
                }
            }
        }
        Ok(out)
    }

    /// Read exactly `n` bytes, or fewer only at end-of-stream.
    pub fn read_exact_upto(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            if self.pos == self.len {
                if self.refill()? == 0 {
                    break;
                }
            }
            let avail = &self.buf[self.pos..self.len];
            let take = avail.len().min(n - out.len());
            out.extend_from_slice(&avail[..take]);
            self.pos += take;
        }
        Ok(out)
    }
}
