//! Byte-stream framing.
//!
//! [`Framer`] turns an unreliable, chunked byte stream into discrete
//! CRLF-terminated lines. It owns two fixed-capacity buffers: a scratch
//! buffer that each read lands in, and a line buffer that accumulates a
//! partial line across reads. A line longer than the buffer capacity is
//! silently truncated to exactly capacity bytes; framing resynchronizes on
//! the next terminator.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;
use tracing::trace;

use crate::error::{ProtocolError, Result};

/// Default buffer capacity (IRC line limit).
pub const DEFAULT_CAPACITY: usize = 512;

/// Default per-read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Incremental line framer over a byte source.
///
/// Call [`Framer::poll`] in a loop until it returns `Ok(None)` to drain all
/// pending lines before idling; each call returns at most one line.
pub struct Framer<R> {
    reader: R,
    read_timeout: Duration,
    /// Scratch destination for each read; overwritten every read.
    rx_buf: Box<[u8]>,
    /// Bytes of `rx_buf` filled by the last read.
    filled: usize,
    /// Index of the next unconsumed byte in `rx_buf`.
    scan: usize,
    /// Accumulates a partial line across reads; length never exceeds capacity.
    line_buf: Box<[u8]>,
    line_end: usize,
    /// The last raw byte of the previous read was a CR with no LF yet seen.
    pending_cr: bool,
}

impl<R: AsyncRead + Unpin> Framer<R> {
    /// Create a framer with the default capacity and read timeout.
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_CAPACITY)
    }

    /// Create a framer with custom buffer capacity.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader,
            read_timeout: DEFAULT_READ_TIMEOUT,
            rx_buf: vec![0u8; capacity].into_boxed_slice(),
            filled: 0,
            scan: 0,
            line_buf: vec![0u8; capacity].into_boxed_slice(),
            line_end: 0,
            pending_cr: false,
        }
    }

    /// Set the per-read timeout.
    pub fn read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Attempt to produce one complete line.
    ///
    /// Returns `Ok(None)` when no line is currently available (nothing
    /// buffered and the read timed out) - a benign condition. An EOF or I/O
    /// error is fatal to the link and is never retried here.
    pub async fn poll(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.next_buffered_line() {
            return Ok(Some(line));
        }

        let n = match timeout(self.read_timeout, self.reader.read(&mut self.rx_buf)).await {
            // No data before the timeout: benign, try again later.
            Err(_) => return Ok(None),
            Ok(Ok(0)) => return Err(ProtocolError::ConnectionClosed),
            Ok(Ok(n)) => n,
            Ok(Err(e))
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut =>
            {
                return Ok(None);
            }
            Ok(Err(e)) => return Err(e.into()),
        };
        trace!(bytes = n, "read");
        self.filled = n;
        self.scan = 0;

        Ok(self.next_buffered_line())
    }

    /// Scan the unconsumed part of the scratch buffer for the next complete
    /// line, absorbing any trailing partial into the line buffer.
    fn next_buffered_line(&mut self) -> Option<String> {
        if self.scan >= self.filled {
            return None;
        }

        // A CRLF terminator may straddle two reads.
        if self.pending_cr {
            self.pending_cr = false;
            if self.rx_buf[self.scan] == b'\n' {
                if self.line_end > 0 && self.line_buf[self.line_end - 1] == b'\r' {
                    self.line_end -= 1;
                }
                self.scan += 1;
                return Some(self.take_line());
            }
        }

        if let Some(rel) = find_crlf(&self.rx_buf[self.scan..self.filled]) {
            let seg_end = self.scan + rel;
            self.append_to_line(self.scan, seg_end);
            self.scan = seg_end + 2;
            return Some(self.take_line());
        }

        // No terminator: keep the partial for continuation on the next read.
        self.pending_cr = self.rx_buf[self.filled - 1] == b'\r';
        self.append_to_line(self.scan, self.filled);
        self.scan = 0;
        self.filled = 0;
        None
    }

    /// Append `rx_buf[start..end]` to the line buffer, copying only as many
    /// bytes as fit. The remainder of an overlong segment is dropped.
    fn append_to_line(&mut self, start: usize, end: usize) {
        let space = self.line_buf.len() - self.line_end;
        let take = (end - start).min(space);
        self.line_buf[self.line_end..self.line_end + take]
            .copy_from_slice(&self.rx_buf[start..start + take]);
        self.line_end += take;
    }

    /// Emit the accumulated line and reset the line buffer.
    ///
    /// A byte sequence that fails to decode yields an empty line, which the
    /// caller's parser drops.
    fn take_line(&mut self) -> String {
        let line = String::from_utf8(self.line_buf[..self.line_end].to_vec()).unwrap_or_default();
        self.line_end = 0;
        line
    }
}

fn find_crlf(haystack: &[u8]) -> Option<usize> {
    haystack.windows(2).position(|w| w == b"\r\n")
}
