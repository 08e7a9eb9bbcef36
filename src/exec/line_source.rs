// src/exec/line_source.rs

//! Line splitting over a child output pipe.

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Lazily reads lines from a byte stream.
///
/// Lines are split on `\n`; a trailing `\r` is stripped as well. A final
/// chunk without a terminator is returned as the last line. Invalid UTF-8 is
/// replaced rather than treated as an error, so a binary blob in the output
/// never cuts the stream short.
///
/// Dropping the source drops the underlying handle, which closes the pipe.
#[derive(Debug)]
pub struct LineSource<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            buf: Vec::with_capacity(256),
        }
    }

    /// Read the next line.
    ///
    /// Returns `Ok(None)` at end-of-stream. Blocks (asynchronously) until a
    /// full line or end-of-stream is available.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        let n = self.reader.read_until(b'\n', &mut self.buf).await?;
        if n == 0 {
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }

        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}
