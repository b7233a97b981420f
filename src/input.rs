//! Line sources feeding the engine
//!
//! A source hands out lines in bounded chunks: a line longer than the
//! chunk limit arrives as several chunks, all but the last flagged with
//! `more_follows`. The engine joins them back into one logical line.

use std::collections::VecDeque;
use std::io::{self, BufRead};

/// Default upper bound for a single chunk, in bytes
pub const DEFAULT_MAX_CHUNK: usize = 4096;

/// One read from a line source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Part or all of a line, without its terminator
    Data { bytes: Vec<u8>, more_follows: bool },
    /// No more bytes will ever be produced
    EndOfInput,
}

/// Anything the engine can pull lines from
pub trait LineSource {
    fn read_chunk(&mut self) -> io::Result<Chunk>;
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn read_chunk(&mut self) -> io::Result<Chunk> {
        (**self).read_chunk()
    }
}

/// Size-limited line reader over any `BufRead`
///
/// Strips `\n` and `\r\n` terminators. A final line without a terminator
/// is returned like any other line.
#[derive(Debug)]
pub struct BufLineSource<R> {
    reader: R,
    max_chunk: usize,
}

impl<R: BufRead> BufLineSource<R> {
    pub fn new(reader: R) -> Self {
        Self::with_max_chunk(reader, DEFAULT_MAX_CHUNK)
    }

    /// Create a source that never returns more than `max_chunk` bytes at once
    pub fn with_max_chunk(reader: R, max_chunk: usize) -> Self {
        Self {
            reader,
            max_chunk: max_chunk.max(1),
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead> BufLineSource<R> {
    /// First buffered byte without consuming it, or `None` at end of input
    fn peek(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Decide how a full chunk ends.
    ///
    /// A terminator (or end of input) right at the boundary closes the line
    /// here, so `more_follows` is only set when more line bytes really exist.
    fn finish_full_chunk(&mut self, mut bytes: Vec<u8>) -> io::Result<Chunk> {
        match self.peek()? {
            None => Ok(Chunk::Data { bytes, more_follows: false }),
            Some(b'\n') => {
                self.reader.consume(1);
                if bytes.last() == Some(&b'\r') {
                    bytes.pop();
                }
                Ok(Chunk::Data { bytes, more_follows: false })
            }
            Some(_) => Ok(Chunk::Data { bytes, more_follows: true }),
        }
    }
}

impl<R: BufRead> LineSource for BufLineSource<R> {
    fn read_chunk(&mut self) -> io::Result<Chunk> {
        let mut bytes = Vec::new();

        loop {
            let available = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            if available.is_empty() {
                if bytes.is_empty() {
                    return Ok(Chunk::EndOfInput);
                }
                return Ok(Chunk::Data { bytes, more_follows: false });
            }

            let room = self.max_chunk - bytes.len();
            let window = &available[..available.len().min(room)];

            if let Some(pos) = window.iter().position(|&b| b == b'\n') {
                bytes.extend_from_slice(&window[..pos]);
                self.reader.consume(pos + 1);
                if bytes.last() == Some(&b'\r') {
                    bytes.pop();
                }
                return Ok(Chunk::Data { bytes, more_follows: false });
            }

            let taken = window.len();
            bytes.extend_from_slice(window);
            self.reader.consume(taken);

            if bytes.len() >= self.max_chunk {
                return self.finish_full_chunk(bytes);
            }
        }
    }
}

/// Several sources read back to back as one stream
///
/// Used for multiple input files: line numbering continues from one file
/// to the next, and end of input is only reported after the last one.
/// A line never continues from one source into the next.
pub struct Concat<S> {
    sources: VecDeque<S>,
    /// The last chunk handed out promised more bytes of the same line
    line_open: bool,
}

impl<S: LineSource> Concat<S> {
    pub fn new(sources: impl IntoIterator<Item = S>) -> Self {
        Self {
            sources: sources.into_iter().collect(),
            line_open: false,
        }
    }
}

impl<S: LineSource> LineSource for Concat<S> {
    fn read_chunk(&mut self) -> io::Result<Chunk> {
        while let Some(current) = self.sources.front_mut() {
            match current.read_chunk()? {
                Chunk::EndOfInput => {
                    self.sources.pop_front();
                    if self.line_open {
                        self.line_open = false;
                        return Ok(Chunk::Data { bytes: Vec::new(), more_follows: false });
                    }
                }
                Chunk::Data { bytes, more_follows } => {
                    self.line_open = more_follows;
                    return Ok(Chunk::Data { bytes, more_follows });
                }
            }
        }
        Ok(Chunk::EndOfInput)
    }
}
