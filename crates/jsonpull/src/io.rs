use alloc::{vec, vec::Vec};
use std::io::{self, Read};

use thiserror::Error;

use crate::{
    Event, SyntaxError,
    decoder::{DecoderOptions, Step},
    stream::JsonStream,
};

/// Failure of a [`ReadStream`].
#[derive(Debug, Error)]
pub enum ReadError {
    /// The reader failed.
    #[error("failed to read JSON input")]
    Io(#[from] io::Error),
    /// The input is not valid JSON.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

/// Decodes JSON pulled from an [`io::Read`] source.
///
/// Input is read in chunks whenever the decoder runs out of bytes, and bytes
/// that are no longer needed are dropped before each read, so memory stays
/// bounded by the largest token plus one chunk.
///
/// ```rust
/// use jsonpull::{Event, ReadStream, Scalar};
///
/// let mut stream = ReadStream::new(&b"[1, 2]"[..]).with_chunk_size(2);
/// assert_eq!(stream.next_event()?, Event::StartArray);
/// assert_eq!(stream.next_event()?, Event::Value(Scalar::number("1")));
/// assert_eq!(stream.next_event()?, Event::Value(Scalar::number("2")));
/// assert_eq!(stream.next_event()?, Event::EndArray);
/// assert_eq!(stream.next_event()?, Event::End);
/// # Ok::<(), jsonpull::ReadError>(())
/// ```
#[derive(Debug)]
pub struct ReadStream<R> {
    reader: R,
    stream: JsonStream,
    chunk: Vec<u8>,
    finished: bool,
}

impl<R: Read> ReadStream<R> {
    /// Chunk size used unless [`ReadStream::with_chunk_size`] says otherwise.
    pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

    /// Decodes `reader` with default options.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, DecoderOptions::default())
    }

    /// Decodes `reader` with the given options.
    pub fn with_options(reader: R, options: DecoderOptions) -> Self {
        ReadStream {
            reader,
            stream: JsonStream::new(options),
            chunk: vec![0; Self::DEFAULT_CHUNK_SIZE],
            finished: false,
        }
    }

    /// Sets how many bytes are requested from the reader at a time.
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk = vec![0; size.max(1)];
        self
    }

    /// Produces the next event, reading more input as needed.
    ///
    /// Never returns [`Event::Incomplete`]: the reader reaching its end closes
    /// the decoder, which then either completes the document or reports a
    /// syntax error.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::Io`] if the reader fails (interrupted reads are
    /// retried) and [`ReadError::Syntax`] for malformed input.
    pub fn next_event(&mut self) -> Result<Event<'_>, ReadError> {
        loop {
            match self.stream.step() {
                Step::Incomplete(_) => self.fill()?,
                Step::Error(err) => return Err(err.into()),
                step => return Ok(self.stream.resolve(step)),
            }
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        self.stream.compact();
        loop {
            match self.reader.read(&mut self.chunk) {
                Ok(0) => {
                    self.stream.close();
                    return Ok(());
                }
                Ok(n) => {
                    self.stream.feed(&self.chunk[..n]);
                    return Ok(());
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
    }

    /// The in-memory stream being filled.
    pub fn stream(&self) -> &JsonStream {
        &self.stream
    }

    /// The underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Gives back the reader. Unconsumed input read from it is lost.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Yields owned events up to and including [`Event::End`], or a single error.
impl<R: Read> Iterator for ReadStream<R> {
    type Item = Result<Event<'static>, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.next_event().map(Event::into_owned);
        self.finished = matches!(item, Ok(Event::End) | Err(_));
        Some(item)
    }
}

impl<R: Read> core::iter::FusedIterator for ReadStream<R> {}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec::Vec};
    use std::io::Cursor;

    use super::*;
    use crate::{Scalar, TokenKind};

    /// Returns `Interrupted` before every successful read.
    struct Flaky<R> {
        inner: R,
        interrupt: bool,
    }

    impl<R: Read> Read for Flaky<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::ErrorKind::Interrupted.into());
            }
            self.inner.read(buf)
        }
    }

    #[test]
    fn retries_interrupted_reads() {
        let reader = Flaky {
            inner: Cursor::new(br#"{"a": [true]}"#.to_vec()),
            interrupt: false,
        };
        let events: Vec<_> = ReadStream::new(reader)
            .with_chunk_size(3)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(events.len(), 7);
        assert_eq!(events[3], Event::Value(Scalar::boolean(true)));
    }

    #[test]
    fn end_of_reader_completes_a_top_level_number() {
        let mut stream = ReadStream::new(&b" -12.5e1 "[..]).with_chunk_size(1);
        assert_eq!(
            stream.next_event().unwrap(),
            Event::Value(Scalar::number("-12.5e1"))
        );
        assert_eq!(stream.next_event().unwrap(), Event::End);
    }

    #[test]
    fn truncated_input_is_a_syntax_error() {
        let results: Vec<_> = ReadStream::new(&b"[1, {\"a\""[..]).collect();
        let Some(Err(ReadError::Syntax(err))) = results.last() else {
            panic!("expected a syntax error, got {results:?}");
        };
        assert!(err.expects(TokenKind::Colon));
        assert_eq!(err.found, None);
    }

    #[test]
    fn io_errors_are_reported() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("disk on fire"))
            }
        }
        let err = ReadStream::new(Broken).next_event().unwrap_err();
        assert!(matches!(err, ReadError::Io(_)));
        assert_eq!(err.to_string(), "failed to read JSON input");
    }
}
