use crate::{
    Event,
    buffer::InputBuffer,
    decoder::{Decoder, DecoderOptions, Step},
};

/// A [`Decoder`] that owns its input.
///
/// Feed bytes as they arrive and pull events until
/// [`Event::Incomplete`] asks for more.
///
/// ```rust
/// use jsonpull::{Event, JsonStream, Scalar};
///
/// let mut stream = JsonStream::default();
/// stream.feed(b"[1");
/// assert_eq!(stream.next_event(), Event::StartArray);
/// assert!(stream.next_event().is_incomplete());
///
/// stream.feed(b"0]");
/// assert_eq!(stream.next_event(), Event::Value(Scalar::number("10")));
/// assert_eq!(stream.next_event(), Event::EndArray);
/// assert_eq!(stream.next_event(), Event::End);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonStream {
    decoder: Decoder,
    buffer: InputBuffer,
}

impl JsonStream {
    /// An empty stream.
    #[must_use]
    pub fn new(options: DecoderOptions) -> Self {
        JsonStream {
            decoder: Decoder::new(options),
            buffer: InputBuffer::new(),
        }
    }

    /// Appends input.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Signals that no more input will be fed.
    pub fn close(&mut self) {
        self.decoder.close();
    }

    /// Produces the next event.
    pub fn next_event(&mut self) -> Event<'_> {
        let window = self.buffer.window();
        self.decoder.step(window).resolve(window)
    }

    /// Drops input the decoder no longer needs.
    ///
    /// Call between events to bound memory on long streams.
    pub fn compact(&mut self) {
        self.buffer.compact(self.decoder.retain_from());
    }

    /// Returns to the initial state, keeping allocations.
    pub fn reset(&mut self) {
        self.decoder.reset();
        self.buffer.clear();
    }

    /// The underlying decoder.
    #[must_use]
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// The buffered input.
    #[must_use]
    pub fn buffer(&self) -> &InputBuffer {
        &self.buffer
    }

    pub(crate) fn step(&mut self) -> Step {
        self.decoder.step(self.buffer.window())
    }

    pub(crate) fn resolve(&self, step: Step) -> Event<'_> {
        step.resolve(self.buffer.window())
    }
}
