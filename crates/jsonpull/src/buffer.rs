use alloc::vec::Vec;

use tracing::trace;

use crate::decoder::Window;

/// Growable storage for the input a [`Decoder`](crate::Decoder) reads.
///
/// The buffer holds a suffix of the logical stream: its first byte sits at
/// logical offset [`origin`](InputBuffer::origin). Bytes only leave the front
/// through [`compact`](InputBuffer::compact), so offsets the decoder has
/// recorded stay meaningful across reallocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    bytes: Vec<u8>,
    origin: usize,
}

impl InputBuffer {
    /// An empty buffer at logical offset 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty buffer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        InputBuffer {
            bytes: Vec::with_capacity(capacity),
            origin: 0,
        }
    }

    /// Appends freshly read bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Replaces the content with `stream`, the whole logical stream so far.
    ///
    /// `stream` must begin with every byte previously appended, including
    /// bytes already dropped by [`compact`](InputBuffer::compact); only the
    /// part after them is new.
    ///
    /// # Panics
    ///
    /// Panics if `stream` is shorter than the bytes already held.
    pub fn replace(&mut self, stream: &[u8]) {
        let held = self.end();
        assert!(
            stream.len() >= held,
            "replacement of {} bytes drops content up to offset {held}",
            stream.len()
        );
        debug_assert_eq!(
            &stream[self.origin..held],
            self.bytes.as_slice(),
            "replacement does not preserve the bytes already held"
        );
        self.bytes.clear();
        self.bytes.extend_from_slice(&stream[self.origin..]);
    }

    /// The view to pass to [`Decoder::advance_window`](crate::Decoder::advance_window).
    #[must_use]
    pub fn window(&self) -> Window<'_> {
        Window::new(&self.bytes, self.origin)
    }

    /// Drops the bytes before logical offset `keep_from`, usually
    /// [`Decoder::retain_from`](crate::Decoder::retain_from).
    ///
    /// Offsets before the origin are ignored and offsets past the end drop
    /// everything.
    pub fn compact(&mut self, keep_from: usize) {
        let drop = keep_from.saturating_sub(self.origin).min(self.bytes.len());
        if drop == 0 {
            return;
        }
        self.bytes.drain(..drop);
        self.origin += drop;
        trace!(dropped = drop, origin = self.origin, "compacted input buffer");
    }

    /// Logical offset of the first held byte.
    #[must_use]
    pub fn origin(&self) -> usize {
        self.origin
    }

    /// Logical offset one past the last held byte.
    #[must_use]
    pub fn end(&self) -> usize {
        self.origin + self.bytes.len()
    }

    /// Number of held bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether no bytes are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The held bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Forgets all content and moves back to logical offset 0.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.origin = 0;
    }
}
