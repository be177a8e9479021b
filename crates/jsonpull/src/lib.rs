//! A resumable, pull-based JSON event decoder.
//!
//! `jsonpull` lexes and parses JSON text incrementally. Every call to
//! [`Decoder::advance`] returns exactly one [`Event`]: a structural token, a
//! key, a scalar value, an [`Event::Incomplete`] signal when the bytes seen so
//! far are not enough to make progress, [`Event::End`] once the document is
//! complete, or [`Event::SyntaxError`].
//!
//! The decoder never stores a pointer into the input. Each call receives the
//! current view of the logical stream; the view may be reallocated or grown
//! between calls as long as the bytes already consumed stay in place.
//!
//! ```rust
//! use jsonpull::{Decoder, Event, Scalar};
//!
//! let mut decoder = Decoder::default();
//! let mut input = br#"{"x":"#.to_vec();
//!
//! assert_eq!(decoder.advance(&input), Event::StartObject);
//! assert_eq!(decoder.advance(&input), Event::key("x"));
//! assert!(decoder.advance(&input).is_incomplete());
//!
//! input.extend_from_slice(b"true}");
//! assert_eq!(decoder.advance(&input), Event::Value(Scalar::boolean(true)));
//! assert_eq!(decoder.advance(&input), Event::EndObject);
//! assert_eq!(decoder.advance(&input), Event::End);
//! ```

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod buffer;
mod decoder;
mod event;
#[cfg(feature = "std")]
mod io;
mod stream;

#[cfg(test)]
mod tests;

pub use buffer::InputBuffer;
pub use decoder::{
    Decoder, DecoderOptions, Events, ExpectedSet, Frame, SyntaxError, TokenKind, Window,
};
pub use event::{Event, Scalar, ScalarKind};
#[cfg(feature = "std")]
pub use io::{ReadError, ReadStream};
pub use stream::JsonStream;
