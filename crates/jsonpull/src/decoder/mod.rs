//! The decoder engine: a pull lexer and parser fused into one state machine.
//!
//! A [`Decoder`] holds no reference to its input. Every call to
//! [`Decoder::advance`] receives the current view of the stream and resumes
//! from the logical offset and the partial-token state saved by the previous
//! call, so the caller is free to grow or reallocate the buffer in between.

mod error;
mod escape_buffer;
mod literal_buffer;
mod number;
mod options;
mod string;

use alloc::{borrow::Cow, vec::Vec};
use core::{iter::FusedIterator, ops::Range};

use bstr::{BString, ByteSlice};
use tracing::{debug, trace};

pub use error::{ExpectedSet, SyntaxError, TokenKind};
use literal_buffer::ExpectedLiteralBuffer;
use number::NumberLexer;
pub use options::DecoderOptions;
use string::StringLexer;

use crate::event::{Event, Scalar, ScalarKind};

/// The bytes a decoder may read during one call, positioned in the logical
/// stream.
///
/// `bytes[0]` sits at logical offset `origin`. A plain slice is a window with
/// origin `0`; a buffer that dropped consumed bytes (see
/// [`InputBuffer::compact`](crate::InputBuffer::compact)) passes its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window<'a> {
    /// The visible bytes.
    pub bytes: &'a [u8],
    /// Logical offset of `bytes[0]`.
    pub origin: usize,
}

impl<'a> Window<'a> {
    /// A window over `bytes` starting at logical offset `origin`.
    #[must_use]
    pub fn new(bytes: &'a [u8], origin: usize) -> Self {
        Window { bytes, origin }
    }

    /// Logical offset one past the last visible byte.
    #[must_use]
    pub fn end(&self) -> usize {
        self.origin + self.bytes.len()
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset.checked_sub(self.origin)?).copied()
    }

    fn slice(&self, range: Range<usize>) -> &'a [u8] {
        &self.bytes[range.start - self.origin..range.end - self.origin]
    }
}

impl<'a> From<&'a [u8]> for Window<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Window::new(bytes, 0)
    }
}

/// An open container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Frame {
    /// Inside `{ ... }`.
    Object,
    /// Inside `[ ... ]`.
    Array,
}

/// The next token class the parser accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Before a top-level value.
    AtTop,
    /// Right after `{`: a key or `}`.
    ObjectOpen,
    /// After `,` in an object.
    ExpectKey,
    ExpectColon,
    /// After `:` or after `,` in an array.
    ExpectValue,
    /// Right after `[`: a value or `]`.
    ArrayOpen,
    ExpectCommaOrObjectEnd,
    ExpectCommaOrArrayEnd,
    /// The top-level value is complete; only whitespace may follow.
    AfterTop,
    /// `End` was reported.
    Done,
}

impl Mode {
    fn expected(self) -> ExpectedSet {
        match self {
            Mode::AtTop | Mode::ExpectValue => ExpectedSet::VALUE,
            Mode::ArrayOpen => ExpectedSet::VALUE.with(TokenKind::EndArray),
            Mode::ObjectOpen => ExpectedSet::of(&[TokenKind::EndObject, TokenKind::Key]),
            Mode::ExpectKey => ExpectedSet::of(&[TokenKind::Key]),
            Mode::ExpectColon => ExpectedSet::of(&[TokenKind::Colon]),
            Mode::ExpectCommaOrObjectEnd => {
                ExpectedSet::of(&[TokenKind::EndObject, TokenKind::Comma])
            }
            Mode::ExpectCommaOrArrayEnd => ExpectedSet::of(&[TokenKind::EndArray, TokenKind::Comma]),
            Mode::AfterTop | Mode::Done => ExpectedSet::of(&[TokenKind::EndOfInput]),
        }
    }
}

/// Outcome of running a lexer over the visible bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lexed {
    /// Every visible byte was consumed and the token is still open.
    NeedMore,
    /// The token ended; the position is just past its last byte.
    Complete,
    /// The byte at the position cannot continue the token.
    Reject(ExpectedSet),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Lexeme {
    String { lexer: StringLexer, key: bool },
    Number(NumberLexer),
    Literal(ExpectedLiteralBuffer),
}

impl Lexeme {
    fn expected(&self) -> ExpectedSet {
        match self {
            Lexeme::String { lexer, .. } => lexer.expected(),
            Lexeme::Number(lexer) => lexer.expected(),
            Lexeme::Literal(literal) => literal.expected(),
        }
    }
}

/// A token that began but has not ended yet.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    /// Logical offset of its first byte (the opening quote for strings).
    start: usize,
    lexeme: Lexeme,
}

/// Decoded bytes, either a span of the window or a decoded copy.
#[derive(Debug)]
pub(crate) enum Text {
    Span(Range<usize>),
    Owned(Vec<u8>),
}

/// An [`Event`] whose payload is not yet tied to a window.
///
/// Keeping offsets instead of slices lets drivers that own the buffer mutate
/// the decoder and the buffer separately before resolving the event.
#[derive(Debug)]
pub(crate) enum Step {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    Key(Text),
    Value(ScalarKind, Text),
    Incomplete(Range<usize>),
    End,
    Error(SyntaxError),
}

impl Step {
    /// Ties the payload to `window`, which must be the one the step was
    /// produced from.
    pub(crate) fn resolve(self, window: Window<'_>) -> Event<'_> {
        let text = |text: Text| match text {
            Text::Span(range) => Cow::Borrowed(window.slice(range).as_bstr()),
            Text::Owned(bytes) => Cow::Owned(BString::from(bytes)),
        };
        match self {
            Step::StartObject => Event::StartObject,
            Step::EndObject => Event::EndObject,
            Step::StartArray => Event::StartArray,
            Step::EndArray => Event::EndArray,
            Step::Key(key) => Event::Key(text(key)),
            Step::Value(kind, bytes) => Event::Value(Scalar {
                kind,
                bytes: text(bytes),
            }),
            Step::Incomplete(range) => Event::Incomplete(text(Text::Span(range))),
            Step::End => Event::End,
            Step::Error(err) => Event::SyntaxError(err),
        }
    }
}

/// Incremental JSON decoder.
///
/// See the [crate documentation](crate) for the calling convention.
#[derive(Debug, Clone)]
pub struct Decoder {
    options: DecoderOptions,
    mode: Mode,
    stack: Vec<Frame>,
    /// Logical offset of the next unconsumed byte.
    cursor: usize,
    token: Option<Token>,
    /// Decoded content of the in-flight string once it contained an escape.
    scratch: Vec<u8>,
    closed: bool,
    error: Option<SyntaxError>,
    line: usize,
    line_start: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new(DecoderOptions::default())
    }
}

impl Decoder {
    /// Creates a decoder positioned before the first top-level value.
    #[must_use]
    pub fn new(options: DecoderOptions) -> Self {
        Decoder {
            options,
            mode: Mode::AtTop,
            stack: Vec::new(),
            cursor: 0,
            token: None,
            scratch: Vec::new(),
            closed: false,
            error: None,
            line: 1,
            line_start: 0,
        }
    }

    /// The options this decoder was created with.
    #[must_use]
    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Produces the next event from `input`, the whole stream seen so far.
    ///
    /// `input` may be a different allocation on every call but must start
    /// with the bytes passed before.
    ///
    /// # Panics
    ///
    /// Panics if `input` is shorter than the prefix the decoder has consumed.
    pub fn advance<'a>(&mut self, input: &'a [u8]) -> Event<'a> {
        self.advance_window(Window::from(input))
    }

    /// Produces the next event from a window into the stream.
    ///
    /// # Panics
    ///
    /// Panics if the window starts after [`Decoder::retain_from`] or ends
    /// before [`Decoder::offset`].
    pub fn advance_window<'a>(&mut self, window: Window<'a>) -> Event<'a> {
        self.step(window).resolve(window)
    }

    /// Iterates over the events that `input` allows.
    ///
    /// The iterator stops before the next [`Event::Incomplete`]; the caller
    /// then supplies more input and calls `events` again. [`Event::End`] is
    /// yielded and ends iteration, as does a syntax error, yielded as `Err`.
    pub fn events<'d, 'a>(&'d mut self, input: &'a [u8]) -> Events<'d, 'a> {
        Events {
            decoder: self,
            input,
            finished: false,
        }
    }

    /// Signals that no more input will arrive.
    ///
    /// Afterwards, running out of bytes completes a pending top-level number
    /// and turns an unfinished document into a syntax error instead of
    /// [`Event::Incomplete`].
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Returns to the initial state, keeping allocations.
    pub fn reset(&mut self) {
        self.mode = Mode::AtTop;
        self.stack.clear();
        self.cursor = 0;
        self.token = None;
        self.scratch.clear();
        self.closed = false;
        self.error = None;
        self.line = 1;
        self.line_start = 0;
    }

    /// Logical offset of the next unconsumed byte.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.cursor
    }

    /// Number of open containers.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The open containers, outermost first.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.stack
    }

    /// 1-based line of [`Decoder::offset`].
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based byte column of [`Decoder::offset`].
    #[must_use]
    pub fn column(&self) -> usize {
        self.cursor - self.line_start + 1
    }

    /// Whether [`Event::End`] has been produced.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.mode == Mode::Done
    }

    /// Whether a syntax error has been produced.
    #[must_use]
    pub fn is_errored(&self) -> bool {
        self.error.is_some()
    }

    /// Whether [`Decoder::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Earliest logical offset the next call still needs: the start of the
    /// in-flight token, or the cursor between tokens. Bytes before it may be
    /// discarded.
    #[must_use]
    pub fn retain_from(&self) -> usize {
        self.token.as_ref().map_or(self.cursor, |token| token.start)
    }

    pub(crate) fn step(&mut self, window: Window<'_>) -> Step {
        if let Some(err) = &self.error {
            return Step::Error(err.clone());
        }
        if self.mode == Mode::Done {
            return Step::End;
        }
        assert!(
            window.origin <= self.retain_from() && window.end() >= self.cursor,
            "window {}..{} does not cover offsets {}..{} still needed by the decoder",
            window.origin,
            window.end(),
            self.retain_from(),
            self.cursor,
        );

        let step = self.step_inner(window);
        match &step {
            Step::Error(err) => {
                debug!(
                    offset = err.offset,
                    line = err.line,
                    column = err.column,
                    expected = %err.expected,
                    "syntax error"
                );
                self.token = None;
                self.error = Some(err.clone());
                #[cfg(any(test, feature = "fuzzing"))]
                if self.options.panic_on_error {
                    panic!("{err}");
                }
            }
            Step::End => {
                debug!(offset = self.cursor, "end of document");
                self.mode = Mode::Done;
            }
            Step::Incomplete(pending) => {
                trace!(offset = self.cursor, pending = pending.len(), "need more input");
            }
            _ => {}
        }
        step
    }

    fn step_inner(&mut self, window: Window<'_>) -> Step {
        loop {
            if let Some(token) = self.token.take() {
                return self.resume(window, token);
            }
            self.skip_whitespace(window);
            let Some(byte) = window.byte_at(self.cursor) else {
                return self.at_end_of_view(window);
            };
            match self.mode {
                Mode::AtTop | Mode::ExpectValue => return self.begin_value(window, byte),
                Mode::ArrayOpen => {
                    if byte == b']' {
                        return self.close_container(Frame::Array);
                    }
                    return self.begin_value(window, byte);
                }
                Mode::ObjectOpen | Mode::ExpectKey => match byte {
                    b'"' => return self.begin_string(window, true),
                    b'}' if self.mode == Mode::ObjectOpen => {
                        return self.close_container(Frame::Object);
                    }
                    _ => return self.reject(window, self.mode.expected()),
                },
                Mode::ExpectColon => {
                    if byte != b':' {
                        return self.reject(window, self.mode.expected());
                    }
                    self.cursor += 1;
                    self.mode = Mode::ExpectValue;
                }
                Mode::ExpectCommaOrObjectEnd => match byte {
                    b',' => {
                        self.cursor += 1;
                        self.mode = Mode::ExpectKey;
                    }
                    b'}' => return self.close_container(Frame::Object),
                    _ => return self.reject(window, self.mode.expected()),
                },
                Mode::ExpectCommaOrArrayEnd => match byte {
                    b',' => {
                        self.cursor += 1;
                        self.mode = Mode::ExpectValue;
                    }
                    b']' => return self.close_container(Frame::Array),
                    _ => return self.reject(window, self.mode.expected()),
                },
                Mode::AfterTop => return self.reject(window, self.mode.expected()),
                Mode::Done => return Step::End,
            }
        }
    }

    fn skip_whitespace(&mut self, window: Window<'_>) {
        let mut pos = self.cursor - window.origin;
        while let Some(&byte) = window.bytes.get(pos) {
            match byte {
                b' ' | b'\t' | b'\r' => {}
                b'\n' => {
                    self.line += 1;
                    self.line_start = window.origin + pos + 1;
                }
                _ => break,
            }
            pos += 1;
        }
        self.cursor = window.origin + pos;
    }

    fn at_end_of_view(&mut self, window: Window<'_>) -> Step {
        match self.mode {
            Mode::AfterTop | Mode::Done => Step::End,
            Mode::AtTop if self.closed && self.options.allow_multiple_values => Step::End,
            mode if self.closed => self.reject(window, mode.expected()),
            _ => Step::Incomplete(self.cursor..self.cursor),
        }
    }

    fn begin_value(&mut self, window: Window<'_>, byte: u8) -> Step {
        match byte {
            b'{' => {
                self.stack.push(Frame::Object);
                self.cursor += 1;
                self.mode = Mode::ObjectOpen;
                Step::StartObject
            }
            b'[' => {
                self.stack.push(Frame::Array);
                self.cursor += 1;
                self.mode = Mode::ArrayOpen;
                Step::StartArray
            }
            b'"' => self.begin_string(window, false),
            b'-' | b'0'..=b'9' => {
                let token = Token {
                    start: self.cursor,
                    lexeme: Lexeme::Number(NumberLexer::new()),
                };
                self.resume(window, token)
            }
            _ => match ExpectedLiteralBuffer::new(byte) {
                Some(literal) => {
                    let token = Token {
                        start: self.cursor,
                        lexeme: Lexeme::Literal(literal),
                    };
                    self.cursor += 1;
                    self.resume(window, token)
                }
                None => self.reject(window, self.mode.expected()),
            },
        }
    }

    fn begin_string(&mut self, window: Window<'_>, key: bool) -> Step {
        let token = Token {
            start: self.cursor,
            lexeme: Lexeme::String {
                lexer: StringLexer::new(),
                key,
            },
        };
        self.cursor += 1;
        self.resume(window, token)
    }

    /// Runs the token's lexer over the rest of the window.
    fn resume(&mut self, window: Window<'_>, mut token: Token) -> Step {
        let follow = self.follow_set();
        let mut pos = self.cursor - window.origin;
        let lexed = match &mut token.lexeme {
            Lexeme::String { lexer, .. } => lexer.lex(
                window.bytes,
                &mut pos,
                token.start + 1 - window.origin,
                &mut self.scratch,
            ),
            Lexeme::Number(lexer) => lexer.lex(window.bytes, &mut pos, follow),
            Lexeme::Literal(literal) => literal.lex(window.bytes, &mut pos),
        };
        self.cursor = window.origin + pos;

        match lexed {
            Lexed::Complete => self.finish(token),
            Lexed::Reject(expected) => self.reject(window, expected),
            Lexed::NeedMore if self.closed => {
                if matches!(&token.lexeme, Lexeme::Number(lexer) if lexer.can_end()) {
                    self.finish(token)
                } else {
                    self.reject(window, token.lexeme.expected())
                }
            }
            Lexed::NeedMore => {
                let pending = token.start..self.cursor;
                self.token = Some(token);
                Step::Incomplete(pending)
            }
        }
    }

    fn finish(&mut self, token: Token) -> Step {
        let span = token.start..self.cursor;
        let step = match token.lexeme {
            Lexeme::String { lexer, key } => {
                let text = if lexer.escaped() {
                    // the scratch allocation is reused by the next escaped string
                    let decoded = self.scratch.clone();
                    self.scratch.clear();
                    Text::Owned(decoded)
                } else {
                    Text::Span(span.start + 1..span.end - 1)
                };
                if key {
                    self.mode = Mode::ExpectColon;
                    return Step::Key(text);
                }
                Step::Value(ScalarKind::String, text)
            }
            Lexeme::Number(lexer) => Step::Value(lexer.kind(), Text::Span(span)),
            Lexeme::Literal(literal) => Step::Value(literal.kind(), Text::Span(span)),
        };
        self.after_value();
        step
    }

    fn close_container(&mut self, frame: Frame) -> Step {
        let popped = self.stack.pop();
        debug_assert_eq!(popped, Some(frame));
        self.cursor += 1;
        self.after_value();
        match frame {
            Frame::Object => Step::EndObject,
            Frame::Array => Step::EndArray,
        }
    }

    fn after_value(&mut self) {
        self.mode = match self.stack.last() {
            Some(Frame::Object) => Mode::ExpectCommaOrObjectEnd,
            Some(Frame::Array) => Mode::ExpectCommaOrArrayEnd,
            None if self.options.allow_multiple_values => Mode::AtTop,
            None => Mode::AfterTop,
        };
    }

    /// What may follow a value in the current container.
    fn follow_set(&self) -> ExpectedSet {
        match self.stack.last() {
            Some(Frame::Object) => Mode::ExpectCommaOrObjectEnd.expected(),
            Some(Frame::Array) => Mode::ExpectCommaOrArrayEnd.expected(),
            None => Mode::AfterTop.expected(),
        }
    }

    /// A syntax error at the cursor.
    fn reject(&self, window: Window<'_>, expected: ExpectedSet) -> Step {
        let at = self.cursor;
        let radius = self.options.context_radius;
        let lo = at.saturating_sub(radius).max(window.origin);
        let hi = at.saturating_add(radius).min(window.end());
        Step::Error(SyntaxError {
            expected,
            found: window.byte_at(at),
            offset: at,
            line: self.line,
            column: at - self.line_start + 1,
            context: BString::from(window.slice(lo..hi)),
        })
    }
}

/// Iterator returned by [`Decoder::events`].
#[derive(Debug)]
pub struct Events<'d, 'a> {
    decoder: &'d mut Decoder,
    input: &'a [u8],
    finished: bool,
}

impl<'a> Iterator for Events<'_, 'a> {
    type Item = Result<Event<'a>, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.decoder.advance(self.input) {
            Event::Incomplete(_) => {
                self.finished = true;
                None
            }
            Event::SyntaxError(err) => {
                self.finished = true;
                Some(Err(err))
            }
            Event::End => {
                self.finished = true;
                Some(Ok(Event::End))
            }
            event => Some(Ok(event)),
        }
    }
}

impl FusedIterator for Events<'_, '_> {}
