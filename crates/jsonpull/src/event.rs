use alloc::borrow::Cow;
use core::fmt;

use bstr::{BStr, ByteSlice};

use crate::decoder::SyntaxError;

/// One discrete result of advancing a [`Decoder`](crate::Decoder).
///
/// Byte payloads borrow from the input view passed to the decoder whenever
/// possible. They stay valid until that buffer is mutated; use
/// [`Event::into_owned`] to keep an event past that point.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "value"))]
pub enum Event<'a> {
    /// `{`
    StartObject,
    /// `}`
    EndObject,
    /// `[`
    StartArray,
    /// `]`
    EndArray,
    /// An object key, with escapes resolved and quotes removed.
    Key(#[cfg_attr(feature = "serde", serde(serialize_with = "serialize_cow"))] Cow<'a, BStr>),
    /// A scalar value.
    Value(Scalar<'a>),
    /// More input is required. Carries the bytes of the in-flight token
    /// consumed so far (empty between tokens).
    Incomplete(#[cfg_attr(feature = "serde", serde(serialize_with = "serialize_cow"))] Cow<'a, BStr>),
    /// The top-level value is complete and only whitespace followed.
    End,
    /// The input is not valid JSON. Terminal for the decoder.
    SyntaxError(SyntaxError),
}

impl<'a> Event<'a> {
    /// Builds a [`Event::Key`] borrowing `key`.
    #[must_use]
    pub fn key(key: &'a str) -> Self {
        Event::Key(Cow::Borrowed(key.as_bytes().as_bstr()))
    }

    /// Returns `true` for [`Event::Incomplete`].
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Event::Incomplete(_))
    }

    /// Returns `true` for the terminal events, [`Event::End`] and
    /// [`Event::SyntaxError`].
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::End | Event::SyntaxError(_))
    }

    /// Copies any borrowed bytes so the event no longer refers to the input.
    #[must_use]
    pub fn into_owned(self) -> Event<'static> {
        match self {
            Event::StartObject => Event::StartObject,
            Event::EndObject => Event::EndObject,
            Event::StartArray => Event::StartArray,
            Event::EndArray => Event::EndArray,
            Event::Key(key) => Event::Key(Cow::Owned(key.into_owned())),
            Event::Value(scalar) => Event::Value(scalar.into_owned()),
            Event::Incomplete(partial) => Event::Incomplete(Cow::Owned(partial.into_owned())),
            Event::End => Event::End,
            Event::SyntaxError(err) => Event::SyntaxError(err),
        }
    }
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::StartObject => f.write_str("StartObject"),
            Event::EndObject => f.write_str("EndObject"),
            Event::StartArray => f.write_str("StartArray"),
            Event::EndArray => f.write_str("EndArray"),
            Event::Key(key) => write!(f, "Key {:?}", &**key),
            Event::Value(scalar) => write!(f, "Value {scalar}"),
            Event::Incomplete(partial) => write!(f, "Incomplete {:?}", &**partial),
            Event::End => f.write_str("End"),
            Event::SyntaxError(err) => write!(f, "SyntaxError: {err}"),
        }
    }
}

/// Lexical class of a [`Scalar`].
///
/// Numbers are reported as `Integer` (no fraction and no exponent) or `Float`
/// so consumers can pick a conversion; the decoder never converts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScalarKind {
    /// A string; bytes are the unescaped content.
    String,
    /// A number without fraction or exponent.
    Integer,
    /// A number with a fraction or an exponent.
    Float,
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
}

impl ScalarKind {
    /// Returns `true` for [`ScalarKind::Integer`] and [`ScalarKind::Float`].
    #[must_use]
    pub fn is_number(self) -> bool {
        matches!(self, ScalarKind::Integer | ScalarKind::Float)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScalarKind::String => "string",
            ScalarKind::Integer => "integer",
            ScalarKind::Float => "float",
            ScalarKind::True => "true",
            ScalarKind::False => "false",
            ScalarKind::Null => "null",
        })
    }
}

/// A scalar JSON value: its lexical kind and its bytes.
///
/// For strings the bytes are the decoded content without quotes. For
/// numbers, booleans and `null` they are the literal span as it appeared in
/// the input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Scalar<'a> {
    /// Lexical kind.
    pub kind: ScalarKind,
    /// Content bytes.
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_cow"))]
    pub bytes: Cow<'a, BStr>,
}

impl<'a> Scalar<'a> {
    /// Builds a scalar borrowing `bytes`.
    #[must_use]
    pub fn new(kind: ScalarKind, bytes: &'a [u8]) -> Self {
        Scalar {
            kind,
            bytes: Cow::Borrowed(bytes.as_bstr()),
        }
    }

    /// A string scalar with the given (unescaped) content.
    #[must_use]
    pub fn string(content: &'a str) -> Self {
        Scalar::new(ScalarKind::String, content.as_bytes())
    }

    /// A number scalar from its literal text.
    #[must_use]
    pub fn number(literal: &'a str) -> Self {
        let kind = if literal.bytes().any(|b| matches!(b, b'.' | b'e' | b'E')) {
            ScalarKind::Float
        } else {
            ScalarKind::Integer
        };
        Scalar::new(kind, literal.as_bytes())
    }

    /// `true` or `false`.
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        if value {
            Scalar::new(ScalarKind::True, b"true")
        } else {
            Scalar::new(ScalarKind::False, b"false")
        }
    }

    /// `null`
    #[must_use]
    pub fn null() -> Self {
        Scalar::new(ScalarKind::Null, b"null")
    }

    /// The scalar's bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_ref()
    }

    /// The scalar's bytes as UTF-8.
    ///
    /// # Errors
    ///
    /// The decoder only produces valid UTF-8, so this fails only for scalars
    /// built by hand from arbitrary bytes.
    pub fn to_str(&self) -> Result<&str, bstr::Utf8Error> {
        self.bytes.to_str()
    }

    /// Copies borrowed bytes.
    #[must_use]
    pub fn into_owned(self) -> Scalar<'static> {
        Scalar {
            kind: self.kind,
            bytes: Cow::Owned(self.bytes.into_owned()),
        }
    }
}

impl fmt::Display for Scalar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.kind, &*self.bytes)
    }
}

#[cfg(feature = "serde")]
#[allow(clippy::ptr_arg)]
fn serialize_cow<S: serde::Serializer>(bytes: &Cow<'_, BStr>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&bytes.to_str_lossy())
}
