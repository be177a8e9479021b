use core::fmt;

use bstr::BString;
use thiserror::Error;

/// A class of token the decoder can expect at some position.
///
/// Reported inside [`SyntaxError::expected`]. The declaration order is the
/// order in which an [`ExpectedSet`] lists its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum TokenKind {
    /// `{`
    StartObject,
    /// `}`
    EndObject,
    /// `[`
    StartArray,
    /// `]`
    EndArray,
    /// A quoted object key.
    Key,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// A quoted string value.
    String,
    /// A number value.
    Number,
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// The closing `"` of a string.
    Quote,
    /// Any unescaped string character (U+0020 and above).
    StringByte,
    /// One of `"` `\` `/` `b` `f` `n` `r` `t` `u` after a backslash.
    Escape,
    /// A hexadecimal digit inside `\uXXXX`.
    HexDigit,
    /// A `\uDC00`–`\uDFFF` escape completing a surrogate pair.
    LowSurrogate,
    /// A `\uXXXX` escape that is not a lone low surrogate.
    UnicodeScalar,
    /// A UTF-8 continuation byte.
    Utf8Continuation,
    /// A decimal digit.
    Digit,
    /// `.` starting a fraction.
    DecimalPoint,
    /// `e` or `E` starting an exponent.
    Exponent,
    /// `+` or `-` after an exponent marker.
    ExponentSign,
    /// The end of the input (only whitespace may follow).
    EndOfInput,
}

impl TokenKind {
    const ALL: [TokenKind; 24] = [
        TokenKind::StartObject,
        TokenKind::EndObject,
        TokenKind::StartArray,
        TokenKind::EndArray,
        TokenKind::Key,
        TokenKind::Colon,
        TokenKind::Comma,
        TokenKind::String,
        TokenKind::Number,
        TokenKind::True,
        TokenKind::False,
        TokenKind::Null,
        TokenKind::Quote,
        TokenKind::StringByte,
        TokenKind::Escape,
        TokenKind::HexDigit,
        TokenKind::LowSurrogate,
        TokenKind::UnicodeScalar,
        TokenKind::Utf8Continuation,
        TokenKind::Digit,
        TokenKind::DecimalPoint,
        TokenKind::Exponent,
        TokenKind::ExponentSign,
        TokenKind::EndOfInput,
    ];

    /// Short human-readable description.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::StartObject => "`{`",
            TokenKind::EndObject => "`}`",
            TokenKind::StartArray => "`[`",
            TokenKind::EndArray => "`]`",
            TokenKind::Key => "key",
            TokenKind::Colon => "`:`",
            TokenKind::Comma => "`,`",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Null => "`null`",
            TokenKind::Quote => "`\"`",
            TokenKind::StringByte => "string character",
            TokenKind::Escape => "escape character",
            TokenKind::HexDigit => "hex digit",
            TokenKind::LowSurrogate => "low surrogate escape",
            TokenKind::UnicodeScalar => "unicode scalar escape",
            TokenKind::Utf8Continuation => "UTF-8 continuation byte",
            TokenKind::Digit => "digit",
            TokenKind::DecimalPoint => "`.`",
            TokenKind::Exponent => "exponent",
            TokenKind::ExponentSign => "exponent sign",
            TokenKind::EndOfInput => "end of input",
        }
    }

    const fn bit(self) -> u32 {
        1 << self as u8
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// An ordered set of [`TokenKind`]s.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ExpectedSet(u32);

impl ExpectedSet {
    /// The empty set.
    pub const EMPTY: ExpectedSet = ExpectedSet(0);

    /// Everything that may start a value.
    pub const VALUE: ExpectedSet = ExpectedSet::of(&[
        TokenKind::StartObject,
        TokenKind::StartArray,
        TokenKind::String,
        TokenKind::Number,
        TokenKind::True,
        TokenKind::False,
        TokenKind::Null,
    ]);

    /// Builds a set from a list of kinds.
    #[must_use]
    pub const fn of(kinds: &[TokenKind]) -> ExpectedSet {
        let mut bits = 0;
        let mut i = 0;
        while i < kinds.len() {
            bits |= kinds[i].bit();
            i += 1;
        }
        ExpectedSet(bits)
    }

    /// Returns a copy of the set with `kind` added.
    #[must_use]
    pub const fn with(self, kind: TokenKind) -> ExpectedSet {
        ExpectedSet(self.0 | kind.bit())
    }

    /// Union of two sets.
    #[must_use]
    pub const fn union(self, other: ExpectedSet) -> ExpectedSet {
        ExpectedSet(self.0 | other.0)
    }

    /// Whether `kind` is a member.
    #[must_use]
    pub const fn contains(self, kind: TokenKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Number of members.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set has no members.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in declaration order of [`TokenKind`].
    pub fn iter(self) -> impl Iterator<Item = TokenKind> {
        TokenKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl FromIterator<TokenKind> for ExpectedSet {
    fn from_iter<T: IntoIterator<Item = TokenKind>>(iter: T) -> Self {
        iter.into_iter().fold(ExpectedSet::EMPTY, ExpectedSet::with)
    }
}

impl fmt::Debug for ExpectedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for ExpectedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.len();
        if len == 0 {
            return f.write_str("nothing");
        }
        for (i, kind) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(if i + 1 == len { " or " } else { ", " })?;
            }
            f.write_str(kind.describe())?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ExpectedSet {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(self.iter())
    }
}

/// Malformed input. Fatal for the decoder that reported it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[error("expected {expected}, found {what} at {line}:{column} near `{context}`", what = describe_found(.found))]
pub struct SyntaxError {
    /// Token kinds that would have been accepted at `offset`.
    pub expected: ExpectedSet,
    /// The offending byte, or `None` at the end of a closed input.
    pub found: Option<u8>,
    /// Logical byte offset of the offending byte.
    pub offset: usize,
    /// 1-based line of `offset`.
    pub line: usize,
    /// 1-based byte column of `offset`.
    pub column: usize,
    /// Bytes surrounding `offset`.
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_lossy"))]
    pub context: BString,
}

impl SyntaxError {
    /// Whether `kind` would have been accepted.
    #[must_use]
    pub fn expects(&self, kind: TokenKind) -> bool {
        self.expected.contains(kind)
    }
}

struct Found(Option<u8>);

#[allow(clippy::ref_option, clippy::trivially_copy_pass_by_ref)]
fn describe_found(found: &Option<u8>) -> Found {
    Found(*found)
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => f.write_str("end of input"),
            Some(b) if b.is_ascii_graphic() || b == b' ' => write!(f, "`{}`", b as char),
            Some(b) => write!(f, "byte 0x{b:02X}"),
        }
    }
}

#[cfg(feature = "serde")]
fn serialize_lossy<S: serde::Serializer>(bytes: &BString, s: S) -> Result<S::Ok, S::Error> {
    use bstr::ByteSlice;
    s.serialize_str(&bytes.to_str_lossy())
}
