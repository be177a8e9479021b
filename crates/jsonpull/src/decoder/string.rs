use alloc::vec::Vec;

use super::{
    ExpectedSet, Lexed, TokenKind,
    escape_buffer::{NotHexDigit, UnicodeEscapeBuffer},
};

/// Position inside a quoted string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringState {
    Plain,
    /// After `\`.
    Escape,
    /// Inside `\uXXXX`.
    Unicode(UnicodeEscapeBuffer),
    /// After a high surrogate escape; `\` must follow.
    LowBackslash { high: u16 },
    /// After a high surrogate escape and `\`; `u` must follow.
    LowU { high: u16 },
    /// Inside the `\uXXXX` that must be a low surrogate.
    LowUnicode {
        high: u16,
        digits: UnicodeEscapeBuffer,
    },
    /// Inside a multi-byte UTF-8 sequence. The next byte must lie in
    /// `lo..=hi`; `remaining` counts the continuation bytes still missing.
    Utf8 { remaining: u8, lo: u8, hi: u8 },
}

/// Lexes string content after the opening quote.
///
/// Content is validated as it goes. Until the first escape the decoded value
/// is the raw span between the quotes; from then on decoded bytes are written
/// to the caller's scratch buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct StringLexer {
    state: StringState,
    escaped: bool,
}

/// Continuation byte rules for a UTF-8 lead byte, rejecting overlong forms,
/// surrogate code points and anything above U+10FFFF.
fn utf8_lead(byte: u8) -> Option<StringState> {
    let (remaining, lo, hi) = match byte {
        0xC2..=0xDF => (1, 0x80, 0xBF),
        0xE0 => (2, 0xA0, 0xBF),
        0xE1..=0xEC | 0xEE..=0xEF => (2, 0x80, 0xBF),
        0xED => (2, 0x80, 0x9F),
        0xF0 => (3, 0x90, 0xBF),
        0xF1..=0xF3 => (3, 0x80, 0xBF),
        0xF4 => (3, 0x80, 0x8F),
        _ => return None,
    };
    Some(StringState::Utf8 { remaining, lo, hi })
}

fn unescape(byte: u8) -> Option<u8> {
    Some(match byte {
        b'"' => b'"',
        b'\\' => b'\\',
        b'/' => b'/',
        b'b' => 0x08,
        b'f' => 0x0C,
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        _ => return None,
    })
}

fn push_code_point(scratch: &mut Vec<u8>, code: u32) -> bool {
    let Some(ch) = char::from_u32(code) else {
        return false;
    };
    let mut utf8 = [0; 4];
    scratch.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
    true
}

fn reject(kinds: &[TokenKind]) -> Lexed {
    Lexed::Reject(ExpectedSet::of(kinds))
}

impl StringLexer {
    pub(super) fn new() -> Self {
        StringLexer {
            state: StringState::Plain,
            escaped: false,
        }
    }

    /// Whether the decoded content lives in the scratch buffer rather than
    /// in the input span.
    pub(super) fn escaped(&self) -> bool {
        self.escaped
    }

    /// What may come next.
    pub(super) fn expected(&self) -> ExpectedSet {
        ExpectedSet::of(match self.state {
            StringState::Plain => &[TokenKind::Quote, TokenKind::StringByte],
            StringState::Escape => &[TokenKind::Escape],
            StringState::Unicode(_) => &[TokenKind::HexDigit],
            StringState::LowBackslash { .. }
            | StringState::LowU { .. }
            | StringState::LowUnicode { .. } => &[TokenKind::LowSurrogate],
            StringState::Utf8 { .. } => &[TokenKind::Utf8Continuation],
        })
    }

    /// Consumes string bytes from `input[*pos..]`, including the closing
    /// quote. `content_start` is the index of the first byte after the
    /// opening quote; it must still be inside `input` while no escape has
    /// been seen.
    ///
    /// On rejection `*pos` is left on the offending byte.
    pub(super) fn lex(
        &mut self,
        input: &[u8],
        pos: &mut usize,
        content_start: usize,
        scratch: &mut Vec<u8>,
    ) -> Lexed {
        while let Some(&byte) = input.get(*pos) {
            match self.state {
                StringState::Plain => match byte {
                    b'"' => {
                        *pos += 1;
                        return Lexed::Complete;
                    }
                    b'\\' => {
                        if !self.escaped {
                            self.escaped = true;
                            scratch.clear();
                            scratch.extend_from_slice(&input[content_start..*pos]);
                        }
                        self.state = StringState::Escape;
                        *pos += 1;
                    }
                    0x00..=0x1F => return reject(&[TokenKind::Quote, TokenKind::StringByte]),
                    0x20..=0x7F => {
                        let run = input[*pos..]
                            .iter()
                            .position(|&b| b == b'"' || b == b'\\' || !(0x20..0x80).contains(&b))
                            .unwrap_or(input.len() - *pos);
                        if self.escaped {
                            scratch.extend_from_slice(&input[*pos..*pos + run]);
                        }
                        *pos += run;
                    }
                    lead => {
                        let Some(next) = utf8_lead(lead) else {
                            return reject(&[TokenKind::StringByte]);
                        };
                        if self.escaped {
                            scratch.push(lead);
                        }
                        self.state = next;
                        *pos += 1;
                    }
                },
                StringState::Utf8 { remaining, lo, hi } => {
                    if !(lo..=hi).contains(&byte) {
                        return reject(&[TokenKind::Utf8Continuation]);
                    }
                    if self.escaped {
                        scratch.push(byte);
                    }
                    self.state = if remaining == 1 {
                        StringState::Plain
                    } else {
                        StringState::Utf8 {
                            remaining: remaining - 1,
                            lo: 0x80,
                            hi: 0xBF,
                        }
                    };
                    *pos += 1;
                }
                StringState::Escape => {
                    if byte == b'u' {
                        self.state = StringState::Unicode(UnicodeEscapeBuffer::new());
                    } else if let Some(decoded) = unescape(byte) {
                        scratch.push(decoded);
                        self.state = StringState::Plain;
                    } else {
                        return reject(&[TokenKind::Escape]);
                    }
                    *pos += 1;
                }
                StringState::Unicode(mut digits) => match digits.feed(byte) {
                    Err(NotHexDigit) => return reject(&[TokenKind::HexDigit]),
                    Ok(None) => {
                        self.state = StringState::Unicode(digits);
                        *pos += 1;
                    }
                    Ok(Some(unit @ 0xD800..=0xDBFF)) => {
                        self.state = StringState::LowBackslash { high: unit };
                        *pos += 1;
                    }
                    Ok(Some(0xDC00..=0xDFFF)) => return reject(&[TokenKind::UnicodeScalar]),
                    Ok(Some(unit)) => {
                        if !push_code_point(scratch, u32::from(unit)) {
                            return reject(&[TokenKind::UnicodeScalar]);
                        }
                        self.state = StringState::Plain;
                        *pos += 1;
                    }
                },
                StringState::LowBackslash { high } => {
                    if byte != b'\\' {
                        return reject(&[TokenKind::LowSurrogate]);
                    }
                    self.state = StringState::LowU { high };
                    *pos += 1;
                }
                StringState::LowU { high } => {
                    if byte != b'u' {
                        return reject(&[TokenKind::LowSurrogate]);
                    }
                    self.state = StringState::LowUnicode {
                        high,
                        digits: UnicodeEscapeBuffer::new(),
                    };
                    *pos += 1;
                }
                StringState::LowUnicode { high, mut digits } => match digits.feed(byte) {
                    Err(NotHexDigit) => return reject(&[TokenKind::HexDigit]),
                    Ok(None) => {
                        self.state = StringState::LowUnicode { high, digits };
                        *pos += 1;
                    }
                    Ok(Some(low @ 0xDC00..=0xDFFF)) => {
                        let code = 0x1_0000
                            + ((u32::from(high) - 0xD800) << 10)
                            + (u32::from(low) - 0xDC00);
                        if !push_code_point(scratch, code) {
                            return reject(&[TokenKind::LowSurrogate]);
                        }
                        self.state = StringState::Plain;
                        *pos += 1;
                    }
                    Ok(Some(_)) => return reject(&[TokenKind::LowSurrogate]),
                },
            }
        }
        Lexed::NeedMore
    }
}
