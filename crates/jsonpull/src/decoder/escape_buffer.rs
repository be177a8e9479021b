//! Accumulates the four hexadecimal digits of a `\uXXXX` escape.
//!
//! [`UnicodeEscapeBuffer`] only yields UTF-16 code units. Pairing surrogates
//! and rejecting lone ones is left to the string lexer, which knows what came
//! before and what must follow.

/// The byte fed to [`UnicodeEscapeBuffer::feed`] was not an ASCII hex digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct NotHexDigit;

/// Up to four hex digits (`0-9`, `A-F`, `a-f`) of a unicode escape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct UnicodeEscapeBuffer {
    value: u16,
    len: u8,
}

impl UnicodeEscapeBuffer {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Feeds one digit.
    ///
    /// Returns `Ok(None)` while fewer than four digits have been seen and
    /// `Ok(Some(unit))` on the fourth, after which the buffer starts over.
    pub(super) fn feed(&mut self, byte: u8) -> Result<Option<u16>, NotHexDigit> {
        let digit = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            _ => return Err(NotHexDigit),
        };
        self.value = (self.value << 4) | u16::from(digit);
        self.len += 1;
        if self.len == 4 {
            let unit = self.value;
            *self = Self::new();
            Ok(Some(unit))
        } else {
            Ok(None)
        }
    }
}
