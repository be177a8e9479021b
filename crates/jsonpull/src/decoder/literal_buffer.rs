use super::{ExpectedSet, Lexed, TokenKind};
use crate::event::ScalarKind;

/// What happened after feeding one more byte into the literal matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LiteralStep {
    /// Byte matched, but the literal is not finished yet.
    NeedMore,
    /// Byte matched and it was the last one of the literal.
    Done,
    /// Byte did not match the expected one.
    Reject,
}

/// Remaining bytes of `true`, `false` or `null` while one is being matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct ExpectedLiteralBuffer {
    rest: &'static [u8],
    kind: ScalarKind,
}

impl ExpectedLiteralBuffer {
    /// Starts matching after the first byte (`n`, `t` or `f`).
    pub(super) fn new(first: u8) -> Option<Self> {
        let (rest, kind): (&'static [u8], _) = match first {
            b'n' => (b"ull", ScalarKind::Null),
            b't' => (b"rue", ScalarKind::True),
            b'f' => (b"alse", ScalarKind::False),
            _ => return None,
        };
        Some(ExpectedLiteralBuffer { rest, kind })
    }

    pub(super) fn kind(&self) -> ScalarKind {
        self.kind
    }

    pub(super) fn step(&mut self, byte: u8) -> LiteralStep {
        match self.rest.split_first() {
            Some((&expected, rest)) if expected == byte => {
                self.rest = rest;
                if rest.is_empty() {
                    LiteralStep::Done
                } else {
                    LiteralStep::NeedMore
                }
            }
            _ => LiteralStep::Reject,
        }
    }

    /// The literal this matcher is waiting to finish.
    pub(super) fn expected(&self) -> ExpectedSet {
        ExpectedSet::EMPTY.with(match self.kind {
            ScalarKind::True => TokenKind::True,
            ScalarKind::False => TokenKind::False,
            _ => TokenKind::Null,
        })
    }

    /// Consumes bytes from `input[*pos..]` until the literal is matched, a
    /// byte mismatches, or the input runs out.
    pub(super) fn lex(&mut self, input: &[u8], pos: &mut usize) -> Lexed {
        while let Some(&byte) = input.get(*pos) {
            match self.step(byte) {
                LiteralStep::NeedMore => *pos += 1,
                LiteralStep::Done => {
                    *pos += 1;
                    return Lexed::Complete;
                }
                LiteralStep::Reject => return Lexed::Reject(self.expected()),
            }
        }
        Lexed::NeedMore
    }
}
