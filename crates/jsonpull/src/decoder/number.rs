use super::{ExpectedSet, Lexed, TokenKind};
use crate::event::ScalarKind;

/// Position inside an RFC 8259 number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberState {
    Begin,
    /// After the leading `-`.
    Sign,
    /// A lone leading `0`; no further integer digits may follow.
    Zero,
    Integer,
    /// After `.`; a digit must follow.
    Point,
    Fraction,
    /// After `e` or `E`.
    Exponent,
    ExponentSign,
    ExponentDigits,
}

impl NumberState {
    /// States in which the number could end here.
    fn is_terminal(self) -> bool {
        matches!(
            self,
            NumberState::Zero
                | NumberState::Integer
                | NumberState::Fraction
                | NumberState::ExponentDigits
        )
    }
}

/// Lexes a number without converting it. The token span is the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct NumberLexer {
    state: NumberState,
}

impl NumberLexer {
    pub(super) fn new() -> Self {
        NumberLexer {
            state: NumberState::Begin,
        }
    }

    /// Whether the bytes consumed so far form a complete number.
    pub(super) fn can_end(&self) -> bool {
        self.state.is_terminal()
    }

    pub(super) fn kind(&self) -> ScalarKind {
        match self.state {
            NumberState::Zero | NumberState::Integer => ScalarKind::Integer,
            _ => ScalarKind::Float,
        }
    }

    /// What may follow the bytes consumed so far.
    pub(super) fn expected(&self) -> ExpectedSet {
        match self.state {
            NumberState::Exponent => {
                ExpectedSet::of(&[TokenKind::Digit, TokenKind::ExponentSign])
            }
            NumberState::Zero => ExpectedSet::of(&[TokenKind::DecimalPoint, TokenKind::Exponent]),
            NumberState::Integer => ExpectedSet::of(&[
                TokenKind::Digit,
                TokenKind::DecimalPoint,
                TokenKind::Exponent,
            ]),
            NumberState::Fraction => ExpectedSet::of(&[TokenKind::Digit, TokenKind::Exponent]),
            _ => ExpectedSet::of(&[TokenKind::Digit]),
        }
    }

    /// Consumes number bytes from `input[*pos..]`.
    ///
    /// The number completes at the first byte that cannot continue it, which
    /// is left unconsumed. `follow` is what the enclosing container accepts
    /// after a value and is only used to describe a leading-zero error.
    pub(super) fn lex(&mut self, input: &[u8], pos: &mut usize, follow: ExpectedSet) -> Lexed {
        use NumberState as S;

        while let Some(&byte) = input.get(*pos) {
            let next = match (self.state, byte) {
                (S::Begin, b'-') => S::Sign,
                (S::Begin | S::Sign, b'0') => S::Zero,
                (S::Begin | S::Sign | S::Integer, b'0'..=b'9') => S::Integer,
                (S::Zero | S::Integer, b'.') => S::Point,
                (S::Point | S::Fraction, b'0'..=b'9') => S::Fraction,
                (S::Zero | S::Integer | S::Fraction, b'e' | b'E') => S::Exponent,
                (S::Exponent, b'+' | b'-') => S::ExponentSign,
                (S::Exponent | S::ExponentSign | S::ExponentDigits, b'0'..=b'9') => {
                    S::ExponentDigits
                }
                (S::Zero, b'0'..=b'9') => return Lexed::Reject(self.expected().union(follow)),
                (state, _) if state.is_terminal() => return Lexed::Complete,
                _ => return Lexed::Reject(self.expected()),
            };
            self.state = next;
            *pos += 1;
        }
        Lexed::NeedMore
    }
}
