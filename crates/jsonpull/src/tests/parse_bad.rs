use alloc::{string::ToString, vec::Vec};

use rstest::rstest;

use super::{decode, decode_chunks};
use crate::{DecoderOptions, Event, SyntaxError, TokenKind};

fn syntax_error(input: &[u8]) -> SyntaxError {
    let events = decode(input);
    match events.last() {
        Some(Event::SyntaxError(err)) => err.clone(),
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[rstest]
#[case::leading_zero(br#"{"a":01}"#, 6, TokenKind::DecimalPoint)]
#[case::negative_leading_zero(b"-01", 2, TokenKind::Exponent)]
#[case::trailing_comma_in_array(b"[1,2,]", 5, TokenKind::Number)]
#[case::trailing_comma_in_object(br#"{"a":1,}"#, 7, TokenKind::Key)]
#[case::comma_first(b"[,]", 1, TokenKind::EndArray)]
#[case::bare_point(b"[1.]", 3, TokenKind::Digit)]
#[case::point_first(b"[.5]", 1, TokenKind::Number)]
#[case::empty_exponent(b"[1e]", 3, TokenKind::Digit)]
#[case::signed_empty_exponent(b"[1e+]", 4, TokenKind::Digit)]
#[case::lone_minus(b"[-]", 2, TokenKind::Digit)]
#[case::plus_sign(b"[+1]", 1, TokenKind::Number)]
#[case::control_byte(b"[\"a\x01\"]", 3, TokenKind::StringByte)]
#[case::raw_newline(b"[\"a\nb\"]", 3, TokenKind::Quote)]
#[case::unknown_escape(br#"["\q"]"#, 3, TokenKind::Escape)]
#[case::short_unicode_escape(br#"["\u12x4"]"#, 6, TokenKind::HexDigit)]
#[case::lone_high_surrogate(br#"["\ud800"]"#, 8, TokenKind::LowSurrogate)]
#[case::high_surrogate_then_bmp(br#"["\ud800\u0041"]"#, 13, TokenKind::LowSurrogate)]
#[case::lone_low_surrogate(br#"["\udc00"]"#, 7, TokenKind::UnicodeScalar)]
#[case::invalid_lead_byte(b"[\"\xff\"]", 2, TokenKind::StringByte)]
#[case::overlong_encoding(b"[\"\xc0\x80\"]", 2, TokenKind::StringByte)]
#[case::truncated_sequence(b"[\"\xc3(\"]", 3, TokenKind::Utf8Continuation)]
#[case::encoded_surrogate(b"[\"\xed\xa0\x80\"]", 3, TokenKind::Utf8Continuation)]
#[case::beyond_max_code_point(b"[\"\xf4\x90\x80\x80\"]", 3, TokenKind::Utf8Continuation)]
#[case::missing_colon(br#"{"a" 1}"#, 5, TokenKind::Colon)]
#[case::unquoted_key(b"{a:1}", 1, TokenKind::Key)]
#[case::number_key(b"{1:2}", 1, TokenKind::Key)]
#[case::missing_comma(b"[1 2]", 3, TokenKind::Comma)]
#[case::mismatched_close(b"[1}", 2, TokenKind::EndArray)]
#[case::trailing_garbage(br#"{"a":1}}"#, 7, TokenKind::EndOfInput)]
#[case::second_value(b"1 2", 2, TokenKind::EndOfInput)]
#[case::misspelled_literal(b"[nul1]", 4, TokenKind::Null)]
#[case::capitalized_literal(b"True", 0, TokenKind::True)]
#[case::single_quotes(b"['a']", 1, TokenKind::String)]
#[case::comment(b"[1 /* c */]", 3, TokenKind::EndArray)]
fn rejects_malformed_input(#[case] input: &[u8], #[case] offset: usize, #[case] kind: TokenKind) {
    let err = syntax_error(input);
    assert_eq!(err.offset, offset, "{err}");
    assert!(err.expects(kind), "{err}");
    assert_eq!(err.found, input.get(offset).copied());
}

#[rstest]
#[case::empty(b"", TokenKind::Number)]
#[case::whitespace_only(b" \n ", TokenKind::Number)]
#[case::open_object(b"{", TokenKind::Key)]
#[case::open_array(b"[1,", TokenKind::Number)]
#[case::after_key(br#"{"a""#, TokenKind::Colon)]
#[case::unterminated_string(br#"["abc"#, TokenKind::Quote)]
#[case::inside_escape(br#"["\u00"#, TokenKind::HexDigit)]
#[case::inside_utf8(b"[\"\xe2\x82", TokenKind::Utf8Continuation)]
#[case::inside_literal(b"fals", TokenKind::False)]
#[case::exponent_sign(b"1e-", TokenKind::Digit)]
fn closing_an_unfinished_document_fails(#[case] input: &[u8], #[case] kind: TokenKind) {
    let err = syntax_error(input);
    assert_eq!(err.found, None);
    assert_eq!(err.offset, input.len());
    assert!(err.expects(kind), "{err}");
}

/// The context snippet depends on how much input was buffered when the error
/// surfaced, so it is left out of the comparison.
fn without_context(mut events: Vec<Event<'static>>) -> Vec<Event<'static>> {
    if let Some(Event::SyntaxError(err)) = events.last_mut() {
        err.context.clear();
    }
    events
}

#[rstest]
#[case(br#"{"a":01}"#)]
#[case(b"[\"\xe2\x82(\"]")]
#[case(br#"["\ud800\n"]"#)]
#[case(br#"{"a":[1,2,]}"#)]
#[case(b"[1e+x]")]
fn errors_do_not_depend_on_chunking(#[case] input: &[u8]) {
    let whole = without_context(decode(input));
    assert!(matches!(whole.last(), Some(Event::SyntaxError(_))));
    for at in 0..=input.len() {
        let (head, tail) = input.split_at(at);
        let split = without_context(decode_chunks([head, tail], DecoderOptions::default()));
        assert_eq!(split, whole, "split at byte {at}");
    }
}

#[test]
fn trailing_byte_in_a_later_chunk_is_not_seen() {
    let whole = without_context(decode(b"{}\x0b"));
    assert_eq!(whole[..2], [Event::StartObject, Event::EndObject]);
    let Some(Event::SyntaxError(err)) = whole.last() else {
        panic!("expected a syntax error, got {whole:?}");
    };
    assert!(err.expects(TokenKind::EndOfInput));
    assert_eq!(err.offset, 2);

    let chunked = decode_chunks([&b"{}"[..], &b"\x0b"[..]], DecoderOptions::default());
    assert_eq!(chunked, [Event::StartObject, Event::EndObject, Event::End]);
}

/// Chunking only differs from one-shot decoding when the chunked run already
/// ended before the trailing bytes arrived.
#[rstest]
#[case(b"{} x")]
#[case(b"[1]\x0c")]
#[case(b"\"s\"\xc2\xa0")]
#[case(b"null,")]
fn chunking_can_only_end_early_on_trailing_content(#[case] input: &[u8]) {
    let whole = without_context(decode(input));
    let Some((Event::SyntaxError(err), value)) = whole.split_last() else {
        panic!("expected a syntax error, got {whole:?}");
    };
    assert!(err.expects(TokenKind::EndOfInput));
    for at in 0..=input.len() {
        let (head, tail) = input.split_at(at);
        let split = without_context(decode_chunks([head, tail], DecoderOptions::default()));
        if split != whole {
            assert_eq!(split.split_last(), Some((&Event::End, value)), "split at byte {at}");
            assert!(at <= err.offset, "split at byte {at}");
        }
    }
}

#[test]
fn error_message_points_at_the_offending_byte() {
    let err = syntax_error(br#"{"a":1x}"#);
    assert_eq!(
        err.to_string(),
        r#"expected `}` or `,`, found `x` at 1:7 near `{"a":1x}`"#
    );
}
