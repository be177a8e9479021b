#![expect(missing_docs)]

mod common;

use std::io::Cursor;

use jsonpull::{DecoderOptions, Event, JsonStream, ReadError, ReadStream, Scalar, TokenKind};
use rstest::rstest;

fn one_shot(input: &[u8]) -> Vec<Event<'static>> {
    let mut stream = JsonStream::default();
    stream.feed(input);
    stream.close();
    let mut events = Vec::new();
    loop {
        let event = stream.next_event().into_owned();
        let terminal = event.is_terminal();
        events.push(event);
        if terminal {
            return events;
        }
    }
}

#[rstest]
fn reader_matches_in_memory_decoding(#[values(1, 2, 3, 7, 64, 8192)] chunk_size: usize) {
    let input = common::ORIGINAL.as_bytes();
    let events: Vec<_> = ReadStream::new(Cursor::new(input))
        .with_chunk_size(chunk_size)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(events, one_shot(input));
}

#[test]
fn memory_stays_bounded_on_long_input() {
    let mut input = String::from("[");
    for i in 0..10_000 {
        if i > 0 {
            input.push(',');
        }
        input.push_str(&format!(r#"{{"i":{i},"s":"value number {i}"}}"#));
    }
    input.push(']');

    let mut stream = ReadStream::new(Cursor::new(input.into_bytes())).with_chunk_size(16);
    let mut values = 0;
    loop {
        match stream.next_event().unwrap() {
            Event::Value(_) => values += 1,
            Event::End => break,
            _ => {}
        }
        assert!(stream.stream().buffer().len() <= 64);
    }
    assert_eq!(values, 20_000);
}

#[test]
fn json_lines_from_a_reader() {
    let input = "{\"n\":1}\n{\"n\":2}\n\n3\n";
    let options = DecoderOptions {
        allow_multiple_values: true,
        ..Default::default()
    };
    let values: Vec<_> = ReadStream::with_options(Cursor::new(input), options)
        .with_chunk_size(5)
        .filter_map(|event| match event.unwrap() {
            Event::Value(scalar) => Some(scalar),
            _ => None,
        })
        .collect();
    assert_eq!(
        values,
        [Scalar::number("1"), Scalar::number("2"), Scalar::number("3")]
    );
}

#[test]
fn truncated_reader_input_fails_with_position() {
    let input = "{\n  \"a\": [1, 2";
    let err = ReadStream::new(Cursor::new(input))
        .with_chunk_size(4)
        .find_map(Result::err)
        .unwrap();
    let ReadError::Syntax(err) = err else {
        panic!("expected a syntax error, got {err}");
    };
    assert_eq!(err.line, 2);
    assert_eq!(err.column, 13);
    assert_eq!(err.found, None);
    assert!(err.expects(TokenKind::EndArray));
}

#[test]
fn reader_is_returned_after_decoding() {
    let mut stream = ReadStream::new(Cursor::new(b"true   ".to_vec()));
    assert_eq!(
        stream.next_event().unwrap(),
        Event::Value(Scalar::boolean(true))
    );
    assert_eq!(stream.next_event().unwrap(), Event::End);
    let reader = stream.into_inner();
    assert!(reader.position() > 0);
}
