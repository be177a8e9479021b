mod parse_bad;

use alloc::{string::String, vec::Vec};

use bstr::ByteSlice;
use serde_json::{Map, Value};

use crate::{DecoderOptions, Event, JsonStream, ScalarKind};

/// Splits `payload` into `parts` nearly equal chunks. Boundaries may fall
/// inside UTF-8 sequences and escapes on purpose.
///
/// # Panics
///
/// Panics if `parts` is zero.
pub(crate) fn produce_chunks(payload: &[u8], parts: usize) -> Vec<&[u8]> {
    assert!(parts > 0);
    let chunk_size = payload.len().div_ceil(parts).max(1);
    payload.chunks(chunk_size).collect()
}

/// Feeds `chunks` one after another, compacting between chunks, then closes
/// the stream. Returns every event except [`Event::Incomplete`].
pub(crate) fn decode_chunks<'c>(
    chunks: impl IntoIterator<Item = &'c [u8]>,
    options: DecoderOptions,
) -> Vec<Event<'static>> {
    let mut stream = JsonStream::new(options);
    let mut events = Vec::new();
    let pull = |stream: &mut JsonStream, events: &mut Vec<Event<'static>>| loop {
        let event = stream.next_event().into_owned();
        if event.is_incomplete() {
            return false;
        }
        let terminal = event.is_terminal();
        events.push(event);
        if terminal {
            return true;
        }
    };
    for chunk in chunks {
        stream.feed(chunk);
        if pull(&mut stream, &mut events) {
            return events;
        }
        stream.compact();
    }
    stream.close();
    let finished = pull(&mut stream, &mut events);
    assert!(finished, "a closed stream must end or fail");
    events
}

/// Decodes `input` in one piece.
pub(crate) fn decode(input: &[u8]) -> Vec<Event<'static>> {
    decode_chunks([input], DecoderOptions::default())
}

enum Open {
    Array(Vec<Value>),
    Object(Map<String, Value>, Option<String>),
}

/// Rebuilds the top-level values described by `events`.
///
/// # Panics
///
/// Panics on a syntax error or on an event sequence no decoder would emit.
pub(crate) fn rebuild(events: &[Event<'_>]) -> Vec<Value> {
    let mut stack: Vec<Open> = Vec::new();
    let mut values = Vec::new();
    let mut place = |stack: &mut Vec<Open>, value: Value| match stack.last_mut() {
        None => values.push(value),
        Some(Open::Array(items)) => items.push(value),
        Some(Open::Object(map, key)) => {
            let key = key.take().expect("value without key");
            map.insert(key, value);
        }
    };
    for event in events {
        match event {
            Event::StartObject => stack.push(Open::Object(Map::new(), None)),
            Event::StartArray => stack.push(Open::Array(Vec::new())),
            Event::EndObject | Event::EndArray => {
                let value = match stack.pop().expect("unbalanced end") {
                    Open::Array(items) => Value::Array(items),
                    Open::Object(map, _) => Value::Object(map),
                };
                place(&mut stack, value);
            }
            Event::Key(key) => match stack.last_mut() {
                Some(Open::Object(_, slot)) => {
                    *slot = Some(key.to_str().expect("keys are UTF-8").into());
                }
                _ => panic!("key outside of an object"),
            },
            Event::Value(scalar) => {
                let value = match scalar.kind {
                    ScalarKind::String => Value::String(scalar.to_str().unwrap().into()),
                    ScalarKind::Integer | ScalarKind::Float => {
                        serde_json::from_slice(scalar.as_bytes()).unwrap()
                    }
                    ScalarKind::True => Value::Bool(true),
                    ScalarKind::False => Value::Bool(false),
                    ScalarKind::Null => Value::Null,
                };
                place(&mut stack, value);
            }
            Event::Incomplete(_) | Event::End => {}
            Event::SyntaxError(err) => panic!("unexpected syntax error: {err}"),
        }
    }
    assert!(stack.is_empty(), "unclosed containers");
    values
}

#[test]
fn produce_chunks_example() {
    let payload = br#"["foo","bar"]"#;
    let chunks = produce_chunks(payload, 5);
    assert_eq!(
        chunks,
        [&b"[\"f"[..], &b"oo\""[..], &b",\"b"[..], &b"ar\""[..], &b"]"[..]]
    );
    assert_eq!(chunks.concat(), payload);
    assert_eq!(produce_chunks(b"", 3), Vec::<&[u8]>::new());
}

#[test]
fn stream_example_rebuilds_to_the_original() {
    let input = br#"{"a":1,"b":[2,3]}"#;
    let expected: Value = serde_json::from_slice(input).unwrap();
    for parts in 1..=input.len() {
        let events = decode_chunks(produce_chunks(input, parts), DecoderOptions::default());
        assert_eq!(rebuild(&events), [expected.clone()], "{parts} parts");
    }
}
