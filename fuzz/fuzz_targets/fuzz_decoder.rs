#![no_main]
use std::cell::RefCell;

use arbitrary::Arbitrary;
use jsonpull::{DecoderOptions, Event, JsonStream, TokenKind};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde_json::{Map, Value};

const HEADER: usize = 5; // 1 flag byte + 4-byte split seed

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

// JSON whitespace plus a few near misses the decoder must reject.
static WS_TABLE: &[&[u8]] = &[
    b" ",
    b"\t",
    b"\n",
    b"\r",
    b"\x0b",
    b"\x0c",
    "\u{a0}".as_bytes(),
    "\u{2028}".as_bytes(),
];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

/// Mostly emits well-formed documents so the fuzzer spends its time deep in
/// the state machine rather than failing on the first byte.
fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || max_size <= HEADER || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.next_u32() as u8 & 0x03);
        data[1..5].copy_from_slice(&with_rng(|rng| rng.next_u32().to_le_bytes()));

        let mut prefix = HEADER;
        while prefix < size.max(HEADER + 1) && prefix < max_size {
            let limit = max_size - prefix;
            prefix += append_whitespace(&mut data[prefix..], limit);
            let limit = max_size - prefix;
            prefix += append_value(&mut data[prefix..], size, limit);
        }
        prefix
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

fn append_whitespace(buf: &mut [u8], limit: usize) -> usize {
    with_rng(|rng| {
        if limit == 0 {
            return 0;
        }
        let count = rng.random_range(1..=limit.min(4));
        let mut written = 0;
        for _ in 0..count {
            // near misses are rare so most documents stay valid
            let w = if rng.random_ratio(1, 50) {
                WS_TABLE[rng.random_range(4..WS_TABLE.len())]
            } else {
                WS_TABLE[rng.random_range(0..4)]
            };
            if written + w.len() > limit {
                break;
            }
            buf[written..written + w.len()].copy_from_slice(w);
            written += w.len();
        }
        written
    })
}

fn append_value(data: &mut [u8], size: usize, limit: usize) -> usize {
    if limit == 0 {
        return 0;
    }
    let value = loop {
        let s = with_rng(|rng| rng.random_range(size / 2..=size * 2).min(limit));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(value) = ArbitraryValue::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
            break value;
        }
    };

    let serialized = serde_json::to_vec(&value.0).expect("serializing a generated value");
    let len = serialized.len().min(limit);
    data[..len].copy_from_slice(&serialized[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        let value = match u.choose_index(22)? {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                Value::Number(
                    serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?,
                )
            }
            3 => Value::from(u.arbitrary::<i64>()?),
            4..=11 => Value::String(u.arbitrary()?),
            12..=16 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            _ => {
                let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                Value::Object(Map::from_iter(m.into_iter().map(|(k, v)| (k, v.0))))
            }
        };
        Ok(ArbitraryValue(value))
    }
}

/// Feeds `chunks` through a stream and returns every non-`Incomplete` event,
/// with error contexts blanked since they depend on what was buffered.
fn decode<'c>(chunks: impl IntoIterator<Item = &'c [u8]>, options: DecoderOptions) -> Vec<Event<'static>> {
    let mut stream = JsonStream::new(options);
    let mut events = Vec::new();
    let pull = |stream: &mut JsonStream, events: &mut Vec<Event<'static>>| loop {
        let mut event = stream.next_event().into_owned();
        if event.is_incomplete() {
            return false;
        }
        if let Event::SyntaxError(err) = &mut event {
            err.context.clear();
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
    assert!(pull(&mut stream, &mut events), "closed stream did not finish");
    events
}

fn decoder(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }
    let flags = data[0];
    let split_seed = u32::from_le_bytes([data[1], data[2], data[3], data[4]]) as usize;
    let data = &data[HEADER..];

    let options = DecoderOptions {
        allow_multiple_values: flags & 1 != 0,
        context_radius: if flags & 2 != 0 { 0 } else { 16 },
        panic_on_error: false,
    };

    let whole = decode([data], options);
    let chunked = decode(split_into_chunks(data, split_seed), options);

    // serde_json limits depth and number range, so only acceptance carries over
    if !options.allow_multiple_values && serde_json::from_slice::<Value>(data).is_ok() {
        assert_eq!(whole, chunked, "chunking changed the event sequence");
        assert_eq!(whole.last(), Some(&Event::End), "rejected a document serde_json accepts");
    } else {
        assert_agrees_until_chunked_end(&whole, &chunked);
    }
}

/// A single top-level value ends as soon as a chunk runs out after it, so
/// trailing bytes in a later chunk are never seen. That is the only way the
/// chunked run may differ: it ends early with `End` where the one-shot run
/// rejects the trailing content.
fn assert_agrees_until_chunked_end(whole: &[Event<'static>], chunked: &[Event<'static>]) {
    if whole == chunked {
        return;
    }
    let (Some((Event::End, value)), Some((Event::SyntaxError(err), whole_value))) =
        (chunked.split_last(), whole.split_last())
    else {
        panic!("chunking changed the event sequence: {whole:?} vs {chunked:?}");
    };
    assert_eq!(value, whole_value, "chunking changed the event sequence");
    assert!(
        err.expects(TokenKind::EndOfInput),
        "chunked run ended before an error inside the value: {err}"
    );
}

fuzz_target!(|data: &[u8]| decoder(data));

/// Splits `data` into chunks of pseudo-random size derived from `seed`.
/// Boundaries ignore UTF-8 on purpose.
fn split_into_chunks(data: &[u8], seed: usize) -> Vec<&[u8]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut state = seed | 1;
    while start < data.len() {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let size = state % (data.len() - start) + 1;
        chunks.push(&data[start..start + size]);
        start += size;
    }
    chunks
}
