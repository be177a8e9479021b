#![allow(missing_docs, dead_code)]

pub const ORIGINAL: &str = r#"
{
    "id": "call_7",
    "tool": "search",
    "args": {
        "query": "rust \"pull\" parser",
        "limit": 10,
        "filters": ["lang:en", "year>=2020"],
        "exact": false
    },
    "score": -0.25e1,
    "tags": [],
    "meta": {
        "retry": null,
        "note": "café"
    }
}"#;

// A tool-call payload cut at awkward places: inside keys and values, inside
// an escaped quote, inside a unicode escape, inside literals and numbers.
#[rustfmt::skip]
pub const STREAM: [&str; 11] = [
    r#"{"id":"ca"#,                                  // inside a string value
    r#"ll_7","tool":"sea"#,                          // string end -> key -> string
    r#"rch","args":{"query":"rust \"pu"#,            // inside a string after an escape
    r#"ll\" parser","limit":1"#,                     // ends inside a number
    r#"0,"filters":["lang:en","#,                    // number end -> array, ends on ','
    r#""year>=2020"],"exact":fa"#,                   // ends inside a literal
    r#"lse},"score":-0.2"#,                          // ends inside a fraction
    r#"5e1,"tags":[],"meta":{"retry":n"#,            // exponent, empty array, literal start
    r#"ull,"note":"caf\u00"#,                        // ends inside a unicode escape
    r#"e9"}"#,                                       // escape end -> string end -> object end
    r#"}"#,                                          // closes the top-level object
];
