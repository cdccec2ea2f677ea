//! Round-trip and idempotence laws: reparse what we emit, emit what we
//! reparse, and keep emitted lines within the configured width.

use yamline::{
    parse, parse_document, stringify, LogLevel, ParseOptions, StringifyOptions, Value,
};

fn lenient() -> ParseOptions {
    ParseOptions {
        log_level: LogLevel::Silent,
        ..Default::default()
    }
}

/// stringify ∘ parse ∘ stringify == stringify
fn assert_stringify_idempotent(value: &Value) {
    let opts = StringifyOptions::default();
    let once = stringify(value, &opts).expect("first stringify");
    let reparsed = parse(&once, &ParseOptions::default()).expect("reparse");
    let twice = stringify(&reparsed, &opts).expect("second stringify");
    assert_eq!(once, twice, "not idempotent for {value:?}");
}

/// parse ∘ stringify == identity at the plain-value level
fn assert_value_round_trip(value: &Value) {
    let out = stringify(value, &StringifyOptions::default()).expect("stringify");
    assert!(
        out.ends_with('\n') && !out.ends_with("\n\n"),
        "bad trailing newline in {out:?}"
    );
    let back = parse(&out, &ParseOptions::default()).expect("parse");
    assert_eq!(&back, value, "round trip changed value; emitted {out:?}");
}

fn sample_values() -> Vec<Value> {
    vec![
        Value::Null,
        Value::Bool(true),
        Value::Int(0),
        Value::Int(-42),
        Value::Float(3.25),
        Value::Str(String::new()),
        Value::Str("plain".into()),
        Value::Str("with spaces".into()),
        Value::Str(": leading colon".into()),
        Value::Str("trailing space ".into()),
        Value::Str("a: b".into()),
        Value::Str("null".into()),
        Value::Str("123".into()),
        Value::Str("line one\nline two".into()),
        Value::Str("ends with newline\n".into()),
        Value::Str("# not a comment".into()),
        Value::Seq(vec![]),
        Value::Seq(vec![Value::Int(1), Value::Str("two".into()), Value::Null]),
        Value::Map(vec![]),
        Value::Map(vec![
            ("a".into(), Value::Int(1)),
            ("b".into(), Value::Seq(vec![Value::Bool(false)])),
            (
                "c".into(),
                Value::Map(vec![("nested".into(), Value::Str("deep".into()))]),
            ),
        ]),
        Value::Map(vec![(Value::Int(7), Value::Str("int key".into()))]),
    ]
}

#[test]
fn values_round_trip() {
    for value in sample_values() {
        assert_value_round_trip(&value);
    }
}

#[test]
fn stringify_is_idempotent() {
    for value in sample_values() {
        assert_stringify_idempotent(&value);
    }
}

#[test]
fn plain_strings_never_coerce() {
    // Any control-free string must survive a stringify/parse cycle
    let cases = [
        "yes", "no", "on", "off", "~", "true", "0x2a", "0o17", "1e3", ".inf", ".nan",
        "2001-12-15", "- dash", "? question", "[bracket", "{brace", "#hash", "a # b",
        "ends:", "a:b", "@at", "`tick",
    ];
    for case in cases {
        let value = Value::Str(case.to_string());
        let out = stringify(&value, &StringifyOptions::default()).expect("stringify");
        let back = parse(&out, &ParseOptions::default()).expect("parse");
        assert_eq!(back, value, "coerced {case:?} via {out:?}");
    }
}

#[test]
fn document_round_trip_preserves_styles() {
    let sources = [
        "key: value\n",
        "key: \"quoted\"\n",
        "key: 'single'\n",
        "- one\n- two\n",
        "[ 1, 2 ]\n",
        "{ a: 1, b: 2 }\n",
        "a:\n  b: 1\n  c: 2\n",
        "a:\n  - x\n  - y\n",
        "key: |-\n  one\n  two\n",
        "key: |\n  kept\n",
        "key: >-\n  folded text here\n",
        "a: &x 1\nb: *x\n",
        "# leading\nkey: value # trailing\n",
        "~: null\n",
    ];
    for source in sources {
        let doc = parse_document(source, &ParseOptions::default());
        assert!(doc.errors.is_empty(), "{source:?}: {:?}", doc.errors);
        let out = doc
            .to_string_with(&StringifyOptions::default())
            .expect("stringify");
        assert_eq!(out, source, "style not preserved");
    }
}

#[test]
fn document_round_trip_preserves_semantics() {
    let sources = [
        "a: 1\nb:\n  - x\n  - { inline: flow }\nc: |\n  block\n",
        "---\nfirst: doc\n",
        "%YAML 1.2\n---\nversioned: true\n",
        "? complex\n: value\n",
        "nested:\n  deeply:\n    - 1\n    - 2\n",
    ];
    for source in sources {
        let doc = parse_document(source, &lenient());
        assert!(doc.errors.is_empty(), "{source:?}: {:?}", doc.errors);
        let native = doc.to_native(100).expect("native");
        let out = doc
            .to_string_with(&StringifyOptions::default())
            .expect("stringify");
        let doc2 = parse_document(&out, &lenient());
        assert!(doc2.errors.is_empty(), "reparse of {out:?}: {:?}", doc2.errors);
        assert_eq!(
            doc2.to_native(100).expect("native"),
            native,
            "semantics changed through {out:?}"
        );
    }
}

#[test]
fn emitted_lines_respect_width() {
    let long_text = "the quick brown fox jumps over the lazy dog ".repeat(8);
    let value = Value::Map(vec![
        ("text".into(), Value::Str(long_text.trim_end().to_string())),
        (
            "multi".into(),
            Value::Str("first long paragraph of folded content here\nsecond line".into()),
        ),
    ]);
    let opts = StringifyOptions::default();
    let out = stringify(&value, &opts).expect("stringify");
    for line in out.lines() {
        let has_break_opportunity = line.trim_start().contains(' ');
        assert!(
            line.len() <= opts.line_width || !has_break_opportunity,
            "overlong foldable line: {line:?}"
        );
    }
    // And the folded output still parses back to the same value
    let back = parse(&out, &ParseOptions::default()).expect("parse");
    assert_eq!(back, value);
}

#[test]
fn folded_block_preserves_more_indented_lines() {
    let value = Value::Str("paragraph one\n  indented code\nparagraph two".into());
    let out = stringify(&value, &StringifyOptions::default()).expect("stringify");
    let back = parse(&out, &ParseOptions::default()).expect("parse");
    assert_eq!(back, value, "more-indented content changed via {out:?}");
}

#[test]
fn multi_document_streams_round_trip() {
    let source = "---\nfirst: 1\n---\nsecond: 2\n";
    let docs = yamline::parse_all_documents(source, &ParseOptions::default());
    assert_eq!(docs.len(), 2);
    let mut out = String::new();
    for doc in &docs {
        out.push_str(
            &doc.to_string_with(&StringifyOptions::default())
                .expect("stringify"),
        );
    }
    let docs2 = yamline::parse_all_documents(&out, &ParseOptions::default());
    assert_eq!(docs2.len(), 2);
    assert_eq!(
        docs2[0].to_native(100).expect("native"),
        docs[0].to_native(100).expect("native")
    );
    assert_eq!(
        docs2[1].to_native(100).expect("native"),
        docs[1].to_native(100).expect("native")
    );
}
