//! Schema preset behavior through the public API: resolution differences
//! between failsafe/json/core/yaml-1.1, merge keys, and custom tags.

use yamline::{
    parse, parse_document, LogLevel, ParseOptions, Resolved, SchemaName, TagDef, Value,
};

fn with_schema(schema: SchemaName) -> ParseOptions {
    ParseOptions {
        schema: Some(schema),
        log_level: LogLevel::Silent,
        ..Default::default()
    }
}

#[test]
fn failsafe_keeps_everything_stringy() {
    let value = parse("[true, 42, null, x]", &with_schema(SchemaName::Failsafe)).expect("value");
    assert_eq!(
        value,
        Value::Seq(vec![
            Value::Str("true".into()),
            Value::Str("42".into()),
            Value::Str("null".into()),
            Value::Str("x".into()),
        ])
    );
}

#[test]
fn json_is_strict_about_spellings() {
    let value = parse(
        "[true, True, 42, 0x2a, null, NULL]",
        &with_schema(SchemaName::Json),
    )
    .expect("value");
    assert_eq!(
        value,
        Value::Seq(vec![
            Value::Bool(true),
            Value::Str("True".into()),
            Value::Int(42),
            Value::Str("0x2a".into()),
            Value::Null,
            Value::Str("NULL".into()),
        ])
    );
}

#[test]
fn core_resolves_12_scalars() {
    let value = parse(
        "[True, 0x2a, 0o17, .inf, -.Inf, 1e3, yes]",
        &with_schema(SchemaName::Core),
    )
    .expect("value");
    assert_eq!(
        value,
        Value::Seq(vec![
            Value::Bool(true),
            Value::Int(42),
            Value::Int(15),
            Value::Float(f64::INFINITY),
            Value::Float(f64::NEG_INFINITY),
            Value::Float(1000.0),
            Value::Str("yes".into()),
        ])
    );
}

#[test]
fn v11_extended_scalars() {
    let value = parse(
        "[yes, off, 052, 0b110, 1_000, 2001-12-15]",
        &with_schema(SchemaName::Yaml11),
    )
    .expect("value");
    assert_eq!(
        value,
        Value::Seq(vec![
            Value::Bool(true),
            Value::Bool(false),
            Value::Int(42),
            Value::Int(6),
            Value::Int(1000),
            Value::Timestamp("2001-12-15".into()),
        ])
    );
}

#[test]
fn merge_keys_fold_in_defaults() {
    let source = "\
defaults: &defaults\n  adapter: postgres\n  host: localhost\n\
development:\n  <<: *defaults\n  database: dev\n\
production:\n  <<: *defaults\n  host: db.example.com\n";
    let value = parse(source, &with_schema(SchemaName::Yaml11)).expect("value");

    let development = value.get("development").expect("development");
    assert_eq!(
        development.get("adapter"),
        Some(&Value::Str("postgres".into()))
    );
    assert_eq!(development.get("database"), Some(&Value::Str("dev".into())));

    // An own entry beats the merged default
    let production = value.get("production").expect("production");
    assert_eq!(
        production.get("host"),
        Some(&Value::Str("db.example.com".into()))
    );
    assert_eq!(
        production.get("adapter"),
        Some(&Value::Str("postgres".into()))
    );
}

#[test]
fn merge_of_sequence_of_mappings() {
    let source = "\
a: &a\n  x: 1\nb: &b\n  y: 2\nmerged:\n  <<: [*a, *b]\n  z: 3\n";
    let value = parse(source, &with_schema(SchemaName::Yaml11)).expect("value");
    let merged = value.get("merged").expect("merged");
    assert_eq!(merged.get("x"), Some(&Value::Int(1)));
    assert_eq!(merged.get("y"), Some(&Value::Int(2)));
    assert_eq!(merged.get("z"), Some(&Value::Int(3)));
}

#[test]
fn merge_is_inert_outside_v11() {
    let value = parse(
        "a: &a\n  x: 1\nm:\n  <<: *a\n",
        &with_schema(SchemaName::Core),
    )
    .expect("value");
    let m = value.get("m").expect("m");
    assert_eq!(m.get("x"), None);
    assert!(m.get("<<").is_some());
}

#[test]
fn omap_and_set_collections() {
    let omap = parse(
        "!!omap\n- a: 1\n- b: 2\n",
        &with_schema(SchemaName::Yaml11),
    )
    .expect("omap");
    assert_eq!(
        omap,
        Value::Map(vec![
            (Value::Str("a".into()), Value::Int(1)),
            (Value::Str("b".into()), Value::Int(2)),
        ])
    );

    let set = parse("!!set\n? a\n? b\n", &with_schema(SchemaName::Yaml11)).expect("set");
    assert_eq!(
        set,
        Value::Seq(vec![Value::Str("a".into()), Value::Str("b".into())])
    );
}

#[test]
fn version_directive_overrides_default_schema() {
    // Without the directive, 1.2 core rules: `yes` stays a string
    let value = parse("yes", &ParseOptions::default()).expect("value");
    assert_eq!(value, Value::Str("yes".into()));

    let value = parse("%YAML 1.1\n---\nyes\n", &ParseOptions::default()).expect("value");
    assert_eq!(value, Value::Bool(true));
}

fn resolve_celsius(text: &str) -> Option<Resolved> {
    let n = text.strip_suffix("C")?;
    n.parse::<f64>().ok().map(|c| Resolved::plain(Value::Float(c)))
}

#[test]
fn custom_tags_extend_a_preset() {
    let celsius = TagDef {
        tag: "!celsius",
        default: false,
        resolve: resolve_celsius,
        identify: |_| false,
    };
    let options = ParseOptions {
        custom_tags: vec![celsius],
        ..Default::default()
    };
    let value = parse("temp: !celsius 21.5C\n", &options).expect("value");
    assert_eq!(value.get("temp"), Some(&Value::Float(21.5)));
}

#[test]
fn unknown_tags_warn_and_keep_strings() {
    let doc = parse_document("!unknown x\n", &ParseOptions::default());
    assert!(doc.errors.is_empty());
    assert!(!doc.warnings.is_empty());
    assert_eq!(doc.to_native(100).expect("native"), Value::Str("x".into()));
}

#[test]
fn tag_mismatch_is_an_error() {
    let doc = parse_document("!!int not-a-number\n", &ParseOptions::default());
    assert!(doc
        .errors
        .iter()
        .any(|e| e.code == yamline::ErrorCode::TagResolveFailed));
}
