//! The composer: raw syntax trees + a schema → typed documents.
//!
//! This stage owns everything the lexer and parser deliberately left raw:
//! escape decoding in double-quoted scalars, line folding of multiline
//! flow scalars, block scalar indentation and chomping, tag shorthand
//! resolution through `%TAG` handles, and plain-scalar resolution against
//! the schema's ordered tag definitions.

use crate::error::{ErrorCode, YamlError, YamlWarning};
use crate::lexer::{BlockHeader, Chomping};
use crate::node::{
    Alias, Document, Mapping, Node, Pair, Scalar, ScalarStyle, Sequence, YamlVersion,
};
use crate::options::ParseOptions;
use crate::schema::{uri, Resolved, Schema};
use crate::span::Span;
use crate::syntax::{SyntaxContent, SyntaxDocument, SyntaxNode};
use crate::value::Value;

/// Parse and compose every document in `input`.
pub(crate) fn compose_source(input: &str, options: &ParseOptions) -> Vec<Document> {
    let (sdocs, errors) = crate::parser::parse_source(input, options.strict);

    // Distribute stage errors to the document whose content they fall in
    let mut docs: Vec<Document> = sdocs
        .iter()
        .map(|sdoc| compose_document(sdoc, options))
        .collect();

    if docs.is_empty() {
        if errors.is_empty() {
            return docs;
        }
        let mut doc = empty_document(options);
        doc.errors = errors;
        return vec![doc];
    }

    let starts: Vec<usize> = sdocs
        .iter()
        .map(|d| d.root.as_ref().map_or(0, |r| r.span.start))
        .collect();
    for error in errors {
        let idx = starts
            .iter()
            .rposition(|&start| error.span.start >= start)
            .unwrap_or(0);
        docs[idx].errors.push(error);
    }
    docs
}

/// An empty document under the options' default version and schema.
pub(crate) fn empty_document(options: &ParseOptions) -> Document {
    let version = options.version;
    let schema = Schema::new(options.schema_for(version), &options.custom_tags);
    Document::new(schema, version)
}

struct Ctx<'a> {
    schema: &'a Schema,
    tag_handles: &'a [(String, String)],
    errors: &'a mut Vec<YamlError>,
    warnings: &'a mut Vec<YamlWarning>,
}

/// Compose one parsed document.
pub(crate) fn compose_document(sdoc: &SyntaxDocument, options: &ParseOptions) -> Document {
    let version = sdoc
        .version
        .as_deref()
        .and_then(YamlVersion::from_str_opt)
        .unwrap_or(options.version);
    let schema = Schema::new(options.schema_for(version), &options.custom_tags);

    let mut doc = Document::new(schema, version);
    doc.explicit_version = sdoc.version.is_some();
    doc.tag_handles = sdoc.tag_handles.clone();
    doc.directives_end_marker = sdoc.directives_end_marker;
    doc.comment_before = sdoc.comment_before.clone();
    doc.comment = sdoc.comment.clone();
    doc.errors = sdoc.errors.clone();

    if let Some(root) = &sdoc.root {
        let mut errors = std::mem::take(&mut doc.errors);
        let mut warnings = std::mem::take(&mut doc.warnings);
        let schema = doc.schema.clone();
        let mut ctx = Ctx {
            schema: &schema,
            tag_handles: &doc.tag_handles,
            errors: &mut errors,
            warnings: &mut warnings,
        };
        doc.contents = Some(compose_node(root, &mut ctx));
        doc.errors = errors;
        doc.warnings = warnings;
    }
    doc
}

/// A resolved tag reference.
#[derive(Debug, Clone, PartialEq)]
enum TagRef {
    /// The non-specific `!` tag: force the kind's default (string)
    NonSpecific,
    Uri(String),
}

/// Resolve a raw tag spelling (`!!str`, `!h!x`, `!<uri>`, `!local`)
/// against the built-in and `%TAG`-declared handles.
fn resolve_tag_ref(raw: &str, at: Span, ctx: &mut Ctx) -> Option<TagRef> {
    if raw == "!" {
        return Some(TagRef::NonSpecific);
    }
    if let Some(inner) = raw.strip_prefix("!<") {
        let uri = inner.strip_suffix('>').unwrap_or(inner);
        return Some(TagRef::Uri(uri.to_string()));
    }

    let lookup = |handle: &str| -> Option<String> {
        ctx.tag_handles
            .iter()
            .rev()
            .find(|(h, _)| h == handle)
            .map(|(_, p)| p.clone())
    };

    if let Some(suffix) = raw.strip_prefix("!!") {
        let prefix = lookup("!!").unwrap_or_else(|| uri::PREFIX.to_string());
        return Some(TagRef::Uri(format!("{prefix}{suffix}")));
    }
    // A named handle: `!h!suffix`
    if let Some(rest) = raw.strip_prefix('!') {
        if let Some(bang) = rest.find('!') {
            let handle = format!("!{}!", &rest[..bang]);
            let suffix = &rest[bang + 1..];
            return match lookup(&handle) {
                Some(prefix) => Some(TagRef::Uri(format!("{prefix}{suffix}"))),
                None => {
                    ctx.errors.push(
                        YamlError::new(ErrorCode::TagResolveFailed, at)
                            .with_message(format!("tag handle {handle} is not declared")),
                    );
                    None
                }
            };
        }
        // `!local`, possibly re-prefixed by a %TAG for `!`
        return match lookup("!") {
            Some(prefix) => Some(TagRef::Uri(format!("{prefix}{rest}"))),
            None => Some(TagRef::Uri(format!("!{rest}"))),
        };
    }
    None
}

/// Compose one syntax node into a typed node.
fn compose_node(snode: &SyntaxNode, ctx: &mut Ctx) -> Node {
    let tag_ref = snode
        .tag
        .as_ref()
        .and_then(|(raw, _)| resolve_tag_ref(raw, snode.span, ctx));

    let node = match &snode.content {
        SyntaxContent::Scalar {
            style,
            text,
            header,
        } => {
            let scalar = compose_scalar(*style, text, *header, tag_ref, snode.span, ctx);
            Node::scalar(scalar)
        }
        SyntaxContent::Empty => {
            let mut scalar = Scalar::new(Value::Null);
            if let Some(TagRef::Uri(uri)) = tag_ref {
                scalar.props.tag = Some(uri);
            }
            Node::scalar(scalar)
        }
        SyntaxContent::Seq { flow, items } => {
            let mut seq = Sequence {
                flow: *flow,
                ..Default::default()
            };
            for item in items {
                seq.items.push(compose_node(item, ctx));
            }
            if let Some(TagRef::Uri(uri)) = tag_ref {
                seq.props.tag = Some(uri);
            }
            Node::sequence(seq)
        }
        SyntaxContent::Map { flow, entries } => {
            let mut map = Mapping {
                flow: *flow,
                ..Default::default()
            };
            let mut seen_keys: Vec<Value> = Vec::new();
            for entry in entries {
                let key = entry.key.as_ref().map(|k| compose_node(k, ctx));
                let value = entry.value.as_ref().map(|v| compose_node(v, ctx));
                if let Some(key_value) = key.as_ref().and_then(Node::scalar_value) {
                    if seen_keys.contains(&key_value) {
                        let at = entry.key.as_ref().map_or(snode.span, |k| k.span);
                        ctx.warnings
                            .push(YamlWarning::new(ErrorCode::DuplicateKey, at));
                    } else {
                        seen_keys.push(key_value);
                    }
                }
                map.items.push(Pair::new(key, value));
            }
            if let Some(TagRef::Uri(uri)) = tag_ref {
                map.props.tag = Some(uri);
            }
            Node::mapping(map)
        }
        SyntaxContent::Alias(name) => Node::alias(Alias::new(name.clone())),
    };

    node.with_props_mut(|props| {
        props.anchor = snode.anchor.as_ref().map(|(name, _)| name.clone());
        props.comment_before = snode.comment_before.clone();
        props.comment = snode.comment.clone();
        props.space_before = snode.space_before;
        props.span = Some(snode.span);
    });
    node
}

/// Decode scalar source text per its style, then resolve it to a value.
fn compose_scalar(
    style: ScalarStyle,
    text: &str,
    header: Option<BlockHeader>,
    tag_ref: Option<TagRef>,
    at: Span,
    ctx: &mut Ctx,
) -> Scalar {
    let decoded = match style {
        ScalarStyle::Plain => fold_flow_lines(text),
        ScalarStyle::QuoteSingle => fold_flow_lines(text).replace("''", "'"),
        ScalarStyle::QuoteDouble => decode_double_quoted(text, at, ctx),
        ScalarStyle::BlockLiteral | ScalarStyle::BlockFolded => block_scalar_value(
            text,
            header.unwrap_or(BlockHeader {
                literal: style == ScalarStyle::BlockLiteral,
                indent: None,
                chomping: Chomping::Clip,
                base: 0,
            }),
        ),
    };

    let mut scalar = Scalar::new(Value::Str(decoded.clone()));
    scalar.style = Some(style);
    if style == ScalarStyle::Plain {
        scalar.source = Some(decoded.clone());
    }

    match tag_ref {
        Some(TagRef::NonSpecific) => {}
        Some(TagRef::Uri(tag)) => {
            scalar.props.tag = Some(tag.clone());
            if tag != uri::STR {
                match ctx.schema.resolve_tag(&tag, &decoded) {
                    Some(Some(resolved)) => apply_resolved(&mut scalar, resolved),
                    Some(None) => {
                        ctx.errors.push(
                            YamlError::new(ErrorCode::TagResolveFailed, at)
                                .with_message(format!("cannot resolve {decoded:?} as {tag}")),
                        );
                    }
                    None => {
                        ctx.warnings.push(
                            YamlWarning::new(ErrorCode::TagResolveFailed, at)
                                .with_message(format!("unknown tag {tag}")),
                        );
                    }
                }
            }
        }
        None => {
            if style == ScalarStyle::Plain {
                if let Some((resolved, _tag)) = ctx.schema.resolve_plain(&decoded) {
                    apply_resolved(&mut scalar, resolved);
                }
            }
        }
    }
    scalar
}

fn apply_resolved(scalar: &mut Scalar, resolved: Resolved) {
    scalar.value = resolved.value;
    scalar.format = resolved.format;
    scalar.min_fraction_digits = resolved.min_fraction_digits;
}

/// Fold the logical lines of a flow scalar: a single break becomes a
/// space, n consecutive breaks become n-1 newlines. Whitespace around
/// interior breaks is trimmed; the first line keeps its leading and the
/// last line its trailing whitespace.
fn fold_flow_lines(text: &str) -> String {
    if !text.contains('\n') {
        return text.to_string();
    }
    let lines: Vec<&str> = text.split('\n').collect();
    let last = lines.len() - 1;
    let mut out = lines[0].trim_end().to_string();
    let mut blanks = 0usize;
    for (idx, line) in lines.iter().enumerate().skip(1) {
        let trimmed = if idx == last {
            line.trim_start()
        } else {
            line.trim()
        };
        if trimmed.is_empty() && idx != last {
            blanks += 1;
            continue;
        }
        if blanks > 0 {
            for _ in 0..blanks {
                out.push('\n');
            }
            blanks = 0;
        } else {
            out.push(' ');
        }
        out.push_str(trimmed);
    }
    out
}

/// Decode the raw content of a double-quoted scalar: escape sequences,
/// escaped-newline continuations, and line folding.
#[allow(clippy::too_many_lines)]
fn decode_double_quoted(text: &str, at: Span, ctx: &mut Ctx) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            i += 1;
            let Some(&escape) = chars.get(i) else {
                out.push('\\');
                break;
            };
            i += 1;
            match escape {
                '0' => out.push('\0'),
                'a' => out.push('\x07'),
                'b' => out.push('\x08'),
                't' | '\t' => out.push('\t'),
                'n' => out.push('\n'),
                'v' => out.push('\x0B'),
                'f' => out.push('\x0C'),
                'r' => out.push('\r'),
                'e' => out.push('\x1B'),
                ' ' => out.push(' '),
                '"' => out.push('"'),
                '/' => out.push('/'),
                '\\' => out.push('\\'),
                'N' => out.push('\u{0085}'),
                '_' => out.push('\u{00A0}'),
                'L' => out.push('\u{2028}'),
                'P' => out.push('\u{2029}'),
                'x' | 'u' | 'U' => {
                    let digits = match escape {
                        'x' => 2,
                        'u' => 4,
                        _ => 8,
                    };
                    let (decoded, consumed) = decode_hex_escape(&chars[i..], digits);
                    i += consumed;
                    match decoded {
                        Some(decoded) => out.push_str(&decoded),
                        None => {
                            ctx.errors.push(
                                YamlError::new(ErrorCode::UnexpectedToken, at)
                                    .with_message(format!("invalid \\{escape} escape sequence")),
                            );
                        }
                    }
                }
                '\n' | '\r' => {
                    // Escaped line break: join lines without a space
                    while matches!(chars.get(i), Some(' ' | '\t' | '\n' | '\r')) {
                        i += 1;
                    }
                }
                other => {
                    ctx.errors.push(
                        YamlError::new(ErrorCode::UnexpectedToken, at)
                            .with_message(format!("invalid escape character {other:?}")),
                    );
                    out.push(other);
                }
            }
        } else if c == '\n' || c == '\r' {
            // Fold: trim spaces before the break, count consecutive breaks
            while out.ends_with(' ') || out.ends_with('\t') {
                out.pop();
            }
            let mut breaks = 0;
            while i < chars.len() {
                match chars[i] {
                    '\n' => {
                        breaks += 1;
                        i += 1;
                    }
                    '\r' => {
                        if chars.get(i + 1) == Some(&'\n') {
                            i += 1;
                        }
                        breaks += 1;
                        i += 1;
                    }
                    ' ' | '\t' => {
                        // Leading indentation of a continuation line; only
                        // skip it if the line holds more breaks or ends
                        let mut j = i;
                        while matches!(chars.get(j), Some(' ' | '\t')) {
                            j += 1;
                        }
                        if matches!(chars.get(j), Some('\n' | '\r')) {
                            i = j;
                        } else {
                            i = j;
                            break;
                        }
                    }
                    _ => break,
                }
            }
            if breaks == 1 {
                out.push(' ');
            } else {
                for _ in 1..breaks {
                    out.push('\n');
                }
            }
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

/// Decode up to `digits` hex digits into a character, pairing UTF-16
/// surrogates when both halves are escaped. Returns the decoded string
/// and the number of characters consumed.
fn decode_hex_escape(chars: &[char], digits: usize) -> (Option<String>, usize) {
    let mut hex = String::new();
    for &c in chars.iter().take(digits) {
        if c.is_ascii_hexdigit() {
            hex.push(c);
        } else {
            break;
        }
    }
    let consumed = hex.len();
    if consumed < digits {
        return (None, consumed);
    }
    let Ok(code) = u32::from_str_radix(&hex, 16) else {
        return (None, consumed);
    };

    // A high surrogate may be followed by an escaped low surrogate
    if (0xD800..0xDC00).contains(&code) {
        let rest = &chars[consumed..];
        if rest.len() >= 6 && rest[0] == '\\' && rest[1] == 'u' {
            let low_hex: String = rest[2..6].iter().collect();
            if let Ok(low) = u32::from_str_radix(&low_hex, 16) {
                if (0xDC00..0xE000).contains(&low) {
                    let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    if let Some(c) = char::from_u32(combined) {
                        return (Some(c.to_string()), consumed + 6);
                    }
                }
            }
        }
        // An unpaired surrogate has no char representation
        return (Some('\u{FFFD}'.to_string()), consumed);
    }

    match char::from_u32(code) {
        Some(c) => (Some(c.to_string()), consumed),
        None => (None, consumed),
    }
}

fn starts_with_ws(line: &str) -> bool {
    line.starts_with(' ') || line.starts_with('\t')
}

/// Apply indentation stripping, folding (for `>`), and chomping to a raw
/// block scalar body.
fn block_scalar_value(text: &str, header: BlockHeader) -> String {
    if text.is_empty() {
        return String::new();
    }
    let raw_lines: Vec<&str> = text.split('\n').collect();

    let content_indent = header.indent.map_or_else(
        || {
            raw_lines
                .iter()
                .find(|l| !l.trim().is_empty())
                .map_or(0, |l| l.len() - l.trim_start_matches(' ').len())
        },
        |digit| header.base + usize::from(digit),
    );

    let stripped: Vec<&str> = raw_lines
        .iter()
        .map(|line| {
            let leading = line.len() - line.trim_start_matches(' ').len();
            &line[content_indent.min(leading)..]
        })
        .collect();

    // Split off trailing blank lines; they belong to chomping
    let mut content_len = stripped.len();
    while content_len > 0 && stripped[content_len - 1].trim().is_empty() {
        content_len -= 1;
    }
    let trailing_blanks = stripped.len() - content_len;
    let content = &stripped[..content_len];

    let body = if header.literal {
        content.join("\n")
    } else {
        let mut out = String::new();
        for (idx, line) in content.iter().enumerate() {
            if idx == 0 {
                out.push_str(line);
                continue;
            }
            let prev = content[idx - 1];
            if line.is_empty() {
                out.push('\n');
            } else if prev.is_empty() {
                out.push_str(line);
            } else if starts_with_ws(line) || starts_with_ws(prev) {
                out.push('\n');
                out.push_str(line);
            } else {
                out.push(' ');
                out.push_str(line);
            }
        }
        out
    };

    match header.chomping {
        Chomping::Strip => body,
        Chomping::Clip => {
            if body.is_empty() {
                String::new()
            } else {
                format!("{body}\n")
            }
        }
        Chomping::Keep => {
            let mut out = body;
            for _ in 0..=trailing_blanks {
                out.push('\n');
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParseOptions;
    use crate::schema::NumberFormat;

    fn compose_one(input: &str) -> Document {
        let options = ParseOptions {
            strict: false,
            ..Default::default()
        };
        let mut docs = compose_source(input, &options);
        assert_eq!(docs.len(), 1, "expected one document for {input:?}");
        docs.remove(0)
    }

    fn native(input: &str) -> Value {
        let doc = compose_one(input);
        assert!(doc.errors.is_empty(), "errors: {:?}", doc.errors);
        doc.to_native(100).expect("native value")
    }

    #[test]
    fn plain_scalars_resolve_through_schema() {
        assert_eq!(native("42"), Value::Int(42));
        assert_eq!(native("true"), Value::Bool(true));
        assert_eq!(native("~"), Value::Null);
        assert_eq!(native("hello"), Value::Str("hello".into()));
        assert_eq!(native("3.5"), Value::Float(3.5));
    }

    #[test]
    fn quoted_scalars_stay_strings() {
        assert_eq!(native("'42'"), Value::Str("42".into()));
        assert_eq!(native("\"true\""), Value::Str("true".into()));
    }

    #[test]
    fn double_quoted_escapes() {
        assert_eq!(native(r#""a\nb""#), Value::Str("a\nb".into()));
        assert_eq!(native(r#""A""#), Value::Str("A".into()));
        assert_eq!(native(r#""tab\there""#), Value::Str("tab\there".into()));
        assert_eq!(
            native(r#""😀""#),
            Value::Str("\u{1F600}".into())
        );
    }

    #[test]
    fn single_quote_pairs_decode() {
        assert_eq!(native("'it''s'"), Value::Str("it's".into()));
    }

    #[test]
    fn multiline_flow_scalars_fold() {
        assert_eq!(native("a\nb"), Value::Str("a b".into()));
        assert_eq!(native("a\n\nb"), Value::Str("a\nb".into()));
        assert_eq!(native("\"a\nb\""), Value::Str("a b".into()));
    }

    #[test]
    fn block_literal_preserves_newlines() {
        assert_eq!(
            native("|\n  one\n  two\n"),
            Value::Str("one\ntwo\n".into())
        );
    }

    #[test]
    fn block_folded_folds() {
        assert_eq!(
            native(">\n  one\n  two\n"),
            Value::Str("one two\n".into())
        );
        // More-indented lines keep their newlines
        assert_eq!(
            native(">\n  one\n    more\n  two\n"),
            Value::Str("one\n  more\ntwo\n".into())
        );
    }

    #[test]
    fn chomping_indicators() {
        assert_eq!(native("|-\n  text\n"), Value::Str("text".into()));
        assert_eq!(native("|\n  text\n"), Value::Str("text\n".into()));
        assert_eq!(native("|+\n  text\n\n\n"), Value::Str("text\n\n\n".into()));
    }

    #[test]
    fn explicit_indentation_indicator() {
        assert_eq!(
            native("|2\n   keep one space\n"),
            Value::Str(" keep one space\n".into())
        );
    }

    #[test]
    fn tags_override_resolution() {
        assert_eq!(native("!!str 42"), Value::Str("42".into()));
        assert_eq!(native("!!int '42'"), Value::Int(42));
    }

    #[test]
    fn non_specific_tag_forces_string() {
        assert_eq!(native("! 42"), Value::Str("42".into()));
    }

    #[test]
    fn failed_tag_resolution_is_an_error() {
        let doc = compose_one("!!int not-a-number");
        assert!(doc
            .errors
            .iter()
            .any(|e| e.code == ErrorCode::TagResolveFailed));
    }

    #[test]
    fn unknown_tag_is_a_warning() {
        let doc = compose_one("!custom x");
        assert!(doc
            .warnings
            .iter()
            .any(|w| w.code == ErrorCode::TagResolveFailed));
        assert_eq!(
            doc.to_native(100).expect("native"),
            Value::Str("x".into())
        );
    }

    #[test]
    fn tag_handle_resolution() {
        let doc = compose_one("%TAG !e! tag:example.com,2000:\n---\n!e!x 1\n");
        assert!(doc.errors.is_empty(), "{:?}", doc.errors);
        let root = doc.contents.expect("root");
        assert_eq!(root.tag().as_deref(), Some("tag:example.com,2000:x"));
    }

    #[test]
    fn version_directive_switches_schema() {
        let doc = compose_one("%YAML 1.1\n---\nyes\n");
        assert_eq!(doc.version, YamlVersion::V1_1);
        assert_eq!(doc.to_native(100).expect("native"), Value::Bool(true));
    }

    #[test]
    fn v11_scalars_under_option_version() {
        let options = ParseOptions {
            version: YamlVersion::V1_1,
            strict: false,
            ..Default::default()
        };
        let docs = compose_source("[ n, Y, on, off ]", &options);
        let value = docs[0].to_native(100).expect("native");
        assert_eq!(
            value,
            Value::Seq(vec![
                Value::Bool(false),
                Value::Bool(true),
                Value::Bool(true),
                Value::Bool(false),
            ])
        );
    }

    #[test]
    fn duplicate_keys_warn_but_compose() {
        let doc = compose_one("a: 1\na: 2\n");
        assert!(doc
            .warnings
            .iter()
            .any(|w| w.code == ErrorCode::DuplicateKey));
        // Both pairs are kept in the tree
        let Some(Node::Mapping(map)) = doc.contents else {
            panic!("expected mapping");
        };
        assert_eq!(map.borrow().items.len(), 2);
    }

    #[test]
    fn hex_format_hint_preserved() {
        let doc = compose_one("0x2a");
        let Some(Node::Scalar(scalar)) = doc.contents else {
            panic!("expected scalar");
        };
        let scalar = scalar.borrow();
        assert_eq!(scalar.value, Value::Int(42));
        assert_eq!(scalar.format, Some(NumberFormat::Hex));
    }

    #[test]
    fn spans_attached_to_nodes() {
        let doc = compose_one("key: value");
        let root = doc.contents.expect("root");
        let span = root.with_props(|p| p.span).expect("span");
        assert_eq!(span.start, 0);
        assert_eq!(span.end, 10);
    }

    #[test]
    fn empty_value_is_null() {
        assert_eq!(
            native("key:"),
            Value::Map(vec![(Value::Str("key".into()), Value::Null)])
        );
    }
}
