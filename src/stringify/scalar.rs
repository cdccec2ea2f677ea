//! Scalar stringification: style selection, quoting, escaping, number
//! formatting and line folding.

use num_bigint::BigInt;
use num_traits::Signed;

use crate::error::EmitError;
use crate::node::{Scalar, ScalarStyle, YamlVersion};
use crate::options::StringifyOptions;
use crate::schema::{NumberFormat, Schema, SchemaName};
use crate::value::Value;

use super::EmitCtx;

/// Render a scalar node's value under the given context.
pub(super) fn stringify_scalar(
    scalar: &Scalar,
    ctx: &EmitCtx,
    opts: &StringifyOptions,
    schema: &Schema,
    version: YamlVersion,
) -> Result<String, EmitError> {
    match &scalar.value {
        Value::Null => Ok(source_or(scalar, opts.null_str.clone())),
        Value::Bool(b) => Ok(source_or(
            scalar,
            if *b {
                opts.true_str.clone()
            } else {
                opts.false_str.clone()
            },
        )),
        Value::Int(n) => Ok(emit_i64(*n, scalar, version)),
        Value::BigInt(n) => Ok(emit_bigint(n, scalar, version)),
        Value::Float(f) => Ok(emit_float(*f, scalar)),
        Value::Timestamp(t) => {
            if schema.name == SchemaName::Yaml11 {
                Ok(t.clone())
            } else {
                // No timestamp tag in this schema; degrade to a string
                stringify_string(t, scalar.style, ctx, opts, schema)
            }
        }
        Value::Bytes(bytes) => Ok(emit_bytes(bytes, ctx, opts)),
        Value::Str(s) => stringify_string(s, scalar.style, ctx, opts, schema),
        Value::Seq(_) | Value::Map(_) => Err(EmitError::Unrepresentable(
            "a collection value inside a scalar node".to_string(),
        )),
    }
}

/// The source spelling when present and trustworthy, else the default.
fn source_or(scalar: &Scalar, default: String) -> String {
    match (&scalar.format, &scalar.source) {
        (None, Some(source)) if !source.is_empty() => source.clone(),
        _ => default,
    }
}

fn emit_i64(n: i64, scalar: &Scalar, version: YamlVersion) -> String {
    match scalar.format {
        Some(NumberFormat::Hex) => {
            if n >= 0 {
                format!("0x{n:x}")
            } else if version == YamlVersion::V1_1 {
                // 1.2 core has no negative-hex syntax
                format!("-0x{:x}", n.unsigned_abs())
            } else {
                n.to_string()
            }
        }
        Some(NumberFormat::Oct) => {
            if n < 0 {
                if version == YamlVersion::V1_1 {
                    format!("-0{:o}", n.unsigned_abs())
                } else {
                    n.to_string()
                }
            } else if version == YamlVersion::V1_1 {
                format!("0{n:o}")
            } else {
                format!("0o{n:o}")
            }
        }
        Some(NumberFormat::Bin) => {
            if version == YamlVersion::V1_1 && n >= 0 {
                format!("0b{n:b}")
            } else {
                n.to_string()
            }
        }
        Some(NumberFormat::Exp) => {
            #[allow(clippy::cast_precision_loss)]
            let f = n as f64;
            format!("{f:e}")
        }
        None => source_or(scalar, n.to_string()),
    }
}

fn emit_bigint(n: &BigInt, scalar: &Scalar, version: YamlVersion) -> String {
    let negative = n.is_negative();
    match scalar.format {
        Some(NumberFormat::Hex) if !negative => format!("0x{n:x}"),
        Some(NumberFormat::Hex) if version == YamlVersion::V1_1 => {
            format!("-0x{:x}", n.abs())
        }
        Some(NumberFormat::Oct) if !negative => {
            if version == YamlVersion::V1_1 {
                format!("0{n:o}")
            } else {
                format!("0o{n:o}")
            }
        }
        _ => source_or(scalar, n.to_string()),
    }
}

fn emit_float(f: f64, scalar: &Scalar) -> String {
    if f.is_nan() {
        return ".nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { ".inf" } else { "-.inf" }.to_string();
    }
    if scalar.format == Some(NumberFormat::Exp) {
        // Exponential form ignores min_fraction_digits
        return format!("{f:e}");
    }
    if scalar.format.is_none() {
        if let Some(source) = &scalar.source {
            if !source.is_empty() {
                return source.clone();
            }
        }
    }
    let mut out = f.to_string();
    if !out.contains('.') && !out.contains('e') && !out.contains("inf") && !out.contains("NaN") {
        out.push_str(".0");
    }
    if scalar.min_fraction_digits > 0 {
        if let Some(dot) = out.find('.') {
            let frac_len = out.len() - dot - 1;
            let want = scalar.min_fraction_digits as usize;
            for _ in frac_len..want {
                out.push('0');
            }
        }
    }
    out
}

/// Base64 body for `!!binary`, folded to the line width in block context.
fn emit_bytes(bytes: &[u8], ctx: &EmitCtx, opts: &StringifyOptions) -> String {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;

    let encoded = BASE64.encode(bytes);
    if ctx.in_flow || ctx.as_key || opts.line_width == 0 {
        return format!("\"{encoded}\"");
    }
    let width = opts
        .line_width
        .saturating_sub(ctx.indent.len())
        .max(opts.min_content_width);
    if encoded.len() <= width {
        return format!("\"{encoded}\"");
    }
    // A block literal keeps the long body legible
    let mut out = String::from("|-");
    let inner = if ctx.indent.is_empty() {
        " ".repeat(opts.indent)
    } else {
        ctx.indent.clone()
    };
    let mut rest = encoded.as_str();
    while !rest.is_empty() {
        let take = width.min(rest.len());
        out.push('\n');
        out.push_str(&inner);
        out.push_str(&rest[..take]);
        rest = &rest[take..];
    }
    out
}

/// Choose a style and render a string value.
pub(super) fn stringify_string(
    s: &str,
    requested: Option<ScalarStyle>,
    ctx: &EmitCtx,
    opts: &StringifyOptions,
    schema: &Schema,
) -> Result<String, EmitError> {
    let style = resolve_string_style(s, requested, ctx, opts, schema);
    Ok(match style {
        ScalarStyle::Plain => fold_plain(s, ctx, opts),
        ScalarStyle::QuoteSingle => emit_single_quoted(s),
        ScalarStyle::QuoteDouble => emit_double_quoted(s, ctx, opts),
        ScalarStyle::BlockLiteral => emit_block_scalar(s, false, ctx, opts),
        ScalarStyle::BlockFolded => emit_block_scalar(s, true, ctx, opts),
    })
}

/// Pick the string style honoring the precedence rules: the node's own
/// style first (degraded where illegal), then the configured default,
/// then legality-driven fallbacks.
fn resolve_string_style(
    s: &str,
    requested: Option<ScalarStyle>,
    ctx: &EmitCtx,
    opts: &StringifyOptions,
    schema: &Schema,
) -> ScalarStyle {
    let allow_block = !ctx.in_flow && !ctx.as_key;
    let multiline = s.contains('\n');
    let has_forbidden = needs_double_quotes(s);

    let preferred = requested.unwrap_or(if ctx.as_key {
        opts.default_key_type.unwrap_or(opts.default_string_type)
    } else {
        opts.default_string_type
    });

    if has_forbidden {
        return ScalarStyle::QuoteDouble;
    }

    match preferred {
        ScalarStyle::BlockLiteral | ScalarStyle::BlockFolded => {
            if allow_block && !s.is_empty() {
                preferred
            } else {
                quoted_fallback(s, opts)
            }
        }
        ScalarStyle::Plain => {
            if plain_is_safe(s, ctx, schema) {
                ScalarStyle::Plain
            } else if multiline && allow_block {
                ScalarStyle::BlockLiteral
            } else {
                quoted_fallback(s, opts)
            }
        }
        ScalarStyle::QuoteSingle => {
            if single_quotable(s) {
                ScalarStyle::QuoteSingle
            } else {
                ScalarStyle::QuoteDouble
            }
        }
        ScalarStyle::QuoteDouble => ScalarStyle::QuoteDouble,
    }
}

/// Control characters (and other unprintables) force double quotes.
fn needs_double_quotes(s: &str) -> bool {
    s.chars()
        .any(|c| c.is_control() && c != '\n' && c != '\t')
}

fn single_quotable(s: &str) -> bool {
    !s.contains('\n') && !s.chars().any(char::is_control)
}

fn quoted_fallback(s: &str, opts: &StringifyOptions) -> ScalarStyle {
    if !single_quotable(s) {
        return ScalarStyle::QuoteDouble;
    }
    match opts.single_quote {
        Some(true) => ScalarStyle::QuoteSingle,
        Some(false) => ScalarStyle::QuoteDouble,
        // Unset: prefer whichever avoids escapes
        None => {
            if s.contains('"') || s.contains('\\') {
                ScalarStyle::QuoteSingle
            } else {
                ScalarStyle::QuoteDouble
            }
        }
    }
}

/// Is this string safe to emit as a plain scalar in the given context?
fn plain_is_safe(s: &str, ctx: &EmitCtx, schema: &Schema) -> bool {
    if s.is_empty() || s.contains('\n') || s.contains('\t') {
        return false;
    }
    if s.starts_with(' ') || s.ends_with(' ') {
        return false;
    }
    let first = s.chars().next().unwrap_or(' ');
    if matches!(
        first,
        '?' | '-'
            | ':'
            | ','
            | '['
            | ']'
            | '{'
            | '}'
            | '&'
            | '*'
            | '|'
            | '>'
            | '!'
            | '%'
            | '@'
            | '`'
            | '#'
            | '"'
            | '\''
    ) {
        // Indicator-first strings are only plain when the indicator is
        // not actually an indicator there; quoting is always safe
        return false;
    }
    if s.contains(": ") || s.ends_with(':') || s.contains(" #") {
        return false;
    }
    if ctx.in_flow && s.contains([',', '[', ']', '{', '}', ':']) {
        return false;
    }
    if ctx.top_level && (s.starts_with("---") || s.starts_with("...")) {
        return false;
    }
    // Never let a plain string reparse as another type
    if schema.plain_resolves_to_non_string(s) {
        return false;
    }
    true
}

/// Fold a plain scalar at word boundaries. Only applies in block value
/// context; continuation lines fold back to spaces on reparse.
fn fold_plain(s: &str, ctx: &EmitCtx, opts: &StringifyOptions) -> String {
    if opts.line_width == 0 || ctx.in_flow || ctx.as_key {
        return s.to_string();
    }
    fold_line(
        s,
        &ctx.indent,
        opts.line_width,
        opts.min_content_width,
        ctx.first_offset,
    )
}

fn emit_single_quoted(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Escape and quote a string, folding long results at spaces (a raw line
/// break inside double quotes folds back to a space on reparse).
fn emit_double_quoted(s: &str, ctx: &EmitCtx, opts: &StringifyOptions) -> String {
    let mut body = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '"' => body.push_str("\\\""),
            '\\' => body.push_str("\\\\"),
            '\n' => body.push_str("\\n"),
            '\t' => body.push_str("\\t"),
            '\r' => body.push_str("\\r"),
            '\0' => body.push_str("\\0"),
            '\x07' if !opts.double_quoted_as_json => body.push_str("\\a"),
            '\x08' => body.push_str("\\b"),
            '\x0B' if !opts.double_quoted_as_json => body.push_str("\\v"),
            '\x0C' => body.push_str("\\f"),
            '\x1B' if !opts.double_quoted_as_json => body.push_str("\\e"),
            '\u{0085}' if !opts.double_quoted_as_json => body.push_str("\\N"),
            '\u{00A0}' if !opts.double_quoted_as_json => body.push_str("\\_"),
            '\u{2028}' if !opts.double_quoted_as_json => body.push_str("\\L"),
            '\u{2029}' if !opts.double_quoted_as_json => body.push_str("\\P"),
            c if c.is_control() => {
                let code = c as u32;
                if code <= 0xFF && !opts.double_quoted_as_json {
                    body.push_str(&format!("\\x{code:02x}"));
                } else if code <= 0xFFFF {
                    body.push_str(&format!("\\u{code:04x}"));
                } else {
                    body.push_str(&format!("\\U{code:08x}"));
                }
            }
            c => body.push(c),
        }
    }

    let quoted = format!("\"{body}\"");
    if opts.line_width == 0
        || ctx.in_flow
        || ctx.as_key
        || quoted.len() < opts.double_quoted_min_multi_line_length
        || ctx.first_offset + quoted.len() <= opts.line_width
    {
        return quoted;
    }
    fold_line(
        &quoted,
        &ctx.indent,
        opts.line_width,
        opts.min_content_width,
        ctx.first_offset,
    )
}

/// Break one long logical line at spaces, indenting continuations. The
/// first line is measured from `first_col` (where the caller places it);
/// a single word longer than the width stays unbroken.
pub(super) fn fold_line(
    text: &str,
    indent: &str,
    width: usize,
    min_content: usize,
    first_col: usize,
) -> String {
    let min = min_content.max(1);
    let cont_usable = width.saturating_sub(indent.len()).max(min);
    let first_usable = width.saturating_sub(first_col).max(min);
    if text.len() <= first_usable {
        return text.to_string();
    }
    let mut out = String::new();
    let mut usable = first_usable;
    let mut line_len = 0usize;
    for (idx, word) in text.split(' ').enumerate() {
        if idx == 0 {
            out.push_str(word);
            line_len = word.len();
            continue;
        }
        // Never break before an empty word: that would strand a space at
        // a line end and lose it on reparse
        if !word.is_empty() && line_len + 1 + word.len() > usable && line_len >= min.min(usable) {
            out.push('\n');
            out.push_str(indent);
            out.push_str(word);
            line_len = word.len();
            usable = cont_usable;
        } else {
            out.push(' ');
            out.push_str(word);
            line_len += 1 + word.len();
        }
    }
    out
}

/// Render a block scalar: header (explicit indent digit when the content
/// starts with whitespace, chomping from the trailing newlines), then the
/// indented body. Folded style wraps long lines, preserving more-indented
/// lines verbatim.
pub(super) fn emit_block_scalar(
    s: &str,
    folded: bool,
    ctx: &EmitCtx,
    opts: &StringifyOptions,
) -> String {
    let trailing_newlines = s.len() - s.trim_end_matches('\n').len();
    let chomp = match trailing_newlines {
        0 => "-",
        1 => "",
        _ => "+",
    };
    let content = s.trim_end_matches('\n');

    let explicit_indent = if content.starts_with(' ') {
        opts.indent.to_string()
    } else {
        String::new()
    };
    let header = format!(
        "{}{}{}",
        if folded { '>' } else { '|' },
        explicit_indent,
        chomp
    );

    // The body sits at the value's continuation indent; at the document
    // root there is none, so one step is added
    let inner_indent = if ctx.indent.is_empty() {
        " ".repeat(opts.indent)
    } else {
        ctx.indent.clone()
    };
    let mut body_lines: Vec<String> = Vec::new();
    for line in content.split('\n') {
        if folded && !line.starts_with(' ') && !line.is_empty() && opts.line_width > 0 {
            let folded_line = fold_line(
                line,
                &inner_indent,
                opts.line_width,
                opts.min_content_width,
                inner_indent.len(),
            );
            body_lines.extend(folded_line.split('\n').map(|l| {
                // fold_line indents continuations already; normalize to
                // bare content here and re-indent uniformly below
                l.strip_prefix(inner_indent.as_str()).unwrap_or(l).to_string()
            }));
        } else {
            body_lines.push(line.to_string());
        }
    }
    // Keep-chomped extra newlines become trailing blank lines
    for _ in 1..trailing_newlines {
        body_lines.push(String::new());
    }

    let mut out = String::new();
    for line in body_lines {
        out.push('\n');
        if !line.is_empty() {
            out.push_str(&inner_indent);
            out.push_str(&line);
        }
    }
    if content.is_empty() && trailing_newlines == 0 {
        return header;
    }
    format!("{header}{out}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn ctx() -> EmitCtx {
        EmitCtx {
            indent: String::new(),
            first_offset: 0,
            in_flow: false,
            as_key: false,
            top_level: false,
        }
    }

    fn emit(s: &str) -> String {
        stringify_string(
            s,
            None,
            &ctx(),
            &StringifyOptions::default(),
            &Schema::default(),
        )
        .expect("stringify")
    }

    #[test]
    fn plain_when_safe() {
        assert_eq!(emit("hello"), "hello");
        assert_eq!(emit("hello world"), "hello world");
    }

    #[test]
    fn leading_indicators_are_quoted() {
        assert_eq!(emit(":"), "\":\"");
        assert_eq!(emit("- item"), "\"- item\"");
        assert_eq!(emit("&anchor"), "\"&anchor\"");
    }

    #[test]
    fn type_lookalikes_are_quoted() {
        assert_eq!(emit("42"), "\"42\"");
        assert_eq!(emit("null"), "\"null\"");
        assert_eq!(emit("true"), "\"true\"");
        assert_eq!(emit("3.14"), "\"3.14\"");
    }

    #[test]
    fn embedded_colon_space_is_quoted() {
        assert_eq!(emit("a: b"), "\"a: b\"");
        assert_eq!(emit("a:b"), "a:b");
        assert_eq!(emit("ends:"), "\"ends:\"");
    }

    #[test]
    fn multiline_prefers_block_literal() {
        assert_eq!(emit("a\nb"), "|-\n  a\n  b");
        assert_eq!(emit("a\nb\n"), "|\n  a\n  b");
        assert_eq!(emit("a\nb\n\n\n"), "|+\n  a\n  b\n\n");
    }

    #[test]
    fn block_scalar_with_leading_space_gets_indent_digit() {
        assert_eq!(emit(" a\nb"), "|2-\n   a\n  b");
    }

    #[test]
    fn control_chars_force_double_quotes() {
        assert_eq!(emit("bell\x07"), "\"bell\\a\"");
        assert_eq!(emit("nul\0"), "\"nul\\0\"");
    }

    #[test]
    fn json_escapes_only_when_requested() {
        let opts = StringifyOptions {
            double_quoted_as_json: true,
            ..Default::default()
        };
        let out = stringify_string("bell\x07", None, &ctx(), &opts, &Schema::default())
            .expect("stringify");
        assert_eq!(out, "\"bell\\u0007\"");
    }

    #[test]
    fn single_quote_preference() {
        let opts = StringifyOptions {
            single_quote: Some(true),
            ..Default::default()
        };
        let out = stringify_string(":", None, &ctx(), &opts, &Schema::default()).expect("ok");
        assert_eq!(out, "':'");
        // Escape-laden strings pick single quotes even when unset
        assert_eq!(emit(r"back\slash"), r"'back\slash'");
    }

    #[test]
    fn requested_style_wins_when_legal() {
        let out = stringify_string(
            "plain",
            Some(ScalarStyle::QuoteDouble),
            &ctx(),
            &StringifyOptions::default(),
            &Schema::default(),
        )
        .expect("ok");
        assert_eq!(out, "\"plain\"");
    }

    #[test]
    fn block_style_degrades_in_flow() {
        let flow_ctx = EmitCtx {
            in_flow: true,
            ..ctx()
        };
        let out = stringify_string(
            "a\nb",
            Some(ScalarStyle::BlockLiteral),
            &flow_ctx,
            &StringifyOptions::default(),
            &Schema::default(),
        )
        .expect("ok");
        assert_eq!(out, "\"a\\nb\"");
    }

    #[test]
    fn int_formats() {
        let mut scalar = Scalar::new(Value::Int(42));
        scalar.format = Some(NumberFormat::Hex);
        assert_eq!(emit_i64(42, &scalar, YamlVersion::V1_2), "0x2a");
        assert_eq!(emit_i64(42, &scalar, YamlVersion::V1_1), "0x2a");

        scalar.format = Some(NumberFormat::Oct);
        assert_eq!(emit_i64(42, &scalar, YamlVersion::V1_2), "0o52");
        assert_eq!(emit_i64(42, &scalar, YamlVersion::V1_1), "052");

        // Negative hex falls back to decimal under 1.2 only
        scalar.format = Some(NumberFormat::Hex);
        assert_eq!(emit_i64(-42, &scalar, YamlVersion::V1_2), "-42");
        assert_eq!(emit_i64(-42, &scalar, YamlVersion::V1_1), "-0x2a");
    }

    #[test]
    fn float_spellings() {
        let scalar = Scalar::new(Value::Float(3.0));
        assert_eq!(emit_float(3.0, &scalar), "3.0");
        assert_eq!(emit_float(f64::NAN, &scalar), ".nan");
        assert_eq!(emit_float(f64::NEG_INFINITY, &scalar), "-.inf");

        let mut padded = Scalar::new(Value::Float(1.2));
        padded.min_fraction_digits = 3;
        assert_eq!(emit_float(1.2, &padded), "1.200");

        let mut exp = Scalar::new(Value::Float(1000.0));
        exp.format = Some(NumberFormat::Exp);
        assert_eq!(emit_float(1000.0, &exp), "1e3");
    }

    #[test]
    fn fold_line_breaks_at_spaces() {
        let folded = fold_line("aaa bbb ccc ddd eee fff", "  ", 12, 3, 2);
        for line in folded.split('\n') {
            assert!(line.trim_start().len() <= 10, "line too long: {line:?}");
        }
        assert!(folded.contains('\n'));
    }

    #[test]
    fn fold_line_respects_first_line_offset() {
        let folded = fold_line("aa bb cc dd", "", 10, 1, 6);
        let first = folded.split('\n').next().unwrap();
        assert!(6 + first.len() <= 10, "first line too long: {first:?}");
    }

    #[test]
    fn fold_line_keeps_unbreakable_words() {
        let folded = fold_line("averyveryverylongword", "", 10, 3, 0);
        assert_eq!(folded, "averyveryverylongword");
    }
}
