//! Tag resolvers and identifiers for the preset tag sets.
//!
//! Each resolver owns its compiled pattern in a `OnceLock`, so patterns
//! are built on first use and shared afterwards.

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use num_bigint::BigInt;
use regex::Regex;

use super::{uri, NumberFormat, Resolved, SchemaName, TagDef};
use crate::value::Value;

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
}

/// Parse an integer in the given radix, falling back to a big integer
/// when the native range overflows.
fn parse_int(digits: &str, radix: u32, negative: bool) -> Option<Value> {
    let signed = if negative {
        format!("-{digits}")
    } else {
        digits.to_string()
    };
    if let Ok(n) = i64::from_str_radix(&signed, radix) {
        return Some(Value::Int(n));
    }
    BigInt::parse_bytes(signed.as_bytes(), radix).map(Value::BigInt)
}

/// Fraction digits worth preserving: `1.20` keeps 2, `1.25` keeps none
/// (the float itself round-trips those).
fn fraction_digits(text: &str) -> u32 {
    let Some(dot) = text.find('.') else { return 0 };
    let frac: &str = text[dot + 1..]
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .unwrap_or("");
    if frac.ends_with('0') {
        u32::try_from(frac.len()).unwrap_or(0)
    } else {
        0
    }
}

// --- shared resolvers -------------------------------------------------

fn identify_null(v: &Value) -> bool {
    matches!(v, Value::Null)
}
fn identify_bool(v: &Value) -> bool {
    matches!(v, Value::Bool(_))
}
fn identify_int(v: &Value) -> bool {
    matches!(v, Value::Int(_) | Value::BigInt(_))
}
fn identify_float(v: &Value) -> bool {
    matches!(v, Value::Float(_))
}
fn identify_str(v: &Value) -> bool {
    matches!(v, Value::Str(_))
}
fn identify_bytes(v: &Value) -> bool {
    matches!(v, Value::Bytes(_))
}
fn identify_timestamp(v: &Value) -> bool {
    matches!(v, Value::Timestamp(_))
}
fn identify_none(_: &Value) -> bool {
    false
}

fn resolve_str(text: &str) -> Option<Resolved> {
    Some(Resolved::plain(Value::Str(text.to_string())))
}

// --- JSON ------------------------------------------------------------

fn resolve_json_null(text: &str) -> Option<Resolved> {
    (text == "null").then(|| Resolved::plain(Value::Null))
}

fn resolve_json_bool(text: &str) -> Option<Resolved> {
    match text {
        "true" => Some(Resolved::plain(Value::Bool(true))),
        "false" => Some(Resolved::plain(Value::Bool(false))),
        _ => None,
    }
}

fn resolve_json_int(text: &str) -> Option<Resolved> {
    static RE: OnceLock<Regex> = OnceLock::new();
    if !regex(&RE, r"^-?(?:0|[1-9][0-9]*)$").is_match(text) {
        return None;
    }
    let (digits, negative) = match text.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (text, false),
    };
    parse_int(digits, 10, negative).map(Resolved::plain)
}

fn resolve_json_float(text: &str) -> Option<Resolved> {
    static RE: OnceLock<Regex> = OnceLock::new();
    if !regex(
        &RE,
        r"^-?(?:0|[1-9][0-9]*)(?:\.[0-9]*)?(?:[eE][-+]?[0-9]+)?$",
    )
    .is_match(text)
    {
        return None;
    }
    let value = text.parse::<f64>().ok()?;
    let format = if text.contains(['e', 'E']) {
        Some(NumberFormat::Exp)
    } else {
        None
    };
    Some(Resolved {
        value: Value::Float(value),
        format,
        min_fraction_digits: fraction_digits(text),
    })
}

// --- YAML 1.2 core ---------------------------------------------------

fn resolve_core_null(text: &str) -> Option<Resolved> {
    matches!(text, "~" | "null" | "Null" | "NULL" | "").then(|| Resolved::plain(Value::Null))
}

fn resolve_core_bool(text: &str) -> Option<Resolved> {
    match text {
        "true" | "True" | "TRUE" => Some(Resolved::plain(Value::Bool(true))),
        "false" | "False" | "FALSE" => Some(Resolved::plain(Value::Bool(false))),
        _ => None,
    }
}

fn resolve_core_int(text: &str) -> Option<Resolved> {
    static DEC: OnceLock<Regex> = OnceLock::new();
    static OCT: OnceLock<Regex> = OnceLock::new();
    static HEX: OnceLock<Regex> = OnceLock::new();

    if regex(&DEC, r"^[-+]?[0-9]+$").is_match(text) {
        let (digits, negative) = match text.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (text.strip_prefix('+').unwrap_or(text), false),
        };
        return parse_int(digits, 10, negative).map(Resolved::plain);
    }
    if regex(&OCT, r"^0o[0-7]+$").is_match(text) {
        return parse_int(&text[2..], 8, false)
            .map(|v| Resolved::formatted(v, NumberFormat::Oct));
    }
    if regex(&HEX, r"^0x[0-9a-fA-F]+$").is_match(text) {
        return parse_int(&text[2..], 16, false)
            .map(|v| Resolved::formatted(v, NumberFormat::Hex));
    }
    None
}

fn resolve_core_float(text: &str) -> Option<Resolved> {
    static RE: OnceLock<Regex> = OnceLock::new();
    static SPECIAL: OnceLock<Regex> = OnceLock::new();

    if regex(&SPECIAL, r"^[-+]?\.(?:inf|Inf|INF)$").is_match(text) {
        let value = if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        return Some(Resolved::plain(Value::Float(value)));
    }
    if matches!(text, ".nan" | ".NaN" | ".NAN") {
        return Some(Resolved::plain(Value::Float(f64::NAN)));
    }
    if !regex(
        &RE,
        r"^[-+]?(?:\.[0-9]+|[0-9]+(?:\.[0-9]*)?)(?:[eE][-+]?[0-9]+)?$",
    )
    .is_match(text)
    {
        return None;
    }
    // An integer spelling belongs to the int tag
    if !text.contains(['.', 'e', 'E']) {
        return None;
    }
    let value = text.parse::<f64>().ok()?;
    let format = if text.contains(['e', 'E']) {
        Some(NumberFormat::Exp)
    } else {
        None
    };
    Some(Resolved {
        value: Value::Float(value),
        format,
        min_fraction_digits: fraction_digits(text),
    })
}

// --- YAML 1.1 --------------------------------------------------------

fn resolve_v11_null(text: &str) -> Option<Resolved> {
    matches!(text, "~" | "null" | "Null" | "NULL" | "").then(|| Resolved::plain(Value::Null))
}

fn resolve_v11_bool(text: &str) -> Option<Resolved> {
    match text {
        "y" | "Y" | "yes" | "Yes" | "YES" | "true" | "True" | "TRUE" | "on" | "On" | "ON" => {
            Some(Resolved::plain(Value::Bool(true)))
        }
        "n" | "N" | "no" | "No" | "NO" | "false" | "False" | "FALSE" | "off" | "Off" | "OFF" => {
            Some(Resolved::plain(Value::Bool(false)))
        }
        _ => None,
    }
}

fn resolve_v11_int(text: &str) -> Option<Resolved> {
    static DEC: OnceLock<Regex> = OnceLock::new();
    static BIN: OnceLock<Regex> = OnceLock::new();
    static HEX: OnceLock<Regex> = OnceLock::new();
    static OCT: OnceLock<Regex> = OnceLock::new();

    let (body, negative) = match text.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (text.strip_prefix('+').unwrap_or(text), false),
    };

    if regex(&BIN, r"^0b[0-1_]+$").is_match(body) {
        let digits = body[2..].replace('_', "");
        return parse_int(&digits, 2, negative)
            .map(|v| Resolved::formatted(v, NumberFormat::Bin));
    }
    if regex(&HEX, r"^0x[0-9a-fA-F_]+$").is_match(body) {
        let digits = body[2..].replace('_', "");
        return parse_int(&digits, 16, negative)
            .map(|v| Resolved::formatted(v, NumberFormat::Hex));
    }
    if regex(&OCT, r"^0[0-7_]+$").is_match(body) {
        let digits = body[1..].replace('_', "");
        return parse_int(&digits, 8, negative)
            .map(|v| Resolved::formatted(v, NumberFormat::Oct));
    }
    if regex(&DEC, r"^[0-9][0-9_]*$").is_match(body) {
        let digits = body.replace('_', "");
        return parse_int(&digits, 10, negative).map(Resolved::plain);
    }
    None
}

fn resolve_v11_float(text: &str) -> Option<Resolved> {
    static RE: OnceLock<Regex> = OnceLock::new();
    static SPECIAL: OnceLock<Regex> = OnceLock::new();

    if regex(&SPECIAL, r"^[-+]?\.(?:inf|Inf|INF)$").is_match(text) {
        let value = if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        return Some(Resolved::plain(Value::Float(value)));
    }
    if matches!(text, ".nan" | ".NaN" | ".NAN") {
        return Some(Resolved::plain(Value::Float(f64::NAN)));
    }
    if !regex(
        &RE,
        r"^[-+]?(?:[0-9][0-9_]*)?\.[0-9_]*(?:[eE][-+]?[0-9]+)?$",
    )
    .is_match(text)
    {
        return None;
    }
    let cleaned = text.replace('_', "");
    let value = cleaned.parse::<f64>().ok()?;
    let format = if text.contains(['e', 'E']) {
        Some(NumberFormat::Exp)
    } else {
        None
    };
    Some(Resolved {
        value: Value::Float(value),
        format,
        min_fraction_digits: fraction_digits(&cleaned),
    })
}

/// The YAML 1.1 timestamp patterns: a bare date, or date + time with an
/// optional timezone. The source spelling is preserved.
pub(crate) fn timestamp_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r"^\d{4}-\d{2}-\d{2}$|^\d{4}-\d{1,2}-\d{1,2}(?:[Tt]|[ \t]+)\d{1,2}:\d{2}:\d{2}(?:\.\d*)?(?:[ \t]*(?:Z|[-+]\d{1,2}(?::?\d{2})?))?$",
    )
}

fn resolve_v11_timestamp(text: &str) -> Option<Resolved> {
    timestamp_pattern()
        .is_match(text)
        .then(|| Resolved::plain(Value::Timestamp(text.to_string())))
}

fn resolve_v11_binary(text: &str) -> Option<Resolved> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64
        .decode(compact.as_bytes())
        .ok()
        .map(|bytes| Resolved::plain(Value::Bytes(bytes)))
}

// --- presets ---------------------------------------------------------

const STR_TAG: TagDef = TagDef {
    tag: uri::STR,
    default: false,
    resolve: resolve_str,
    identify: identify_str,
};

/// The ordered tag list for a preset schema.
#[must_use]
pub fn preset(name: SchemaName) -> Vec<TagDef> {
    match name {
        SchemaName::Failsafe => vec![STR_TAG],
        SchemaName::Json => vec![
            TagDef {
                tag: uri::NULL,
                default: true,
                resolve: resolve_json_null,
                identify: identify_null,
            },
            TagDef {
                tag: uri::BOOL,
                default: true,
                resolve: resolve_json_bool,
                identify: identify_bool,
            },
            TagDef {
                tag: uri::INT,
                default: true,
                resolve: resolve_json_int,
                identify: identify_int,
            },
            TagDef {
                tag: uri::FLOAT,
                default: true,
                resolve: resolve_json_float,
                identify: identify_float,
            },
            STR_TAG,
        ],
        SchemaName::Core => vec![
            TagDef {
                tag: uri::NULL,
                default: true,
                resolve: resolve_core_null,
                identify: identify_null,
            },
            TagDef {
                tag: uri::BOOL,
                default: true,
                resolve: resolve_core_bool,
                identify: identify_bool,
            },
            TagDef {
                tag: uri::INT,
                default: true,
                resolve: resolve_core_int,
                identify: identify_int,
            },
            TagDef {
                tag: uri::FLOAT,
                default: true,
                resolve: resolve_core_float,
                identify: identify_float,
            },
            STR_TAG,
        ],
        SchemaName::Yaml11 => vec![
            TagDef {
                tag: uri::NULL,
                default: true,
                resolve: resolve_v11_null,
                identify: identify_null,
            },
            TagDef {
                tag: uri::BOOL,
                default: true,
                resolve: resolve_v11_bool,
                identify: identify_bool,
            },
            TagDef {
                tag: uri::INT,
                default: true,
                resolve: resolve_v11_int,
                identify: identify_int,
            },
            TagDef {
                tag: uri::FLOAT,
                default: true,
                resolve: resolve_v11_float,
                identify: identify_float,
            },
            TagDef {
                tag: uri::TIMESTAMP,
                default: true,
                resolve: resolve_v11_timestamp,
                identify: identify_timestamp,
            },
            TagDef {
                tag: uri::BINARY,
                default: false,
                resolve: resolve_v11_binary,
                identify: identify_bytes,
            },
            TagDef {
                tag: uri::MERGE,
                default: false,
                resolve: resolve_str,
                identify: identify_none,
            },
            STR_TAG,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_int_shapes() {
        assert_eq!(
            resolve_json_int("42").map(|r| r.value),
            Some(Value::Int(42))
        );
        assert_eq!(
            resolve_json_int("-7").map(|r| r.value),
            Some(Value::Int(-7))
        );
        // Leading zeros are not JSON integers
        assert!(resolve_json_int("007").is_none());
        assert!(resolve_json_int("0x1f").is_none());
    }

    #[test]
    fn core_int_radixes() {
        let hex = resolve_core_int("0x2a").expect("hex");
        assert_eq!(hex.value, Value::Int(42));
        assert_eq!(hex.format, Some(NumberFormat::Hex));

        let oct = resolve_core_int("0o52").expect("oct");
        assert_eq!(oct.value, Value::Int(42));
        assert_eq!(oct.format, Some(NumberFormat::Oct));

        assert_eq!(
            resolve_core_int("+3").map(|r| r.value),
            Some(Value::Int(3))
        );
        // Core has no leading-zero octal; `010` is decimal ten
        assert_eq!(
            resolve_core_int("010").map(|r| r.value),
            Some(Value::Int(10))
        );
    }

    #[test]
    fn int_overflow_falls_back_to_bigint() {
        let resolved = resolve_core_int("123456789012345678901234567890").expect("bigint");
        match resolved.value {
            Value::BigInt(n) => {
                assert_eq!(n.to_string(), "123456789012345678901234567890");
            }
            other => panic!("expected BigInt, got {other:?}"),
        }
    }

    #[test]
    fn core_float_shapes() {
        assert_eq!(
            resolve_core_float("3.14").map(|r| r.value),
            Some(Value::Float(3.14))
        );
        let exp = resolve_core_float("1e3").expect("exp float");
        assert_eq!(exp.value, Value::Float(1000.0));
        assert_eq!(exp.format, Some(NumberFormat::Exp));
        assert!(resolve_core_float("42").is_none());

        let kept = resolve_core_float("1.20").expect("float");
        assert_eq!(kept.min_fraction_digits, 2);
    }

    #[test]
    fn non_finite_floats() {
        assert_eq!(
            resolve_core_float(".inf").map(|r| r.value),
            Some(Value::Float(f64::INFINITY))
        );
        assert_eq!(
            resolve_core_float("-.Inf").map(|r| r.value),
            Some(Value::Float(f64::NEG_INFINITY))
        );
        let nan = resolve_core_float(".nan").expect("nan").value;
        assert!(matches!(nan, Value::Float(f) if f.is_nan()));
    }

    #[test]
    fn v11_bool_single_letters() {
        assert_eq!(
            resolve_v11_bool("n").map(|r| r.value),
            Some(Value::Bool(false))
        );
        assert_eq!(
            resolve_v11_bool("Y").map(|r| r.value),
            Some(Value::Bool(true))
        );
        assert_eq!(
            resolve_v11_bool("on").map(|r| r.value),
            Some(Value::Bool(true))
        );
        assert_eq!(
            resolve_v11_bool("off").map(|r| r.value),
            Some(Value::Bool(false))
        );
        // Core does not know these spellings
        assert!(resolve_core_bool("yes").is_none());
    }

    #[test]
    fn v11_int_radixes() {
        let oct = resolve_v11_int("052").expect("leading-zero octal");
        assert_eq!(oct.value, Value::Int(42));
        assert_eq!(oct.format, Some(NumberFormat::Oct));

        let bin = resolve_v11_int("0b101").expect("binary");
        assert_eq!(bin.value, Value::Int(5));

        assert_eq!(
            resolve_v11_int("1_000").map(|r| r.value),
            Some(Value::Int(1000))
        );
        assert_eq!(
            resolve_v11_int("-0x1F").map(|r| r.value),
            Some(Value::Int(-31))
        );
    }

    #[test]
    fn v11_timestamps() {
        assert!(resolve_v11_timestamp("2001-12-15").is_some());
        assert!(resolve_v11_timestamp("2001-12-14 21:59:43.10 -5").is_some());
        assert!(resolve_v11_timestamp("2001-12-14t21:59:43.10-05:00").is_some());
        assert!(resolve_v11_timestamp("not-a-date").is_none());
    }

    #[test]
    fn v11_binary_roundtrip() {
        let resolved = resolve_v11_binary("aGVsbG8=").expect("base64");
        assert_eq!(resolved.value, Value::Bytes(b"hello".to_vec()));
    }
}
