//! Schema registry: ordered tag definitions and preset tag sets.
//!
//! A [`Schema`] holds an ordered list of [`TagDef`]s. Plain scalars are
//! resolved by trying each *default* tag's resolver in registration order;
//! the first match wins and anything unmatched stays a string. Explicitly
//! tagged scalars resolve through the named tag only.

pub mod tags;

use std::rc::Rc;

use crate::value::Value;

/// Canonical `tag:yaml.org,2002:` URIs.
pub mod uri {
    pub const PREFIX: &str = "tag:yaml.org,2002:";
    pub const STR: &str = "tag:yaml.org,2002:str";
    pub const MAP: &str = "tag:yaml.org,2002:map";
    pub const SEQ: &str = "tag:yaml.org,2002:seq";
    pub const NULL: &str = "tag:yaml.org,2002:null";
    pub const BOOL: &str = "tag:yaml.org,2002:bool";
    pub const INT: &str = "tag:yaml.org,2002:int";
    pub const FLOAT: &str = "tag:yaml.org,2002:float";
    pub const BINARY: &str = "tag:yaml.org,2002:binary";
    pub const TIMESTAMP: &str = "tag:yaml.org,2002:timestamp";
    pub const MERGE: &str = "tag:yaml.org,2002:merge";
    pub const SET: &str = "tag:yaml.org,2002:set";
    pub const OMAP: &str = "tag:yaml.org,2002:omap";
    pub const PAIRS: &str = "tag:yaml.org,2002:pairs";
}

/// Number formatting hint attached to resolved scalars and honored by the
/// stringifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    /// `0x..` (or `-0x..` under YAML 1.1)
    Hex,
    /// `0o..` (YAML 1.2) or `0..` (YAML 1.1)
    Oct,
    /// Exponential float notation
    Exp,
    /// `0b..` (YAML 1.1 only)
    Bin,
}

/// A successfully resolved scalar plus its formatting hints.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub value: Value,
    pub format: Option<NumberFormat>,
    /// Fraction digits to preserve when re-emitting a float (`1.20` → 2)
    pub min_fraction_digits: u32,
}

impl Resolved {
    #[must_use]
    pub fn plain(value: Value) -> Self {
        Self {
            value,
            format: None,
            min_fraction_digits: 0,
        }
    }

    #[must_use]
    pub fn formatted(value: Value, format: NumberFormat) -> Self {
        Self {
            value,
            format: Some(format),
            min_fraction_digits: 0,
        }
    }
}

/// One tag's behavior: how to recognize source text and native values.
#[derive(Debug, Clone, Copy)]
pub struct TagDef {
    /// Absolute tag URI
    pub tag: &'static str,
    /// Whether plain scalars are matched against this tag
    pub default: bool,
    /// Source text → value, `None` when the text does not match
    pub resolve: fn(&str) -> Option<Resolved>,
    /// Does this native value belong to this tag?
    pub identify: fn(&Value) -> bool,
}

/// The schema presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaName {
    /// Maps, sequences and strings only
    Failsafe,
    /// Adds JSON-shaped null/bool/int/float
    Json,
    /// YAML 1.2 core resolution
    #[default]
    Core,
    /// The YAML 1.1 tag set (timestamps, binary, yes/no/on/off, ...)
    Yaml11,
}

impl SchemaName {
    /// Parse a schema name as it appears in options (`"yaml-1.1"` etc.).
    #[must_use]
    pub fn from_option(name: &str) -> Option<Self> {
        match name {
            "failsafe" => Some(Self::Failsafe),
            "json" => Some(Self::Json),
            "core" => Some(Self::Core),
            "yaml-1.1" => Some(Self::Yaml11),
            _ => None,
        }
    }
}

/// An immutable, cheaply cloneable tag registry.
#[derive(Debug, Clone)]
pub struct Schema {
    pub name: SchemaName,
    tags: Rc<Vec<TagDef>>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new(SchemaName::Core, &[])
    }
}

impl Schema {
    /// Build a schema from a preset plus custom tags (tried after the
    /// preset's own, in the order given).
    #[must_use]
    pub fn new(name: SchemaName, custom: &[TagDef]) -> Self {
        let mut tag_list = tags::preset(name);
        tag_list.extend_from_slice(custom);
        Self {
            name,
            tags: Rc::new(tag_list),
        }
    }

    /// Resolve a plain scalar against the default tags, in order.
    #[must_use]
    pub fn resolve_plain(&self, text: &str) -> Option<(Resolved, &'static str)> {
        self.tags
            .iter()
            .filter(|t| t.default)
            .find_map(|t| (t.resolve)(text).map(|r| (r, t.tag)))
    }

    /// Resolve explicitly tagged scalar text through the named tag.
    /// `None` when the tag is unknown to this schema.
    #[must_use]
    pub fn resolve_tag(&self, tag: &str, text: &str) -> Option<Option<Resolved>> {
        let def = self.tags.iter().find(|t| t.tag == tag)?;
        Some((def.resolve)(text))
    }

    /// Whether this schema knows the given tag URI.
    #[must_use]
    pub fn knows_tag(&self, tag: &str) -> bool {
        tag == uri::MAP
            || tag == uri::SEQ
            || tag == uri::STR
            || self.tags.iter().any(|t| t.tag == tag)
    }

    /// The canonical tag for a native value under this schema.
    #[must_use]
    pub fn tag_of(&self, value: &Value) -> &'static str {
        match value {
            Value::Seq(_) => uri::SEQ,
            Value::Map(_) => uri::MAP,
            _ => self
                .tags
                .iter()
                .find(|t| (t.identify)(value))
                .map_or(uri::STR, |t| t.tag),
        }
    }

    /// Would this string be mistaken for a non-string scalar if emitted
    /// plain? Used by the stringifier to force quoting.
    #[must_use]
    pub fn plain_resolves_to_non_string(&self, text: &str) -> bool {
        self.resolve_plain(text).is_some()
    }
}

#[cfg(test)]
mod test_support {
    use super::*;

    /// A `!!locale` tag used by custom-tag tests.
    fn resolve_locale(text: &str) -> Option<Resolved> {
        if text.len() == 5 && text.as_bytes()[2] == b'-' {
            Some(Resolved::plain(Value::Str(text.to_uppercase())))
        } else {
            None
        }
    }

    pub fn locale_tag() -> TagDef {
        TagDef {
            tag: "!locale",
            default: false,
            resolve: resolve_locale,
            identify: |_| false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_resolves_in_order() {
        let schema = Schema::new(SchemaName::Core, &[]);
        let (resolved, tag) = schema.resolve_plain("42").expect("int");
        assert_eq!(resolved.value, Value::Int(42));
        assert_eq!(tag, uri::INT);

        let (resolved, tag) = schema.resolve_plain("null").expect("null");
        assert_eq!(resolved.value, Value::Null);
        assert_eq!(tag, uri::NULL);

        assert!(schema.resolve_plain("hello").is_none());
    }

    #[test]
    fn failsafe_resolves_nothing() {
        let schema = Schema::new(SchemaName::Failsafe, &[]);
        assert!(schema.resolve_plain("true").is_none());
        assert!(schema.resolve_plain("42").is_none());
    }

    #[test]
    fn custom_tags_are_reachable() {
        let schema = Schema::new(SchemaName::Core, &[test_support::locale_tag()]);
        let resolved = schema
            .resolve_tag("!locale", "en-us")
            .expect("tag known")
            .expect("text matches");
        assert_eq!(resolved.value, Value::Str("EN-US".into()));
        assert!(schema.resolve_tag("!locale", "nope").expect("known").is_none());
        assert!(schema.resolve_tag("!absent", "x").is_none());
    }

    #[test]
    fn tag_of_native_values() {
        let schema = Schema::new(SchemaName::Core, &[]);
        assert_eq!(schema.tag_of(&Value::Int(3)), uri::INT);
        assert_eq!(schema.tag_of(&Value::Str("x".into())), uri::STR);
        assert_eq!(schema.tag_of(&Value::Seq(vec![])), uri::SEQ);
        assert_eq!(schema.tag_of(&Value::Null), uri::NULL);
    }
}
