//! Parse and stringify options.

use crate::node::{Pair, ScalarStyle, YamlVersion};
use crate::schema::{SchemaName, TagDef};

/// How loudly the `parse` convenience reacts to recorded problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Never escalate; callers inspect `Document::errors` themselves
    Silent,
    /// Escalate errors, ignore warnings
    #[default]
    Warn,
    /// Escalate errors and warnings
    Error,
}

/// Options for the parsing pipeline.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Schema preset; defaults from the version (1.1 → `yaml-1.1`,
    /// 1.2 → `core`) when unset
    pub schema: Option<SchemaName>,
    /// Version assumed when the source has no `%YAML` directive
    pub version: YamlVersion,
    /// Extra tags, tried after the preset's own
    pub custom_tags: Vec<TagDef>,
    /// Render `line:col` locations onto error messages
    pub pretty_errors: bool,
    pub log_level: LogLevel,
    /// Enforce pedantic rules (comment spacing)
    pub strict: bool,
    /// Alias-expansion budget for native conversion; negative disables
    pub max_alias_count: i64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            schema: None,
            version: YamlVersion::default(),
            custom_tags: Vec::new(),
            pretty_errors: true,
            log_level: LogLevel::default(),
            strict: true,
            max_alias_count: 100,
        }
    }
}

impl ParseOptions {
    /// The schema preset in effect for a document of `version`.
    #[must_use]
    pub fn schema_for(&self, version: YamlVersion) -> SchemaName {
        self.schema.unwrap_or(match version {
            YamlVersion::V1_1 => SchemaName::Yaml11,
            YamlVersion::V1_2 => SchemaName::Core,
        })
    }
}

/// Map-entry ordering applied at serialization time.
#[derive(Debug, Clone, Copy, Default)]
pub enum SortEntries {
    /// Keep insertion order
    #[default]
    Off,
    /// Lexicographic by key
    Lex,
    /// Custom comparator over the pair objects
    By(fn(&Pair, &Pair) -> std::cmp::Ordering),
}

/// Options for serializing a document tree.
#[derive(Debug, Clone)]
pub struct StringifyOptions {
    /// Spaces per nesting level; accepted range 1..=8
    pub indent: usize,
    /// Whether sequence items indent one extra step inside a mapping
    pub indent_seq: bool,
    /// Preferred maximum line length; 0 disables folding
    pub line_width: usize,
    /// Minimum characters per folded line
    pub min_content_width: usize,
    /// Restrict double-quoted escapes to the JSON set
    pub double_quoted_as_json: bool,
    /// Minimum length before a double-quoted string is folded
    pub double_quoted_min_multi_line_length: usize,
    /// Spelling for null values
    pub null_str: String,
    /// Spelling for true
    pub true_str: String,
    /// Spelling for false
    pub false_str: String,
    /// Style used for strings with no explicit style
    pub default_string_type: ScalarStyle,
    /// Style used for keys; falls back to `default_string_type`
    pub default_key_type: Option<ScalarStyle>,
    /// Prefer single over double quotes when both are legal;
    /// `None` picks whichever needs fewer escapes
    pub single_quote: Option<bool>,
    /// Fail instead of emitting `?` explicit keys
    pub simple_keys: bool,
    pub sort_map_entries: SortEntries,
    /// Prefix for generated anchor labels
    pub anchor_prefix: String,
    /// Always open the document with `---`
    pub directives_end_marker: bool,
    /// Longest flow collection emitted on a single line
    pub max_flow_string_single_line_length: usize,
    /// Keep map entries whose value the replacer skips, as nulls, instead
    /// of dropping them
    pub keep_undefined: bool,
    /// Version override; defaults to the document's version
    pub version: Option<YamlVersion>,
}

impl Default for StringifyOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            indent_seq: true,
            line_width: 80,
            min_content_width: 20,
            double_quoted_as_json: false,
            double_quoted_min_multi_line_length: 40,
            null_str: "null".to_string(),
            true_str: "true".to_string(),
            false_str: "false".to_string(),
            default_string_type: ScalarStyle::Plain,
            default_key_type: None,
            single_quote: None,
            simple_keys: false,
            sort_map_entries: SortEntries::default(),
            anchor_prefix: "a".to_string(),
            directives_end_marker: false,
            max_flow_string_single_line_length: 60,
            keep_undefined: false,
            version: None,
        }
    }
}

impl StringifyOptions {
    /// Validate option values that have no sensible fallback.
    pub fn validate(&self) -> Result<(), crate::error::EmitError> {
        if self.indent == 0 || self.indent > 8 {
            return Err(crate::error::EmitError::BadIndent(self.indent));
        }
        Ok(())
    }
}
