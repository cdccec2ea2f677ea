//! A YAML 1.1/1.2 processor built around a mutable document tree.
//!
//! This crate parses YAML source into typed [`Document`]s — preserving
//! style choices (block vs. flow, quoting, block scalar headers),
//! comments, anchors and aliases — and serializes trees back to YAML that
//! any conforming loader (itself included) reads identically.
//!
//! Parsing recovers from syntax errors: a document always comes back,
//! carrying its [`errors`](Document::errors) and
//! [`warnings`](Document::warnings) with stable codes and source spans.
//!
//! # Example
//!
//! ```
//! use yamline::{parse, parse_document, stringify, ParseOptions, StringifyOptions};
//!
//! let input = "name: John\nage: 30\n";
//! let value = parse(input, &ParseOptions::default()).unwrap();
//! assert_eq!(value.get("name").and_then(|v| v.as_str()), Some("John"));
//!
//! let out = stringify(&value, &StringifyOptions::default()).unwrap();
//! assert_eq!(out, input);
//!
//! let doc = parse_document("a: 1 # one\n", &ParseOptions::default());
//! assert!(doc.errors.is_empty());
//! ```

mod compose;
pub mod error;
pub mod lexer;
pub mod node;
pub mod options;
mod parser;
pub mod schema;
pub mod span;
mod stringify;
pub mod syntax;
pub mod value;

use thiserror::Error;

pub use error::{EmitError, ErrorCode, LineCounter, ResolveError, YamlError, YamlWarning};
pub use node::{
    Alias, Document, Mapping, Node, NodeProps, Pair, Replacer, Scalar, ScalarStyle, Sequence,
    YamlVersion,
};
pub use options::{LogLevel, ParseOptions, SortEntries, StringifyOptions};
pub use schema::{NumberFormat, Resolved, Schema, SchemaName, TagDef};
pub use span::{Span, Spanned};
pub use value::Value;

/// Why the [`parse`] convenience failed.
#[derive(Debug, Error, PartialEq)]
pub enum ParseFailure {
    /// A syntax problem recorded during parsing
    #[error(transparent)]
    Syntax(YamlError),
    /// Alias or tag resolution failed while converting to a plain value
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Parse every document in `source`.
///
/// Empty (or whitespace-only) input yields an empty collection. Each
/// document carries its own errors and warnings; nothing is thrown.
#[must_use]
pub fn parse_all_documents(source: &str, options: &ParseOptions) -> Vec<Document> {
    compose::compose_source(source, options)
}

/// Parse exactly one document. When the source holds several, the first
/// is returned with a `MULTIPLE_DOCS` error appended; empty input yields
/// an empty document.
#[must_use]
pub fn parse_document(source: &str, options: &ParseOptions) -> Document {
    let mut docs = parse_all_documents(source, options);
    match docs.len() {
        0 => compose::empty_document(options),
        1 => docs.remove(0),
        _ => {
            let at = docs[1]
                .contents
                .as_ref()
                .and_then(|root| root.with_props(|p| p.span))
                .unwrap_or_else(|| span::span(source.len(), source.len()));
            let mut doc = docs.remove(0);
            doc.errors.push(
                YamlError::new(ErrorCode::MultipleDocs, at)
                    .with_message("only a single document is allowed here"),
            );
            doc
        }
    }
}

/// Parse a single document and convert it to a plain [`Value`].
///
/// Unless `log_level` is [`LogLevel::Silent`], the first recorded error
/// (and, at [`LogLevel::Error`], the first warning) is escalated to a
/// returned failure; with `pretty_errors` it carries a `line:col`
/// location.
pub fn parse(source: &str, options: &ParseOptions) -> Result<Value, ParseFailure> {
    let doc = parse_document(source, options);

    if options.log_level != LogLevel::Silent {
        if let Some(error) = doc.errors.first() {
            let error = if options.pretty_errors {
                let counter = LineCounter::new(source);
                let (line, col) = counter.line_col(error.span.start);
                error
                    .clone()
                    .with_message(format!("{error} at line {line}, column {col}"))
            } else {
                error.clone()
            };
            return Err(ParseFailure::Syntax(error));
        }
        if options.log_level == LogLevel::Error {
            if let Some(warning) = doc.warnings.first() {
                return Err(ParseFailure::Syntax(YamlError {
                    code: warning.code,
                    span: warning.span,
                    message: warning.message.clone(),
                }));
            }
        }
    }

    doc.to_native(options.max_alias_count).map_err(Into::into)
}

/// The schema a value-built document uses under these options.
fn schema_for_stringify(options: &StringifyOptions) -> (Schema, YamlVersion) {
    let version = options.version.unwrap_or_default();
    let name = match version {
        YamlVersion::V1_1 => SchemaName::Yaml11,
        YamlVersion::V1_2 => SchemaName::Core,
    };
    (Schema::new(name, &[]), version)
}

/// Serialize a plain value as a YAML document.
pub fn stringify(value: &Value, options: &StringifyOptions) -> Result<String, EmitError> {
    let (schema, version) = schema_for_stringify(options);
    let mut doc = Document::from_value(value, None, schema);
    doc.version = version;
    doc.to_string_with(options)
}

/// Serialize a plain value through a replacer. Returns `Ok(None)` when
/// the replacer skips the root — the "no output" sentinel.
pub fn stringify_filtered(
    value: &Value,
    replacer: &Replacer,
    options: &StringifyOptions,
) -> Result<Option<String>, EmitError> {
    let (schema, version) = schema_for_stringify(options);
    let mut doc = Document::new(schema, version);
    doc.contents =
        doc.create_node_with(value, Some(replacer), None, options.keep_undefined);
    if doc.contents.is_none() {
        return Ok(None);
    }
    doc.to_string_with(options).map(Some)
}
