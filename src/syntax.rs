//! The raw syntax tree produced by the parser.
//!
//! Syntax nodes carry node properties (anchor, tag, comments) separately
//! from content, mirroring YAML's grammar where properties attach to any
//! node. Scalar content is kept in *source* form here: quoted scalars are
//! undecoded, plain multiline scalars keep their line breaks, block scalar
//! bodies keep their indentation. The composer resolves all of that
//! against a schema.

use crate::lexer::BlockHeader;
use crate::span::Span;

/// Scalar presentation style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    /// Unquoted
    Plain,
    /// `'...'`
    QuoteSingle,
    /// `"..."`
    QuoteDouble,
    /// `|` block scalar
    BlockLiteral,
    /// `>` block scalar
    BlockFolded,
}

/// A raw parsed node: content plus optional properties.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    /// Optional anchor name (from `&name`) with its span
    pub anchor: Option<(String, Span)>,
    /// Optional tag in raw source form (from `!...`) with its span
    pub tag: Option<(String, Span)>,
    /// Comment lines on their own line(s) immediately before this node
    pub comment_before: Option<String>,
    /// Trailing comment on the same line as this node
    pub comment: Option<String>,
    /// Whether a blank line precedes this node
    pub space_before: bool,
    /// The node's content
    pub content: SyntaxContent,
    /// Source span covering the content
    pub span: Span,
}

impl SyntaxNode {
    #[must_use]
    pub fn new(content: SyntaxContent, span: Span) -> Self {
        Self {
            anchor: None,
            tag: None,
            comment_before: None,
            comment: None,
            space_before: false,
            content,
            span,
        }
    }

    /// An absent node (e.g. the missing value of `key:`).
    #[must_use]
    pub fn empty(span: Span) -> Self {
        Self::new(SyntaxContent::Empty, span)
    }

    /// Returns `true` if this node is a block (non-flow) collection.
    #[must_use]
    pub fn is_block_collection(&self) -> bool {
        matches!(
            &self.content,
            SyntaxContent::Seq { flow: false, .. } | SyntaxContent::Map { flow: false, .. }
        )
    }
}

/// Raw node content.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxContent {
    /// A scalar in source form.
    ///
    /// For `Plain`, `text` holds the logical lines joined by `\n` (the
    /// composer folds them). For quoted styles it holds the raw content
    /// between the quotes. For block styles it holds the raw body with
    /// per-line indentation, and `header` carries the `|`/`>` header.
    Scalar {
        style: ScalarStyle,
        text: String,
        header: Option<BlockHeader>,
    },
    /// A sequence, block or flow
    Seq { flow: bool, items: Vec<SyntaxNode> },
    /// A mapping, block or flow; entries may miss a key or value
    Map {
        flow: bool,
        entries: Vec<SyntaxEntry>,
    },
    /// An alias reference (`*name`)
    Alias(String),
    /// No content (missing value or key)
    Empty,
}

/// One mapping entry: either side may be absent (`? key` with no value,
/// or `: value` with no key).
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxEntry {
    pub key: Option<SyntaxNode>,
    pub value: Option<SyntaxNode>,
}

/// One document's worth of parsed syntax, plus its directive state.
#[derive(Debug, Clone, Default)]
pub struct SyntaxDocument {
    /// Version from `%YAML`, if present
    pub version: Option<String>,
    /// `%TAG` handle → prefix table, in source order
    pub tag_handles: Vec<(String, String)>,
    /// Whether the document was opened with `---`
    pub directives_end_marker: bool,
    /// The root node, absent for an empty document
    pub root: Option<SyntaxNode>,
    /// Comment lines between the directives and the root
    pub comment_before: Option<String>,
    /// Comment lines after the root
    pub comment: Option<String>,
    /// Errors recorded while lexing and parsing this document
    pub errors: Vec<crate::error::YamlError>,
}
