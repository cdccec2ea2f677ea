//! Error types for YAML processing.
//!
//! Parsing never fails outright: syntactic problems are recorded on the
//! owning document as [`YamlError`] values (with a stable code and a source
//! span) and parsing continues best-effort. Converting a tree to a plain
//! value can fail with [`ResolveError`], and serialization can fail with
//! [`EmitError`]; both are fatal and produce no partial output.

use crate::span::Span;
use derive_more::Display;
use thiserror::Error;

/// Stable machine-readable codes for recoverable parse errors and warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorCode {
    /// Source contains more than one document where one was requested
    #[display("source contains multiple documents")]
    MultipleDocs,

    /// More than one anchor on the same node
    #[display("a node can have at most one anchor")]
    MultipleAnchors,

    /// More than one tag on the same node
    #[display("a node can have at most one tag")]
    MultipleTags,

    /// An explicitly tagged scalar did not match its tag's resolver
    #[display("value does not match its tag")]
    TagResolveFailed,

    /// A required character (closing quote, flow terminator, comma) is missing
    #[display("missing required character")]
    MissingChar,

    /// A token that cannot appear at this position
    #[display("unexpected token")]
    UnexpectedToken,

    /// A scalar starts with a character that is not legal in this context
    #[display("scalar cannot start with this character")]
    BadScalarStart,

    /// Block-style construct inside a flow collection
    #[display("block constructs are not allowed in flow context")]
    BlockInFlow,

    /// A block collection used as an implicit key
    #[display("a block collection cannot be an implicit key")]
    BlockAsImplicitKey,

    /// An implicit key spanning more than one line
    #[display("implicit keys must be on a single line")]
    MultilineImplicitKey,

    /// Implicit-key separator found more than 1024 characters after key start
    #[display("implicit key is longer than 1024 characters")]
    KeyOver1024Chars,

    /// `#` not preceded by whitespace (strict mode only)
    #[display("comments must be separated from other tokens by whitespace")]
    CommentSpace,

    /// Malformed or misplaced `%YAML` / `%TAG` directive
    #[display("invalid directive")]
    BadDirective,

    /// A mapping repeats an equal key (warning)
    #[display("map keys must be unique")]
    DuplicateKey,

    /// Anchor or tag attached to an alias node
    #[display("an alias node cannot have anchors or tags")]
    AliasProps,

    /// An alias references an anchor that has not been seen yet
    #[display("alias references an undefined anchor")]
    UnresolvedAlias,

    /// Internal invariant violation
    #[display("internal error, this should not happen")]
    Impossible,
}

impl ErrorCode {
    /// The stable string form of this code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MultipleDocs => "MULTIPLE_DOCS",
            Self::MultipleAnchors => "MULTIPLE_ANCHORS",
            Self::MultipleTags => "MULTIPLE_TAGS",
            Self::TagResolveFailed => "TAG_RESOLVE_FAILED",
            Self::MissingChar => "MISSING_CHAR",
            Self::UnexpectedToken => "UNEXPECTED_TOKEN",
            Self::BadScalarStart => "BAD_SCALAR_START",
            Self::BlockInFlow => "BLOCK_IN_FLOW",
            Self::BlockAsImplicitKey => "BLOCK_AS_IMPLICIT_KEY",
            Self::MultilineImplicitKey => "MULTILINE_IMPLICIT_KEY",
            Self::KeyOver1024Chars => "KEY_OVER_1024_CHARS",
            Self::CommentSpace => "COMMENT_SPACE",
            Self::BadDirective => "BAD_DIRECTIVE",
            Self::DuplicateKey => "DUPLICATE_KEY",
            Self::AliasProps => "ALIAS_PROPS",
            Self::UnresolvedAlias => "UNRESOLVED_ALIAS",
            Self::Impossible => "IMPOSSIBLE",
        }
    }
}

/// A recoverable error recorded on a document during parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct YamlError {
    /// The error code
    pub code: ErrorCode,
    /// The span in the source where the error occurred
    pub span: Span,
    /// Extra context beyond the code's canonical message, if any
    pub message: Option<String>,
}

impl YamlError {
    /// Create a new error with just a code and span.
    #[must_use]
    pub const fn new(code: ErrorCode, span: Span) -> Self {
        Self {
            code,
            span,
            message: None,
        }
    }

    /// Attach a context message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Render this error with a `line:col` location from the counter.
    #[must_use]
    pub fn pretty(&self, counter: &LineCounter) -> String {
        let (line, col) = counter.line_col(self.span.start);
        match &self.message {
            Some(message) => format!("{} at line {line}, column {col}: {message}", self.code),
            None => format!("{} at line {line}, column {col}", self.code),
        }
    }
}

impl std::fmt::Display for YamlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

impl std::error::Error for YamlError {}

/// A non-fatal condition recorded on a document during parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct YamlWarning {
    /// The warning code
    pub code: ErrorCode,
    /// The span in the source the warning refers to
    pub span: Span,
    /// Extra context, if any
    pub message: Option<String>,
}

impl YamlWarning {
    #[must_use]
    pub const fn new(code: ErrorCode, span: Span) -> Self {
        Self {
            code,
            span,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl std::fmt::Display for YamlWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

/// A fatal error raised while serializing a node tree.
///
/// Serialization produces no partial output: the first violated constraint
/// aborts the whole pass.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmitError {
    /// `indent` outside the accepted 1..=8 range
    #[error("invalid indent of {0}, expected a value in 1..=8")]
    BadIndent(usize),

    /// A mapping's item list holds something that is not a pair
    #[error("mapping items must all be key/value pairs")]
    NotAPair,

    /// A key that cannot be rendered as a simple key under `simple_keys`
    #[error("cannot render {0} as a simple key")]
    ForbiddenSimpleKey(String),

    /// An alias whose anchor has not been emitted yet
    #[error("alias *{0} would be emitted before its anchor")]
    UnresolvedAlias(String),

    /// A value the active schema has no representation for
    #[error("cannot stringify value: {0}")]
    Unrepresentable(String),
}

/// A fatal error raised while converting a document tree to a plain value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// An alias whose anchor never appeared earlier in the document
    #[error("unresolved alias *{0}")]
    UnresolvedAlias(String),

    /// Alias expansion work exceeded `max_alias_count`
    #[error("excessive alias expansion through *{0}")]
    ExcessiveAliasCount(String),

    /// An alias participating in a reference cycle
    #[error("alias *{0} forms a cycle and cannot become a plain value")]
    CyclicAlias(String),
}

impl ResolveError {
    /// The stable string form of this error's code, matching the registry
    /// that [`ErrorCode::as_str`] draws from.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnresolvedAlias(_) => "UNRESOLVED_ALIAS",
            Self::ExcessiveAliasCount(_) => "EXCESSIVE_ALIAS_COUNT",
            Self::CyclicAlias(_) => "CYCLIC_ALIAS",
        }
    }
}

/// Byte-offset to line/column translation table.
///
/// Build one per source string; lookups are binary searches over the
/// recorded line starts. Lines and columns are 1-based.
#[derive(Debug, Clone)]
pub struct LineCounter {
    line_starts: Vec<usize>,
}

impl LineCounter {
    /// Index the line starts of `source`.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (idx, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        Self { line_starts }
    }

    /// Translate a byte offset to a 1-based `(line, column)` pair.
    #[must_use]
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        (line + 1, offset - self.line_starts[line] + 1)
    }
}
