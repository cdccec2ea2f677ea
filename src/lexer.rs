//! Context-aware lexer for YAML source text.
//!
//! The lexer is a character scanner that tracks flow depth to tokenize
//! characters whose meaning differs between block and flow context:
//! - In **block context** (`flow_depth == 0`): `,` is an ordinary scalar
//!   character and `-`/`?` at an indicator position start block structure.
//! - In **flow context** (`flow_depth > 0`): `,[]{}` are delimiters.
//!
//! Quoted scalars are emitted with their *raw* source content; escape
//! decoding and line folding happen later, in the composer. Block scalar
//! bodies are collected here into a single [`Token::BlockBody`] that keeps
//! each line's full indentation, terminated by the first non-blank line at
//! or below the header line's indent.
//!
//! Lexing never fails. Malformed input produces error-marker tokens
//! ([`Token::FlowErrorEnd`]) plus recorded [`YamlError`]s, and scanning
//! continues so the parser can build a partial tree.

use std::collections::VecDeque;

use crate::error::{ErrorCode, YamlError};
use crate::span::{span, Span, Spanned};

/// Check if a character is valid in an anchor/alias name.
/// Per YAML 1.2, ns-anchor-char is any non-whitespace char except
/// c-flow-indicator: `[`, `]`, `{`, `}`, `,`
fn is_anchor_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '[' | ']' | '{' | '}' | ',')
}

/// Block scalar chomping indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Chomping {
    /// `-` strip all trailing newlines
    Strip,
    /// (default) clip to a single trailing newline
    #[default]
    Clip,
    /// `+` keep all trailing newlines
    Keep,
}

/// Block scalar header information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// `true` for `|` (literal), `false` for `>` (folded)
    pub literal: bool,
    /// Explicit indentation indicator (1-9), or None for auto-detect
    pub indent: Option<u8>,
    /// Chomping behavior for trailing newlines
    pub chomping: Chomping,
    /// Indent of the line the header appeared on; body lines must exceed it
    pub base: usize,
}

/// A source token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// U+FEFF at the start of the stream
    ByteOrderMark,
    /// `---` document start marker
    DocStart,
    /// `...` document end marker
    DocEnd,
    /// `{` flow mapping start
    FlowMapStart,
    /// `}` flow mapping end
    FlowMapEnd,
    /// `[` flow sequence start
    FlowSeqStart,
    /// `]` flow sequence end
    FlowSeqEnd,
    /// Marker emitted where a flow construct or quote was left unterminated
    FlowErrorEnd,
    /// `,` flow entry separator
    Comma,
    /// `?` explicit key indicator
    ExplicitKey,
    /// `:` mapping value indicator
    Colon,
    /// `-` block sequence entry indicator
    SeqItem,
    /// Anchor definition (`&name`, without the `&`)
    Anchor(String),
    /// Alias reference (`*name`, without the `*`)
    Alias(String),
    /// Tag in raw source form (`!`, `!!str`, `!h!x`, `!<uri>`)
    Tag(String),
    /// Start of a new line; the value is its indentation in spaces
    LineStart(usize),
    /// Inline whitespace run (spaces and tabs)
    Whitespace,
    /// Comment content (after `#`, without the `#`)
    Comment(String),
    /// A full `%...` directive line, `%` included
    Directive(String),
    /// `|` or `>` block scalar header
    BlockScalarHeader(BlockHeader),
    /// Raw block scalar body, lines joined by `\n`, indentation preserved
    BlockBody(String),
    /// Raw single-quoted content, quotes stripped, `''` not collapsed
    SingleQuoted(String),
    /// Raw double-quoted content, quotes stripped, escapes not decoded
    DoubleQuoted(String),
    /// A plain (unquoted) scalar line, trailing spaces trimmed
    Plain(String),
}

impl Token {
    /// Returns `true` if this token can begin a scalar node.
    #[must_use]
    pub const fn is_scalar_start(&self) -> bool {
        matches!(
            self,
            Self::Plain(_)
                | Self::SingleQuoted(_)
                | Self::DoubleQuoted(_)
                | Self::BlockScalarHeader(_)
        )
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByteOrderMark => write!(f, "byte order mark"),
            Self::DocStart => write!(f, "'---'"),
            Self::DocEnd => write!(f, "'...'"),
            Self::FlowMapStart => write!(f, "'{{'"),
            Self::FlowMapEnd => write!(f, "'}}'"),
            Self::FlowSeqStart => write!(f, "'['"),
            Self::FlowSeqEnd => write!(f, "']'"),
            Self::FlowErrorEnd => write!(f, "<unterminated>"),
            Self::Comma => write!(f, "','"),
            Self::ExplicitKey => write!(f, "'?'"),
            Self::Colon => write!(f, "':'"),
            Self::SeqItem => write!(f, "'-'"),
            Self::Anchor(name) => write!(f, "anchor '&{name}'"),
            Self::Alias(name) => write!(f, "alias '*{name}'"),
            Self::Tag(tag) => write!(f, "tag '{tag}'"),
            Self::LineStart(n) => write!(f, "line start (indent={n})"),
            Self::Whitespace => write!(f, "whitespace"),
            Self::Comment(text) => write!(f, "comment '{text}'"),
            Self::Directive(line) => write!(f, "directive '{line}'"),
            Self::BlockScalarHeader(h) => write!(f, "'{}'", if h.literal { '|' } else { '>' }),
            Self::BlockBody(_) => write!(f, "block scalar body"),
            Self::SingleQuoted(text) => write!(f, "single-quoted scalar '{text}'"),
            Self::DoubleQuoted(text) => write!(f, "double-quoted scalar '{text}'"),
            Self::Plain(text) => write!(f, "plain scalar '{text}'"),
        }
    }
}

/// The character-driven lexer state.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    byte_pos: usize,
    /// Column of the current position, in characters since the last newline
    col: usize,
    /// Number of unclosed `{` or `[`
    flow_depth: usize,
    /// Indent of the current line (set by the most recent line start)
    line_indent: usize,
    /// Whether the previous token was whitespace or a line start.
    /// A `#` only starts a comment when preceded by a separator.
    prev_was_separator: bool,
    /// Whether the previous token was a "JSON-like" value (quoted scalar,
    /// alias, flow end). After these, `:` is always an indicator in flow.
    prev_was_json_like: bool,
    /// Base indent captured at a `|`/`>` header; triggers body collection
    /// at the next newline
    pending_block: Option<usize>,
    /// Tokens scheduled ahead of the scanner (error markers)
    queued: VecDeque<Spanned<Token>>,
    errors: Vec<YamlError>,
}

impl Lexer {
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            byte_pos: 0,
            col: 0,
            flow_depth: 0,
            line_indent: 0,
            prev_was_separator: true,
            prev_was_json_like: false,
            pending_block: None,
            queued: VecDeque::new(),
            errors: Vec::new(),
        }
    }

    fn add_error(&mut self, code: ErrorCode, span: Span) {
        self.errors.push(YamlError::new(code, span));
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_n(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = *self.chars.get(self.pos)?;
        self.pos += 1;
        self.byte_pos += c.len_utf8();
        if c == '\n' || c == '\r' {
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn current_span(&self, start: usize) -> Span {
        span(start, self.byte_pos)
    }

    fn is_newline(c: char) -> bool {
        matches!(c, '\n' | '\r')
    }

    fn is_flow_indicator(c: char) -> bool {
        matches!(c, ',' | '[' | ']' | '{' | '}')
    }

    fn in_flow(&self) -> bool {
        self.flow_depth > 0
    }

    /// Check whether the remaining input starts with a document marker
    /// (`---` or `...` followed by whitespace or end of input).
    fn at_doc_marker(&self, marker: char) -> bool {
        if self.col != 0 {
            return false;
        }
        for n in 0..3 {
            if self.peek_n(n) != Some(marker) {
                return false;
            }
        }
        match self.peek_n(3) {
            None => true,
            Some(c) => c == ' ' || c == '\t' || Self::is_newline(c),
        }
    }

    /// Tokenize the whole input, returning tokens with spans and all
    /// recoverable errors encountered along the way.
    #[must_use]
    pub fn tokenize(mut self) -> (Vec<Spanned<Token>>, Vec<YamlError>) {
        let mut tokens: Vec<Spanned<Token>> = Vec::new();

        // Leading indentation of the first line
        if self.peek() == Some(' ') {
            let start = self.byte_pos;
            let mut indent = 0;
            while self.peek() == Some(' ') {
                self.advance();
                indent += 1;
            }
            self.line_indent = indent;
            tokens.push((Token::LineStart(indent), self.current_span(start)));
        }

        while !self.is_eof() || !self.queued.is_empty() {
            let Some((token, tok_span)) = self.next_token() else {
                break;
            };

            match &token {
                Token::FlowMapStart | Token::FlowSeqStart => self.flow_depth += 1,
                Token::FlowMapEnd | Token::FlowSeqEnd => {
                    self.flow_depth = self.flow_depth.saturating_sub(1);
                }
                _ => {}
            }

            // Whitespace-ish tokens are separators and leave the
            // JSON-like state untouched, allowing `"key"\n  :value`.
            match &token {
                Token::Whitespace | Token::LineStart(_) | Token::Comment(_) => {
                    self.prev_was_separator = true;
                }
                Token::SingleQuoted(_)
                | Token::DoubleQuoted(_)
                | Token::Alias(_)
                | Token::FlowMapEnd
                | Token::FlowSeqEnd => {
                    self.prev_was_json_like = true;
                    self.prev_was_separator = false;
                }
                _ => {
                    self.prev_was_json_like = false;
                    self.prev_was_separator = false;
                }
            }

            tokens.push((token, tok_span));
        }

        (tokens, self.errors)
    }

    fn queue(&mut self, token: Token, span: Span) {
        self.queued.push_back((token, span));
    }

    #[allow(clippy::too_many_lines)]
    fn next_token(&mut self) -> Option<Spanned<Token>> {
        if let Some(queued) = self.queued.pop_front() {
            return Some(queued);
        }

        let start = self.byte_pos;
        let c = self.peek()?;

        // Newlines produce LineStart tokens, except when a block scalar
        // header is pending; then the body is collected instead.
        if Self::is_newline(c) {
            if let Some(base) = self.pending_block.take() {
                return Some(self.collect_block_body(base));
            }
            self.advance();
            if c == '\r' && self.peek() == Some('\n') {
                self.advance();
            }
            let mut indent = 0;
            while self.peek() == Some(' ') {
                self.advance();
                indent += 1;
            }
            self.line_indent = indent;
            return Some((Token::LineStart(indent), self.current_span(start)));
        }

        if self.byte_pos == 0 && c == '\u{feff}' {
            self.advance();
            // The BOM does not occupy a column
            self.col = 0;
            return Some((Token::ByteOrderMark, self.current_span(start)));
        }

        if c == ' ' || c == '\t' {
            while matches!(self.peek(), Some(' ' | '\t')) {
                self.advance();
            }
            return Some((Token::Whitespace, self.current_span(start)));
        }

        // Comments. A `#` without a preceding separator is reported (the
        // parser keeps the error only in strict mode) but still consumed
        // as a comment for recovery.
        if c == '#' {
            if !self.prev_was_separator {
                let marker_span = span(start, start + 1);
                self.add_error(ErrorCode::CommentSpace, marker_span);
            }
            self.advance();
            let mut content = String::new();
            while let Some(ch) = self.peek() {
                if Self::is_newline(ch) {
                    break;
                }
                content.push(ch);
                self.advance();
            }
            return Some((Token::Comment(content), self.current_span(start)));
        }

        // Document markers at column 0
        if self.at_doc_marker('-') {
            for _ in 0..3 {
                self.advance();
            }
            return Some((Token::DocStart, self.current_span(start)));
        }
        if self.at_doc_marker('.') {
            for _ in 0..3 {
                self.advance();
            }
            return Some((Token::DocEnd, self.current_span(start)));
        }

        // Directive lines (block context only; `%` is an ordinary scalar
        // character inside flow collections)
        if c == '%' && self.col == 0 && !self.in_flow() {
            let mut line = String::new();
            while let Some(ch) = self.peek() {
                if Self::is_newline(ch) {
                    break;
                }
                line.push(ch);
                self.advance();
            }
            return Some((Token::Directive(line), self.current_span(start)));
        }

        match c {
            '{' => {
                self.advance();
                return Some((Token::FlowMapStart, self.current_span(start)));
            }
            '}' => {
                self.advance();
                return Some((Token::FlowMapEnd, self.current_span(start)));
            }
            '[' => {
                self.advance();
                return Some((Token::FlowSeqStart, self.current_span(start)));
            }
            ']' => {
                self.advance();
                return Some((Token::FlowSeqEnd, self.current_span(start)));
            }
            ',' if self.in_flow() => {
                self.advance();
                return Some((Token::Comma, self.current_span(start)));
            }
            _ => {}
        }

        // Block sequence entry: `-` followed by whitespace, newline, or EOF
        if c == '-' && !self.in_flow() {
            match self.peek_n(1) {
                None => {
                    self.advance();
                    return Some((Token::SeqItem, self.current_span(start)));
                }
                Some(next) if next == ' ' || next == '\t' || Self::is_newline(next) => {
                    self.advance();
                    return Some((Token::SeqItem, self.current_span(start)));
                }
                _ => {}
            }
        }

        // Explicit key indicator: `?` followed by whitespace/newline/EOF,
        // or a flow delimiter when inside a flow collection
        if c == '?' {
            let follows = self.peek_n(1);
            let is_indicator = match follows {
                None => true,
                Some(next) => {
                    next == ' '
                        || next == '\t'
                        || Self::is_newline(next)
                        || (self.in_flow() && Self::is_flow_indicator(next))
                }
            };
            if is_indicator {
                self.advance();
                return Some((Token::ExplicitKey, self.current_span(start)));
            }
        }

        // Colon: an indicator after a JSON-like value in flow, otherwise
        // only when followed by whitespace/newline/EOF (plus flow
        // delimiters in flow context)
        if c == ':' {
            let next = self.peek_n(1);
            let is_indicator = if self.prev_was_json_like && self.in_flow() {
                true
            } else {
                match next {
                    None => true,
                    Some(n) => {
                        n == ' '
                            || n == '\t'
                            || Self::is_newline(n)
                            || (self.in_flow() && Self::is_flow_indicator(n))
                    }
                }
            };
            if is_indicator {
                self.advance();
                return Some((Token::Colon, self.current_span(start)));
            }
        }

        if c == '&' {
            if let Some(next) = self.peek_n(1) {
                if is_anchor_char(next) {
                    self.advance();
                    let name = self.consume_anchor_name();
                    return Some((Token::Anchor(name), self.current_span(start)));
                }
            }
        }

        if c == '*' {
            if let Some(next) = self.peek_n(1) {
                if is_anchor_char(next) {
                    self.advance();
                    let name = self.consume_anchor_name();
                    return Some((Token::Alias(name), self.current_span(start)));
                }
            }
        }

        if c == '!' {
            return Some(self.consume_tag(start));
        }

        // Block scalar headers. Inside flow these are plain scalar
        // characters; the parser reports the structural error.
        if (c == '|' || c == '>') && !self.in_flow() {
            self.advance();
            let header = self.consume_block_header(c == '|');
            self.pending_block = Some(header.base);
            return Some((Token::BlockScalarHeader(header), self.current_span(start)));
        }

        if c == '\'' {
            return Some(self.consume_single_quoted(start));
        }
        if c == '"' {
            return Some(self.consume_double_quoted(start));
        }

        Some(self.consume_plain(start))
    }

    fn consume_anchor_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if is_anchor_char(c) {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        name
    }

    /// Consume a tag in raw source form. Verbatim tags run to the closing
    /// `>`; shorthand tags run to the next whitespace or flow indicator.
    fn consume_tag(&mut self, start: usize) -> Spanned<Token> {
        let mut tag = String::from('!');
        self.advance(); // consume !

        if self.peek() == Some('<') {
            tag.push('<');
            self.advance();
            let mut closed = false;
            while let Some(c) = self.peek() {
                if c.is_whitespace() {
                    break;
                }
                tag.push(c);
                self.advance();
                if c == '>' {
                    closed = true;
                    break;
                }
            }
            if !closed {
                let tag_span = self.current_span(start);
                self.add_error(ErrorCode::MissingChar, tag_span);
            }
        } else {
            while let Some(c) = self.peek() {
                if c.is_whitespace() || Self::is_flow_indicator(c) {
                    break;
                }
                tag.push(c);
                self.advance();
            }
        }

        (Token::Tag(tag), self.current_span(start))
    }

    fn consume_block_header(&mut self, literal: bool) -> BlockHeader {
        let mut indent = None;
        let mut chomping = Chomping::Clip;

        // Indent digit and chomping indicator, in either order
        for _ in 0..2 {
            match self.peek() {
                Some('+') => {
                    chomping = Chomping::Keep;
                    self.advance();
                }
                Some('-') => {
                    chomping = Chomping::Strip;
                    self.advance();
                }
                Some(c) if c.is_ascii_digit() && c != '0' => {
                    indent = Some((c as u8) - b'0');
                    self.advance();
                }
                _ => break,
            }
        }

        // Only whitespace and a comment may follow on the header line
        let trailing_start = self.byte_pos;
        let mut invalid = false;
        let mut saw_space = false;
        while let Some(c) = self.peek() {
            if Self::is_newline(c) {
                break;
            }
            if c == ' ' || c == '\t' {
                saw_space = true;
                self.advance();
                continue;
            }
            if c == '#' && saw_space {
                break; // the comment becomes its own token
            }
            invalid = true;
            self.advance();
        }
        if invalid {
            let bad = span(trailing_start, self.byte_pos);
            self.add_error(ErrorCode::UnexpectedToken, bad);
        }

        BlockHeader {
            literal,
            indent,
            chomping,
            base: self.line_indent,
        }
    }

    /// Collect a block scalar body. Called with the scanner sitting on the
    /// newline that ends the header line. Lines are accepted while blank or
    /// indented deeper than `base`; the terminating line is left unconsumed
    /// so it produces a normal `LineStart` next.
    fn collect_block_body(&mut self, base: usize) -> Spanned<Token> {
        let start = self.byte_pos;
        let mut lines: Vec<String> = Vec::new();
        // `committed` is the char index just after the last accepted line,
        // sitting on its terminating newline (or at EOF).
        let mut committed = self.pos;
        let mut i = self.pos;

        loop {
            if i >= self.chars.len() {
                committed = i;
                break;
            }
            // Tentatively step over the newline
            let mut j = i + 1;
            if self.chars[i] == '\r' && self.chars.get(j) == Some(&'\n') {
                j += 1;
            }
            if j >= self.chars.len() {
                // The input's final newline terminates the previous line
                // rather than starting a new one
                committed = j;
                break;
            }
            let mut k = j;
            let mut indent = 0;
            while self.chars.get(k) == Some(&' ') {
                k += 1;
                indent += 1;
            }
            let blank = matches!(self.chars.get(k), None | Some('\n' | '\r'));
            if !blank && indent <= base {
                break;
            }
            let mut m = k;
            while let Some(&ch) = self.chars.get(m) {
                if ch == '\n' || ch == '\r' {
                    break;
                }
                m += 1;
            }
            lines.push(self.chars[j..m].iter().collect());
            committed = m;
            i = m;
            if m >= self.chars.len() {
                break;
            }
        }

        // Bulk-advance the scanner to the committed position
        while self.pos < committed {
            self.advance();
        }

        let body = lines.join("\n");
        (Token::BlockBody(body), self.current_span(start))
    }

    /// Consume a single-quoted scalar's raw content. `''` pairs are kept
    /// verbatim; newlines are included raw for the composer to fold.
    fn consume_single_quoted(&mut self, start: usize) -> Spanned<Token> {
        let mut content = String::new();
        self.advance(); // opening '
        let mut terminated = false;

        while let Some(c) = self.peek() {
            if c == '\'' {
                if self.peek_n(1) == Some('\'') {
                    content.push_str("''");
                    self.advance();
                    self.advance();
                } else {
                    self.advance();
                    terminated = true;
                    break;
                }
            } else {
                content.push(c);
                self.advance();
            }
        }

        let tok_span = self.current_span(start);
        if !terminated {
            self.add_error(ErrorCode::MissingChar, tok_span);
            self.queue(Token::FlowErrorEnd, span(self.byte_pos, self.byte_pos));
        }
        (Token::SingleQuoted(content), tok_span)
    }

    /// Consume a double-quoted scalar's raw content. Escape sequences are
    /// passed through undecoded; `\"` and `\\` are honored only so far as
    /// not to terminate the scan early.
    fn consume_double_quoted(&mut self, start: usize) -> Spanned<Token> {
        let mut content = String::new();
        self.advance(); // opening "
        let mut terminated = false;

        while let Some(c) = self.peek() {
            if c == '"' {
                self.advance();
                terminated = true;
                break;
            }
            if c == '\\' {
                content.push(c);
                self.advance();
                if let Some(escaped) = self.peek() {
                    content.push(escaped);
                    self.advance();
                }
                continue;
            }
            content.push(c);
            self.advance();
        }

        let tok_span = self.current_span(start);
        if !terminated {
            self.add_error(ErrorCode::MissingChar, tok_span);
            self.queue(Token::FlowErrorEnd, span(self.byte_pos, self.byte_pos));
        }
        (Token::DoubleQuoted(content), tok_span)
    }

    /// Consume one line's worth of a plain scalar. Multi-line plain scalars
    /// are reassembled by the parser from consecutive Plain tokens.
    fn consume_plain(&mut self, start: usize) -> Spanned<Token> {
        let mut content = String::new();

        if matches!(self.peek(), Some('@' | '`')) {
            let bad = span(start, start + 1);
            self.add_error(ErrorCode::BadScalarStart, bad);
        }

        while let Some(c) = self.peek() {
            if Self::is_newline(c) {
                break;
            }

            if c == ':' {
                let next = self.peek_n(1);
                let terminates = match next {
                    None => true,
                    Some(n) => {
                        n == ' '
                            || n == '\t'
                            || Self::is_newline(n)
                            || (self.in_flow() && Self::is_flow_indicator(n))
                    }
                };
                if terminates {
                    break;
                }
            }

            // A space followed by `#` starts a trailing comment
            if (c == ' ' || c == '\t') && self.peek_n(1) == Some('#') {
                break;
            }

            // In block context flow indicators are ordinary characters;
            // a scalar can never *start* with one (handled by the caller)
            if Self::is_flow_indicator(c) && self.in_flow() {
                break;
            }

            content.push(c);
            self.advance();
        }

        (
            Token::Plain(content.trim_end().to_string()),
            self.current_span(start),
        )
    }
}

/// Tokenize YAML source, returning the token stream and any recoverable
/// errors found while scanning.
#[must_use]
pub fn tokenize(input: &str) -> (Vec<Spanned<Token>>, Vec<YamlError>) {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn significant(input: &str) -> Vec<Token> {
        let (tokens, _errors) = tokenize(input);
        tokens
            .into_iter()
            .filter(|(t, _)| !matches!(t, Token::Whitespace | Token::LineStart(_)))
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn colon_in_block_plain_scalar() {
        assert_eq!(significant(":foo"), vec![Token::Plain(":foo".into())]);
    }

    #[test]
    fn adjacent_colon_in_flow_plain() {
        assert_eq!(
            significant("{key:value}"),
            vec![
                Token::FlowMapStart,
                Token::Plain("key:value".into()),
                Token::FlowMapEnd,
            ]
        );
    }

    #[test]
    fn colon_with_space_in_flow() {
        assert_eq!(
            significant("{key: value}"),
            vec![
                Token::FlowMapStart,
                Token::Plain("key".into()),
                Token::Colon,
                Token::Plain("value".into()),
                Token::FlowMapEnd,
            ]
        );
    }

    #[test]
    fn colon_after_quoted_key_in_flow() {
        assert_eq!(
            significant("{\"adjacent\":value}"),
            vec![
                Token::FlowMapStart,
                Token::DoubleQuoted("adjacent".into()),
                Token::Colon,
                Token::Plain("value".into()),
                Token::FlowMapEnd,
            ]
        );
    }

    #[test]
    fn comma_is_plain_in_block_context() {
        assert_eq!(significant("a,b,c"), vec![Token::Plain("a,b,c".into())]);
    }

    #[test]
    fn comma_separates_in_flow() {
        assert_eq!(
            significant("[a,b]"),
            vec![
                Token::FlowSeqStart,
                Token::Plain("a".into()),
                Token::Comma,
                Token::Plain("b".into()),
                Token::FlowSeqEnd,
            ]
        );
    }

    #[test]
    fn seq_item_vs_negative_number() {
        assert_eq!(
            significant("- -1"),
            vec![Token::SeqItem, Token::Plain("-1".into())]
        );
    }

    #[test]
    fn document_markers() {
        assert_eq!(
            significant("---\na\n..."),
            vec![Token::DocStart, Token::Plain("a".into()), Token::DocEnd]
        );
    }

    #[test]
    fn doc_marker_requires_column_zero() {
        assert_eq!(significant("a: ---"), {
            vec![
                Token::Plain("a".into()),
                Token::Colon,
                Token::Plain("---".into()),
            ]
        });
    }

    #[test]
    fn anchor_alias_tag() {
        assert_eq!(
            significant("&a !!str *b"),
            vec![
                Token::Anchor("a".into()),
                Token::Tag("!!str".into()),
                Token::Alias("b".into()),
            ]
        );
    }

    #[test]
    fn directive_line() {
        let tokens = significant("%YAML 1.2\n---\nx");
        assert_eq!(tokens[0], Token::Directive("%YAML 1.2".into()));
        assert_eq!(tokens[1], Token::DocStart);
    }

    #[test]
    fn percent_in_flow_is_content() {
        let tokens = significant("{ matches\n% : 20 }");
        assert!(tokens.contains(&Token::FlowMapStart));
        assert!(!tokens.iter().any(|t| matches!(t, Token::Directive(_))));
    }

    #[test]
    fn block_scalar_header_and_body() {
        let (tokens, errors) = tokenize("key: |-\n  one\n  two\nnext: 1\n");
        assert!(errors.is_empty());
        let header = tokens
            .iter()
            .find_map(|(t, _)| match t {
                Token::BlockScalarHeader(h) => Some(*h),
                _ => None,
            })
            .expect("header token");
        assert!(header.literal);
        assert_eq!(header.chomping, Chomping::Strip);
        assert_eq!(header.base, 0);
        let body = tokens
            .iter()
            .find_map(|(t, _)| match t {
                Token::BlockBody(b) => Some(b.clone()),
                _ => None,
            })
            .expect("body token");
        assert_eq!(body, "  one\n  two");
        // The terminating line is tokenized normally
        assert!(tokens.iter().any(|(t, _)| *t == Token::Plain("next".into())));
    }

    #[test]
    fn block_body_keeps_trailing_blank_lines() {
        let (tokens, _) = tokenize("|+\n  a\n\n\n");
        let body = tokens
            .iter()
            .find_map(|(t, _)| match t {
                Token::BlockBody(b) => Some(b.clone()),
                _ => None,
            })
            .expect("body token");
        assert_eq!(body, "  a\n\n");
    }

    #[test]
    fn unterminated_double_quote_emits_error_marker() {
        let (tokens, errors) = tokenize("\"abc");
        assert!(errors.iter().any(|e| e.code == ErrorCode::MissingChar));
        assert!(tokens.iter().any(|(t, _)| *t == Token::FlowErrorEnd));
    }

    #[test]
    fn raw_escapes_not_decoded() {
        let tokens = significant(r#""a\nb""#);
        assert_eq!(tokens, vec![Token::DoubleQuoted("a\\nb".into())]);
    }

    #[test]
    fn single_quote_pairs_kept_raw() {
        let tokens = significant("'it''s'");
        assert_eq!(tokens, vec![Token::SingleQuoted("it''s".into())]);
    }

    #[test]
    fn comment_without_space_is_flagged() {
        let (_, errors) = tokenize("\"x\"#oops");
        assert!(errors.iter().any(|e| e.code == ErrorCode::CommentSpace));
    }
}
