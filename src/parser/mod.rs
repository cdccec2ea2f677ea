//! YAML parser with error recovery.
//!
//! The parser turns the lexer's flat token stream into a raw syntax tree
//! ([`SyntaxDocument`]s of [`SyntaxNode`]s), handling document boundaries,
//! directives, block structure (by indentation) and flow structure. Scalar
//! content stays in source form; the composer resolves it.
//!
//! Anchors and tags are node *properties* collected before the value they
//! attach to. `&anchor key: value` attaches the anchor to the key scalar,
//! while `&anchor\nkey: value` attaches it to the mapping; the
//! `crossed_newline` flag on [`Props`] tells the two apart.
//!
//! All syntactic errors are recorded with a stable code and span, and
//! parsing continues best-effort.

mod block;
mod flow;
mod scalar;

use crate::error::{ErrorCode, YamlError};
use crate::lexer::Token;
use crate::span::{span, Span, Spanned};
use crate::syntax::{SyntaxContent, SyntaxDocument, SyntaxNode};

/// Pending node properties collected before parsing the value.
#[derive(Debug, Default, Clone)]
pub(crate) struct Props {
    pub anchor: Option<(String, Span)>,
    pub tag: Option<(String, Span)>,
    pub comments: Vec<String>,
    pub space_before: bool,
    /// Whether a line boundary was crossed while accumulating these
    /// properties. Distinguishes `&a key: v` (anchor on the key) from
    /// `&a\nkey: v` (anchor on the mapping).
    pub crossed_newline: bool,
}

impl Props {
    pub fn is_empty(&self) -> bool {
        self.anchor.is_none() && self.tag.is_none()
    }

    /// Apply these properties to a node, extending its span over them.
    pub fn apply_to(self, mut node: SyntaxNode) -> SyntaxNode {
        let mut start = node.span.start;
        if let Some((_, anchor_span)) = &self.anchor {
            start = start.min(anchor_span.start);
        }
        if let Some((_, tag_span)) = &self.tag {
            start = start.min(tag_span.start);
        }
        node.span = span(start, node.span.end);
        node.anchor = self.anchor.map(|(name, _)| (name, node.span));
        node.tag = self.tag.map(|(tag, _)| (tag, node.span));
        if !self.comments.is_empty() {
            node.comment_before = Some(self.comments.join("\n"));
        }
        if self.space_before {
            node.space_before = true;
        }
        node
    }
}

/// Parser state over the lexed token stream.
pub(crate) struct Parser<'a> {
    pub tokens: &'a [Spanned<Token>],
    pub input: &'a str,
    pub pos: usize,
    pub errors: Vec<YamlError>,
    /// Indent of the line holding the current position
    pub line_indent: usize,
    /// Flow nesting depth (0 = block context)
    pub flow_depth: usize,
    /// Anchor names defined so far, for undefined-alias reporting
    pub anchors_seen: std::collections::HashSet<String>,
    /// Own-line comments waiting to attach to the next node
    pub pending_comments: Vec<String>,
    /// A blank line was crossed since the last node
    pub pending_space: bool,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Spanned<Token>], input: &'a str) -> Self {
        Self {
            tokens,
            input,
            pos: 0,
            errors: Vec::new(),
            line_indent: 0,
            flow_depth: 0,
            anchors_seen: std::collections::HashSet::new(),
            pending_comments: Vec::new(),
            pending_space: false,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    // peek/advance return references with the token slice's lifetime, so
    // callers can hold them across error recording and other mutation.
    pub fn peek(&self) -> Option<&'a Spanned<Token>> {
        self.tokens.get(self.pos)
    }

    pub fn peek_token(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    pub fn advance(&mut self) -> Option<&'a Spanned<Token>> {
        let tok = self.tokens.get(self.pos)?;
        if let Token::LineStart(n) = tok.0 {
            self.line_indent = n;
        }
        self.pos += 1;
        Some(tok)
    }

    /// Column (0-based, in bytes since the last newline) of a byte offset.
    /// Indentation is always ASCII spaces, so byte and character columns
    /// agree everywhere a column comparison happens.
    pub fn column_of(&self, offset: usize) -> usize {
        let before = &self.input[..offset.min(self.input.len())];
        match before.rfind('\n') {
            Some(nl) => offset - nl - 1,
            None => offset,
        }
    }

    pub fn current_span(&self) -> Span {
        self.peek().map_or_else(
            || span(self.input.len(), self.input.len()),
            |(_, sp)| *sp,
        )
    }

    pub fn error(&mut self, code: ErrorCode, at: Span) {
        self.errors.push(YamlError::new(code, at));
    }

    pub fn error_msg(&mut self, code: ErrorCode, at: Span, message: impl Into<String>) {
        self.errors.push(YamlError::new(code, at).with_message(message));
    }

    pub fn take_pending(&mut self) -> (Vec<String>, bool) {
        (
            std::mem::take(&mut self.pending_comments),
            std::mem::take(&mut self.pending_space),
        )
    }

    /// Skip inline whitespace only.
    pub fn skip_inline(&mut self) {
        while matches!(self.peek_token(), Some(Token::Whitespace)) {
            self.advance();
        }
    }

    /// Advance to the next significant token, consuming whitespace, line
    /// starts and own-line comments (which accumulate as pending leading
    /// comments). Returns `true` if at least one line boundary was crossed.
    pub fn advance_to_content(&mut self) -> bool {
        let mut crossed = false;
        let mut prev_was_linestart = false;
        loop {
            match self.peek_token() {
                Some(Token::Whitespace | Token::FlowErrorEnd) => {
                    self.advance();
                }
                Some(Token::LineStart(_)) => {
                    if prev_was_linestart {
                        self.pending_space = true;
                    }
                    crossed = true;
                    prev_was_linestart = true;
                    self.advance();
                    continue;
                }
                Some(Token::Comment(text)) => {
                    let text = text.clone();
                    self.advance();
                    self.pending_comments.push(text);
                }
                _ => break,
            }
            prev_was_linestart = false;
        }
        crossed
    }

    /// Attach a same-line trailing comment to `node` if one follows.
    pub fn attach_trailing_comment(&mut self, node: &mut SyntaxNode) {
        let mut look = self.pos;
        while let Some((Token::Whitespace, _)) = self.tokens.get(look) {
            look += 1;
        }
        if let Some((Token::Comment(text), _)) = self.tokens.get(look) {
            node.comment = Some(text.clone());
            self.pos = look + 1;
        }
    }

    /// Is the current position a `scalar: ` implicit-key pattern on one line?
    pub fn at_implicit_key(&self) -> bool {
        let mut look = self.pos;
        match self.tokens.get(look) {
            Some((Token::Plain(_) | Token::SingleQuoted(_) | Token::DoubleQuoted(_), _)) => {
                look += 1;
            }
            _ => return false,
        }
        while let Some((Token::Whitespace, _)) = self.tokens.get(look) {
            look += 1;
        }
        matches!(self.tokens.get(look), Some((Token::Colon, _)))
    }

    /// Record the implicit-key constraint errors for a key node: a block
    /// collection needs `{}`/`[]` wrapping (or an explicit `?` key), the
    /// key's source must stay on one line, and the separator must come
    /// within 1024 characters of the key's start.
    pub fn check_implicit_key(&mut self, key: &SyntaxNode, colon_span: Span) {
        if key.is_block_collection() {
            self.error(ErrorCode::BlockAsImplicitKey, key.span);
        }
        let end = key.span.end.min(self.input.len());
        let start = key.span.start.min(end);
        if self.input[start..end].contains('\n') {
            self.error(ErrorCode::MultilineImplicitKey, colon_span);
        }
        if colon_span.start.saturating_sub(key.span.start) > 1024 {
            self.error(ErrorCode::KeyOver1024Chars, key.span);
        }
    }

    /// Produce an empty node carrying any pending properties, or nothing.
    fn finish_empty(&mut self, props: Props) -> Option<SyntaxNode> {
        if props.is_empty() {
            None
        } else {
            let at = self.peek().map_or_else(
                || span(self.input.len(), self.input.len()),
                |(_, sp)| span(sp.start, sp.start),
            );
            Some(props.apply_to(SyntaxNode::empty(at)))
        }
    }

    /// Parse one value at the given minimum indentation.
    #[allow(clippy::too_many_lines)]
    pub fn parse_value(&mut self, min_indent: usize, mut props: Props) -> Option<SyntaxNode> {
        loop {
            let Some((tok, tok_span)) = self.peek() else {
                return self.finish_empty(props);
            };
            let tok_span = *tok_span;

            match tok {
                Token::Whitespace | Token::FlowErrorEnd | Token::ByteOrderMark => {
                    self.advance();
                }
                Token::Comment(text) => {
                    let text = text.clone();
                    self.advance();
                    self.pending_comments.push(text);
                }
                Token::LineStart(n) => {
                    let n = *n;
                    if self.flow_depth == 0 && n < min_indent {
                        return self.finish_empty(props);
                    }
                    self.advance();
                    if matches!(self.peek_token(), Some(Token::LineStart(_))) {
                        self.pending_space = true;
                    }
                    props.crossed_newline = true;
                }
                Token::DocStart | Token::DocEnd => {
                    return self.finish_empty(props);
                }
                Token::Directive(_) => {
                    self.error(ErrorCode::BadDirective, tok_span);
                    self.advance();
                }
                Token::Anchor(name) => {
                    if props.anchor.is_some() && !props.crossed_newline {
                        self.error(ErrorCode::MultipleAnchors, tok_span);
                    }
                    let name = name.clone();
                    self.anchors_seen.insert(name.clone());
                    props.anchor = Some((name, tok_span));
                    props.crossed_newline = false;
                    self.advance();
                    self.skip_inline();
                }
                Token::Tag(tag) => {
                    if props.tag.is_some() && !props.crossed_newline {
                        self.error(ErrorCode::MultipleTags, tok_span);
                    }
                    props.tag = Some((tag.clone(), tok_span));
                    props.crossed_newline = false;
                    self.advance();
                    self.skip_inline();
                }
                Token::Alias(name) => {
                    if !props.is_empty() && !props.crossed_newline {
                        self.error(ErrorCode::AliasProps, tok_span);
                    }
                    let name = name.clone();
                    if !self.anchors_seen.contains(&name) {
                        self.error(ErrorCode::UnresolvedAlias, tok_span);
                    }
                    self.advance();
                    let mut node = SyntaxNode::new(SyntaxContent::Alias(name), tok_span);
                    let (comments, space) = self.take_pending();
                    if !comments.is_empty() {
                        node.comment_before = Some(comments.join("\n"));
                    }
                    node.space_before = space;
                    // An alias followed by `: ` starts a block mapping
                    self.skip_inline();
                    if self.flow_depth == 0 && matches!(self.peek_token(), Some(Token::Colon)) {
                        let col = self.column_of(tok_span.start);
                        return Some(self.parse_block_mapping_from_key(col, node, props));
                    }
                    self.attach_trailing_comment(&mut node);
                    return Some(node);
                }
                Token::SeqItem => {
                    let col = self.column_of(tok_span.start);
                    return Some(self.parse_block_sequence(col, props));
                }
                Token::ExplicitKey => {
                    if self.flow_depth > 0 {
                        // handled by the flow parser; reaching here means a
                        // stray `?` at the value level
                        self.error(ErrorCode::UnexpectedToken, tok_span);
                        self.advance();
                        return Some(props.apply_to(SyntaxNode::empty(tok_span)));
                    }
                    let col = self.column_of(tok_span.start);
                    return Some(self.parse_block_mapping_explicit(col, props));
                }
                Token::Colon => {
                    // An empty implicit key (`: value`)
                    let col = self.column_of(tok_span.start);
                    return Some(self.parse_block_mapping_empty_key(col, props));
                }
                Token::FlowSeqStart | Token::FlowMapStart => {
                    let node = self.parse_flow_collection();
                    let col = self.column_of(node.span.start);
                    self.skip_inline();
                    if self.flow_depth == 0 && matches!(self.peek_token(), Some(Token::Colon)) {
                        let colon_span = self.current_span();
                        self.check_implicit_key(&node, colon_span);
                        // Same-line properties attach to the key, not the map
                        return Some(if props.crossed_newline {
                            self.parse_block_mapping_from_key(col, node, props)
                        } else {
                            let key = props.apply_to(node);
                            self.parse_block_mapping_from_key(col, key, Props::default())
                        });
                    }
                    let mut node = props.apply_to(node);
                    self.attach_trailing_comment(&mut node);
                    return Some(node);
                }
                Token::BlockScalarHeader(header) => {
                    let header = *header;
                    return Some(self.parse_block_scalar(header, tok_span, props));
                }
                Token::Plain(_) | Token::SingleQuoted(_) | Token::DoubleQuoted(_) => {
                    return Some(self.parse_scalar_or_mapping(min_indent, props));
                }
                Token::BlockBody(_) => {
                    self.error(ErrorCode::Impossible, tok_span);
                    self.advance();
                }
                Token::FlowMapEnd | Token::FlowSeqEnd | Token::Comma => {
                    self.error(ErrorCode::UnexpectedToken, tok_span);
                    self.advance();
                    return Some(props.apply_to(SyntaxNode::empty(tok_span)));
                }
            }
        }
    }

    /// Parse the whole token stream into documents.
    pub fn parse_stream(&mut self) -> Vec<SyntaxDocument> {
        let mut documents = Vec::new();

        if matches!(self.peek_token(), Some(Token::ByteOrderMark)) {
            self.advance();
        }

        loop {
            self.advance_to_content();
            if self.is_eof() {
                break;
            }

            let mut doc = SyntaxDocument::default();
            self.collect_directives(&mut doc);

            self.advance_to_content();
            if matches!(self.peek_token(), Some(Token::DocStart)) {
                self.advance();
                doc.directives_end_marker = true;
            } else if doc.version.is_some() || !doc.tag_handles.is_empty() {
                // Directives without a following `---`
                let at = self.current_span();
                self.error(ErrorCode::BadDirective, at);
            }

            // Leading comments stay pending so they attach to the root's
            // first node; an empty document claims them below.
            self.advance_to_content();
            doc.root = match self.peek_token() {
                None | Some(Token::DocStart | Token::DocEnd) => None,
                _ => self.parse_value(0, Props::default()),
            };
            if doc.root.is_none() {
                let (comments, _) = self.take_pending();
                if !comments.is_empty() {
                    doc.comment_before = Some(comments.join("\n"));
                }
            }

            // Consume anything left before the next document boundary
            loop {
                self.advance_to_content();
                match self.peek_token() {
                    None => break,
                    Some(Token::DocEnd) => {
                        self.advance();
                        // Trailing same-line comment after `...`
                        self.skip_inline();
                        if let Some(Token::Comment(text)) = self.peek_token() {
                            self.pending_comments.push(text.clone());
                            self.advance();
                        }
                        break;
                    }
                    Some(Token::DocStart) => break,
                    Some(_) => {
                        let at = self.current_span();
                        self.error(ErrorCode::UnexpectedToken, at);
                        self.advance();
                    }
                }
            }

            let (comments, _) = self.take_pending();
            if !comments.is_empty() {
                doc.comment = Some(comments.join("\n"));
            }

            documents.push(doc);
        }

        // Comment-only input still yields a document carrying it
        if documents.is_empty() && !self.pending_comments.is_empty() {
            let (comments, _) = self.take_pending();
            documents.push(SyntaxDocument {
                comment: Some(comments.join("\n")),
                ..Default::default()
            });
        }

        documents
    }

    /// Collect `%YAML` / `%TAG` directive lines into the document.
    fn collect_directives(&mut self, doc: &mut SyntaxDocument) {
        loop {
            self.advance_to_content();
            let Some((Token::Directive(line), dir_span)) = self.peek() else {
                break;
            };
            let line = line.clone();
            let dir_span = *dir_span;
            self.advance();

            // Strip a trailing comment from the directive line
            let text = match line.find(" #") {
                Some(idx) => line[..idx].trim_end(),
                None => line.trim_end(),
            };

            if let Some(rest) = text.strip_prefix("%YAML") {
                let version = rest.trim();
                if doc.version.is_some() {
                    self.error(ErrorCode::BadDirective, dir_span);
                }
                if version == "1.1" || version == "1.2" {
                    doc.version = Some(version.to_string());
                } else {
                    self.error_msg(
                        ErrorCode::BadDirective,
                        dir_span,
                        format!("unsupported YAML version {version}"),
                    );
                }
            } else if let Some(rest) = text.strip_prefix("%TAG") {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(handle), Some(prefix), None)
                        if handle.starts_with('!') && handle.ends_with('!') =>
                    {
                        doc.tag_handles
                            .push((handle.to_string(), prefix.to_string()));
                    }
                    _ => self.error(ErrorCode::BadDirective, dir_span),
                }
            }
            // Reserved directives (e.g. %FOO) are skipped silently
        }
    }
}

/// Parse a lexed token stream into raw syntax documents.
pub(crate) fn parse_tokens(
    tokens: &[Spanned<Token>],
    input: &str,
) -> (Vec<SyntaxDocument>, Vec<YamlError>) {
    let mut parser = Parser::new(tokens, input);
    let docs = parser.parse_stream();
    (docs, parser.errors)
}

/// Lex and parse YAML source into raw syntax documents. Errors from both
/// stages come back in one list; in non-strict mode, comment-spacing
/// pedantry is dropped.
pub(crate) fn parse_source(input: &str, strict: bool) -> (Vec<SyntaxDocument>, Vec<YamlError>) {
    let (tokens, mut errors) = crate::lexer::tokenize(input);
    if !strict {
        errors.retain(|e| e.code != ErrorCode::CommentSpace);
    }
    let (docs, parse_errors) = parse_tokens(&tokens, input);
    errors.extend(parse_errors);
    (docs, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::ScalarStyle;

    fn parse(input: &str) -> (Vec<SyntaxDocument>, Vec<YamlError>) {
        parse_source(input, false)
    }

    fn single_root(input: &str) -> SyntaxNode {
        let (docs, errors) = parse(input);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        assert_eq!(docs.len(), 1, "expected one document");
        docs.into_iter().next().unwrap().root.expect("root")
    }

    #[test]
    fn simple_scalar() {
        let root = single_root("hello");
        match root.content {
            SyntaxContent::Scalar { style, text, .. } => {
                assert_eq!(style, ScalarStyle::Plain);
                assert_eq!(text, "hello");
            }
            other => panic!("expected scalar, got {other:?}"),
        }
    }

    #[test]
    fn simple_mapping() {
        let root = single_root("key: value");
        let SyntaxContent::Map { flow, entries } = root.content else {
            panic!("expected mapping");
        };
        assert!(!flow);
        assert_eq!(entries.len(), 1);
        let key = entries[0].key.as_ref().expect("key");
        assert!(matches!(
            &key.content,
            SyntaxContent::Scalar { text, .. } if text == "key"
        ));
    }

    #[test]
    fn nested_block_structure() {
        let root = single_root("a:\n  b: 1\n  c:\n    - x\n    - y\nd: 2\n");
        let SyntaxContent::Map { entries, .. } = root.content else {
            panic!("expected mapping");
        };
        assert_eq!(entries.len(), 2);
        let inner = entries[0].value.as_ref().expect("a's value");
        let SyntaxContent::Map {
            entries: inner_entries,
            ..
        } = &inner.content
        else {
            panic!("expected nested mapping");
        };
        assert_eq!(inner_entries.len(), 2);
        let seq = inner_entries[1].value.as_ref().expect("c's value");
        assert!(matches!(
            &seq.content,
            SyntaxContent::Seq { flow: false, items } if items.len() == 2
        ));
    }

    #[test]
    fn block_sequence() {
        let root = single_root("- a\n- b\n- c\n");
        assert!(matches!(
            root.content,
            SyntaxContent::Seq { flow: false, ref items } if items.len() == 3
        ));
    }

    #[test]
    fn seq_item_at_parent_indent() {
        // Sequence items may sit at the same indent as their mapping key
        let root = single_root("key:\n- a\n- b\n");
        let SyntaxContent::Map { entries, .. } = root.content else {
            panic!("expected mapping");
        };
        let value = entries[0].value.as_ref().expect("value");
        assert!(matches!(
            &value.content,
            SyntaxContent::Seq { items, .. } if items.len() == 2
        ));
    }

    #[test]
    fn flow_collections() {
        let root = single_root("{a: 1, b: [x, y]}");
        let SyntaxContent::Map { flow, entries } = root.content else {
            panic!("expected mapping");
        };
        assert!(flow);
        assert_eq!(entries.len(), 2);
        let b_value = entries[1].value.as_ref().expect("b value");
        assert!(matches!(
            &b_value.content,
            SyntaxContent::Seq { flow: true, items } if items.len() == 2
        ));
    }

    #[test]
    fn anchor_on_key_vs_mapping() {
        let root = single_root("&m\nkey: value\n");
        assert_eq!(root.anchor.as_ref().map(|(n, _)| n.as_str()), Some("m"));

        let root = single_root("&k key: value\n");
        assert!(root.anchor.is_none());
        let SyntaxContent::Map { entries, .. } = root.content else {
            panic!("expected mapping");
        };
        let key = entries[0].key.as_ref().expect("key");
        assert_eq!(key.anchor.as_ref().map(|(n, _)| n.as_str()), Some("k"));
    }

    #[test]
    fn alias_value() {
        let root = single_root("a: &x 1\nb: *x\n");
        let SyntaxContent::Map { entries, .. } = root.content else {
            panic!("expected mapping");
        };
        let b = entries[1].value.as_ref().expect("b value");
        assert!(matches!(&b.content, SyntaxContent::Alias(name) if name == "x"));
    }

    #[test]
    fn undefined_alias_is_reported() {
        let (_, errors) = parse("a: *missing\n");
        assert!(errors.iter().any(|e| e.code == ErrorCode::UnresolvedAlias));
    }

    #[test]
    fn multiple_documents() {
        let (docs, errors) = parse("---\none\n---\ntwo\n");
        assert!(errors.is_empty());
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.directives_end_marker));
    }

    #[test]
    fn directives() {
        let (docs, errors) = parse("%YAML 1.1\n%TAG !e! tag:example.com,2000:\n---\nx\n");
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].version.as_deref(), Some("1.1"));
        assert_eq!(docs[0].tag_handles.len(), 1);
        assert_eq!(docs[0].tag_handles[0].0, "!e!");
    }

    #[test]
    fn directive_without_marker_errors() {
        let (_, errors) = parse("%YAML 1.2\nvalue\n");
        assert!(errors.iter().any(|e| e.code == ErrorCode::BadDirective));
    }

    #[test]
    fn multiline_plain_scalar_folds_in_tree() {
        let root = single_root("a\nb\nc\n");
        assert!(matches!(
            root.content,
            SyntaxContent::Scalar { ref text, .. } if text == "a\nb\nc"
        ));
    }

    #[test]
    fn explicit_key_mapping() {
        let root = single_root("? key\n: value\n");
        let SyntaxContent::Map { entries, .. } = root.content else {
            panic!("expected mapping");
        };
        assert_eq!(entries.len(), 1);
        assert!(entries[0].key.is_some());
        assert!(entries[0].value.is_some());
    }

    #[test]
    fn explicit_key_without_value() {
        let root = single_root("? ~\n");
        let SyntaxContent::Map { entries, .. } = root.content else {
            panic!("expected mapping");
        };
        assert_eq!(entries.len(), 1);
        assert!(entries[0].value.is_none());
    }

    #[test]
    fn comment_attachment() {
        let root = single_root("# leading\nkey: value # trailing\n");
        let SyntaxContent::Map { entries, .. } = &root.content else {
            panic!("expected mapping");
        };
        let key = entries[0].key.as_ref().expect("key");
        assert_eq!(key.comment_before.as_deref(), Some(" leading"));
        let value = entries[0].value.as_ref().expect("value");
        assert_eq!(value.comment.as_deref(), Some(" trailing"));
    }

    #[test]
    fn block_scalar_value() {
        let root = single_root("key: |\n  line one\n  line two\n");
        let SyntaxContent::Map { entries, .. } = root.content else {
            panic!("expected mapping");
        };
        let value = entries[0].value.as_ref().expect("value");
        match &value.content {
            SyntaxContent::Scalar {
                style,
                text,
                header,
            } => {
                assert_eq!(*style, ScalarStyle::BlockLiteral);
                assert_eq!(text, "  line one\n  line two");
                assert!(header.is_some());
            }
            other => panic!("expected block scalar, got {other:?}"),
        }
    }

    #[test]
    fn tagged_scalar() {
        let root = single_root("!!str 3\n");
        assert_eq!(root.tag.as_ref().map(|(t, _)| t.as_str()), Some("!!str"));
    }

    #[test]
    fn multiple_anchors_error() {
        let (_, errors) = parse("&a &b value\n");
        assert!(errors.iter().any(|e| e.code == ErrorCode::MultipleAnchors));
    }

    #[test]
    fn key_over_1024_reported() {
        let long_key = "k".repeat(1100);
        let (_, errors) = parse(&format!("[{long_key} : v]\n"));
        assert!(errors.iter().any(|e| e.code == ErrorCode::KeyOver1024Chars));
    }
}
