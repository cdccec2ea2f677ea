//! Flow collection parsing: `[ ... ]` and `{ ... }`.
//!
//! Inside flow collections indentation is insignificant and entries are
//! comma-separated. A `key: value` pair inside a flow sequence becomes a
//! single-entry flow mapping. Missing commas and unterminated collections
//! are recovered from with a recorded error.

use crate::error::ErrorCode;
use crate::lexer::Token;
use crate::span::span;
use crate::syntax::{ScalarStyle, SyntaxContent, SyntaxEntry, SyntaxNode};

use super::{Parser, Props};

impl Parser<'_> {
    /// Parse a flow collection at the current `[` or `{` token.
    pub(crate) fn parse_flow_collection(&mut self) -> SyntaxNode {
        match self.peek_token() {
            Some(Token::FlowSeqStart) => self.parse_flow_seq(),
            Some(Token::FlowMapStart) => self.parse_flow_map(),
            _ => {
                let at = self.current_span();
                self.error(ErrorCode::Impossible, at);
                SyntaxNode::empty(at)
            }
        }
    }

    fn parse_flow_seq(&mut self) -> SyntaxNode {
        let open = self.current_span();
        self.advance();
        self.flow_depth += 1;

        let mut items: Vec<SyntaxNode> = Vec::new();
        let mut end = open.end;

        loop {
            self.advance_to_content();
            match self.peek_token() {
                None | Some(Token::DocStart | Token::DocEnd | Token::Directive(_)) => {
                    self.error_msg(ErrorCode::MissingChar, open, "flow sequence is not closed");
                    break;
                }
                Some(Token::FlowSeqEnd) => {
                    end = self.current_span().end;
                    self.advance();
                    break;
                }
                Some(Token::FlowMapEnd) => {
                    let at = self.current_span();
                    self.error(ErrorCode::UnexpectedToken, at);
                    end = at.end;
                    self.advance();
                    break;
                }
                Some(Token::Comma) => {
                    // An empty entry such as `[a, , b]`
                    let at = self.current_span();
                    self.error(ErrorCode::UnexpectedToken, at);
                    self.advance();
                    continue;
                }
                Some(_) => {}
            }

            let Some(item) = self.parse_flow_item() else {
                let at = self.current_span();
                self.error(ErrorCode::UnexpectedToken, at);
                self.advance();
                continue;
            };
            end = end.max(item.span.end);
            items.push(item);

            self.advance_to_content();
            match self.peek_token() {
                Some(Token::Comma) => {
                    self.advance();
                }
                Some(Token::FlowSeqEnd) | None => {}
                Some(Token::DocStart | Token::DocEnd | Token::Directive(_)) => {}
                Some(_) => {
                    let at = self.current_span();
                    self.error_msg(ErrorCode::MissingChar, at, "expected a comma or ]");
                }
            }
        }

        self.flow_depth -= 1;
        SyntaxNode::new(
            SyntaxContent::Seq { flow: true, items },
            span(open.start, end),
        )
    }

    fn parse_flow_map(&mut self) -> SyntaxNode {
        let open = self.current_span();
        self.advance();
        self.flow_depth += 1;

        let mut entries: Vec<SyntaxEntry> = Vec::new();
        let mut end = open.end;

        loop {
            self.advance_to_content();
            match self.peek_token() {
                None | Some(Token::DocStart | Token::DocEnd | Token::Directive(_)) => {
                    self.error_msg(ErrorCode::MissingChar, open, "flow mapping is not closed");
                    break;
                }
                Some(Token::FlowMapEnd) => {
                    end = self.current_span().end;
                    self.advance();
                    break;
                }
                Some(Token::FlowSeqEnd) => {
                    let at = self.current_span();
                    self.error(ErrorCode::UnexpectedToken, at);
                    end = at.end;
                    self.advance();
                    break;
                }
                Some(Token::Comma) => {
                    let at = self.current_span();
                    self.error(ErrorCode::UnexpectedToken, at);
                    self.advance();
                    continue;
                }
                Some(Token::ExplicitKey) => {
                    self.advance();
                    let key = self.parse_flow_node();
                    self.advance_to_content();
                    let value = if matches!(self.peek_token(), Some(Token::Colon)) {
                        self.advance();
                        self.parse_flow_node()
                    } else {
                        None
                    };
                    if let Some(k) = &key {
                        end = end.max(k.span.end);
                    }
                    if let Some(v) = &value {
                        end = end.max(v.span.end);
                    }
                    entries.push(SyntaxEntry { key, value });
                }
                Some(_) => {
                    let key = self.parse_flow_node();
                    self.advance_to_content();
                    let value = if matches!(self.peek_token(), Some(Token::Colon)) {
                        let colon_span = self.current_span();
                        if let Some(k) = &key {
                            self.check_implicit_key(k, colon_span);
                        }
                        self.advance();
                        self.parse_flow_node()
                    } else {
                        None
                    };
                    if key.is_none() && value.is_none() {
                        let at = self.current_span();
                        self.error(ErrorCode::UnexpectedToken, at);
                        self.advance();
                        continue;
                    }
                    if let Some(k) = &key {
                        end = end.max(k.span.end);
                    }
                    if let Some(v) = &value {
                        end = end.max(v.span.end);
                    }
                    entries.push(SyntaxEntry { key, value });
                }
            }

            self.advance_to_content();
            match self.peek_token() {
                Some(Token::Comma) => {
                    self.advance();
                }
                Some(Token::FlowMapEnd) | None => {}
                Some(Token::DocStart | Token::DocEnd | Token::Directive(_)) => {}
                Some(_) => {
                    let at = self.current_span();
                    self.error_msg(ErrorCode::MissingChar, at, "expected a comma or }");
                }
            }
        }

        self.flow_depth -= 1;
        SyntaxNode::new(
            SyntaxContent::Map {
                flow: true,
                entries,
            },
            span(open.start, end),
        )
    }

    /// Parse one flow-sequence entry: a value, an implicit `key: value`
    /// pair (wrapped in a single-entry mapping), or an explicit `?` pair.
    /// Returns `None` without consuming if nothing value-like is present.
    fn parse_flow_item(&mut self) -> Option<SyntaxNode> {
        if matches!(self.peek_token(), Some(Token::ExplicitKey)) {
            let start = self.current_span();
            self.advance();
            let key = self.parse_flow_node();
            self.advance_to_content();
            let value = if matches!(self.peek_token(), Some(Token::Colon)) {
                self.advance();
                self.parse_flow_node()
            } else {
                None
            };
            let end = value
                .as_ref()
                .map_or_else(|| key.as_ref().map_or(start.end, |k| k.span.end), |v| v.span.end);
            return Some(SyntaxNode::new(
                SyntaxContent::Map {
                    flow: true,
                    entries: vec![SyntaxEntry { key, value }],
                },
                span(start.start, end),
            ));
        }

        let node = self.parse_flow_node();

        // `value :` turns the value into a pair's key
        self.advance_to_content();
        if matches!(self.peek_token(), Some(Token::Colon)) {
            let colon_span = self.current_span();
            if let Some(k) = &node {
                self.check_implicit_key(k, colon_span);
            }
            self.advance();
            let value = self.parse_flow_node();
            let key_start = node.as_ref().map_or(colon_span.start, |k| k.span.start);
            let end = value
                .as_ref()
                .map_or(colon_span.end, |v| v.span.end);
            return Some(SyntaxNode::new(
                SyntaxContent::Map {
                    flow: true,
                    entries: vec![SyntaxEntry { key: node, value }],
                },
                span(key_start, end),
            ));
        }

        node
    }

    /// Parse one flow node: properties plus a scalar, nested collection,
    /// or alias. Returns `None` without consuming anything significant if
    /// the position holds a delimiter instead of a value.
    fn parse_flow_node(&mut self) -> Option<SyntaxNode> {
        self.advance_to_content();

        let mut props = Props::default();
        {
            let (comments, space) = self.take_pending();
            props.comments = comments;
            props.space_before = space;
        }

        loop {
            let (tok, tok_span) = self.peek()?;
            let tok_span = *tok_span;
            match tok {
                Token::Anchor(name) => {
                    if props.anchor.is_some() {
                        self.error(ErrorCode::MultipleAnchors, tok_span);
                    }
                    let name = name.clone();
                    self.anchors_seen.insert(name.clone());
                    props.anchor = Some((name, tok_span));
                    self.advance();
                    self.advance_to_content();
                }
                Token::Tag(tag) => {
                    if props.tag.is_some() {
                        self.error(ErrorCode::MultipleTags, tok_span);
                    }
                    props.tag = Some((tag.clone(), tok_span));
                    self.advance();
                    self.advance_to_content();
                }
                Token::Alias(name) => {
                    if !props.is_empty() {
                        self.error(ErrorCode::AliasProps, tok_span);
                    }
                    let name = name.clone();
                    if !self.anchors_seen.contains(&name) {
                        self.error(ErrorCode::UnresolvedAlias, tok_span);
                    }
                    self.advance();
                    let mut node = SyntaxNode::new(SyntaxContent::Alias(name), tok_span);
                    self.attach_trailing_comment(&mut node);
                    return Some(node);
                }
                Token::FlowSeqStart | Token::FlowMapStart => {
                    let node = self.parse_flow_collection();
                    return Some(props.apply_to(node));
                }
                Token::Plain(_) => {
                    let node = self.parse_flow_plain();
                    return Some(props.apply_to(node));
                }
                Token::SingleQuoted(_) | Token::DoubleQuoted(_) => {
                    let node = self.scalar_token_node()?;
                    let mut node = props.apply_to(node);
                    self.attach_trailing_comment(&mut node);
                    return Some(node);
                }
                Token::BlockScalarHeader(_) | Token::SeqItem => {
                    self.error(ErrorCode::BlockInFlow, tok_span);
                    self.advance();
                    return Some(props.apply_to(SyntaxNode::empty(tok_span)));
                }
                _ => {
                    // A delimiter: nothing here. Properties with no value
                    // still form an (empty) node.
                    if props.is_empty() {
                        return None;
                    }
                    return Some(props.apply_to(SyntaxNode::empty(span(
                        tok_span.start,
                        tok_span.start,
                    ))));
                }
            }
        }
    }

    /// A plain scalar in flow context, joining continuation lines.
    fn parse_flow_plain(&mut self) -> SyntaxNode {
        let Some((Token::Plain(first), first_span)) = self.peek() else {
            let at = self.current_span();
            return SyntaxNode::empty(at);
        };
        let mut text = first.clone();
        let first_span = *first_span;
        let start = first_span.start;
        let mut end = first_span.end;
        self.advance();

        loop {
            let Some(ahead) = self.peek_content() else {
                break;
            };
            if !ahead.crossed {
                break;
            }
            let Token::Plain(next) = &self.tokens[ahead.idx].0 else {
                break;
            };
            if self.implicit_key_at(ahead.idx) {
                break;
            }
            if self.tokens[self.pos..ahead.idx]
                .iter()
                .any(|(t, _)| matches!(t, Token::Comment(_)))
            {
                break;
            }
            let newlines = self.tokens[self.pos..ahead.idx]
                .iter()
                .filter(|(t, _)| matches!(t, Token::LineStart(_)))
                .count();
            let next = next.clone();
            self.advance_to_content();
            end = self.current_span().end;
            self.advance();
            for _ in 0..newlines {
                text.push('\n');
            }
            text.push_str(&next);
        }
        self.pending_space = false;

        SyntaxNode::new(
            SyntaxContent::Scalar {
                style: ScalarStyle::Plain,
                text,
                header: None,
            },
            span(start, end),
        )
    }
}
