//! Block-structure parsing: indentation-based mappings and sequences.
//!
//! Within a document every block collection has a *base column*. An entry
//! belongs to the collection whose base column it sits on; content at a
//! lower column terminates the collection; stray content at a higher
//! column is an indentation error.

use crate::error::ErrorCode;
use crate::lexer::Token;
use crate::span::span;
use crate::syntax::{SyntaxContent, SyntaxEntry, SyntaxNode};

use super::{Parser, Props};

/// Lookahead result: the next significant token's index, its column, and
/// whether a line boundary separates it from the current position.
pub(crate) struct ContentAhead {
    pub idx: usize,
    pub col: usize,
    pub crossed: bool,
}

impl Parser<'_> {
    /// Pure lookahead to the next significant token; consumes nothing.
    pub(crate) fn peek_content(&self) -> Option<ContentAhead> {
        let mut idx = self.pos;
        let mut crossed = false;
        while let Some((tok, _)) = self.tokens.get(idx) {
            match tok {
                Token::Whitespace | Token::Comment(_) | Token::FlowErrorEnd => idx += 1,
                Token::LineStart(_) => {
                    crossed = true;
                    idx += 1;
                }
                _ => {
                    let col = self.column_of(self.tokens[idx].1.start);
                    return Some(ContentAhead { idx, col, crossed });
                }
            }
        }
        None
    }

    /// Skip the remainder of the current line after an error.
    fn skip_rest_of_line(&mut self) {
        while let Some(tok) = self.peek_token() {
            if matches!(tok, Token::LineStart(_)) {
                break;
            }
            self.advance();
        }
    }

    /// Does the next content line continue a sequence at column `col`?
    fn at_next_seq_item(&self, col: usize) -> bool {
        self.peek_content().is_some_and(|ahead| {
            matches!(self.tokens[ahead.idx].0, Token::SeqItem) && ahead.col == col
        })
    }

    /// Parse a block sequence whose `-` markers sit at column `col`.
    /// Positioned at the first `SeqItem` token.
    pub(crate) fn parse_block_sequence(&mut self, col: usize, props: Props) -> SyntaxNode {
        let start = self.current_span().start;
        let mut end = self.current_span().end;
        let mut items: Vec<SyntaxNode> = Vec::new();

        loop {
            // consume the `-`
            end = self.current_span().end;
            self.advance();

            let item = self.parse_value(col + 1, Props::default());
            let item = item.unwrap_or_else(|| SyntaxNode::empty(span(end, end)));
            end = end.max(item.span.end);
            items.push(item);

            let Some(ahead) = self.peek_content() else {
                break;
            };
            let tok = &self.tokens[ahead.idx].0;
            if matches!(tok, Token::DocStart | Token::DocEnd) {
                break;
            }
            if !ahead.crossed {
                let at = self.tokens[ahead.idx].1;
                self.error(ErrorCode::UnexpectedToken, at);
                self.advance_to_content();
                self.skip_rest_of_line();
                if !self.at_next_seq_item(col) {
                    break;
                }
                self.advance_to_content();
                continue;
            }
            // A `:` at the sequence's own column tries to use the block
            // sequence as an implicit mapping key
            if matches!(tok, Token::Colon) && ahead.col == col {
                let at = self.tokens[ahead.idx].1;
                self.error(ErrorCode::BlockAsImplicitKey, at);
                self.advance_to_content();
                self.advance();
                self.skip_rest_of_line();
                if !self.at_next_seq_item(col) {
                    break;
                }
                self.advance_to_content();
                continue;
            }
            if !matches!(tok, Token::SeqItem) || ahead.col != col {
                break;
            }
            self.advance_to_content();
        }

        props.apply_to(SyntaxNode::new(
            SyntaxContent::Seq { flow: false, items },
            span(start, end),
        ))
    }

    /// Parse a block mapping whose first (implicit) key has already been
    /// parsed. Positioned at the `:` token.
    pub(crate) fn parse_block_mapping_from_key(
        &mut self,
        col: usize,
        key: SyntaxNode,
        map_props: Props,
    ) -> SyntaxNode {
        let start = key.span.start;
        let mut end = self.current_span().end;
        self.advance(); // the colon

        let value = self.parse_map_value(col);
        if let Some(v) = &value {
            end = end.max(v.span.end);
        }
        let mut entries = vec![SyntaxEntry {
            key: Some(key),
            value,
        }];

        self.parse_map_entries(col, &mut entries, &mut end);

        map_props.apply_to(SyntaxNode::new(
            SyntaxContent::Map {
                flow: false,
                entries,
            },
            span(start, end),
        ))
    }

    /// Parse a block mapping that opens with an explicit `?` key.
    /// Positioned at the `?` token.
    pub(crate) fn parse_block_mapping_explicit(&mut self, col: usize, props: Props) -> SyntaxNode {
        let start = self.current_span().start;
        let mut end = self.current_span().end;
        let mut entries = Vec::new();

        let entry = self.parse_explicit_entry(col, &mut end);
        entries.push(entry);
        self.parse_map_entries(col, &mut entries, &mut end);

        props.apply_to(SyntaxNode::new(
            SyntaxContent::Map {
                flow: false,
                entries,
            },
            span(start, end),
        ))
    }

    /// Parse a block mapping that opens with a bare `:` (empty key).
    /// Positioned at the `:` token.
    pub(crate) fn parse_block_mapping_empty_key(&mut self, col: usize, props: Props) -> SyntaxNode {
        let start = self.current_span().start;
        let mut end = self.current_span().end;
        self.advance(); // the colon

        let value = self.parse_map_value(col);
        if let Some(v) = &value {
            end = end.max(v.span.end);
        }
        let mut entries = vec![SyntaxEntry { key: None, value }];
        self.parse_map_entries(col, &mut entries, &mut end);

        props.apply_to(SyntaxNode::new(
            SyntaxContent::Map {
                flow: false,
                entries,
            },
            span(start, end),
        ))
    }

    /// One `? key` (and optional `: value`) entry. Positioned at the `?`.
    fn parse_explicit_entry(&mut self, col: usize, end: &mut usize) -> SyntaxEntry {
        self.advance(); // the `?`
        let key = self.parse_value(col + 1, Props::default());
        if let Some(k) = &key {
            *end = (*end).max(k.span.end);
        }

        let value = match self.peek_content() {
            Some(ahead)
                if matches!(self.tokens[ahead.idx].0, Token::Colon)
                    && (!ahead.crossed || ahead.col == col) =>
            {
                self.advance_to_content();
                *end = self.current_span().end;
                self.advance(); // the colon
                let value = self.parse_map_value(col);
                if let Some(v) = &value {
                    *end = (*end).max(v.span.end);
                }
                value
            }
            _ => None,
        };

        SyntaxEntry { key, value }
    }

    /// Parse a mapping value after its colon. Values must be indented past
    /// the key column, with one exception: a block sequence may sit at the
    /// key's own column.
    pub(crate) fn parse_map_value(&mut self, col: usize) -> Option<SyntaxNode> {
        if let Some(node) = self.parse_value(col + 1, Props::default()) {
            return Some(node);
        }
        let ahead = self.peek_content()?;
        if matches!(self.tokens[ahead.idx].0, Token::SeqItem) && ahead.col == col && ahead.crossed {
            self.advance_to_content();
            return Some(self.parse_block_sequence(col, Props::default()));
        }
        None
    }

    /// The shared continuation loop for block mapping entries at `col`.
    fn parse_map_entries(&mut self, col: usize, entries: &mut Vec<SyntaxEntry>, end: &mut usize) {
        loop {
            let Some(ahead) = self.peek_content() else {
                return;
            };
            let tok = &self.tokens[ahead.idx].0;
            if matches!(tok, Token::DocStart | Token::DocEnd) {
                return;
            }
            if !ahead.crossed {
                let at = self.tokens[ahead.idx].1;
                self.error(ErrorCode::UnexpectedToken, at);
                self.advance_to_content();
                self.skip_rest_of_line();
                continue;
            }
            if ahead.col < col {
                return;
            }
            if ahead.col > col {
                let at = self.tokens[ahead.idx].1;
                self.error(ErrorCode::UnexpectedToken, at);
                self.advance_to_content();
                self.skip_rest_of_line();
                continue;
            }

            match tok {
                Token::ExplicitKey => {
                    self.advance_to_content();
                    let entry = self.parse_explicit_entry(col, end);
                    entries.push(entry);
                }
                Token::Colon => {
                    self.advance_to_content();
                    *end = self.current_span().end;
                    self.advance();
                    let value = self.parse_map_value(col);
                    if let Some(v) = &value {
                        *end = (*end).max(v.span.end);
                    }
                    entries.push(SyntaxEntry { key: None, value });
                }
                Token::Plain(_)
                | Token::SingleQuoted(_)
                | Token::DoubleQuoted(_)
                | Token::FlowSeqStart
                | Token::FlowMapStart
                | Token::Anchor(_)
                | Token::Tag(_)
                | Token::Alias(_) => {
                    self.advance_to_content();
                    let Some(key) = self.parse_entry_key() else {
                        let at = self.current_span();
                        self.error(ErrorCode::UnexpectedToken, at);
                        self.advance();
                        self.skip_rest_of_line();
                        continue;
                    };
                    *end = (*end).max(key.span.end);

                    self.skip_inline();
                    if matches!(self.peek_token(), Some(Token::Colon)) {
                        let colon_span = self.current_span();
                        self.check_implicit_key(&key, colon_span);
                        *end = (*end).max(colon_span.end);
                        self.advance();
                        let value = self.parse_map_value(col);
                        if let Some(v) = &value {
                            *end = (*end).max(v.span.end);
                        }
                        entries.push(SyntaxEntry {
                            key: Some(key),
                            value,
                        });
                    } else {
                        let at = self.current_span();
                        self.error_msg(
                            ErrorCode::MissingChar,
                            at,
                            "expected a colon after the mapping key",
                        );
                        entries.push(SyntaxEntry {
                            key: Some(key),
                            value: None,
                        });
                        self.skip_rest_of_line();
                    }
                }
                _ => {
                    let at = self.tokens[ahead.idx].1;
                    self.error(ErrorCode::UnexpectedToken, at);
                    self.advance_to_content();
                    self.advance();
                    self.skip_rest_of_line();
                }
            }
        }
    }

    /// Parse a key node for an implicit block-mapping entry: properties
    /// followed by a single-line scalar, flow collection, or alias.
    fn parse_entry_key(&mut self) -> Option<SyntaxNode> {
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
                    self.skip_inline();
                }
                Token::Tag(tag) => {
                    if props.tag.is_some() {
                        self.error(ErrorCode::MultipleTags, tok_span);
                    }
                    props.tag = Some((tag.clone(), tok_span));
                    self.advance();
                    self.skip_inline();
                }
                Token::Plain(_) | Token::SingleQuoted(_) | Token::DoubleQuoted(_) => {
                    let node = self.scalar_token_node()?;
                    return Some(props.apply_to(node));
                }
                Token::FlowSeqStart | Token::FlowMapStart => {
                    let node = self.parse_flow_collection();
                    return Some(props.apply_to(node));
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
                    let node = SyntaxNode::new(SyntaxContent::Alias(name), tok_span);
                    return Some(node);
                }
                _ => return None,
            }
        }
    }
}
