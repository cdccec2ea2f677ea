//! Scalar syntax collection: single-token scalars, multiline plain
//! continuation, and block scalar bodies.

use crate::error::ErrorCode;
use crate::lexer::{BlockHeader, Token};
use crate::span::{span, Span};
use crate::syntax::{ScalarStyle, SyntaxContent, SyntaxNode};

use super::{Parser, Props};

impl Parser<'_> {
    /// Build a node from the single scalar token at the current position,
    /// consuming it.
    pub(crate) fn scalar_token_node(&mut self) -> Option<SyntaxNode> {
        let (tok, tok_span) = self.peek()?;
        let tok_span = *tok_span;
        let (style, text) = match tok {
            Token::Plain(s) => (ScalarStyle::Plain, s.clone()),
            Token::SingleQuoted(s) => (ScalarStyle::QuoteSingle, s.clone()),
            Token::DoubleQuoted(s) => (ScalarStyle::QuoteDouble, s.clone()),
            _ => return None,
        };
        self.advance();

        let mut node = SyntaxNode::new(
            SyntaxContent::Scalar {
                style,
                text,
                header: None,
            },
            tok_span,
        );
        let (comments, space) = self.take_pending();
        if !comments.is_empty() {
            node.comment_before = Some(comments.join("\n"));
        }
        if space {
            node.space_before = true;
        }
        Some(node)
    }

    /// Is the token at `idx` a scalar immediately followed by a colon?
    pub(crate) fn implicit_key_at(&self, idx: usize) -> bool {
        let mut look = idx;
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

    /// Parse a scalar at the current position; when it turns out to be an
    /// implicit mapping key, parse the whole block mapping instead.
    pub(crate) fn parse_scalar_or_mapping(
        &mut self,
        min_indent: usize,
        props: Props,
    ) -> SyntaxNode {
        let first_span = self.current_span();
        let col = self.column_of(first_span.start);

        if self.flow_depth == 0 && self.at_implicit_key() {
            let Some(key) = self.scalar_token_node() else {
                // at_implicit_key guarantees a scalar token here
                self.error(ErrorCode::Impossible, first_span);
                return props.apply_to(SyntaxNode::empty(first_span));
            };
            self.skip_inline();
            let colon_span = self.current_span();
            self.check_implicit_key(&key, colon_span);

            // Properties on the same line attach to the key; properties
            // separated by a newline attach to the mapping itself.
            return if props.crossed_newline {
                self.parse_block_mapping_from_key(col, key, props)
            } else {
                let key = props.apply_to(key);
                self.parse_block_mapping_from_key(col, key, Props::default())
            };
        }

        let mut node = match self.peek_token() {
            Some(Token::Plain(_)) => self.parse_plain_multiline(min_indent),
            _ => match self.scalar_token_node() {
                Some(node) => node,
                None => {
                    self.error(ErrorCode::Impossible, first_span);
                    SyntaxNode::empty(first_span)
                }
            },
        };
        node = props.apply_to(node);
        self.attach_trailing_comment(&mut node);
        node
    }

    /// Assemble a multiline plain scalar. Continuation lines must be
    /// indented at least `min_indent`, must not be comment-separated, and
    /// must not themselves form an implicit key. Lines are joined with
    /// `\n`; the composer later folds them.
    pub(crate) fn parse_plain_multiline(&mut self, min_indent: usize) -> SyntaxNode {
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
            if self.flow_depth == 0 && ahead.col < min_indent {
                break;
            }
            if self.implicit_key_at(ahead.idx) {
                break;
            }
            // A comment line terminates the scalar
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
        // Blank-line state accumulated inside the scalar is not a leading
        // blank for the next node
        self.pending_space = false;

        let mut node = SyntaxNode::new(
            SyntaxContent::Scalar {
                style: ScalarStyle::Plain,
                text,
                header: None,
            },
            span(start, end),
        );
        let (comments, space) = self.take_pending();
        if !comments.is_empty() {
            node.comment_before = Some(comments.join("\n"));
        }
        if space {
            node.space_before = true;
        }
        node
    }

    /// Parse a block scalar from its header token plus the body the lexer
    /// collected. Positioned at the header token.
    pub(crate) fn parse_block_scalar(
        &mut self,
        header: BlockHeader,
        header_span: Span,
        props: Props,
    ) -> SyntaxNode {
        self.advance(); // the header

        // Trailing comment on the header line
        self.skip_inline();
        let mut trailing = None;
        if let Some(Token::Comment(text)) = self.peek_token() {
            trailing = Some(text.clone());
            self.advance();
        }

        let (text, end) = match self.peek() {
            Some((Token::BlockBody(body), body_span)) => {
                let text = body.clone();
                let end = body_span.end;
                self.advance();
                (text, end)
            }
            _ => (String::new(), header_span.end),
        };

        let style = if header.literal {
            ScalarStyle::BlockLiteral
        } else {
            ScalarStyle::BlockFolded
        };
        let mut node = SyntaxNode::new(
            SyntaxContent::Scalar {
                style,
                text,
                header: Some(header),
            },
            span(header_span.start, end),
        );
        node.comment = trailing;
        let (comments, space) = self.take_pending();
        if !comments.is_empty() {
            node.comment_before = Some(comments.join("\n"));
        }
        if space {
            node.space_before = true;
        }
        props.apply_to(node)
    }
}
