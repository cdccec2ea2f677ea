//! Serialize a document tree to YAML text.
//!
//! Emission is a single pass over the tree preceded by an anchor
//! assignment pass: identity-shared non-scalar (and non-null) nodes get
//! generated `&{prefix}{n}` labels, with later occurrences emitted as
//! aliases, which also breaks genuine cycles. Rendered nodes follow one
//! convention throughout: the first line carries no indentation (the
//! container places it), continuation lines carry their full indentation.

mod scalar;

use std::collections::{HashMap, HashSet};

use crate::error::EmitError;
use crate::node::{key_sort_string, Document, Node, Pair, ScalarStyle, YamlVersion};
use crate::options::{SortEntries, StringifyOptions};
use crate::schema::{uri, Schema};
use crate::value::Value;

/// Emission context threaded through the tree walk.
#[derive(Debug, Clone)]
pub(crate) struct EmitCtx {
    /// Full indentation for continuation lines
    pub(crate) indent: String,
    /// Column where the node's first character lands (key/marker widths
    /// included); folding measures the first line against this
    pub(crate) first_offset: usize,
    pub(crate) in_flow: bool,
    pub(crate) as_key: bool,
    /// Root position of the document (doc-marker promotion applies)
    pub(crate) top_level: bool,
}

impl EmitCtx {
    fn root() -> Self {
        Self {
            indent: String::new(),
            first_offset: 0,
            in_flow: false,
            as_key: false,
            top_level: false,
        }
    }
}

impl Document {
    /// Serialize this document with the given options.
    pub fn to_string_with(&self, opts: &StringifyOptions) -> Result<String, EmitError> {
        stringify_document(self, opts)
    }
}

struct Emitter<'a> {
    opts: &'a StringifyOptions,
    schema: Schema,
    version: YamlVersion,
    /// Pointer → label for identity-shared nodes
    auto_anchors: HashMap<usize, String>,
    /// Shared nodes already emitted once; later occurrences alias
    emitted_shared: HashMap<usize, String>,
    /// Anchor labels written so far, for alias-order verification
    anchors_out: HashSet<String>,
}

/// Serialize a document to YAML text.
pub(crate) fn stringify_document(
    doc: &Document,
    opts: &StringifyOptions,
) -> Result<String, EmitError> {
    opts.validate()?;
    let version = opts.version.unwrap_or(doc.version);
    let mut emitter = Emitter {
        opts,
        schema: doc.schema.clone(),
        version,
        auto_anchors: assign_anchors(doc, opts),
        emitted_shared: HashMap::new(),
        anchors_out: HashSet::new(),
    };

    let mut out = String::new();
    if doc.explicit_version {
        out.push_str("%YAML ");
        out.push_str(version.as_str());
        out.push('\n');
    }
    for (handle, prefix) in &doc.tag_handles {
        out.push_str(&format!("%TAG {handle} {prefix}\n"));
    }
    let have_directives = !out.is_empty();

    if let Some(comment) = &doc.comment_before {
        for line in comment.split('\n') {
            out.push_str(&comment_text(line));
            out.push('\n');
        }
    }

    let marker =
        have_directives || doc.directives_end_marker || opts.directives_end_marker;

    match &doc.contents {
        None => {
            if marker {
                out.push_str("---\n");
            } else {
                out.push_str(&opts.null_str);
                out.push('\n');
            }
        }
        Some(root) => {
            let ctx = EmitCtx {
                top_level: true,
                ..EmitCtx::root()
            };
            let rendered = emitter.emit_node(root, &ctx)?;
            if marker {
                if renders_as_block(root) && !emitter.node_has_prefix(root) {
                    out.push_str("---\n");
                } else {
                    out.push_str("--- ");
                }
            }
            out.push_str(&rendered);
        }
    }

    if let Some(comment) = &doc.comment {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        for line in comment.split('\n') {
            out.push_str(&comment_text(line));
            out.push('\n');
        }
    }

    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

/// Render one comment line (the stored text keeps its leading space).
fn comment_text(line: &str) -> String {
    if line.is_empty() {
        "#".to_string()
    } else {
        format!("#{line}")
    }
}

/// Does this node render as an indented block collection (rather than
/// inline)?
fn renders_as_block(node: &Node) -> bool {
    match node {
        Node::Mapping(rc) => {
            let map = rc.borrow();
            !map.flow && !map.items.is_empty()
        }
        Node::Sequence(rc) => {
            let seq = rc.borrow();
            !seq.flow && !seq.items.is_empty()
        }
        _ => false,
    }
}

/// Find identity-shared nodes and allocate anchor labels for them.
///
/// Shared nodes that already carry a user anchor reuse it; the rest get
/// `{prefix}{n}` labels, skipping collisions with user anchors. Scalars
/// only participate when they have object identity semantics (bytes,
/// timestamps); plain value duplicates are re-emitted, and null never
/// anchors.
fn assign_anchors(doc: &Document, opts: &StringifyOptions) -> HashMap<usize, String> {
    let Some(root) = &doc.contents else {
        return HashMap::new();
    };

    let mut counts: HashMap<usize, u32> = HashMap::new();
    let mut order: Vec<Node> = Vec::new();
    let mut user_anchors: HashSet<String> = HashSet::new();
    walk_for_anchors(root, &mut counts, &mut order, &mut user_anchors);

    let mut auto = HashMap::new();
    let mut next = 1usize;
    for node in order {
        let ptr = node.ptr_id();
        if counts.get(&ptr).copied().unwrap_or(0) < 2 || !aliasable(&node) {
            continue;
        }
        if let Some(existing) = node.anchor() {
            auto.insert(ptr, existing);
            continue;
        }
        let label = loop {
            let candidate = format!("{}{next}", opts.anchor_prefix);
            next += 1;
            if !user_anchors.contains(&candidate) {
                break candidate;
            }
        };
        auto.insert(ptr, label);
    }
    auto
}

fn walk_for_anchors(
    node: &Node,
    counts: &mut HashMap<usize, u32>,
    order: &mut Vec<Node>,
    user_anchors: &mut HashSet<String>,
) {
    let ptr = node.ptr_id();
    let count = counts.entry(ptr).or_insert(0);
    *count += 1;
    if *count > 1 {
        return;
    }
    order.push(node.clone());
    if let Some(anchor) = node.anchor() {
        user_anchors.insert(anchor);
    }
    match node {
        Node::Mapping(rc) => {
            let map = rc.borrow();
            for pair in &map.items {
                if let Some(key) = &pair.key {
                    walk_for_anchors(key, counts, order, user_anchors);
                }
                if let Some(value) = &pair.value {
                    walk_for_anchors(value, counts, order, user_anchors);
                }
            }
        }
        Node::Sequence(rc) => {
            let seq = rc.borrow();
            for item in &seq.items {
                walk_for_anchors(item, counts, order, user_anchors);
            }
        }
        Node::Scalar(_) | Node::Alias(_) => {}
    }
}

/// Shared-node aliasing policy: collections always, object-identity
/// scalars (bytes, timestamps) too, primitive scalars and nulls never.
fn aliasable(node: &Node) -> bool {
    match node {
        Node::Mapping(_) | Node::Sequence(_) => true,
        Node::Scalar(rc) => {
            matches!(rc.borrow().value, Value::Bytes(_) | Value::Timestamp(_))
        }
        Node::Alias(_) => false,
    }
}

impl Emitter<'_> {
    /// Does this node emit an `&anchor`/`!tag` prefix?
    fn node_has_prefix(&self, node: &Node) -> bool {
        if node.anchor().is_some() || node.tag().is_some() {
            return true;
        }
        if self.auto_anchors.contains_key(&node.ptr_id()) {
            return true;
        }
        matches!(node, Node::Scalar(rc) if matches!(rc.borrow().value, Value::Bytes(_)))
    }

    /// Shorthand tag spelling for emission.
    fn tag_text(&self, node: &Node) -> Option<String> {
        if let Some(tag) = node.tag() {
            return Some(render_tag(&tag));
        }
        // Bytes need their tag to reparse as bytes
        if let Node::Scalar(rc) = node {
            if matches!(rc.borrow().value, Value::Bytes(_)) {
                return Some("!!binary".to_string());
            }
        }
        None
    }

    /// Render one node per the emission convention (first line bare,
    /// continuations fully indented).
    fn emit_node(&mut self, node: &Node, ctx: &EmitCtx) -> Result<String, EmitError> {
        if let Node::Alias(rc) = node {
            let source = rc.borrow().source.clone();
            if !self.anchors_out.contains(&source) {
                return Err(EmitError::UnresolvedAlias(source));
            }
            return Ok(format!("*{source}"));
        }

        let ptr = node.ptr_id();
        if let Some(label) = self.emitted_shared.get(&ptr) {
            return Ok(format!("*{label}"));
        }

        let mut prefix = String::new();
        let label = node
            .anchor()
            .or_else(|| self.auto_anchors.get(&ptr).cloned());
        if let Some(label) = &label {
            prefix.push('&');
            prefix.push_str(label);
            self.anchors_out.insert(label.clone());
            // Mark before descending so cycles emit aliases
            if self.auto_anchors.contains_key(&ptr) {
                self.emitted_shared.insert(ptr, label.clone());
            }
        }
        if let Some(tag) = self.tag_text(node) {
            if !prefix.is_empty() {
                prefix.push(' ');
            }
            prefix.push_str(&tag);
        }

        let body = match node {
            Node::Scalar(rc) => {
                let scalar = rc.borrow();
                if ctx.top_level && prefix.is_empty() {
                    if let Value::Str(s) = &scalar.value {
                        let plainish =
                            matches!(scalar.style, None | Some(ScalarStyle::Plain));
                        if plainish && (s.starts_with("---") || s.starts_with("...")) {
                            // A document-marker lookalike is promoted to a
                            // block literal
                            return Ok(scalar::emit_block_scalar(s, false, ctx, self.opts));
                        }
                    }
                }
                scalar::stringify_scalar(&scalar, ctx, self.opts, &self.schema, self.version)?
            }
            Node::Mapping(rc) => {
                let map = rc.borrow();
                if map.flow || ctx.in_flow {
                    self.emit_flow_map(&map.items, ctx)?
                } else {
                    self.emit_block_map(&map.items, ctx)?
                }
            }
            Node::Sequence(rc) => {
                let seq = rc.borrow();
                if seq.flow || ctx.in_flow {
                    self.emit_flow_seq(&seq.items, ctx)?
                } else {
                    self.emit_block_seq(&seq.items, ctx)?
                }
            }
            Node::Alias(_) => unreachable!("aliases return early"),
        };

        if prefix.is_empty() {
            return Ok(body);
        }
        if renders_as_block(node) {
            Ok(format!("{prefix}\n{}{body}", ctx.indent))
        } else {
            Ok(format!("{prefix} {body}"))
        }
    }

    fn sorted_pairs(&self, items: &[Pair]) -> Vec<Pair> {
        let mut pairs = items.to_vec();
        match self.opts.sort_map_entries {
            SortEntries::Off => {}
            SortEntries::Lex => pairs.sort_by(|a, b| {
                key_sort_string(a.key.as_ref()).cmp(&key_sort_string(b.key.as_ref()))
            }),
            SortEntries::By(cmp) => pairs.sort_by(cmp),
        }
        pairs
    }

    fn emit_block_map(&mut self, items: &[Pair], ctx: &EmitCtx) -> Result<String, EmitError> {
        if items.is_empty() {
            return Ok("{}".to_string());
        }
        let child_indent = format!("{}{}", ctx.indent, " ".repeat(self.opts.indent));
        let mut lines: Vec<String> = Vec::new();

        for pair in self.sorted_pairs(items) {
            let (comment_before, space_before) = pair
                .key
                .as_ref()
                .map_or((None, false), |k| {
                    k.with_props(|p| (p.comment_before.clone(), p.space_before))
                });
            if space_before {
                lines.push(String::new());
            }
            if let Some(comment) = comment_before {
                for line in comment.split('\n') {
                    lines.push(comment_text(line));
                }
            }
            lines.push(self.emit_pair(&pair, ctx, &child_indent)?);
        }
        Ok(join_block_lines(&lines, &ctx.indent))
    }

    #[allow(clippy::too_many_lines)]
    fn emit_pair(
        &mut self,
        pair: &Pair,
        ctx: &EmitCtx,
        child_indent: &str,
    ) -> Result<String, EmitError> {
        let key_ctx = EmitCtx {
            indent: child_indent.to_string(),
            first_offset: ctx.indent.len(),
            in_flow: false,
            as_key: true,
            top_level: false,
        };
        let key_rendered = match &pair.key {
            Some(key) => self.emit_node(key, &key_ctx)?,
            None => String::new(),
        };
        let key_is_collection = pair
            .key
            .as_ref()
            .is_some_and(|k| k.is_map() || k.is_seq());
        let key_has_comment = pair
            .key
            .as_ref()
            .is_some_and(|k| k.with_props(|p| p.comment.is_some()));
        let explicit = key_is_collection
            || key_has_comment
            || key_rendered.contains('\n')
            || key_rendered.len() > 1024;

        if explicit && self.opts.simple_keys {
            let mut shown = key_rendered.clone();
            shown.truncate(40);
            return Err(EmitError::ForbiddenSimpleKey(shown));
        }

        // Value context; an indentless sequence shares the key's column
        let value_is_plain_seq = pair
            .value
            .as_ref()
            .is_some_and(|v| renders_as_block(v) && v.is_seq());
        let value_indent = if value_is_plain_seq && !self.opts.indent_seq {
            ctx.indent.clone()
        } else {
            child_indent.to_string()
        };
        let value_ctx = EmitCtx {
            indent: value_indent.clone(),
            first_offset: ctx.indent.len() + key_rendered.len() + 2,
            in_flow: false,
            as_key: false,
            top_level: false,
        };

        let value_part = match &pair.value {
            None => self.opts.null_str.clone(),
            Some(value) => {
                let rendered = self.emit_node(value, &value_ctx)?;
                let trailing = value.with_props(|p| p.comment.clone());
                append_comment(rendered, trailing.as_deref())
            }
        };

        if explicit {
            let value_line = match &pair.value {
                Some(value) if renders_as_block(value) && !self.node_has_prefix(value) => {
                    format!(":\n{child_indent}{value_part}")
                }
                _ => format!(": {value_part}"),
            };
            return Ok(format!(
                "? {key_rendered}\n{}{value_line}",
                ctx.indent
            ));
        }

        match &pair.value {
            Some(value) if renders_as_block(value) && !self.node_has_prefix(value) => Ok(
                format!("{key_rendered}:\n{value_indent}{value_part}"),
            ),
            _ => Ok(format!("{key_rendered}: {value_part}")),
        }
    }

    fn emit_block_seq(&mut self, items: &[Node], ctx: &EmitCtx) -> Result<String, EmitError> {
        if items.is_empty() {
            return Ok("[]".to_string());
        }
        // The marker pads to the indent width so nested block content
        // stays aligned with its continuation lines
        let marker_width = self.opts.indent.max(2);
        let marker = format!("-{}", " ".repeat(marker_width - 1));
        let item_indent = format!("{}{}", ctx.indent, " ".repeat(marker_width));
        let mut lines: Vec<String> = Vec::new();

        for item in items {
            let (comment_before, space_before) =
                item.with_props(|p| (p.comment_before.clone(), p.space_before));
            if space_before {
                lines.push(String::new());
            }
            if let Some(comment) = comment_before {
                for line in comment.split('\n') {
                    lines.push(comment_text(line));
                }
            }
            let ictx = EmitCtx {
                indent: item_indent.clone(),
                first_offset: item_indent.len(),
                in_flow: false,
                as_key: false,
                top_level: false,
            };
            let rendered = self.emit_node(item, &ictx)?;
            let trailing = item.with_props(|p| p.comment.clone());
            let rendered = append_comment(rendered, trailing.as_deref());
            lines.push(format!("{marker}{rendered}"));
        }
        Ok(join_block_lines(&lines, &ctx.indent))
    }

    fn emit_flow_seq(&mut self, items: &[Node], ctx: &EmitCtx) -> Result<String, EmitError> {
        if items.is_empty() {
            return Ok("[]".to_string());
        }
        let inner_indent = format!("{}{}", ctx.indent, " ".repeat(self.opts.indent));
        let inner = EmitCtx {
            first_offset: inner_indent.len(),
            indent: inner_indent,
            in_flow: true,
            as_key: false,
            top_level: false,
        };
        let mut rendered = Vec::with_capacity(items.len());
        let mut has_comments = false;
        for item in items {
            has_comments |=
                item.with_props(|p| p.comment.is_some() || p.comment_before.is_some());
            rendered.push(self.emit_node(item, &inner)?);
        }

        let inline = format!("[ {} ]", rendered.join(", "));
        if !has_comments
            && !inline.contains('\n')
            && ctx.indent.len() + inline.len() <= self.opts.max_flow_string_single_line_length
        {
            return Ok(inline);
        }

        let mut out = String::from("[");
        let last = items.len() - 1;
        for (idx, (item, item_rendered)) in items.iter().zip(&rendered).enumerate() {
            if let Some(comment) = item.with_props(|p| p.comment_before.clone()) {
                for line in comment.split('\n') {
                    out.push('\n');
                    out.push_str(&inner.indent);
                    out.push_str(&comment_text(line));
                }
            }
            out.push('\n');
            out.push_str(&inner.indent);
            out.push_str(item_rendered);
            if idx != last {
                out.push(',');
            }
            if let Some(comment) = item.with_props(|p| p.comment.clone()) {
                out.push_str(" #");
                out.push_str(&comment);
            }
        }
        out.push('\n');
        out.push_str(&ctx.indent);
        out.push(']');
        Ok(out)
    }

    fn emit_flow_map(&mut self, items: &[Pair], ctx: &EmitCtx) -> Result<String, EmitError> {
        if items.is_empty() {
            return Ok("{}".to_string());
        }
        let inner_indent = format!("{}{}", ctx.indent, " ".repeat(self.opts.indent));
        let inner = EmitCtx {
            first_offset: inner_indent.len(),
            indent: inner_indent,
            in_flow: true,
            as_key: false,
            top_level: false,
        };
        let key_ctx = EmitCtx {
            as_key: true,
            ..inner.clone()
        };

        let pairs = self.sorted_pairs(items);
        let mut rendered = Vec::with_capacity(pairs.len());
        for pair in &pairs {
            let entry = match (&pair.key, &pair.value) {
                (None, None) => self.opts.null_str.clone(),
                (Some(key), None) => self.emit_node(key, &key_ctx)?,
                (None, Some(value)) => format!(": {}", self.emit_node(value, &inner)?),
                (Some(key), Some(value)) => format!(
                    "{}: {}",
                    self.emit_node(key, &key_ctx)?,
                    self.emit_node(value, &inner)?
                ),
            };
            rendered.push(entry);
        }

        let inline = format!("{{ {} }}", rendered.join(", "));
        if !inline.contains('\n')
            && ctx.indent.len() + inline.len() <= self.opts.max_flow_string_single_line_length
        {
            return Ok(inline);
        }

        let mut out = String::from("{");
        let last = rendered.len() - 1;
        for (idx, entry) in rendered.iter().enumerate() {
            out.push('\n');
            out.push_str(&inner.indent);
            out.push_str(entry);
            if idx != last {
                out.push(',');
            }
        }
        out.push('\n');
        out.push_str(&ctx.indent);
        out.push('}');
        Ok(out)
    }
}

/// Join block-entry lines: the first line is bare, later non-empty lines
/// get the container indent, empty lines stay empty.
fn join_block_lines(lines: &[String], indent: &str) -> String {
    let mut out = String::new();
    for (idx, line) in lines.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(indent);
            }
        }
        out.push_str(line);
    }
    out
}

/// Append a trailing comment. Block scalars carry it on their header
/// line, anything else at the very end.
fn append_comment(rendered: String, comment: Option<&str>) -> String {
    let Some(comment) = comment else {
        return rendered;
    };
    if rendered.starts_with('|') || rendered.starts_with('>') {
        match rendered.find('\n') {
            Some(nl) => format!("{} #{comment}{}", &rendered[..nl], &rendered[nl..]),
            None => format!("{rendered} #{comment}"),
        }
    } else {
        format!("{rendered} #{comment}")
    }
}

/// Shorthand spelling for a tag URI.
fn render_tag(tag: &str) -> String {
    if let Some(suffix) = tag.strip_prefix(uri::PREFIX) {
        format!("!!{suffix}")
    } else if tag.starts_with('!') {
        tag.to_string()
    } else {
        format!("!<{tag}>")
    }
}
