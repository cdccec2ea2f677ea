//! The typed document tree.
//!
//! [`Node`] is a tagged union over reference-counted variants, so cloning
//! a node clones a *reference*: the same underlying scalar or collection
//! can appear in several places, and the stringifier detects such sharing
//! by pointer identity to assign anchors (cycles included). A document
//! owns its tree; aliases are within-document references by anchor name,
//! resolved on conversion to a plain [`Value`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{ResolveError, YamlError, YamlWarning};
use crate::schema::{uri, NumberFormat, Schema, SchemaName};
use crate::span::Span;
pub use crate::syntax::ScalarStyle;
use crate::value::Value;

/// The YAML version a document is interpreted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YamlVersion {
    V1_1,
    #[default]
    V1_2,
}

impl YamlVersion {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1_1 => "1.1",
            Self::V1_2 => "1.2",
        }
    }

    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "1.1" => Some(Self::V1_1),
            "1.2" => Some(Self::V1_2),
            _ => None,
        }
    }
}

/// Properties shared by every node variant.
#[derive(Debug, Clone, Default)]
pub struct NodeProps {
    /// Anchor label, without the `&`
    pub anchor: Option<String>,
    /// Absolute tag URI (e.g. `tag:yaml.org,2002:str`), or a local `!tag`
    pub tag: Option<String>,
    /// Comment lines rendered on their own line(s) before the node
    pub comment_before: Option<String>,
    /// Comment rendered after the node on the same line
    pub comment: Option<String>,
    /// A blank line precedes the node
    pub space_before: bool,
    /// Source range, when the node came from parsed input
    pub span: Option<Span>,
}

/// A terminal value.
#[derive(Debug, Clone, Default)]
pub struct Scalar {
    pub value: Value,
    /// Requested presentation style; the stringifier may degrade it
    pub style: Option<ScalarStyle>,
    /// Number formatting override
    pub format: Option<NumberFormat>,
    /// Fraction digits to keep when emitting a float
    pub min_fraction_digits: u32,
    /// Original plain spelling from the source (`~`, `yes`, `+42`), used
    /// to re-emit non-string scalars faithfully when no format override
    /// applies
    pub source: Option<String>,
    pub props: NodeProps,
}

impl Scalar {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self {
            value,
            style: None,
            format: None,
            min_fraction_digits: 0,
            source: None,
            props: NodeProps::default(),
        }
    }
}

/// One mapping entry; either side may be absent.
#[derive(Debug, Clone, Default)]
pub struct Pair {
    pub key: Option<Node>,
    pub value: Option<Node>,
}

impl Pair {
    #[must_use]
    pub fn new(key: Option<Node>, value: Option<Node>) -> Self {
        Self { key, value }
    }
}

/// An ordered mapping. Duplicate keys are legal at the tree level;
/// lookups are linear.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    pub items: Vec<Pair>,
    pub flow: bool,
    pub props: NodeProps,
}

/// An ordered sequence.
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    pub items: Vec<Node>,
    pub flow: bool,
    pub props: NodeProps,
}

/// A reference to the most recent preceding node anchored with `source`.
/// Aliases never carry a tag.
#[derive(Debug, Clone)]
pub struct Alias {
    pub source: String,
    pub props: NodeProps,
}

impl Alias {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            props: NodeProps::default(),
        }
    }
}

/// A tree node. Cloning shares the underlying data.
#[derive(Debug, Clone)]
pub enum Node {
    Scalar(Rc<RefCell<Scalar>>),
    Mapping(Rc<RefCell<Mapping>>),
    Sequence(Rc<RefCell<Sequence>>),
    Alias(Rc<RefCell<Alias>>),
}

impl Node {
    #[must_use]
    pub fn scalar(scalar: Scalar) -> Self {
        Node::Scalar(Rc::new(RefCell::new(scalar)))
    }

    #[must_use]
    pub fn mapping(mapping: Mapping) -> Self {
        Node::Mapping(Rc::new(RefCell::new(mapping)))
    }

    #[must_use]
    pub fn sequence(sequence: Sequence) -> Self {
        Node::Sequence(Rc::new(RefCell::new(sequence)))
    }

    #[must_use]
    pub fn alias(alias: Alias) -> Self {
        Node::Alias(Rc::new(RefCell::new(alias)))
    }

    /// A plain scalar node from a host value.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        Node::scalar(Scalar::new(value))
    }

    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(self, Node::Scalar(_))
    }

    #[must_use]
    pub fn is_map(&self) -> bool {
        matches!(self, Node::Mapping(_))
    }

    #[must_use]
    pub fn is_seq(&self) -> bool {
        matches!(self, Node::Sequence(_))
    }

    #[must_use]
    pub fn is_alias(&self) -> bool {
        matches!(self, Node::Alias(_))
    }

    /// Address-based identity, stable across clones of the same node.
    #[must_use]
    pub fn ptr_id(&self) -> usize {
        match self {
            Node::Scalar(rc) => Rc::as_ptr(rc) as usize,
            Node::Mapping(rc) => Rc::as_ptr(rc) as usize,
            Node::Sequence(rc) => Rc::as_ptr(rc) as usize,
            Node::Alias(rc) => Rc::as_ptr(rc) as usize,
        }
    }

    /// Do two handles refer to the same underlying node?
    #[must_use]
    pub fn same_node(&self, other: &Node) -> bool {
        self.ptr_id() == other.ptr_id()
    }

    pub fn with_props<R>(&self, f: impl FnOnce(&NodeProps) -> R) -> R {
        match self {
            Node::Scalar(rc) => f(&rc.borrow().props),
            Node::Mapping(rc) => f(&rc.borrow().props),
            Node::Sequence(rc) => f(&rc.borrow().props),
            Node::Alias(rc) => f(&rc.borrow().props),
        }
    }

    pub fn with_props_mut<R>(&self, f: impl FnOnce(&mut NodeProps) -> R) -> R {
        match self {
            Node::Scalar(rc) => f(&mut rc.borrow_mut().props),
            Node::Mapping(rc) => f(&mut rc.borrow_mut().props),
            Node::Sequence(rc) => f(&mut rc.borrow_mut().props),
            Node::Alias(rc) => f(&mut rc.borrow_mut().props),
        }
    }

    #[must_use]
    pub fn anchor(&self) -> Option<String> {
        self.with_props(|p| p.anchor.clone())
    }

    pub fn set_anchor(&self, anchor: Option<String>) {
        self.with_props_mut(|p| p.anchor = anchor);
    }

    #[must_use]
    pub fn tag(&self) -> Option<String> {
        self.with_props(|p| p.tag.clone())
    }

    pub fn set_tag(&self, tag: Option<String>) {
        self.with_props_mut(|p| p.tag = tag);
    }

    /// The scalar's plain value, if this is a scalar node.
    #[must_use]
    pub fn scalar_value(&self) -> Option<Value> {
        match self {
            Node::Scalar(rc) => Some(rc.borrow().value.clone()),
            _ => None,
        }
    }
}

/// Equality used for mapping keys: scalars compare by value, everything
/// else by identity.
fn key_matches(key_node: Option<&Node>, key: &Value) -> bool {
    match key_node {
        None => key.is_null(),
        Some(node) => node
            .scalar_value()
            .is_some_and(|v| v == *key),
    }
}

impl Mapping {
    /// Append a pair.
    pub fn add(&mut self, pair: Pair) {
        self.items.push(pair);
    }

    /// Set the first pair with an equal scalar key, appending otherwise.
    pub fn set(&mut self, key: Value, value: Node) {
        for pair in &mut self.items {
            if key_matches(pair.key.as_ref(), &key) {
                pair.value = Some(value);
                return;
            }
        }
        self.items.push(Pair::new(Some(Node::from_value(key)), Some(value)));
    }

    /// The first value whose key equals `key`, as a node.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<Node> {
        self.items
            .iter()
            .find(|p| key_matches(p.key.as_ref(), key))
            .and_then(|p| p.value.clone())
    }

    /// Like [`get`](Self::get), but unwraps a scalar node to its value.
    #[must_use]
    pub fn get_plain(&self, key: &Value) -> Option<Value> {
        self.get(key).and_then(|n| n.scalar_value())
    }

    #[must_use]
    pub fn has(&self, key: &Value) -> bool {
        self.items.iter().any(|p| key_matches(p.key.as_ref(), key))
    }

    /// Remove the first pair with an equal key; `true` if one was removed.
    pub fn delete(&mut self, key: &Value) -> bool {
        match self
            .items
            .iter()
            .position(|p| key_matches(p.key.as_ref(), key))
        {
            Some(idx) => {
                self.items.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Sort pairs lexicographically by their key's canonical string. The
    /// stringifier applies this under `sort_map_entries`; calling it after
    /// edits keeps explicit order stable.
    pub fn sort(&mut self) {
        self.items.sort_by(|a, b| {
            key_sort_string(a.key.as_ref()).cmp(&key_sort_string(b.key.as_ref()))
        });
    }
}

/// The canonical string a mapping key sorts under.
#[must_use]
pub fn key_sort_string(key: Option<&Node>) -> String {
    match key.and_then(Node::scalar_value) {
        Some(Value::Str(s)) => s,
        Some(other) => format!("{other:?}"),
        None => String::new(),
    }
}

/// Parse a sequence lookup key: a non-negative index.
fn seq_index(key: &Value) -> Option<usize> {
    match key {
        Value::Int(n) if *n >= 0 => usize::try_from(*n).ok(),
        Value::Str(s) => s.parse::<usize>().ok(),
        _ => None,
    }
}

impl Sequence {
    pub fn add(&mut self, node: Node) {
        self.items.push(node);
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<Node> {
        self.items.get(seq_index(key)?).cloned()
    }

    #[must_use]
    pub fn get_plain(&self, key: &Value) -> Option<Value> {
        self.get(key).and_then(|n| n.scalar_value())
    }

    pub fn set(&mut self, key: &Value, value: Node) -> bool {
        match seq_index(key).filter(|idx| *idx < self.items.len()) {
            Some(idx) => {
                self.items[idx] = value;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn has(&self, key: &Value) -> bool {
        seq_index(key).is_some_and(|idx| idx < self.items.len())
    }

    pub fn delete(&mut self, key: &Value) -> bool {
        match seq_index(key).filter(|idx| *idx < self.items.len()) {
            Some(idx) => {
                self.items.remove(idx);
                true
            }
            None => false,
        }
    }
}

/// Filters and transforms applied while building a tree from host values,
/// analogous to JSON's replacer.
pub enum Replacer {
    /// Keep only map entries whose string key is listed
    Keys(Vec<String>),
    /// Map each (key, value) to the value to emit; `None` skips the entry
    Func(fn(key: &Value, value: &Value) -> Option<Value>),
}

/// One YAML document: a content tree plus directive state and the errors
/// and warnings collected while producing it.
#[derive(Debug, Clone)]
pub struct Document {
    pub contents: Option<Node>,
    pub schema: Schema,
    pub version: YamlVersion,
    /// Whether `%YAML` was explicit in the source (or should be emitted)
    pub explicit_version: bool,
    /// `%TAG` handle → prefix table
    pub tag_handles: Vec<(String, String)>,
    /// Whether the document was (or must be) opened with `---`
    pub directives_end_marker: bool,
    pub errors: Vec<YamlError>,
    pub warnings: Vec<YamlWarning>,
    /// Comment before the root node, after any directives
    pub comment_before: Option<String>,
    /// Comment after the root node
    pub comment: Option<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Schema::default(), YamlVersion::default())
    }
}

impl Document {
    #[must_use]
    pub fn new(schema: Schema, version: YamlVersion) -> Self {
        Self {
            contents: None,
            schema,
            version,
            explicit_version: false,
            tag_handles: Vec::new(),
            directives_end_marker: false,
            errors: Vec::new(),
            warnings: Vec::new(),
            comment_before: None,
            comment: None,
        }
    }

    /// Build a document whose contents represent `value`.
    #[must_use]
    pub fn from_value(value: &Value, replacer: Option<&Replacer>, schema: Schema) -> Self {
        let mut doc = Self::new(schema, YamlVersion::default());
        doc.contents = doc.create_node(value, replacer, None);
        doc
    }

    /// Construct a node tree from a host value. Returns `None` when the
    /// replacer skips the root. Host values are owned trees, so cyclic
    /// input cannot occur here; shared/cyclic structures are built by
    /// cloning [`Node`] handles instead.
    #[must_use]
    pub fn create_node(
        &self,
        value: &Value,
        replacer: Option<&Replacer>,
        tag: Option<&str>,
    ) -> Option<Node> {
        self.create_node_with(value, replacer, tag, false)
    }

    /// [`create_node`](Self::create_node) with control over skipped map
    /// values: with `keep_undefined`, an entry whose value the replacer
    /// skips is kept as a null instead of dropped.
    #[must_use]
    pub fn create_node_with(
        &self,
        value: &Value,
        replacer: Option<&Replacer>,
        tag: Option<&str>,
        keep_undefined: bool,
    ) -> Option<Node> {
        let node = build_node(&Value::Null, value, replacer, keep_undefined)?;
        if let Some(tag) = tag {
            node.set_tag(Some(tag.to_string()));
        }
        Some(node)
    }

    /// Convert this document's tree to a plain value, resolving aliases.
    ///
    /// Aliases bind to the most recent preceding node with their anchor,
    /// in document order. Expansion work is bounded by `max_alias_count`
    /// (negative disables the guard).
    pub fn to_native(&self, max_alias_count: i64) -> Result<Value, ResolveError> {
        let Some(root) = &self.contents else {
            return Ok(Value::Null);
        };
        let mut ctx = NativeCtx {
            anchors: HashMap::new(),
            counts: HashMap::new(),
            in_progress: Vec::new(),
            node_stack: Vec::new(),
            max_alias_count,
            merge: self.schema.name == SchemaName::Yaml11,
        };
        node_to_native(root, &mut ctx).map(|(value, _)| value)
    }
}

struct AnchorEntry {
    value: Value,
    /// Number of alias expansions performed while converting the anchored
    /// subtree; the amplification factor a reference multiplies by
    alias_cost: usize,
}

struct NativeCtx {
    anchors: HashMap<String, AnchorEntry>,
    counts: HashMap<String, usize>,
    in_progress: Vec<String>,
    /// Collections currently being converted, by identity; a repeat means
    /// the tree itself is cyclic (shared handles, not just aliases)
    node_stack: Vec<usize>,
    max_alias_count: i64,
    merge: bool,
}

/// Convert a node, returning the value and the number of alias expansions
/// performed inside it.
#[allow(clippy::too_many_lines)]
fn node_to_native(node: &Node, ctx: &mut NativeCtx) -> Result<(Value, usize), ResolveError> {
    if matches!(node, Node::Mapping(_) | Node::Sequence(_)) {
        let ptr = node.ptr_id();
        if ctx.node_stack.contains(&ptr) {
            return Err(ResolveError::CyclicAlias(
                node.anchor().unwrap_or_else(|| "~".to_string()),
            ));
        }
        ctx.node_stack.push(ptr);
    }

    let anchor = node.anchor();
    if let Some(name) = &anchor {
        ctx.in_progress.push(name.clone());
    }

    let result = match node {
        Node::Scalar(rc) => Ok((rc.borrow().value.clone(), 0)),
        Node::Sequence(rc) => {
            let seq = rc.borrow();
            let tag = seq.props.tag.clone();
            let mut items = Vec::with_capacity(seq.items.len());
            let mut expansions = 0;
            for item in &seq.items {
                let (value, n) = node_to_native(item, ctx)?;
                expansions += n;
                items.push(value);
            }
            drop(seq);
            // !!omap and !!pairs are sequences of single-pair mappings
            if matches!(tag.as_deref(), Some(uri::OMAP | uri::PAIRS)) {
                let mut entries = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Map(mut pairs) if pairs.len() == 1 => {
                            entries.push(pairs.remove(0));
                        }
                        other => entries.push((other, Value::Null)),
                    }
                }
                Ok((Value::Map(entries), expansions))
            } else {
                Ok((Value::Seq(items), expansions))
            }
        }
        Node::Mapping(rc) => {
            let map = rc.borrow();
            let tag = map.props.tag.clone();
            let mut entries: Vec<(Value, Value)> = Vec::with_capacity(map.items.len());
            let mut merge_sources: Vec<Value> = Vec::new();
            let mut expansions = 0;
            for pair in &map.items {
                let key_is_merge = ctx.merge
                    && pair.key.as_ref().is_some_and(|k| {
                        k.tag().as_deref() == Some(uri::MERGE)
                            || matches!(k.scalar_value(), Some(Value::Str(s)) if s == "<<")
                    });
                let key = match &pair.key {
                    Some(k) => {
                        let (value, n) = node_to_native(k, ctx)?;
                        expansions += n;
                        value
                    }
                    None => Value::Null,
                };
                let value = match &pair.value {
                    Some(v) => {
                        let (value, n) = node_to_native(v, ctx)?;
                        expansions += n;
                        value
                    }
                    None => Value::Null,
                };
                if key_is_merge {
                    match value {
                        Value::Seq(sources) => merge_sources.extend(sources),
                        other => merge_sources.push(other),
                    }
                } else {
                    entries.push((key, value));
                }
            }
            drop(map);
            // Merged entries never shadow the mapping's own
            for source in merge_sources {
                if let Value::Map(source_entries) = source {
                    for (key, value) in source_entries {
                        if !entries.iter().any(|(k, _)| *k == key) {
                            entries.push((key, value));
                        }
                    }
                }
            }
            // !!set keeps only the keys
            if tag.as_deref() == Some(uri::SET) {
                let keys = entries.into_iter().map(|(k, _)| k).collect();
                Ok((Value::Seq(keys), expansions))
            } else {
                Ok((Value::Map(entries), expansions))
            }
        }
        Node::Alias(rc) => {
            let source = rc.borrow().source.clone();
            if ctx.in_progress.contains(&source) {
                return Err(ResolveError::CyclicAlias(source));
            }
            let Some(entry) = ctx.anchors.get(&source) else {
                return Err(ResolveError::UnresolvedAlias(source));
            };
            let value = entry.value.clone();
            let cost = entry.alias_cost;
            let count = ctx.counts.entry(source.clone()).or_insert(0);
            *count += 1;
            if ctx.max_alias_count >= 0 {
                let budget = usize::try_from(ctx.max_alias_count).unwrap_or(usize::MAX);
                if *count * cost > budget {
                    return Err(ResolveError::ExcessiveAliasCount(source));
                }
            }
            Ok((value, 1 + cost))
        }
    };

    if matches!(node, Node::Mapping(_) | Node::Sequence(_)) {
        let ptr = node.ptr_id();
        ctx.node_stack.retain(|p| *p != ptr);
    }
    if let Some(name) = anchor {
        ctx.in_progress.retain(|n| n != &name);
        if let Ok((value, expansions)) = &result {
            ctx.anchors.insert(
                name,
                AnchorEntry {
                    value: value.clone(),
                    alias_cost: *expansions,
                },
            );
        }
    }
    result
}

/// Recursively build nodes from a host value, applying the replacer.
fn build_node(
    key: &Value,
    value: &Value,
    replacer: Option<&Replacer>,
    keep_undefined: bool,
) -> Option<Node> {
    let transformed;
    let value = match replacer {
        Some(Replacer::Func(f)) => {
            transformed = f(key, value)?;
            &transformed
        }
        _ => value,
    };

    Some(match value {
        Value::Seq(items) => {
            let mut seq = Sequence::default();
            for (idx, item) in items.iter().enumerate() {
                let idx_key = Value::Int(i64::try_from(idx).unwrap_or(i64::MAX));
                if let Some(node) = build_node(&idx_key, item, replacer, keep_undefined) {
                    seq.items.push(node);
                }
            }
            Node::sequence(seq)
        }
        Value::Map(entries) => {
            let mut map = Mapping::default();
            for (entry_key, entry_value) in entries {
                if let Some(Replacer::Keys(keys)) = replacer {
                    let keep = matches!(entry_key, Value::Str(s) if keys.contains(s));
                    if !keep {
                        continue;
                    }
                }
                match build_node(entry_key, entry_value, replacer, keep_undefined) {
                    Some(value_node) => map.items.push(Pair::new(
                        Some(Node::from_value(entry_key.clone())),
                        Some(value_node),
                    )),
                    None if keep_undefined => map.items.push(Pair::new(
                        Some(Node::from_value(entry_key.clone())),
                        Some(Node::from_value(Value::Null)),
                    )),
                    None => {}
                }
            }
            Node::mapping(map)
        }
        scalar => Node::from_value(scalar.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(contents: Node) -> Document {
        let mut doc = Document::default();
        doc.contents = Some(contents);
        doc
    }

    #[test]
    fn mapping_ops() {
        let mut map = Mapping::default();
        map.set("a".into(), Node::from_value(Value::Int(1)));
        map.set("b".into(), Node::from_value(Value::Int(2)));
        assert!(map.has(&"a".into()));
        assert_eq!(map.get_plain(&"a".into()), Some(Value::Int(1)));

        map.set("a".into(), Node::from_value(Value::Int(10)));
        assert_eq!(map.items.len(), 2);
        assert_eq!(map.get_plain(&"a".into()), Some(Value::Int(10)));

        assert!(map.delete(&"a".into()));
        assert!(!map.has(&"a".into()));
        assert!(!map.delete(&"a".into()));
    }

    #[test]
    fn sequence_ops_use_integer_keys() {
        let mut seq = Sequence::default();
        seq.add(Node::from_value(Value::Str("x".into())));
        seq.add(Node::from_value(Value::Str("y".into())));

        assert_eq!(seq.get_plain(&Value::Int(1)), Some(Value::Str("y".into())));
        // String keys parse as indices
        assert_eq!(seq.get_plain(&"0".into()), Some(Value::Str("x".into())));
        assert!(!seq.has(&Value::Int(5)));
        assert!(seq.get(&Value::Int(-1)).is_none());

        assert!(seq.delete(&Value::Int(0)));
        assert_eq!(seq.items.len(), 1);
    }

    #[test]
    fn mapping_sort_is_stable_by_key() {
        let mut map = Mapping::default();
        map.set("zebra".into(), Node::from_value(Value::Int(1)));
        map.set("apple".into(), Node::from_value(Value::Int(2)));
        map.sort();
        assert_eq!(key_sort_string(map.items[0].key.as_ref()), "apple");
    }

    #[test]
    fn create_node_builds_collections() {
        let doc = Document::default();
        let value = Value::Map(vec![
            ("k".into(), Value::Seq(vec![Value::Int(1), Value::Int(2)])),
        ]);
        let node = doc.create_node(&value, None, None).expect("node");
        assert!(node.is_map());
        let native = doc_with(node).to_native(100).expect("native");
        assert_eq!(native, value);
    }

    #[test]
    fn replacer_keys_filters_map_entries() {
        let doc = Document::default();
        let value = Value::Map(vec![
            ("keep".into(), Value::Int(1)),
            ("drop".into(), Value::Int(2)),
        ]);
        let replacer = Replacer::Keys(vec!["keep".into()]);
        let node = doc.create_node(&value, Some(&replacer), None).expect("node");
        let native = doc_with(node).to_native(100).expect("native");
        assert_eq!(native, Value::Map(vec![("keep".into(), Value::Int(1))]));
    }

    #[test]
    fn replacer_func_can_skip_and_transform() {
        fn double_ints(_key: &Value, value: &Value) -> Option<Value> {
            match value {
                Value::Int(n) => Some(Value::Int(n * 2)),
                Value::Str(_) => None,
                other => Some(other.clone()),
            }
        }
        let doc = Document::default();
        let value = Value::Seq(vec![Value::Int(3), Value::Str("skipped".into())]);
        let node = doc
            .create_node(&value, Some(&Replacer::Func(double_ints)), None)
            .expect("node");
        let native = doc_with(node).to_native(100).expect("native");
        assert_eq!(native, Value::Seq(vec![Value::Int(6)]));
    }

    #[test]
    fn alias_resolves_to_last_preceding_anchor() {
        // a: &x 1, b: &x 2, c: *x  ->  c binds to 2
        let mut map = Mapping::default();
        let first = Node::from_value(Value::Int(1));
        first.set_anchor(Some("x".into()));
        let second = Node::from_value(Value::Int(2));
        second.set_anchor(Some("x".into()));
        map.set("a".into(), first);
        map.set("b".into(), second);
        map.set("c".into(), Node::alias(Alias::new("x")));

        let native = doc_with(Node::mapping(map)).to_native(100).expect("native");
        assert_eq!(native.get("c"), Some(&Value::Int(2)));
    }

    #[test]
    fn unresolved_alias_errors() {
        let mut map = Mapping::default();
        map.set("a".into(), Node::alias(Alias::new("nope")));
        let err = doc_with(Node::mapping(map)).to_native(100).unwrap_err();
        assert_eq!(err, ResolveError::UnresolvedAlias("nope".into()));
    }

    #[test]
    fn cyclic_alias_cannot_become_plain_value() {
        let mut map = Mapping::default();
        map.set("self".into(), Node::alias(Alias::new("m")));
        let node = Node::mapping(map);
        node.set_anchor(Some("m".into()));
        let err = doc_with(node).to_native(100).unwrap_err();
        assert_eq!(err, ResolveError::CyclicAlias("m".into()));
    }

    #[test]
    fn alias_guard_allows_simple_reuse_at_zero() {
        let mut map = Mapping::default();
        let shared = Node::from_value(Value::Int(1));
        shared.set_anchor(Some("x".into()));
        map.set("a".into(), shared);
        map.set("b".into(), Node::alias(Alias::new("x")));
        map.set("c".into(), Node::alias(Alias::new("x")));
        assert!(doc_with(Node::mapping(map)).to_native(0).is_ok());
    }

    #[test]
    fn alias_guard_stops_amplification() {
        // lvl0 is plain; each level is a sequence of 9 aliases to the
        // previous one, multiplying expansion work
        let mut root = Mapping::default();
        let lvl0 = Node::sequence(Sequence {
            items: (0..9).map(|_| Node::from_value(Value::Int(1))).collect(),
            ..Default::default()
        });
        lvl0.set_anchor(Some("l0".into()));
        root.set("l0".into(), lvl0);
        for level in 1..6 {
            let prev = format!("l{}", level - 1);
            let node = Node::sequence(Sequence {
                items: (0..9)
                    .map(|_| Node::alias(Alias::new(prev.clone())))
                    .collect(),
                ..Default::default()
            });
            node.set_anchor(Some(format!("l{level}")));
            root.set(format!("l{level}").into(), node);
        }
        let err = doc_with(Node::mapping(root)).to_native(100).unwrap_err();
        assert!(matches!(err, ResolveError::ExcessiveAliasCount(_)));
    }

    #[test]
    fn merge_keys_apply_in_v11_only() {
        let build = || {
            let mut defaults = Mapping::default();
            defaults.set("x".into(), Node::from_value(Value::Int(1)));
            defaults.set("y".into(), Node::from_value(Value::Int(2)));
            let defaults_node = Node::mapping(defaults);
            defaults_node.set_anchor(Some("defaults".into()));

            let mut root = Mapping::default();
            root.set("base".into(), defaults_node);
            let mut merged = Mapping::default();
            merged.add(Pair::new(
                Some(Node::from_value(Value::Str("<<".into()))),
                Some(Node::alias(Alias::new("defaults"))),
            ));
            merged.set("y".into(), Node::from_value(Value::Int(20)));
            root.set("merged".into(), Node::mapping(merged));
            Node::mapping(root)
        };

        let mut doc = doc_with(build());
        doc.schema = Schema::new(SchemaName::Yaml11, &[]);
        let native = doc.to_native(100).expect("native");
        let merged = native.get("merged").expect("merged");
        // Own entry wins over the merged default
        assert_eq!(merged.get("y"), Some(&Value::Int(20)));
        assert_eq!(merged.get("x"), Some(&Value::Int(1)));

        // Under core, `<<` is an ordinary key
        let doc = doc_with(build());
        let native = doc.to_native(100).expect("native");
        let merged = native.get("merged").expect("merged");
        assert_eq!(merged.get("x"), None);
        assert!(merged.get("<<").is_some());
    }

    #[test]
    fn set_tag_produces_key_sequence() {
        let mut map = Mapping::default();
        map.props.tag = Some(uri::SET.to_string());
        map.add(Pair::new(
            Some(Node::from_value(Value::Str("a".into()))),
            None,
        ));
        map.add(Pair::new(
            Some(Node::from_value(Value::Str("b".into()))),
            None,
        ));
        let native = doc_with(Node::mapping(map)).to_native(100).expect("native");
        assert_eq!(
            native,
            Value::Seq(vec![Value::Str("a".into()), Value::Str("b".into())])
        );
    }
}
