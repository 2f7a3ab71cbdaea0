//! Demangling of Swift symbols.
//!
//! A [`Demangler`] is a session: it owns every node it ever built and hands out [`Node`] views borrowing it, so
//! nodes can never outlive the session that produced them.

pub use self::config::{Config, DEFAULT_MAX_DEPTH, MAX_SUPPORTED_DEPTH};
pub use self::display::DisplayOptions;
pub use self::error::{ConfigError, DemangleError};
pub use self::node_kind::NodeKind;
pub use self::unicode::{GeneralCategory, StdUnicodeProperties, UnicodeProperties};
use self::display::display_fn;
use self::parsers::Parser;
use self::store::{NodeId, NodeStore, RawPayload};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::{self, Debug, Display, Formatter, Write};
use std::ptr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

mod config;
mod cursor;
mod display;
mod error;
mod node_kind;
mod param_kind;
mod parsers;
mod store;
mod unicode;

#[cfg(test)]
mod tests;

pub(crate) const STDLIB_MODULE: &str = "Swift";
pub(crate) const OBJC_MODULE: &str = "__C";
pub(crate) const CLANG_IMPORTER_MODULE: &str = "__C_Synthesized";

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Copy)]
enum Grammar {
    Symbol,
    Type,
}

#[derive(Clone)]
enum CachedPayload {
    Text(Arc<str>),
    Index(u64),
    Children(Arc<[NodeId]>),
}

#[derive(Default)]
struct Session {
    store: NodeStore,
    symbols: HashMap<Arc<str>, NodeId>,
    types: HashMap<Arc<str>, NodeId>,
    mangled: HashMap<NodeId, Arc<str>>,
    payloads: HashMap<NodeId, CachedPayload>,
}

/// A demangling session.
///
/// Every successfully parsed input is cached, so demangling the same string twice returns the same tree. The session
/// can be moved between threads but not shared by them.
///
/// ```rust
/// use swift_ast_demangle::swift::{Demangler, NodeKind};
///
/// let demangler = Demangler::new();
/// let symbol = demangler.parse("$s4main3fooyyF").unwrap();
///
/// assert_eq!(symbol.kind(), NodeKind::Global);
/// assert_eq!(symbol.to_string(), "main.foo() -> ()");
/// assert_eq!(format!("{symbol:#}"), "foo()");
/// ```
pub struct Demangler {
    id: u64,
    config: Config,
    unicode: Box<dyn UnicodeProperties + Send>,
    session: RefCell<Session>,
    grammar_passes: Cell<u64>,
}

impl Default for Demangler {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Demangler {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Demangler")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("grammar_passes", &self.grammar_passes.get())
            .finish_non_exhaustive()
    }
}

impl Demangler {
    /// Creates a session with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a session with the given configuration. A [`Config::max_depth`] above [`MAX_SUPPORTED_DEPTH`] is
    /// lowered to it.
    #[must_use]
    pub fn with_config(mut config: Config) -> Self {
        if config.max_depth > MAX_SUPPORTED_DEPTH {
            tracing::debug!(
                requested = config.max_depth,
                limit = MAX_SUPPORTED_DEPTH,
                "lowering maximum depth"
            );

            config.max_depth = MAX_SUPPORTED_DEPTH;
        }

        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            config,
            unicode: Box::new(StdUnicodeProperties),
            session: RefCell::default(),
            grammar_passes: Cell::new(0),
        }
    }

    /// Replaces the source of Unicode properties used while printing.
    #[must_use]
    pub fn with_unicode_properties(self, unicode: impl UnicodeProperties + Send + 'static) -> Self {
        Self {
            unicode: Box::new(unicode),
            ..self
        }
    }

    /// The configuration of the session.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// How many times the grammar actually ran, cache hits excluded.
    #[must_use]
    pub fn grammar_passes(&self) -> u64 {
        self.grammar_passes.get()
    }

    /// Demangles a symbol such as `$s4main3fooyyF`. The root of the result is a [`NodeKind::Global`] node.
    ///
    /// # Errors
    ///
    /// Fails if `symbol` is not a valid mangled symbol or nests deeper than [`Config::max_depth`].
    pub fn parse(&self, symbol: &str) -> Result<Node<'_>, DemangleError> {
        self.parse_with(symbol, Grammar::Symbol)
    }

    /// Demangles a bare type mangling without a symbol prefix, such as `SaySiG`. The root of the result is a
    /// [`NodeKind::Type`] node.
    ///
    /// # Errors
    ///
    /// Fails if `mangled_type` is not exactly one valid type mangling.
    pub fn parse_type(&self, mangled_type: &str) -> Result<Node<'_>, DemangleError> {
        self.parse_with(mangled_type, Grammar::Type)
    }

    fn parse_with(&self, input: &str, grammar: Grammar) -> Result<Node<'_>, DemangleError> {
        let mut session = self.session.borrow_mut();
        let session = &mut *session;

        let cache = match grammar {
            Grammar::Symbol => &mut session.symbols,
            Grammar::Type => &mut session.types,
        };

        if let Some(&id) = cache.get(input) {
            tracing::debug!(input, "demangle cache hit");

            return Ok(self.wrap(id));
        }

        self.grammar_passes.set(self.grammar_passes.get() + 1);

        let mark = session.store.mark();
        let parser = Parser::new(input, &mut session.store, self.config.max_depth);

        let result = match grammar {
            Grammar::Symbol => parser.parse_symbol(),
            Grammar::Type => parser.parse_type(),
        };

        match result {
            Ok(id) => {
                let source = session.store.get(id).span.source;

                cache.insert(Arc::clone(session.store.text_buffer(source)), id);

                tracing::debug!(input, nodes = session.store.len(), "demangled");

                Ok(self.wrap(id))
            }
            Err(error) => {
                session.store.truncate(mark);

                tracing::debug!(input, offset = error.offset(), %error, "demangling failed");

                Err(error)
            }
        }
    }

    const fn wrap(&self, id: NodeId) -> Node<'_> {
        Node { demangler: self, id }
    }

    /// Resolves a handle obtained from [`Node::handle`].
    ///
    /// # Panics
    ///
    /// Panics if the handle was produced by another session.
    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Node<'_> {
        assert!(
            handle.session == self.id,
            "invalid node handle: it belongs to session {}, not {}",
            handle.session,
            self.id,
        );

        self.wrap(handle.id)
    }

    /// Renders `node` with explicit options.
    ///
    /// # Panics
    ///
    /// Panics if `node` belongs to another session.
    #[must_use]
    pub fn render(&self, node: Node<'_>, options: DisplayOptions) -> String {
        self.node(node.handle()).display(options).to_string()
    }

    /// Demangles `symbol` and renders it with [`DisplayOptions::full`], except that standard library types are
    /// printed with their sugared form, such as `[Swift.Int]` for `Swift.Array<Swift.Int>`.
    ///
    /// # Errors
    ///
    /// Fails if `symbol` cannot be demangled.
    pub fn demangle_to_string(&self, symbol: &str) -> Result<String, DemangleError> {
        let options = DisplayOptions {
            synthesize_sugar_on_types: true,
            ..DisplayOptions::full()
        };

        self.parse(symbol).map(|node| self.render(node, options))
    }

    /// Demangles `symbol` and renders it with [`DisplayOptions::simplified`].
    ///
    /// # Errors
    ///
    /// Fails if `symbol` cannot be demangled.
    pub fn demangle_simplified(&self, symbol: &str) -> Result<String, DemangleError> {
        self.parse(symbol).map(|node| self.render(node, DisplayOptions::simplified()))
    }
}

/// An opaque reference to a node that can be stored without borrowing its session.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NodeHandle {
    session: u64,
    id: NodeId,
}

/// The content of a node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Payload<'d> {
    /// An identifier or other text.
    Text(Arc<str>),
    /// A number.
    Index(u64),
    /// Child nodes, possibly none.
    Children(Children<'d>),
}

/// Children of a node.
#[derive(Clone)]
pub struct Children<'d> {
    demangler: &'d Demangler,
    ids: Arc<[NodeId]>,
}

impl<'d> Children<'d> {
    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The child at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Node<'d>> {
        self.ids.get(index).map(|&id| self.demangler.wrap(id))
    }

    /// Iterates over the children in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Node<'d>> + '_ {
        self.ids.iter().map(|&id| self.demangler.wrap(id))
    }
}

impl Debug for Children<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl PartialEq for Children<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.demangler, other.demangler) && self.ids == other.ids
    }
}

impl Eq for Children<'_> {}

/// A node of a demangled tree, borrowing the session that owns it.
#[derive(Clone, Copy)]
pub struct Node<'d> {
    demangler: &'d Demangler,
    id: NodeId,
}

impl<'d> Node<'d> {
    /// The production that built this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.demangler.session.borrow().store.kind(self.id)
    }

    /// A handle to this node that does not borrow the session.
    #[must_use]
    pub const fn handle(&self) -> NodeHandle {
        NodeHandle {
            session: self.demangler.id,
            id: self.id,
        }
    }

    /// The content of this node.
    #[must_use]
    pub fn payload(&self) -> Payload<'d> {
        let mut session = self.demangler.session.borrow_mut();
        let session = &mut *session;
        let store = &session.store;

        let payload = session
            .payloads
            .entry(self.id)
            .or_insert_with(|| match store.get(self.id).payload {
                RawPayload::Text(text) => CachedPayload::Text(Arc::clone(store.text_buffer(text))),
                RawPayload::Index(index) => CachedPayload::Index(index),
                RawPayload::Children { .. } => CachedPayload::Children(store.children(self.id).into()),
            })
            .clone();

        match payload {
            CachedPayload::Text(text) => Payload::Text(text),
            CachedPayload::Index(index) => Payload::Index(index),
            CachedPayload::Children(ids) => Payload::Children(Children {
                demangler: self.demangler,
                ids,
            }),
        }
    }

    /// The children of this node, empty for text and index nodes.
    #[must_use]
    pub fn children(&self) -> Children<'d> {
        match self.payload() {
            Payload::Children(children) => children,
            Payload::Text(_) | Payload::Index(_) => Children {
                demangler: self.demangler,
                ids: Arc::new([]),
            },
        }
    }

    /// The text of a text node.
    #[must_use]
    pub fn text(&self) -> Option<Arc<str>> {
        match self.payload() {
            Payload::Text(text) => Some(text),
            Payload::Index(_) | Payload::Children(_) => None,
        }
    }

    /// The value of an index node.
    #[must_use]
    pub fn index(&self) -> Option<u64> {
        self.demangler.session.borrow().store.index(self.id)
    }

    /// The part of the demangled input this node was built from. Structural markers that are not spelled in the input
    /// have an empty mangled form.
    #[must_use]
    pub fn mangled(&self) -> Arc<str> {
        let mut session = self.demangler.session.borrow_mut();
        let session = &mut *session;
        let store = &session.store;

        Arc::clone(session.mangled.entry(self.id).or_insert_with(|| {
            let record = store.get(self.id);

            if record.kind.has_mangled_form() {
                store
                    .text_buffer(record.span.source)
                    .get(record.span.start..record.span.end)
                    .unwrap_or_default()
                    .into()
            } else {
                "".into()
            }
        }))
    }

    /// The module the entity of this symbol belongs to, looking through attributes, specializations and nested
    /// contexts.
    #[must_use]
    pub fn module_name(&self) -> Option<Arc<str>> {
        let session = self.demangler.session.borrow();
        let store = &session.store;
        let mut node = self.id;

        loop {
            let kind = store.kind(node);

            node = match kind {
                NodeKind::Module => return store.text(node).map(Arc::from),
                NodeKind::Global => store
                    .children(node)
                    .iter()
                    .copied()
                    .find(|&child| !store.kind(child).is_function_attr())?,
                NodeKind::Type
                | NodeKind::TypeMangling
                | NodeKind::BoundGenericClass
                | NodeKind::BoundGenericEnum
                | NodeKind::BoundGenericFunction
                | NodeKind::BoundGenericProtocol
                | NodeKind::BoundGenericStructure
                | NodeKind::BoundGenericTypeAlias => store.first_child(node)?,
                _ if kind.is_context() => store.first_child(node)?,
                _ => return None,
            };
        }
    }

    /// Whether the symbol rooted at this node is called with the Swift calling convention. Only meaningful for
    /// [`NodeKind::Global`] nodes.
    #[must_use]
    pub fn has_swift_calling_convention(&self) -> bool {
        let session = self.demangler.session.borrow();
        let store = &session.store;

        store.kind(self.id) == NodeKind::Global
            && store.first_child(self.id).is_some_and(|top_level| {
                !matches!(
                    store.kind(top_level),
                    NodeKind::ObjCAttribute | NodeKind::TypeMetadataAccessFunction
                )
            })
    }

    /// An indented listing of the tree rooted at this node, one `kind=…` line per node.
    #[must_use]
    pub fn dump(&self) -> String {
        let session = self.demangler.session.borrow();

        display_fn(|f| write_dump(f, &session.store, self.id, 0)).to_string()
    }

    /// Displays this node with explicit options.
    pub fn display(self, options: DisplayOptions) -> impl Display + 'd {
        display_fn(move |f| self.write_to(f, options))
    }

    fn write_to(self, output: impl Write, options: DisplayOptions) -> fmt::Result {
        let session = self.demangler.session.borrow();

        display::write_node(output, &session.store, self.id, options, &*self.demangler.unicode)
    }
}

fn write_dump(f: &mut Formatter, store: &NodeStore, node: NodeId, indent: usize) -> fmt::Result {
    write!(f, "{:indent$}kind={}", "", store.kind(node))?;

    match store.get(node).payload {
        RawPayload::Text(text) => write!(f, ", text=\"{}\"", store.text_buffer(text))?,
        RawPayload::Index(index) => write!(f, ", index={index}")?,
        RawPayload::Children { .. } => {}
    }

    f.write_char('\n')?;

    for &child in store.children(node) {
        write_dump(f, store, child, indent + 2)?;
    }

    Ok(())
}

/// `{}` uses the display options of the session configuration, `{:#}` uses [`DisplayOptions::simplified`].
impl Display for Node<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let options = if f.alternate() {
            DisplayOptions::simplified()
        } else {
            self.demangler.config.display
        };

        self.write_to(f, options)
    }
}

impl Debug for Node<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind())
            .field("handle", &self.handle())
            .finish()
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.demangler, other.demangler) && self.id == other.id
    }
}

impl Eq for Node<'_> {}
