//! The Swift mangling grammar.
//!
//! Mangled names are postfix: every operator either pushes a new node or pops its operands from a node stack and
//! pushes the node built from them. Productions are split by the part of the grammar they belong to.

use crate::swift::cursor::{Cursor, Snapshot, SnapshotExt};
use crate::swift::error::{CursorError, DemangleError};
use crate::swift::node_kind::NodeKind;
use crate::swift::store::{Mark, NodeId, NodeRecord, NodeStore, RawPayload, Span, TextId};
use crate::swift::STDLIB_MODULE;
use std::mem;

mod entities;
mod identifiers;
mod specializations;
mod types;

#[cfg(test)]
mod tests;

type ParseResult<T> = Result<T, DemangleError>;

const MANGLING_PREFIXES: [&str; 7] = ["_$s", "$s", "_$S", "$S", "_$e", "$e", "_T0"];

pub(crate) struct Parser<'a, 's> {
    cursor: Cursor<'a>,
    store: &'s mut NodeStore,
    source: TextId,
    stack: Vec<NodeId>,
    substitutions: Vec<NodeId>,
    words: Vec<&'a str>,
    operator_start: usize,
    depth: usize,
    max_depth: usize,
}

pub(crate) struct ParserSnapshot {
    position: usize,
    mark: Mark,
    stack: Vec<NodeId>,
    substitutions: usize,
    words: usize,
}

impl Snapshot for Parser<'_, '_> {
    type Snapshot = ParserSnapshot;

    fn snapshot(&mut self) -> Self::Snapshot {
        ParserSnapshot {
            position: self.cursor.snapshot(),
            mark: self.store.mark(),
            stack: self.stack.clone(),
            substitutions: self.substitutions.len(),
            words: self.words.len(),
        }
    }

    fn restore(&mut self, snapshot: Self::Snapshot) {
        self.cursor.restore(snapshot.position);
        self.store.truncate(snapshot.mark);
        self.stack = snapshot.stack;
        self.substitutions.truncate(snapshot.substitutions);
        self.words.truncate(snapshot.words);
    }
}

impl<'a, 's> Parser<'a, 's> {
    pub(crate) fn new(input: &'a str, store: &'s mut NodeStore, max_depth: usize) -> Self {
        let source = store.intern(input);

        Self {
            cursor: Cursor::new(input),
            store,
            source,
            stack: Vec::new(),
            substitutions: Vec::new(),
            words: Vec::new(),
            operator_start: 0,
            depth: 0,
            max_depth,
        }
    }

    /// Demangles a complete symbol. Nothing is left in the store if this fails.
    pub(crate) fn parse_symbol(mut self) -> ParseResult<NodeId> {
        self.transaction(Self::demangle_symbol)
    }

    /// Demangles a bare type mangling without a symbol prefix.
    pub(crate) fn parse_type(mut self) -> ParseResult<NodeId> {
        self.transaction(Self::demangle_type)
    }

    fn demangle_symbol(&mut self) -> ParseResult<NodeId> {
        if !MANGLING_PREFIXES
            .iter()
            .any(|prefix| self.cursor.match_literal(prefix.as_bytes()))
        {
            return Err(self.expected("Swift mangling prefix"));
        }

        self.parse_and_push_nodes()?;
        self.build_global()
    }

    fn demangle_type(&mut self) -> ParseResult<NodeId> {
        self.parse_and_push_nodes()?;

        match *self.stack.as_slice() {
            [node] if self.store.kind(node) == NodeKind::Type => Ok(node),
            _ => Err(self.expected("type")),
        }
    }

    fn parse_and_push_nodes(&mut self) -> ParseResult<()> {
        while !self.cursor.is_at_end() {
            self.operator_start = self.cursor.position();

            let node = self.demangle_operator()?;

            self.push(node);
        }

        Ok(())
    }

    fn build_global(&mut self) -> ParseResult<NodeId> {
        let mut attributes = Vec::new();

        while let Some(attribute) = self.pop_if(NodeKind::is_function_attr) {
            attributes.push(attribute);
        }

        let mut children = Vec::with_capacity(attributes.len() + self.stack.len());

        for node in mem::take(&mut self.stack) {
            let node = if self.store.kind(node) == NodeKind::Type {
                self.store.first_child(node).ok_or_else(|| self.expected("entity"))?
            } else {
                node
            };

            if !self.store.kind(node).is_top_level() {
                return Err(self.expected("entity"));
            }

            children.push(node);
        }

        // Nodes following a partial apply forwarder belong to the forwarder.
        for attribute in attributes.into_iter().rev() {
            let kind = self.store.kind(attribute);

            if matches!(kind, NodeKind::PartialApplyForwarder | NodeKind::PartialApplyObjCForwarder) {
                let start = self.store.get(attribute).span.start;
                let forwarder = self.create_at(kind, &children, start)?;

                children = vec![forwarder];
            } else {
                children.insert(0, attribute);
            }
        }

        if children.is_empty() {
            return Err(self.expected("entity"));
        }

        self.create_at(NodeKind::Global, &children, 0)
    }

    fn demangle_operator(&mut self) -> ParseResult<NodeId> {
        let Some(c) = self.cursor.next_byte() else {
            return Err(self.expected("operator"));
        };

        tracing::trace!(operator = %char::from(c), offset = self.operator_start, "demangling operator");

        match c {
            b'A' => self.demangle_multi_substitutions(),
            b'B' => self.demangle_builtin_type(),
            b'C' => self.demangle_any_generic_type(NodeKind::Class),
            b'D' => self.create_with_popped_type(NodeKind::TypeMangling),
            b'E' => self.demangle_extension_context(),
            b'F' => self.demangle_plain_function(),
            b'G' => self.demangle_bound_generic_type(),
            b'K' => self.create(NodeKind::ThrowsAnnotation, &[]),
            b'L' => self.demangle_local_identifier(),
            b'M' => self.demangle_metatype(),
            b'N' => self.create_with_popped_type(NodeKind::TypeMetadata),
            b'O' => self.demangle_any_generic_type(NodeKind::Enum),
            b'P' => self.demangle_any_generic_type(NodeKind::Protocol),
            b'R' => self.demangle_generic_requirement(),
            b'S' => self.demangle_standard_substitution(),
            b'T' => self.demangle_thunk_or_specialization(),
            b'V' => self.demangle_any_generic_type(NodeKind::Structure),
            b'W' => self.demangle_witness(),
            b'Y' => self.demangle_type_annotation(),
            b'Z' => {
                let entity = self.require_if(NodeKind::is_entity, "entity")?;

                self.create(NodeKind::Static, &[entity])
            }
            b'a' => self.demangle_any_generic_type(NodeKind::TypeAlias),
            b'c' => self.pop_function_type(),
            b'd' => self.create(NodeKind::VariadicMarker, &[]),
            b'f' => self.demangle_function_entity(),
            b'h' => self.create_type_modifier(NodeKind::Shared),
            b'i' => self.demangle_subscript(),
            b'l' => self.demangle_generic_signature(false),
            b'm' => {
                let instance = self.require_kind(NodeKind::Type, "type")?;
                let metatype = self.create(NodeKind::Metatype, &[instance])?;

                self.create_type(metatype)
            }
            b'n' => self.create_type_modifier(NodeKind::Owned),
            b'o' => self.demangle_operator_identifier(),
            b'q' => {
                let param = self.demangle_generic_param_index()?;

                self.create_type(param)
            }
            b'r' => self.demangle_generic_signature(true),
            b's' => self.create_text(NodeKind::Module, STDLIB_MODULE),
            b't' => self.pop_tuple(),
            b'v' => self.demangle_variable(),
            b'x' => {
                let param = self.create_generic_param_type(0, 0)?;

                self.create_type(param)
            }
            b'y' => self.create(NodeKind::EmptyList, &[]),
            b'z' => self.create_type_modifier(NodeKind::InOut),
            b'_' => self.create(NodeKind::FirstElementMarker, &[]),
            b'.' => {
                self.cursor.push_back();

                let suffix = self.cursor.consume_rest();

                self.create_text(NodeKind::Suffix, suffix)
            }
            b'0'..=b'9' => {
                self.cursor.push_back();
                self.demangle_identifier()
            }
            _ => {
                self.cursor.push_back();

                Err(self.expected("operator"))
            }
        }
    }

    // Errors.

    fn expected(&self, expected: &'static str) -> DemangleError {
        DemangleError::ParseFailure {
            offset: self.cursor.position(),
            expected,
        }
    }

    fn cursor_failure(&self, error: CursorError, expected: &'static str) -> DemangleError {
        tracing::trace!(%error, offset = self.cursor.position(), expected, "cursor failure");

        self.expected(expected)
    }

    fn recursion_limit(&self) -> DemangleError {
        DemangleError::RecursionLimitExceeded {
            offset: self.cursor.position(),
            limit: self.max_depth,
        }
    }

    /// Runs a production that recurses into itself, bounding the recursion depth.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= self.max_depth {
            return Err(self.recursion_limit());
        }

        self.depth += 1;

        let result = f(self);

        self.depth -= 1;

        result
    }

    fn next_char(&mut self, expected: &'static str) -> ParseResult<u8> {
        self.cursor.next_byte().ok_or_else(|| self.expected(expected))
    }

    fn demangle_natural(&mut self, expected: &'static str) -> ParseResult<u64> {
        self.cursor
            .read_decimal()
            .map_err(|error| self.cursor_failure(error, expected))
    }

    /// `_` is zero, otherwise a decimal number `N` followed by `_` is `N + 1`.
    fn demangle_index(&mut self) -> ParseResult<u64> {
        if self.cursor.next_if(b'_') {
            return Ok(0);
        }

        if self.cursor.peek_digit() {
            let value = self.demangle_natural("index")?;

            if self.cursor.next_if(b'_') {
                return value.checked_add(1).ok_or_else(|| self.expected("index"));
            }
        }

        Err(self.expected("index"))
    }

    fn demangle_index_as_node(&mut self) -> ParseResult<NodeId> {
        let index = self.demangle_index()?;

        self.create_index(NodeKind::Number, index)
    }

    // Node construction.

    fn insert(&mut self, kind: NodeKind, payload: RawPayload, span: Span, height: usize) -> ParseResult<NodeId> {
        if height > self.max_depth {
            return Err(self.recursion_limit());
        }

        Ok(self.store.insert(NodeRecord {
            kind,
            payload,
            span,
            height,
        }))
    }

    const fn span_from(&self, start: usize) -> Span {
        Span {
            source: self.source,
            start,
            end: self.cursor.position(),
        }
    }

    fn create_text_at(&mut self, kind: NodeKind, text: &str, start: usize) -> ParseResult<NodeId> {
        let text = self.store.intern(text);
        let span = self.span_from(start);

        self.insert(kind, RawPayload::Text(text), span, 1)
    }

    fn create_text(&mut self, kind: NodeKind, text: &str) -> ParseResult<NodeId> {
        self.create_text_at(kind, text, self.operator_start)
    }

    fn create_index(&mut self, kind: NodeKind, index: u64) -> ParseResult<NodeId> {
        let span = self.span_from(self.operator_start);

        self.insert(kind, RawPayload::Index(index), span, 1)
    }

    /// Creates a node whose span covers `start`, the current position and the spans of all children.
    fn create_at(&mut self, kind: NodeKind, children: &[NodeId], start: usize) -> ParseResult<NodeId> {
        let mut span = self.span_from(start);
        let mut height = 0;

        for &child in children {
            let record = self.store.get(child);

            span = span.merge(record.span);
            height = height.max(record.height);
        }

        let payload = self.store.children_payload(children);

        self.insert(kind, payload, span, height + 1)
    }

    fn create(&mut self, kind: NodeKind, children: &[NodeId]) -> ParseResult<NodeId> {
        self.create_at(kind, children, self.operator_start)
    }

    fn create_type(&mut self, child: NodeId) -> ParseResult<NodeId> {
        self.create(NodeKind::Type, &[child])
    }

    fn create_with_popped_type(&mut self, kind: NodeKind) -> ParseResult<NodeId> {
        let ty = self.require_kind(NodeKind::Type, "type")?;

        self.create(kind, &[ty])
    }

    fn create_type_modifier(&mut self, kind: NodeKind) -> ParseResult<NodeId> {
        let ty = self.pop_type_and_get_child()?;
        let modified = self.create(kind, &[ty])?;

        self.create_type(modified)
    }

    /// Reuses the payload and span of `node` under another kind.
    fn change_kind(&mut self, node: NodeId, kind: NodeKind) -> NodeId {
        let record = *self.store.get(node);

        self.store.insert(NodeRecord { kind, ..record })
    }

    // The node stack.

    fn push(&mut self, node: NodeId) {
        self.stack.push(node);
    }

    fn pop_if(&mut self, predicate: impl FnOnce(NodeKind) -> bool) -> Option<NodeId> {
        let &top = self.stack.last()?;

        if predicate(self.store.kind(top)) {
            self.stack.pop()
        } else {
            None
        }
    }

    fn pop_kind(&mut self, kind: NodeKind) -> Option<NodeId> {
        self.pop_if(|top| top == kind)
    }

    fn require_if(&mut self, predicate: impl FnOnce(NodeKind) -> bool, expected: &'static str) -> ParseResult<NodeId> {
        self.pop_if(predicate).ok_or_else(|| self.expected(expected))
    }

    fn require_kind(&mut self, kind: NodeKind, expected: &'static str) -> ParseResult<NodeId> {
        self.pop_kind(kind).ok_or_else(|| self.expected(expected))
    }

    fn add_substitution(&mut self, node: NodeId) {
        self.substitutions.push(node);
    }
}
