use crate::swift::node_kind::NodeKind;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        widen(self.0)
    }
}

fn widen(value: u32) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct TextId(u32);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum RawPayload {
    Text(TextId),
    Index(u64),
    Children { start: u32, len: u32 },
}

impl RawPayload {
    pub(crate) const EMPTY: Self = Self::Children { start: 0, len: 0 };
}

/// Byte range of the input a node was demangled from, together with the input it belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Span {
    pub(crate) source: TextId,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl Span {
    pub(crate) fn merge(self, other: Self) -> Self {
        Self {
            source: self.source,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct NodeRecord {
    pub(crate) kind: NodeKind,
    pub(crate) payload: RawPayload,
    pub(crate) span: Span,
    pub(crate) height: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Mark {
    nodes: usize,
    children: usize,
    texts: usize,
}

/// Append-only arena holding every node of one session.
#[derive(Debug, Default)]
pub(crate) struct NodeStore {
    nodes: Vec<NodeRecord>,
    child_pool: Vec<NodeId>,
    texts: Vec<Arc<str>>,
    text_ids: HashMap<Arc<str>, TextId>,
}

impl NodeStore {
    pub(crate) const fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn insert(&mut self, record: NodeRecord) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or_else(|_| panic!("node store is full")));

        self.nodes.push(record);

        id
    }

    /// Stores a child list and returns the payload referring to it.
    pub(crate) fn children_payload(&mut self, children: &[NodeId]) -> RawPayload {
        if children.is_empty() {
            return RawPayload::EMPTY;
        }

        let start = u32::try_from(self.child_pool.len()).unwrap_or_else(|_| panic!("node store is full"));
        let len = u32::try_from(children.len()).unwrap_or_else(|_| panic!("node store is full"));

        self.child_pool.extend_from_slice(children);

        RawPayload::Children { start, len }
    }

    /// Returns the single shared buffer for `text`, allocating it on first use.
    pub(crate) fn intern(&mut self, text: &str) -> TextId {
        if let Some(&id) = self.text_ids.get(text) {
            return id;
        }

        let id = TextId(u32::try_from(self.texts.len()).unwrap_or_else(|_| panic!("text interner is full")));
        let buffer = Arc::<str>::from(text);

        self.texts.push(Arc::clone(&buffer));
        self.text_ids.insert(buffer, id);

        id
    }

    pub(crate) fn text_buffer(&self, id: TextId) -> &Arc<str> {
        &self.texts[widen(id.0)]
    }

    pub(crate) fn get(&self, id: NodeId) -> &NodeRecord {
        self.nodes
            .get(id.index())
            .unwrap_or_else(|| panic!("invalid node handle {}", id.index()))
    }

    pub(crate) fn kind(&self, id: NodeId) -> NodeKind {
        self.get(id).kind
    }

    pub(crate) fn children(&self, id: NodeId) -> &[NodeId] {
        match self.get(id).payload {
            RawPayload::Children { start, len } => &self.child_pool[widen(start)..widen(start + len)],
            RawPayload::Text(_) | RawPayload::Index(_) => &[],
        }
    }

    pub(crate) fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    pub(crate) fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.child(id, 0)
    }

    pub(crate) fn child_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(id).iter().copied().find(|&child| self.kind(child) == kind)
    }

    pub(crate) fn text(&self, id: NodeId) -> Option<&str> {
        match self.get(id).payload {
            RawPayload::Text(text) => Some(self.text_buffer(text)),
            RawPayload::Index(_) | RawPayload::Children { .. } => None,
        }
    }

    pub(crate) fn index(&self, id: NodeId) -> Option<u64> {
        match self.get(id).payload {
            RawPayload::Index(index) => Some(index),
            RawPayload::Text(_) | RawPayload::Children { .. } => None,
        }
    }

    pub(crate) const fn mark(&self) -> Mark {
        Mark {
            nodes: self.nodes.len(),
            children: self.child_pool.len(),
            texts: self.texts.len(),
        }
    }

    /// Drops every node and every interned text created after `mark`.
    pub(crate) fn truncate(&mut self, mark: Mark) {
        self.nodes.truncate(mark.nodes);
        self.child_pool.truncate(mark.children);

        for text in self.texts.drain(mark.texts..) {
            self.text_ids.remove(&text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NodeRecord, NodeStore, RawPayload, Span};
    use crate::swift::node_kind::NodeKind;
    use std::sync::Arc;

    fn record(store: &mut NodeStore, kind: NodeKind, payload: RawPayload) -> NodeRecord {
        NodeRecord {
            kind,
            payload,
            span: Span {
                source: store.intern("source"),
                start: 0,
                end: 0,
            },
            height: 1,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = NodeStore::default();
        let text = store.intern("JetUI");
        let module = record(&mut store, NodeKind::Module, RawPayload::Text(text));
        let module = store.insert(module);
        let index = record(&mut store, NodeKind::Index, RawPayload::Index(4));
        let index = store.insert(index);
        let payload = store.children_payload(&[module, index, module]);
        let parent = record(&mut store, NodeKind::Global, payload);
        let parent = store.insert(parent);

        assert_eq!(store.kind(module), NodeKind::Module);
        assert_eq!(store.text(module), Some("JetUI"));
        assert_eq!(store.index(index), Some(4));
        assert_eq!(store.children(parent), [module, index, module]);
        assert_eq!(store.first_child(parent), Some(module));
        assert_eq!(store.child_of_kind(parent, NodeKind::Index), Some(index));
        assert!(store.children(module).is_empty());
    }

    #[test]
    fn test_intern() {
        let mut store = NodeStore::default();
        let a = store.intern("abc");
        let b = store.intern("abc");

        assert_eq!(a, b);
        assert!(Arc::ptr_eq(store.text_buffer(a), store.text_buffer(b)));
        assert_ne!(store.intern("abd"), a);
    }

    #[test]
    fn test_truncate() {
        let mut store = NodeStore::default();
        let first = record(&mut store, NodeKind::EmptyList, RawPayload::EMPTY);
        let first = store.insert(first);
        let mark = store.mark();
        let payload = store.children_payload(&[first]);
        let second = record(&mut store, NodeKind::Tuple, payload);

        store.insert(second);
        store.truncate(mark);

        assert_eq!(store.len(), 1);
        assert_eq!(store.kind(first), NodeKind::EmptyList);
        assert_eq!(store.mark(), mark);
    }

    #[test]
    fn test_truncate_texts() {
        let mut store = NodeStore::default();
        let kept = store.intern("kept");
        let mark = store.mark();
        let dropped = store.intern("dropped");

        assert_ne!(dropped, kept);

        store.truncate(mark);

        assert_eq!(store.mark(), mark);
        assert_eq!(store.intern("kept"), kept);
        assert_eq!(store.text_buffer(kept).as_ref(), "kept");

        // The slot of the dropped text is reused.
        assert_eq!(store.intern("other"), dropped);
        assert_eq!(store.text_buffer(dropped).as_ref(), "other");
    }

    #[test]
    #[should_panic(expected = "invalid node handle")]
    fn test_invalid_handle() {
        let mut store = NodeStore::default();
        let node = record(&mut store, NodeKind::EmptyList, RawPayload::EMPTY);
        let node = store.insert(node);
        let mark = store.mark();

        store.truncate(super::Mark { nodes: 0, ..mark });
        store.get(node);
    }
}
