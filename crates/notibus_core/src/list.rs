//! Doubly linked handle list over borrowed notification records.
//!
//! # Responsibility
//! - Chain query results in order without owning the records.
//! - Support head/tail discovery by walking links, tail append, and removal
//!   by record identity.
//!
//! # Invariants
//! - Nodes own linkage only; every record is borrowed for `'a` and removing a
//!   node never drops its record.
//! - No head/tail pointer is stored; both are found by walking links.
//! - Freed node slots are recycled; a stale `NodeId` resolves to `None`.

use crate::model::noti::Notification;

/// Handle to one node of a [`NotiList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy)]
struct Node<'a> {
    prev: Option<NodeId>,
    next: Option<NodeId>,
    record: &'a Notification,
}

/// Arena of linked nodes referencing records owned elsewhere.
#[derive(Debug, Default)]
pub struct NotiList<'a> {
    slots: Vec<Option<Node<'a>>>,
    free: Vec<usize>,
}

impl<'a> NotiList<'a> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Builds a list chaining `records` in slice order.
    pub fn from_records(records: &'a [Notification]) -> Self {
        let mut list = Self::new();
        for record in records {
            list.append(record);
        }
        list
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.any_node().is_none()
    }

    /// Walks `prev` links from `from` to the first node.
    pub fn get_head(&self, from: NodeId) -> Option<NodeId> {
        let mut current = from;
        self.node(current)?;
        while let Some(prev) = self.node(current).and_then(|node| node.prev) {
            current = prev;
        }
        Some(current)
    }

    /// Walks `next` links from `from` to the last node.
    pub fn get_tail(&self, from: NodeId) -> Option<NodeId> {
        let mut current = from;
        self.node(current)?;
        while let Some(next) = self.node(current).and_then(|node| node.next) {
            current = next;
        }
        Some(current)
    }

    /// First node of the list, if any.
    pub fn head(&self) -> Option<NodeId> {
        self.get_head(self.any_node()?)
    }

    pub fn tail(&self) -> Option<NodeId> {
        self.get_tail(self.any_node()?)
    }

    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.prev
    }

    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.next
    }

    pub fn record(&self, id: NodeId) -> Option<&'a Notification> {
        self.node(id).map(|node| node.record)
    }

    /// Splices a new node after the current tail and returns the new node.
    ///
    /// Callers needing the head must re-derive it with [`NotiList::head`].
    pub fn append(&mut self, record: &'a Notification) -> NodeId {
        let tail = self.tail();
        let id = self.allocate(Node {
            prev: tail,
            next: None,
            record,
        });
        if let Some(tail) = tail {
            if let Some(node) = self.node_mut(tail) {
                node.next = Some(id);
            }
        }
        id
    }

    /// Unlinks the node holding `record` (matched by identity).
    ///
    /// Returns the head of the remaining list when the removed node had a
    /// predecessor, else its successor, else `None`. When `record` is not in
    /// the list the current head is returned unchanged.
    pub fn remove(&mut self, record: &Notification) -> Option<NodeId> {
        let Some(target) = self.find(record) else {
            return self.head();
        };
        let Some(removed) = self.slots[target.0].take() else {
            return self.head();
        };
        self.free.push(target.0);

        if let Some(prev) = removed.prev {
            if let Some(node) = self.node_mut(prev) {
                node.next = removed.next;
            }
        }
        if let Some(next) = removed.next {
            if let Some(node) = self.node_mut(next) {
                node.prev = removed.prev;
            }
        }

        match (removed.prev, removed.next) {
            (Some(prev), _) => self.get_head(prev),
            (None, Some(next)) => Some(next),
            (None, None) => None,
        }
    }

    /// Node holding `record`, scanning from the head.
    pub fn find(&self, record: &Notification) -> Option<NodeId> {
        self.iter_nodes()
            .find(|(_, candidate)| std::ptr::eq(*candidate, record))
            .map(|(id, _)| id)
    }

    /// Records from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &'a Notification> + '_ {
        self.iter_nodes().map(|(_, record)| record)
    }

    fn iter_nodes(&self) -> impl Iterator<Item = (NodeId, &'a Notification)> + '_ {
        let mut cursor = self.head();
        std::iter::from_fn(move || {
            let id = cursor?;
            let node = self.node(id)?;
            cursor = node.next;
            Some((id, node.record))
        })
    }

    fn any_node(&self) -> Option<NodeId> {
        self.slots
            .iter()
            .position(Option::is_some)
            .map(NodeId)
    }

    fn node(&self, id: NodeId) -> Option<&Node<'a>> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<'a>> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    fn allocate(&mut self, node: Node<'a>) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NotiList;
    use crate::config::ProcessIdentity;
    use crate::model::noti::{NotiType, Notification};

    fn records(count: usize) -> Vec<Notification> {
        let identity = ProcessIdentity::new("org.example.list", 0);
        (0..count)
            .map(|index| {
                let mut noti = Notification::new(NotiType::Transient, &identity);
                noti.set_tag(Some(&format!("n{index}")));
                noti
            })
            .collect()
    }

    fn tags(list: &NotiList<'_>) -> Vec<String> {
        list.iter()
            .map(|noti| noti.tag().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn append_returns_new_node_not_head() {
        let items = records(2);
        let mut list = NotiList::new();
        let first = list.append(&items[0]);
        let second = list.append(&items[1]);
        assert_ne!(first, second);
        assert_eq!(list.get_head(second), Some(first));
        assert_eq!(list.get_tail(first), Some(second));
    }

    #[test]
    fn remove_middle_keeps_chain_intact_both_ways() {
        let items = records(3);
        let mut list = NotiList::from_records(&items);
        let head = list.remove(&items[1]).unwrap();
        assert_eq!(tags(&list), vec!["n0", "n2"]);
        assert_eq!(Some(head), list.head());

        let tail = list.tail().unwrap();
        assert_eq!(list.record(tail).unwrap().tag(), Some("n2"));
        assert_eq!(list.prev(tail), list.head());
        assert!(list.find(&items[1]).is_none());
        // The removed record is still owned and usable by the caller.
        assert_eq!(items[1].tag(), Some("n1"));
    }

    #[test]
    fn remove_head_returns_successor_and_last_returns_none() {
        let items = records(2);
        let mut list = NotiList::from_records(&items);
        let next = list.remove(&items[0]).unwrap();
        assert_eq!(list.record(next).unwrap().tag(), Some("n1"));
        assert_eq!(list.remove(&items[1]), None);
        assert!(list.is_empty());
    }

    #[test]
    fn identity_not_equality_selects_the_node() {
        let items = records(1);
        let twin = items[0].clone();
        let mut list = NotiList::from_records(&items);
        list.remove(&twin);
        assert_eq!(list.len(), 1);
    }
}
