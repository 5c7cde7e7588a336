//! Flat arena-of-indices backing the search tree.
//!
//! Nodes live in one `RwLock<Vec<Node>>`; children reference each other by
//! `NodeId` rather than by pointer, so there are no `Rc`/`Box` cycles to
//! break on drop and no `unsafe` aliasing between worker threads. Freed
//! subtrees (discarded siblings after a tree promotion) return their slots
//! to a free list instead of shrinking the vector, so a long-running search
//! never needs to reallocate once it plateaus near `max_tree_size`.

use std::sync::{Mutex, RwLock, RwLockReadGuard};

use crate::position::Point;

use super::node::{Node, NodeId, NIL};

pub struct Arena {
    nodes: RwLock<Vec<Node>>,
    free: Mutex<Vec<NodeId>>,
}

impl Arena {
    pub fn new() -> Self {
        Arena { nodes: RwLock::new(Vec::new()), free: Mutex::new(Vec::new()) }
    }

    /// Number of live (non-freed) node slots currently allocated.
    pub fn capacity(&self) -> usize {
        self.nodes.read().unwrap().len()
    }

    /// Insert `node`, reusing a freed slot if one is available.
    pub fn insert(&self, node: Node) -> NodeId {
        if let Some(id) = self.free.lock().unwrap().pop() {
            let mut nodes = self.nodes.write().unwrap();
            nodes[id as usize] = node;
            return id;
        }
        let mut nodes = self.nodes.write().unwrap();
        let id = nodes.len() as NodeId;
        nodes.push(node);
        id
    }

    /// Borrow the whole node table, for callers that need to look at more
    /// than one node without repeatedly acquiring the lock (e.g. selection,
    /// which reads every child of the node being descended).
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<Node>> {
        self.nodes.read().unwrap()
    }

    pub fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.read()[id as usize].children.read().unwrap().clone()
    }

    /// Link `child` under `parent`'s children list. Call once, right after
    /// `insert`, before the id is visible to any other thread's read of
    /// `parent`'s children.
    pub fn attach_child(&self, parent: NodeId, child: NodeId) {
        self.read()[parent as usize].children.write().unwrap().push(child);
    }

    pub fn mv_of(&self, id: NodeId) -> Point {
        self.read()[id as usize].mv
    }

    /// Recursively return `id` and every descendant's slot to the free
    /// list, without touching `id`'s own parent pointer (the caller is
    /// expected to have already unlinked it from its parent's children).
    pub fn free_subtree(&self, id: NodeId) {
        if id == NIL {
            return;
        }
        let children = self.children_of(id);
        for child in children {
            self.free_subtree(child);
        }
        {
            let nodes = self.read();
            nodes[id as usize].children.write().unwrap().clear();
        }
        self.free.lock().unwrap().push(id);
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn insert_reuses_freed_slots() {
        let arena = Arena::new();
        let root = arena.insert(Node::new_root(Position::new()));
        let child = arena.insert(Node::new_child(Position::new(), 1, root));
        arena.attach_child(root, child);
        assert_eq!(arena.children_of(root), vec![child]);

        arena.free_subtree(child);
        let cap_before = arena.capacity();
        let reused = arena.insert(Node::new_child(Position::new(), 2, root));
        assert_eq!(reused, child);
        assert_eq!(arena.capacity(), cap_before);
    }
}
