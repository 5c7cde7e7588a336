//! The search tree: an [`Arena`] plus a root pointer, with promotion
//! (re-rooting on the move actually played) and a save/load format for
//! persisting a tree across processes.

use std::io::{BufRead, BufReader, Write};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::EngineError;
use crate::position::{Point, Position};

use super::arena::Arena;
use super::node::{Node, NodeId, NIL};
use super::prior::{candidate_moves, compute_cfg_distances, prior_for_move};
use crate::playout::EloPolicy;

pub struct Tree {
    pub arena: Arena,
    root: AtomicU32,
}

impl Tree {
    pub fn new(pos: Position) -> Self {
        let arena = Arena::new();
        let root = arena.insert(Node::new_root(pos));
        Tree { arena, root: AtomicU32::new(root) }
    }

    pub fn root(&self) -> NodeId {
        self.root.load(Ordering::Acquire)
    }

    pub fn root_pos(&self) -> Position {
        self.arena.read()[self.root() as usize].pos.copy()
    }

    /// Expand `node` (already known unexpanded) into one child per legal
    /// move, seeding each child's prior via `policy`. A no-argument pass is
    /// always offered, even when other moves exist, matching Go's rules.
    pub fn expand(&self, node: NodeId, policy: &EloPolicy) {
        let parent_pos = {
            let nodes = self.arena.read();
            let n = &nodes[node as usize];
            // Check-then-claim under the same read guard: `is_expanded` is
            // final once true (children are only ever appended, never
            // cleared while live), and `try_begin_expand` is the single CAS
            // that admits only one winner among concurrent callers, so at
            // most one worker ever builds this node's children.
            if n.is_expanded() || !n.try_begin_expand() {
                return;
            }
            n.pos.copy()
        };

        let cfg_map = if parent_pos.last != crate::constants::PASS_MOVE {
            Some(compute_cfg_distances(&parent_pos, parent_pos.last))
        } else {
            None
        };
        let candidates = candidate_moves(&parent_pos);

        let mut new_children = Vec::with_capacity(candidates.len() + 1);
        for &pt in &candidates {
            let mut child_pos = parent_pos.copy();
            if crate::position::play_move(&mut child_pos, pt).is_ok() {
                let prior = prior_for_move(policy, &parent_pos, &child_pos, pt, &cfg_map, &candidates);
                let mut child = Node::new_child(child_pos, pt, node);
                child.set_prior(prior.playouts, prior.wins);
                new_children.push(self.arena.insert(child));
            }
        }

        if new_children.is_empty() {
            let mut pass_pos = parent_pos.copy();
            crate::position::pass_move(&mut pass_pos);
            new_children.push(self.arena.insert(Node::new_child(pass_pos, crate::constants::PASS_MOVE, node)));
        }

        for &child in &new_children {
            self.arena.attach_child(node, child);
        }
    }

    /// Re-root the tree on the child reached by playing `mv` at the root,
    /// discarding every sibling subtree. If `mv` has no matching child
    /// (the opponent played something the tree never explored, or the
    /// caller is resetting after an `undo`), start a fresh root from
    /// `fallback_pos`.
    pub fn promote(&self, mv: Point, fallback_pos: &Position) {
        let old_root = self.root();
        let children = self.arena.children_of(old_root);
        let mut matched = None;
        for &child in &children {
            if self.arena.mv_of(child) == mv {
                matched = Some(child);
            } else {
                self.arena.free_subtree(child);
            }
        }

        match matched {
            Some(new_root) => {
                self.root.store(new_root, Ordering::Release);
            }
            None => {
                let fresh = self.arena.insert(Node::new_root(fallback_pos.copy()));
                self.root.store(fresh, Ordering::Release);
            }
        }
        // `old_root`'s children have all been freed or promoted; its own
        // slot is now a childless shell with no incoming references, so it
        // can be returned to the free list too.
        self.arena.free_subtree(old_root);
    }

    /// Save the tree to a simple line-oriented text format: one line per
    /// node, `id parent mv playouts wins prior_playouts prior_wins`,
    /// children implied by each node's `parent` field, in insertion order
    /// so a reader can rebuild indices by replaying lines in order.
    pub fn save(&self, path: &std::path::Path) -> Result<(), EngineError> {
        let nodes = self.arena.read();
        let mut out = std::fs::File::create(path).map_err(EngineError::Io)?;
        writeln!(out, "# moyo-tree v1 root={}", self.root()).map_err(EngineError::Io)?;
        for (id, node) in nodes.iter().enumerate() {
            writeln!(
                out,
                "{} {} {} {} {} {} {}",
                id,
                node.parent,
                node.mv,
                node.playouts(),
                node.wins(),
                node.prior_playouts,
                node.prior_wins,
            )
            .map_err(EngineError::Io)?;
        }
        Ok(())
    }

    /// Load a tree previously written by [`Tree::save`]. The root position
    /// must be supplied separately (the file does not store full board
    /// state per node, only the move that produced it; walking from the
    /// stored root down via `mv` reconstructs every descendant's position).
    pub fn load(path: &std::path::Path, root_pos: Position) -> Result<Tree, EngineError> {
        let file = std::fs::File::open(path).map_err(EngineError::Io)?;
        let mut lines = BufReader::new(file).lines();

        let header = lines
            .next()
            .ok_or_else(|| EngineError::Protocol("empty tree file".into()))?
            .map_err(EngineError::Io)?;
        let declared_root: NodeId = header
            .rsplit('=')
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| EngineError::Protocol("malformed tree file header".into()))?;

        let tree = Tree::new(root_pos);
        // Rebuild by replaying moves from the stored root downward; since
        // node ids were written in insertion (i.e. parent-before-child)
        // order, a single forward pass suffices.
        let mut id_map = std::collections::HashMap::new();
        id_map.insert(0u32, tree.root());

        for line in lines {
            let line = line.map_err(EngineError::Io)?;
            let mut parts = line.split_whitespace();
            let old_id: NodeId = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| EngineError::Protocol("malformed tree file row".into()))?;
            let old_parent: NodeId = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| EngineError::Protocol("malformed tree file row".into()))?;
            let mv: Point = parts
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| EngineError::Protocol("malformed tree file row".into()))?;
            let playouts: u32 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
            let wins: u32 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
            let prior_playouts: u32 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
            let prior_wins: u32 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);

            if old_id == declared_root {
                continue; // root already created by Tree::new
            }
            let Some(&new_parent) = id_map.get(&old_parent) else {
                continue; // orphan row, skip
            };

            let parent_pos = tree.arena.read()[new_parent as usize].pos.copy();
            let mut child_pos = parent_pos;
            if mv == crate::constants::PASS_MOVE {
                crate::position::pass_move(&mut child_pos);
            } else if crate::position::play_move(&mut child_pos, mv).is_err() {
                continue;
            }
            let mut child = Node::new_child(child_pos, mv, new_parent);
            child.set_prior(prior_playouts, prior_wins);
            let new_id = tree.arena.insert(child);
            // Replay the saved playout/win counts as real records so a
            // loaded tree resumes with the same statistics it was saved
            // with, not just its priors.
            for _ in 0..wins {
                tree.arena.read()[new_id as usize].record(true);
            }
            for _ in 0..(playouts.saturating_sub(wins)) {
                tree.arena.read()[new_id as usize].record(false);
            }
            tree.arena.attach_child(new_parent, new_id);
            id_map.insert(old_id, new_id);
        }

        Ok(tree)
    }

    /// Fold `other`'s statistics into `self`, node-for-node, matching
    /// children by the move that produced them. Used by root-parallel
    /// search (`ThreadModel::Root`) to combine the independent trees grown
    /// by each worker into the shared root tree once every worker has
    /// joined, mirroring `spawn_thread_manager`'s `tree_merge` call.
    pub fn merge(&self, other: &Tree) {
        self.merge_node(self.root(), other, other.root());
    }

    fn merge_node(&self, dest: NodeId, other: &Tree, src: NodeId) {
        {
            let dest_nodes = self.arena.read();
            let src_nodes = other.arena.read();
            let dest_node = &dest_nodes[dest as usize];
            let src_node = &src_nodes[src as usize];
            dest_node.add_stats(src_node.playouts(), src_node.wins());
            dest_node.add_amaf(src_node.amaf_playouts(), src_node.amaf_wins());
        }

        let dest_children = self.arena.children_of(dest);
        let src_children = other.arena.children_of(src);
        for &dchild in &dest_children {
            let mv = self.arena.mv_of(dchild);
            if let Some(&schild) = src_children.iter().find(|&&c| other.arena.mv_of(c) == mv) {
                self.merge_node(dchild, other, schild);
            }
        }
    }

    /// Divide every node's statistics by `k`, in place. Called once after
    /// `k` independent root-parallel trees have all been folded in via
    /// [`Tree::merge`], so the combined counts read as an average of `k`
    /// searches rather than a `k`-times-inflated sum (`tree_normalize`).
    pub fn normalize(&self, k: u32) {
        for node in self.arena.read().iter() {
            node.scale_down(k);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_offers_pass_alongside_other_moves() {
        let tree = Tree::new(Position::new());
        let policy = EloPolicy::default();
        tree.expand(tree.root(), &policy);

        let children = tree.arena.children_of(tree.root());
        assert!(!children.is_empty());
        assert!(children.iter().any(|&c| tree.arena.mv_of(c) == crate::constants::PASS_MOVE));
    }

    #[test]
    fn expand_is_idempotent_under_repeated_calls() {
        // Simulates two workers racing to expand the same leaf: the second
        // call must see `is_expanded() == true` and back off rather than
        // append a duplicate set of children.
        let tree = Tree::new(Position::new());
        let policy = EloPolicy::default();
        tree.expand(tree.root(), &policy);
        let first_count = tree.arena.children_of(tree.root()).len();

        tree.expand(tree.root(), &policy);
        assert_eq!(tree.arena.children_of(tree.root()).len(), first_count);
    }

    #[test]
    fn merge_sums_matching_children_then_normalize_averages() {
        let dest = Tree::new(Position::new());
        let policy = EloPolicy::default();
        dest.expand(dest.root(), &policy);

        let src = Tree::new(Position::new());
        src.expand(src.root(), &policy);

        let dest_child = dest.arena.children_of(dest.root())[0];
        let src_child = src
            .arena
            .children_of(src.root())
            .into_iter()
            .find(|&c| src.arena.mv_of(c) == dest.arena.mv_of(dest_child))
            .unwrap();

        dest.arena.read()[dest_child as usize].add_stats(10, 6);
        src.arena.read()[src_child as usize].add_stats(4, 1);

        dest.merge(&src);
        assert_eq!(dest.arena.read()[dest_child as usize].playouts(), 14);
        assert_eq!(dest.arena.read()[dest_child as usize].wins(), 7);

        dest.normalize(2);
        assert_eq!(dest.arena.read()[dest_child as usize].playouts(), 7);
        assert_eq!(dest.arena.read()[dest_child as usize].wins(), 3);
    }
}
