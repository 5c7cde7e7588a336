//! One worker's descend → expand → playout → backpropagate cycle.
//!
//! Shaped after a `predict_worker`/`ThreadContext` loop (probe the tree,
//! evaluate, insert, repeat until told to stop), but rebuilt on the safe
//! arena-of-indices `Tree` instead of an `Arc<UnsafeCell<Node>>` raw
//! pointer, favoring an arena over a pointer-chasing tree that would
//! otherwise need `unsafe` to share across threads.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::constants::EXPAND_VISITS;
use crate::ownermap::Ownermap;
use crate::playout::{mcplayout, EloPolicy};
use crate::position::PASS_MOVE;

use super::node::NodeId;
use super::selection::{most_urgent, SelectionPolicy};
use super::tree::Tree;

/// Shared state one worker thread needs; cheap to clone (everything behind
/// an `Arc`).
pub struct WorkerContext {
    pub tree: Arc<Tree>,
    pub policy: Arc<EloPolicy>,
    pub selection: Arc<dyn SelectionPolicy>,
    pub ownermap: Arc<Ownermap>,
    pub stop: Arc<AtomicBool>,
    pub playouts_done: Arc<AtomicU64>,
    pub worker_index: usize,
    pub seed: u64,
    /// Whether to apply/undo virtual loss while descending (`TM_TREE_VL`
    /// only - off for `TM_TREE`'s plain shared-tree descent and for
    /// `TM_ROOT`'s independent per-worker trees, which have no sibling
    /// workers to discourage from the same branch).
    pub use_virtual_loss: bool,
}

/// Descend from the root to a leaf, applying virtual loss along the way,
/// expanding nodes that have crossed `EXPAND_VISITS`, then run one playout
/// and backpropagate its result. Runs until `ctx.stop` is set.
pub fn run(ctx: WorkerContext) {
    crate::rng::seed(crate::rng::worker_seed(ctx.seed, ctx.worker_index));

    while !ctx.stop.load(Ordering::Relaxed) {
        play_one(&ctx);
        ctx.playouts_done.fetch_add(1, Ordering::Relaxed);
    }
}

fn play_one(ctx: &WorkerContext) {
    let tree = &ctx.tree;
    if !tree.arena.read()[tree.root() as usize].is_expanded() {
        tree.expand(tree.root(), &ctx.policy);
    }

    let mut path = vec![tree.root()];
    let mut passes_in_a_row = 0;

    loop {
        let current = *path.last().unwrap();
        if ctx.use_virtual_loss {
            let nodes = tree.arena.read();
            nodes[current as usize].apply_virtual_loss();
        }

        if tree.arena.children_of(current).is_empty() || passes_in_a_row >= 2 {
            break;
        }

        let Some(child) = most_urgent(&tree.arena, current, ctx.selection.as_ref()) else {
            break;
        };

        let mv = tree.arena.mv_of(child);
        passes_in_a_row = if mv == PASS_MOVE { passes_in_a_row + 1 } else { 0 };
        path.push(child);

        let should_expand = {
            let nodes = tree.arena.read();
            let node = &nodes[child as usize];
            !node.is_expanded() && node.playouts() >= EXPAND_VISITS
        };
        if should_expand {
            tree.expand(child, &ctx.policy);
        }
    }

    let leaf = *path.last().unwrap();
    let mut leaf_pos = tree.arena.read()[leaf as usize].pos.copy();
    let leaf_to_move_parity = leaf_pos.n % 2;

    let mut amaf_map = vec![0i8; leaf_pos.color.len()];
    let result = mcplayout(&mut leaf_pos, &ctx.policy, Some(&mut amaf_map), Some(&ctx.ownermap));

    backpropagate(ctx, &path, leaf_to_move_parity, result.value, &amaf_map);
}

/// Walk the recorded descent path bottom-up, undoing virtual loss and
/// recording the playout's result (and AMAF updates among siblings) at
/// every level, alternating perspective one ply at a time.
fn backpropagate(ctx: &WorkerContext, path: &[NodeId], leaf_parity: usize, value_at_leaf: f64, amaf_map: &[i8]) {
    let nodes = ctx.tree.arena.read();

    // `value_at_leaf` is from the perspective of the side to move at the
    // leaf; back it up one ply at a time, flipping sign each step, and
    // remove the virtual loss this worker applied on the way down.
    let mut value = value_at_leaf;
    for (depth, &id) in path.iter().enumerate().rev() {
        let node = &nodes[id as usize];
        if ctx.use_virtual_loss {
            node.undo_virtual_loss();
        }
        node.record(value > 0.0);

        if depth > 0 {
            let parent = path[depth - 1];
            let parent_node = &nodes[parent as usize];
            let parent_parity = (leaf_parity + (path.len() - depth)) % 2;
            let amaf_color = if parent_parity == 0 { 1i8 } else { -1i8 };
            for &sibling in parent_node.children.read().unwrap().iter() {
                let mv = nodes[sibling as usize].mv;
                if mv != PASS_MOVE && amaf_map[mv] == amaf_color {
                    nodes[sibling as usize].record_amaf(value > 0.0);
                }
            }
        }

        value = -value;
    }
}
