//! A single search-tree node, stored by value inside the arena.
//!
//! Visit/win counters are packed into one `AtomicU64` so a reader always
//! sees a matching (playouts, wins) pair rather than two counters updated by
//! different threads in different orders — the "atomic packed node
//! statistics" approach the concurrency design calls for in place of a
//! mutex per node.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::RwLock;

use crate::constants::{PRIOR_EVEN, VIRTUAL_LOSS_PLAYOUTS};
use crate::position::{Point, Position};

/// Arena index. `u32` keeps a node at 1/2 the size a `usize` index would
/// cost and caps a single search tree at 4B nodes, far past `max_tree_size`.
pub type NodeId = u32;

/// Sentinel meaning "no such node" (root's parent, an unset field).
pub const NIL: NodeId = u32::MAX;

fn pack(playouts: u32, wins: u32) -> u64 {
    ((playouts as u64) << 32) | wins as u64
}

fn unpack(word: u64) -> (u32, u32) {
    ((word >> 32) as u32, word as u32)
}

pub struct Node {
    /// Position at this node. Cloned from the parent plus one move; kept by
    /// value (not behind a pointer) so the arena holds the whole tree as a
    /// flat `Vec`, with no cycles to worry about.
    pub pos: Position,
    /// Move that produced this node from its parent (`PASS_MOVE` allowed).
    pub mv: Point,
    pub parent: NodeId,
    /// Packed (playouts, wins), wins counted for the side to move *at the
    /// parent* (i.e. a win for whoever chose this child).
    stats: AtomicU64,
    /// Prior (playouts, wins) seeded at expansion time, added to `stats`'
    /// effective totals when computing urgency/winrate but never touched
    /// again afterwards.
    pub prior_playouts: u32,
    pub prior_wins: u32,
    /// AMAF (all-moves-as-first) packed (playouts, wins).
    amaf: AtomicU64,
    /// Extra playouts subtracted from view while a worker holds this node
    /// on its descent path (tree-parallel coordination, `TM_TREE_VL`).
    virtual_loss: AtomicU32,
    /// Child arena indices, empty until expanded.
    pub children: RwLock<Vec<NodeId>>,
    /// Claimed by whichever worker wins the race to expand this node, so a
    /// second worker arriving at the same unexpanded leaf backs off instead
    /// of building a duplicate set of children.
    is_expanding: AtomicBool,
}

impl Node {
    pub fn new_root(pos: Position) -> Self {
        Node {
            pos,
            mv: crate::constants::PASS_MOVE,
            parent: NIL,
            stats: AtomicU64::new(0),
            prior_playouts: PRIOR_EVEN,
            prior_wins: PRIOR_EVEN / 2,
            amaf: AtomicU64::new(0),
            virtual_loss: AtomicU32::new(0),
            children: RwLock::new(Vec::new()),
            is_expanding: AtomicBool::new(false),
        }
    }

    pub fn new_child(pos: Position, mv: Point, parent: NodeId) -> Self {
        Node {
            pos,
            mv,
            parent,
            stats: AtomicU64::new(0),
            prior_playouts: PRIOR_EVEN,
            prior_wins: PRIOR_EVEN / 2,
            amaf: AtomicU64::new(0),
            virtual_loss: AtomicU32::new(0),
            children: RwLock::new(Vec::new()),
            is_expanding: AtomicBool::new(false),
        }
    }

    /// Seed this (not-yet-published) node's priors. Only valid before the
    /// node is linked into a parent's `children` list.
    pub fn set_prior(&mut self, playouts: u32, wins: u32) {
        self.prior_playouts = playouts;
        self.prior_wins = wins;
    }

    #[inline]
    pub fn playouts(&self) -> u32 {
        unpack(self.stats.load(Ordering::Acquire)).0
    }

    #[inline]
    pub fn wins(&self) -> u32 {
        unpack(self.stats.load(Ordering::Acquire)).1
    }

    #[inline]
    pub fn amaf_playouts(&self) -> u32 {
        unpack(self.amaf.load(Ordering::Acquire)).0
    }

    #[inline]
    pub fn amaf_wins(&self) -> u32 {
        unpack(self.amaf.load(Ordering::Acquire)).1
    }

    /// Winrate including priors, or a negative sentinel for a node with no
    /// real or prior visits (should not happen: every node is seeded with
    /// `PRIOR_EVEN`).
    pub fn winrate(&self) -> f64 {
        let (v, w) = unpack(self.stats.load(Ordering::Acquire));
        let total_v = v + self.prior_playouts;
        if total_v == 0 {
            return -0.1;
        }
        (w + self.prior_wins) as f64 / total_v as f64
    }

    /// Record one finished playout's result. `won` is from the perspective
    /// of whoever was to move at this node's parent (i.e. the player who
    /// chose `self.mv`).
    pub fn record(&self, won: bool) {
        loop {
            let old = self.stats.load(Ordering::Acquire);
            let (v, w) = unpack(old);
            let new = pack(v + 1, w + if won { 1 } else { 0 });
            if self
                .stats
                .compare_exchange_weak(old, new, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return;
            }
        }
    }

    pub fn record_amaf(&self, won: bool) {
        loop {
            let old = self.amaf.load(Ordering::Acquire);
            let (v, w) = unpack(old);
            let new = pack(v + 1, w + if won { 1 } else { 0 });
            if self
                .amaf
                .compare_exchange_weak(old, new, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return;
            }
        }
    }

    /// Fold another node's (playouts, wins) totals into this one's, for
    /// merging independently-grown root-parallel trees back into one.
    pub fn add_stats(&self, playouts: u32, wins: u32) {
        loop {
            let old = self.stats.load(Ordering::Acquire);
            let (v, w) = unpack(old);
            let new = pack(v + playouts, w + wins);
            if self.stats.compare_exchange_weak(old, new, Ordering::AcqRel, Ordering::Acquire).is_ok() {
                return;
            }
        }
    }

    pub fn add_amaf(&self, playouts: u32, wins: u32) {
        loop {
            let old = self.amaf.load(Ordering::Acquire);
            let (v, w) = unpack(old);
            let new = pack(v + playouts, w + wins);
            if self.amaf.compare_exchange_weak(old, new, Ordering::AcqRel, Ordering::Acquire).is_ok() {
                return;
            }
        }
    }

    /// Divide both real and AMAF (playouts, wins) by `k`, in place. Used by
    /// [`super::tree::Tree::normalize`] after merging `k` independent
    /// root-parallel trees into one, so the combined counts read as an
    /// average rather than a `k`-times-inflated sum.
    pub fn scale_down(&self, k: u32) {
        if k <= 1 {
            return;
        }
        loop {
            let old = self.stats.load(Ordering::Acquire);
            let (v, w) = unpack(old);
            let new = pack(v / k, w / k);
            if self.stats.compare_exchange_weak(old, new, Ordering::AcqRel, Ordering::Acquire).is_ok() {
                break;
            }
        }
        loop {
            let old = self.amaf.load(Ordering::Acquire);
            let (v, w) = unpack(old);
            let new = pack(v / k, w / k);
            if self.amaf.compare_exchange_weak(old, new, Ordering::AcqRel, Ordering::Acquire).is_ok() {
                break;
            }
        }
    }

    /// Apply one unit of virtual loss; call while descending, undo on the
    /// way back up via [`Node::undo_virtual_loss`].
    pub fn apply_virtual_loss(&self) {
        self.virtual_loss.fetch_add(VIRTUAL_LOSS_PLAYOUTS, Ordering::AcqRel);
    }

    pub fn undo_virtual_loss(&self) {
        self.virtual_loss.fetch_sub(VIRTUAL_LOSS_PLAYOUTS, Ordering::AcqRel);
    }

    pub fn virtual_loss(&self) -> u32 {
        self.virtual_loss.load(Ordering::Acquire)
    }

    pub fn is_expanded(&self) -> bool {
        !self.children.read().unwrap().is_empty()
    }

    /// Claim the right to expand this node. Returns `true` for exactly one
    /// caller among any racing to expand the same node; everyone else gets
    /// `false` and should back off rather than build a duplicate child set.
    pub fn try_begin_expand(&self) -> bool {
        self.is_expanding
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
