//! Search controller: owns the tree, spawns workers, decides when to stop,
//! and turns the result into a move (or a resignation).
//!
//! Three thread models, matching Pachi's `uct/uct.c`:
//! - `Root`: each worker grows its own independent tree; the controller
//!   merges their root-level statistics once every worker has stopped.
//! - `Tree`: all workers share one tree with no virtual loss, relying on
//!   the atomic packed stats to stay consistent under concurrent updates.
//! - `TreeVirtualLoss` (default): like `Tree`, plus virtual loss while a
//!   worker holds a path, so workers spread out across the tree instead of
//!   piling onto the current single most-urgent line.

use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::constants::{
    CONTROLLER_POLL_INTERVAL_MS, EARLY_STOP_PLAYOUTS_HI, EARLY_STOP_PLAYOUTS_LO,
    EARLY_STOP_VALUE_LO, GJ_MINGAMES, LOSS_THRESHOLD, PASS_MOVE, RESIGN_MOVE, RESIGN_RATIO,
    WINNER_LCB_C,
};
use crate::ownermap::Ownermap;
use crate::playout::EloPolicy;
use crate::position::{Point, Position};

use super::node::{Node, NodeId};
use super::selection::{SelectionPolicy, Ucb1Amaf};
use super::time_control::{Allocation, ClockState, TimeControl};
use super::tree::Tree;
use super::worker::{self, WorkerContext};

/// A move's search budget: either a wall-clock allocation or a fixed
/// playout count. Distinct dimensions, matching `uct.c`'s `TD_WALLTIME`
/// versus `TD_GAMES` - under a playout-count budget, search runs until the
/// count is reached and does not wait on the `choose() == winner()`
/// convergence check (`desired_playouts == worst_playouts` in the original).
#[derive(Debug, Clone, Copy)]
pub enum Budget {
    Wall(Allocation),
    Playouts(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadModel {
    Root,
    Tree,
    TreeVirtualLoss,
}

pub struct SearchConfig {
    pub threads: usize,
    pub thread_model: ThreadModel,
    pub resign_ratio: f32,
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            threads: crate::constants::DEFAULT_THREADS,
            thread_model: ThreadModel::TreeVirtualLoss,
            resign_ratio: RESIGN_RATIO,
            seed: 1,
        }
    }
}

pub struct SearchController {
    pub tree: Arc<Tree>,
    pub ownermap: Arc<Ownermap>,
    pub policy: Arc<EloPolicy>,
    pub config: SearchConfig,
    time_control: TimeControl,
}

impl SearchController {
    pub fn new(pos: Position, config: SearchConfig) -> Self {
        SearchController {
            tree: Arc::new(Tree::new(pos)),
            ownermap: Arc::new(Ownermap::new()),
            policy: Arc::new(EloPolicy::default()),
            config,
            time_control: TimeControl::default(),
        }
    }

    /// Re-root the tree on the move actually played (own or opponent's),
    /// so the next search reuses whatever statistics survive.
    pub fn notify_play(&self, mv: Point, resulting_pos: &Position) {
        self.tree.promote(mv, resulting_pos);
    }

    /// Run search until `allocation.worst` elapses or an early-stop
    /// shortcut fires, then return the move to play (or `RESIGN_MOVE`).
    pub fn genmove(&self, clock: &ClockState) -> Point {
        let move_number = self.tree.root_pos().n;
        let allocation = self.time_control.allocate(clock, move_number);
        self.search(Budget::Wall(allocation))
    }

    /// Run search for a fixed number of playouts rather than a wall-clock
    /// budget (`uct.c`'s `TD_GAMES`). Useful for deterministic,
    /// same-seed-same-result regression testing at `threads == 1`.
    pub fn genmove_playouts(&self, count: u64) -> Point {
        self.search(Budget::Playouts(count))
    }

    pub fn search(&self, budget: Budget) -> Point {
        match self.config.thread_model {
            ThreadModel::Root => self.search_root(budget),
            ThreadModel::Tree | ThreadModel::TreeVirtualLoss => self.search_shared(budget),
        }
    }

    /// `Tree`/`TreeVirtualLoss`: every worker shares `self.tree` directly,
    /// with virtual loss applied only under `TreeVirtualLoss`.
    fn search_shared(&self, budget: Budget) -> Point {
        let stop = Arc::new(AtomicBool::new(false));
        let playouts_done = Arc::new(AtomicU64::new(0));
        let selection: Arc<dyn SelectionPolicy> = Arc::new(Ucb1Amaf::default());
        let use_virtual_loss = self.config.thread_model == ThreadModel::TreeVirtualLoss;

        let handles: Vec<_> = (0..self.config.threads.max(1))
            .map(|worker_index| {
                let ctx = WorkerContext {
                    tree: Arc::clone(&self.tree),
                    policy: Arc::clone(&self.policy),
                    selection: Arc::clone(&selection),
                    ownermap: Arc::clone(&self.ownermap),
                    stop: Arc::clone(&stop),
                    playouts_done: Arc::clone(&playouts_done),
                    worker_index,
                    seed: self.config.seed,
                    use_virtual_loss,
                };
                thread::spawn(move || worker::run(ctx))
            })
            .collect();

        self.wait_for_budget(&budget, &stop, &playouts_done, true);

        for handle in handles {
            let _ = handle.join();
        }

        self.best_move_or_resign()
    }

    /// `Root`: each worker grows its own independent tree copy with no
    /// virtual loss (there is nothing shared to discourage collisions on);
    /// once every worker has joined, their trees are folded into
    /// `self.tree` via `merge` and rescaled via `normalize`, matching
    /// `spawn_thread_manager`'s non-shared-tree path.
    fn search_root(&self, budget: Budget) -> Point {
        let n_threads = self.config.threads.max(1);
        let stop = Arc::new(AtomicBool::new(false));
        let playouts_done = Arc::new(AtomicU64::new(0));
        let root_pos = self.tree.root_pos();

        let worker_trees: Vec<Arc<Tree>> =
            (0..n_threads).map(|_| Arc::new(Tree::new(root_pos.copy()))).collect();

        let handles: Vec<_> = worker_trees
            .iter()
            .cloned()
            .enumerate()
            .map(|(worker_index, tree)| {
                let ctx = WorkerContext {
                    tree,
                    policy: Arc::clone(&self.policy),
                    selection: Arc::new(Ucb1Amaf::default()) as Arc<dyn SelectionPolicy>,
                    ownermap: Arc::clone(&self.ownermap),
                    stop: Arc::clone(&stop),
                    playouts_done: Arc::clone(&playouts_done),
                    worker_index,
                    seed: self.config.seed,
                    use_virtual_loss: false,
                };
                thread::spawn(move || worker::run(ctx))
            })
            .collect();

        // No shared tree exists yet to check `choose() == winner()`
        // convergence against mid-search, so root-parallel search only
        // honors the wall-clock/playout budget itself, not the early-stop
        // shortcuts (see DESIGN.md).
        self.wait_for_budget(&budget, &stop, &playouts_done, false);

        for handle in handles {
            let _ = handle.join();
        }

        for tree in &worker_trees {
            self.tree.merge(tree);
        }
        self.tree.normalize(n_threads as u32);

        self.best_move_or_resign()
    }

    /// Block until `budget` is exhausted. Under a wall-clock budget with
    /// `check_convergence`, also stops early once an early-stop shortcut
    /// fires, or once `choose() == winner()` past the desired deadline.
    fn wait_for_budget(
        &self,
        budget: &Budget,
        stop: &Arc<AtomicBool>,
        playouts_done: &Arc<AtomicU64>,
        check_convergence: bool,
    ) {
        let start = Instant::now();
        loop {
            thread::sleep(Duration::from_millis(CONTROLLER_POLL_INTERVAL_MS));

            match budget {
                Budget::Playouts(target) => {
                    if playouts_done.load(Ordering::Relaxed) >= *target {
                        break;
                    }
                }
                Budget::Wall(allocation) => {
                    let elapsed = start.elapsed();
                    if elapsed >= allocation.worst {
                        break;
                    }
                    if check_convergence {
                        if self.early_stop_shortcut() {
                            break;
                        }
                        if elapsed >= allocation.desired && self.converged() {
                            break;
                        }
                    } else if elapsed >= allocation.desired {
                        break;
                    }
                }
            }
        }
        stop.store(true, Ordering::Relaxed);
    }

    /// Stop immediately once the best move has clearly decided the game,
    /// Pachi's `uct.c` shortcuts ported verbatim: 2000 playouts at 0.85,
    /// or 500 playouts at 0.95.
    fn early_stop_shortcut(&self) -> bool {
        let Some(id) = self.choose() else { return false };
        let nodes = self.tree.arena.read();
        let node = &nodes[id as usize];
        let playouts = node.playouts();
        let value = node.winrate() as f32;
        (playouts >= EARLY_STOP_PLAYOUTS_HI && value >= LOSS_THRESHOLD)
            || (playouts >= EARLY_STOP_PLAYOUTS_LO && value >= EARLY_STOP_VALUE_LO)
    }

    /// Most-robust child: highest playouts, ties broken by higher value,
    /// then by lowest coordinate index - an explicit total order rather
    /// than relying on `Iterator::max_by_key`'s unspecified tie behavior.
    fn choose(&self) -> Option<NodeId> {
        let root = self.tree.root();
        let nodes = self.tree.arena.read();
        let children = nodes[root as usize].children.read().unwrap().clone();
        children.into_iter().max_by(|&a, &b| Self::choose_ordering(&nodes[..], a, b))
    }

    fn choose_ordering(nodes: &[Node], a: NodeId, b: NodeId) -> CmpOrdering {
        let na = &nodes[a as usize];
        let nb = &nodes[b as usize];
        na.playouts()
            .cmp(&nb.playouts())
            .then_with(|| na.winrate().partial_cmp(&nb.winrate()).unwrap_or(CmpOrdering::Equal))
            .then_with(|| nb.mv.cmp(&na.mv))
    }

    /// Highest lower-confidence-bound-on-value child, used only as a
    /// convergence check against `choose()` (`uct_search`'s `best == winner`
    /// break condition) - not a move-selection criterion on its own.
    fn winner(&self) -> Option<NodeId> {
        let root = self.tree.root();
        let nodes = self.tree.arena.read();
        let children = nodes[root as usize].children.read().unwrap().clone();
        children.into_iter().max_by(|&a, &b| Self::winner_ordering(&nodes[..], a, b))
    }

    fn lcb(node: &Node) -> f64 {
        let playouts = node.playouts() as f64;
        node.winrate() - WINNER_LCB_C / (playouts + 1.0).sqrt()
    }

    fn winner_ordering(nodes: &[Node], a: NodeId, b: NodeId) -> CmpOrdering {
        Self::lcb(&nodes[a as usize])
            .partial_cmp(&Self::lcb(&nodes[b as usize]))
            .unwrap_or(CmpOrdering::Equal)
            .then_with(|| nodes[b as usize].mv.cmp(&nodes[a as usize].mv))
    }

    /// Search has converged once the most-robust and most-confident
    /// children agree, matching `uct_search`'s `best == winner` stop rule.
    fn converged(&self) -> bool {
        matches!((self.choose(), self.winner()), (Some(a), Some(b)) if a == b)
    }

    fn best_move_or_resign(&self) -> Point {
        let Some(best_id) = self.choose() else { return PASS_MOVE };
        let nodes = self.tree.arena.read();
        let best_node = &nodes[best_id as usize];

        if best_node.mv != PASS_MOVE
            && best_node.playouts() > GJ_MINGAMES
            && (best_node.winrate() as f32) < self.config.resign_ratio
        {
            return RESIGN_MOVE;
        }

        best_node.mv
    }
}
