//! Prior seeder: turns heuristic signal about a candidate move into initial
//! (playouts, wins) counts for its not-yet-visited child node, so search
//! starts exploring promising moves first rather than uniformly.
//!
//! Ported from `apply_priors`/`compute_cfg_distances`, with the
//! large-pattern prior driven by [`EloPolicy::assess`] against the
//! `PatternMatcher` capability rather than a free function.

use crate::constants::{
    BOARD_IMAX, BOARD_IMIN, BOARDSIZE, EMPTY, N, OUT, PRIOR_CAPTURE_MANY, PRIOR_CAPTURE_ONE,
    PRIOR_CFG, PRIOR_EMPTYAREA, PRIOR_EVEN, PRIOR_LARGEPATTERN, PRIOR_PAT3, PRIOR_SELFATARI, W,
};
use crate::patterns::PatternMatcher;
use crate::playout::EloPolicy;
use crate::position::{all_neighbors, fix_atari_ext, gen_capture_moves_all, Point, Position};

/// Accumulated (playouts, wins) prior for a candidate child, before it is
/// written into the node at creation.
#[derive(Clone, Copy)]
pub struct Prior {
    pub playouts: u32,
    pub wins: u32,
}

impl Prior {
    fn even() -> Self {
        Prior { playouts: PRIOR_EVEN, wins: PRIOR_EVEN / 2 }
    }

    fn add(&mut self, playouts: u32, wins: u32) {
        self.playouts += playouts;
        self.wins += wins;
    }
}

/// Common-fate-graph distance map from `start`: like Manhattan distance,
/// but a same-colored group counts as distance 0 within itself.
pub fn compute_cfg_distances(pos: &Position, start: Point) -> [i8; BOARDSIZE] {
    let mut cfg_map = [-1i8; BOARDSIZE];
    let mut queue = Vec::with_capacity(BOARDSIZE);

    cfg_map[start] = 0;
    queue.push(start);
    let mut head = 0;

    while head < queue.len() {
        let pt = queue[head];
        head += 1;

        for n in all_neighbors(pt) {
            let c = pos.color[n];
            if c == OUT {
                continue;
            }
            let new_dist = if c != EMPTY && c == pos.color[pt] { cfg_map[pt] } else { cfg_map[pt] + 1 };
            if cfg_map[n] < 0 || new_dist < cfg_map[n] {
                cfg_map[n] = new_dist;
                queue.push(n);
            }
        }
    }

    cfg_map
}

fn line_height(pt: Point) -> usize {
    let row = pt / W;
    let col = pt % W;
    let row_dist = row.min(N + 1 - row);
    let col_dist = col.min(N + 1 - col);
    row_dist.min(col_dist).saturating_sub(1)
}

fn empty_area(pos: &Position, pt: Point, dist: usize) -> bool {
    if dist == 0 {
        return true;
    }
    for n in all_neighbors(pt) {
        let c = pos.color[n];
        if c != EMPTY && c != OUT {
            return false;
        }
        if c == EMPTY && dist > 1 && !empty_area(pos, n, dist - 1) {
            return false;
        }
    }
    true
}

/// Compute the prior for playing `pt` from `parent_pos`, given `child_pos`
/// (the position *after* the move, used to detect self-atari) and the CFG
/// distance map from the parent's last move, if any.
pub fn prior_for_move(
    policy: &EloPolicy,
    parent_pos: &Position,
    child_pos: &Position,
    pt: Point,
    cfg_map: &Option<[i8; BOARDSIZE]>,
    candidates: &[Point],
) -> Prior {
    let mut prior = Prior::even();

    if let Some(cfg) = cfg_map {
        let dist = cfg[pt];
        if dist >= 1 && (dist as usize) <= PRIOR_CFG.len() {
            let bonus = PRIOR_CFG[(dist - 1) as usize];
            prior.add(bonus, bonus);
        }
    }

    if policy.matcher.matches_pat3(parent_pos, pt) {
        prior.add(PRIOR_PAT3, PRIOR_PAT3);
    }

    let assessed = policy.assess(parent_pos, candidates, pt);
    if assessed > 0.0 {
        let scaled = (assessed.sqrt() * PRIOR_LARGEPATTERN as f64) as u32;
        prior.add(scaled, scaled);
    }

    for (mv, size) in gen_capture_moves_all(parent_pos, false) {
        if mv == pt {
            if size == 1 {
                prior.add(PRIOR_CAPTURE_ONE, PRIOR_CAPTURE_ONE);
            } else {
                prior.add(PRIOR_CAPTURE_MANY, PRIOR_CAPTURE_MANY);
            }
            break;
        }
    }

    if !fix_atari_ext(child_pos, pt, true, true, false).is_empty() {
        prior.playouts += PRIOR_SELFATARI;
    }

    let height = line_height(pt);
    if height <= 2 && empty_area(parent_pos, pt, 3) {
        prior.playouts += PRIOR_EMPTYAREA;
        if height == 2 {
            prior.wins += PRIOR_EMPTYAREA;
        }
    }

    prior
}

/// Every legal, non-self-eye candidate move for the side to move in `pos`.
pub fn candidate_moves(pos: &Position) -> Vec<Point> {
    (BOARD_IMIN..BOARD_IMAX)
        .filter(|&pt| pos.color[pt] == EMPTY && crate::position::is_eye(pos, pt) == 0)
        .collect()
}
