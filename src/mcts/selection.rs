//! Child-selection policy.
//!
//! `SelectionPolicy` is a capability-set trait (per the design notes'
//! "capability-set policies" guidance) so the worker loop doesn't care
//! whether it's running UCB1-AMAF (RAVE) or a plain UCB1 — useful for
//! root-parallelisation (`TM_ROOT`), where independent trees are cheaper to
//! search with a simpler policy since there is no cross-tree RAVE to share.

use super::arena::Arena;
use super::node::{Node, NodeId};
use crate::constants::{RAVE_EQUIV_DEFAULT, UCB1_C_DEFAULT};

pub trait SelectionPolicy: Sync {
    /// Urgency score used to pick the most promising child; higher wins.
    /// `node` is the candidate child, `parent_playouts` its parent's total
    /// visit count (for the UCB1 exploration term).
    fn urgency(&self, node: &Node, parent_playouts: u32) -> f64;
}

/// UCB1 combined with RAVE (all-moves-as-first), as in `rave_urgency`,
/// extended with a virtual-loss penalty so a worker that is mid-descent
/// down a path looks less attractive to other workers (`TM_TREE_VL`).
pub struct Ucb1Amaf {
    pub rave_equiv: f64,
    pub c: f64,
}

impl Default for Ucb1Amaf {
    fn default() -> Self {
        Ucb1Amaf { rave_equiv: RAVE_EQUIV_DEFAULT, c: UCB1_C_DEFAULT }
    }
}

impl SelectionPolicy for Ucb1Amaf {
    fn urgency(&self, node: &Node, parent_playouts: u32) -> f64 {
        let vl = node.virtual_loss() as f64;
        let v = (node.playouts() + node.prior_playouts) as f64 + vl;
        let w = (node.wins() + node.prior_wins) as f64;
        let expectation = if v > 0.0 { w / v } else { 0.0 };

        let exploration = self.c * ((parent_playouts.max(1) as f64).ln() / v.max(1.0)).sqrt();

        let amaf_v = node.amaf_playouts() as f64;
        let blended = if amaf_v == 0.0 {
            expectation
        } else {
            let amaf_w = node.amaf_wins() as f64;
            let rave_expectation = amaf_w / amaf_v;
            let beta = (self.rave_equiv / (3.0 * v + self.rave_equiv)).sqrt();
            beta * rave_expectation + (1.0 - beta) * expectation
        };

        blended + exploration
    }
}

/// Plain UCB1 with no RAVE term, for deployments that want a cheaper
/// per-node urgency (e.g. root-parallel workers merging independent trees,
/// where per-tree RAVE statistics aren't comparable across trees anyway).
pub struct Ucb1 {
    pub c: f64,
}

impl Default for Ucb1 {
    fn default() -> Self {
        Ucb1 { c: UCB1_C_DEFAULT }
    }
}

impl SelectionPolicy for Ucb1 {
    fn urgency(&self, node: &Node, parent_playouts: u32) -> f64 {
        let vl = node.virtual_loss() as f64;
        let v = (node.playouts() + node.prior_playouts) as f64 + vl;
        let w = (node.wins() + node.prior_wins) as f64;
        let expectation = if v > 0.0 { w / v } else { 0.0 };
        expectation + self.c * ((parent_playouts.max(1) as f64).ln() / v.max(1.0)).sqrt()
    }
}

/// Pick the most urgent child of `parent` under `policy`. Ties are broken
/// by shuffling candidates first, important early in search when most
/// children are still unvisited and tie on urgency.
pub fn most_urgent(arena: &Arena, parent: NodeId, policy: &dyn SelectionPolicy) -> Option<NodeId> {
    let mut children = arena.children_of(parent);
    if children.is_empty() {
        return None;
    }
    crate::rng::shuffle(&mut children);

    let nodes = arena.read();
    let parent_playouts = nodes[parent as usize].playouts().max(1);
    children
        .into_iter()
        .max_by(|&a, &b| {
            let ua = policy.urgency(&nodes[a as usize], parent_playouts);
            let ub = policy.urgency(&nodes[b as usize], parent_playouts);
            ua.partial_cmp(&ub).unwrap_or(std::cmp::Ordering::Equal)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn rave_weight_decays_toward_zero_as_real_visits_grow() {
        // Silver's schedule: beta -> 1 with no real visits, beta -> 0 as
        // real visits dominate the equivalence constant.
        let policy = Ucb1Amaf { rave_equiv: 3000.0, c: 0.0 };

        let low_visits = Node::new_child(Position::new(), 1, 0);
        low_visits.add_amaf(10, 7);
        let high_visits = Node::new_child(Position::new(), 1, 0);
        high_visits.add_stats(50000, 25000);
        high_visits.add_amaf(10, 7);

        let u_low = policy.urgency(&low_visits, 1);
        let u_high = policy.urgency(&high_visits, 1);

        // With almost no real playouts the blended value should sit much
        // closer to the AMAF rate (0.7) than to the empty-stats baseline.
        assert!(u_low > 0.5, "expected AMAF to dominate urgency at v=0, got {u_low}");
        // With many real playouts at 0.5 the AMAF rate should barely move
        // the blended value away from 0.5.
        assert!((u_high - 0.5).abs() < 0.05, "expected AMAF to barely matter at large v, got {u_high}");
    }
}
