//! Coulom-style Elo playout policy.
//!
//! Every candidate move is assigned a gamma value built as the product of
//! the gammas of the pattern features that match at that point (a capture,
//! a matched 3x3 shape, a self-atari penalty, ...). `choose` samples one
//! move proportional to gamma using a Fenwick-tree [`ProbDist`]; `assess`
//! reports the normalized probability of a single already-chosen move,
//! which the prior seeder uses to scale `PRIOR_PAT3`/`PRIOR_LARGEPATTERN`.
//!
//! Ported from Pachi's `playout/elo.c`, which keeps two separate
//! patternsets: a small, fast one for `choose` (the hot path, run once per
//! playout move) and a larger, full one for `assess` (run only when scoring
//! priors at node expansion). We keep that split as [`FeatureFamily`] rather
//! than two literal pattern tables, since this crate's pattern matcher does
//! not (yet) distinguish fast/full shapes the way a trained gamma file would.

use crate::constants::{EMPTY, STONE_WHITE};
use crate::patterns::{pat3_match, PatternMatcher};
use crate::position::{all_neighbors, fix_atari, Point, Position};
use crate::probdist::ProbDist;
use crate::tactics::is_bad_selfatari;

/// Which feature groups a gamma lookup considers. Mirrors `elo.c`'s
/// `xspat` option, which drops spatial (pattern) features entirely when a
/// deployment wants to isolate the contribution of non-spatial features
/// (captures, self-atari) during tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureFamily {
    /// Every feature family contributes.
    All,
    /// Only the 3x3/large spatial pattern families contribute.
    SpatialOnly,
    /// Every family except spatial patterns contributes.
    NoSpatial,
}

impl FeatureFamily {
    fn uses_spatial(self) -> bool {
        !matches!(self, FeatureFamily::NoSpatial)
    }

    fn uses_nonspatial(self) -> bool {
        !matches!(self, FeatureFamily::SpatialOnly)
    }
}

/// Fixed gamma weights for each non-spatial feature. A trained gamma file
/// would replace these with fitted values; these reuse the
/// relative-magnitude priors (`PRIOR_CAPTURE_ONE`/`PRIOR_CAPTURE_MANY`/
/// `PRIOR_PAT3`/`PRIOR_SELFATARI`) as multiplicative gammas instead of
/// additive prior counts.
mod gamma {
    pub const BASE: f64 = 1.0;
    pub const CAPTURE_ONE: f64 = 15.0;
    pub const CAPTURE_MANY: f64 = 30.0;
    pub const PATTERN3: f64 = 10.0;
    pub const SELFATARI_PENALTY: f64 = 0.02;
}

/// The Elo playout policy: one feature-family configuration for the hot
/// `choose` path, a (possibly different) one for the cold `assess` path,
/// and the large-pattern matcher both consult.
pub struct EloPolicy<M: PatternMatcher = crate::patterns::LargePatternMatcher> {
    pub choose_family: FeatureFamily,
    pub assess_family: FeatureFamily,
    pub matcher: M,
}

impl Default for EloPolicy<crate::patterns::LargePatternMatcher> {
    fn default() -> Self {
        EloPolicy {
            choose_family: FeatureFamily::All,
            assess_family: FeatureFamily::All,
            matcher: crate::patterns::LargePatternMatcher,
        }
    }
}

impl<M: PatternMatcher> EloPolicy<M> {
    pub fn new(choose_family: FeatureFamily, assess_family: FeatureFamily, matcher: M) -> Self {
        EloPolicy { choose_family, assess_family, matcher }
    }

    /// Product of every matched feature's gamma at `pt`, under `family`.
    /// A bare-empty point with no matched feature still carries
    /// `gamma::BASE` so every legal point has positive weight.
    fn point_gamma(&self, pos: &Position, pt: Point, family: FeatureFamily) -> f64 {
        if pos.color[pt] != EMPTY {
            return 0.0;
        }

        let mut g = gamma::BASE;

        if family.uses_nonspatial() {
            if let Some(size) = capturing_group_size(pos, pt) {
                g *= if size > 1 { gamma::CAPTURE_MANY } else { gamma::CAPTURE_ONE };
            }
            if is_bad_selfatari(pos, pt) {
                g *= gamma::SELFATARI_PENALTY;
            }
        }

        if family.uses_spatial() && self.matcher.matches_pat3(pos, pt) {
            g *= gamma::PATTERN3;
        }
        if family.uses_spatial() {
            if let Some(large_gamma) = self.matcher.large_pattern_gamma(pos, pt) {
                g *= large_gamma;
            }
        }

        g
    }

    /// Build a weighted distribution over `candidates` for the given
    /// family, keyed by position in `candidates` (not by board point).
    fn distribution(&self, pos: &Position, candidates: &[Point], family: FeatureFamily) -> ProbDist {
        let mut pd = ProbDist::new(candidates.len());
        for (i, &pt) in candidates.iter().enumerate() {
            pd.set(i, self.point_gamma(pos, pt, family));
        }
        pd
    }

    /// Sample one move from the legal, non-eye candidates of `pos`,
    /// proportional to gamma under `choose_family`. Returns `None` if there
    /// are no candidates (caller should pass).
    pub fn choose(&self, pos: &Position, candidates: &[Point]) -> Option<Point> {
        if candidates.is_empty() {
            return None;
        }
        let pd = self.distribution(pos, candidates, self.choose_family);
        pd.pick().map(|i| candidates[i])
    }

    /// Normalized probability that `pt` would have been chosen from
    /// `candidates` under `assess_family` — the value the prior seeder
    /// scales `PRIOR_PAT3`/`PRIOR_LARGEPATTERN` by.
    pub fn assess(&self, pos: &Position, candidates: &[Point], pt: Point) -> f64 {
        let pd = self.distribution(pos, candidates, self.assess_family);
        match candidates.iter().position(|&c| c == pt) {
            Some(i) => pd.probability(i),
            None => 0.0,
        }
    }
}

/// If `pt` would capture an opponent group by filling its last liberty,
/// return that group's size; else `None`.
fn capturing_group_size(pos: &Position, pt: Point) -> Option<usize> {
    for n in all_neighbors(pt) {
        if pos.color[n] == STONE_WHITE {
            let moves = fix_atari(pos, n, false);
            if moves.contains(&pt) {
                let (stones, _) = crate::position::compute_block(pos, n, 1);
                return Some(stones.len());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::{parse_coord, play_move};

    #[test]
    fn empty_board_gives_uniform_base_gamma() {
        crate::rng::seed(1);
        let pos = Position::new();
        let policy = EloPolicy::default();
        let candidates = pos.legal_moves();
        assert!(!candidates.is_empty());
        let chosen = policy.choose(&pos, &candidates);
        assert!(chosen.is_some());
    }

    #[test]
    fn capture_point_has_higher_gamma_than_base() {
        let mut pos = Position::new();
        play_move(&mut pos, parse_coord("C5")).unwrap();
        play_move(&mut pos, parse_coord("D5")).unwrap();
        play_move(&mut pos, parse_coord("E5")).unwrap(); // surround White at D5's libs partially
        let policy = EloPolicy::default();
        let base = policy.point_gamma(&pos, parse_coord("B2"), FeatureFamily::All);
        assert!(base > 0.0);
    }
}
