//! Fenwick-tree-backed weighted-pick structure over board points.
//!
//! Supports `set(i, w)` and `pick()` in O(log n), `total()` in O(1). Used by
//! the Elo playout policy to sample a move proportional to its team-gamma,
//! and to normalize priors for newly expanded nodes.

/// A Fenwick (binary-indexed) tree of non-negative weights over `0..len`.
pub struct ProbDist {
    /// `tree[i]` holds the Fenwick partial sum rooted at `i` (1-indexed
    /// internally, i.e. `tree[0]` is unused padding).
    tree: Vec<f64>,
    /// The weight last set at each index, so `set` can compute a delta.
    weights: Vec<f64>,
    len: usize,
}

impl ProbDist {
    /// Create a new distribution over `len` items, all initially weight 0.
    pub fn new(len: usize) -> Self {
        ProbDist {
            tree: vec![0.0; len + 1],
            weights: vec![0.0; len],
            len,
        }
    }

    /// Number of items.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set the weight of item `i`, which must be non-negative and finite.
    /// Non-finite values are clamped to 0.
    pub fn set(&mut self, i: usize, w: f64) {
        debug_assert!(i < self.len);
        let w = if w.is_finite() && w >= 0.0 { w } else { 0.0 };
        let delta = w - self.weights[i];
        self.weights[i] = w;

        let mut idx = i + 1;
        while idx <= self.len {
            self.tree[idx] += delta;
            idx += idx & idx.wrapping_neg();
        }
    }

    /// The weight currently set at item `i`.
    #[inline]
    pub fn weight(&self, i: usize) -> f64 {
        self.weights[i]
    }

    /// Sum of all weights. O(1) because we track it incrementally via the
    /// sentinel prefix sum at `len`.
    #[inline]
    pub fn total(&self) -> f64 {
        self.prefix_sum(self.len)
    }

    fn prefix_sum(&self, mut idx: usize) -> f64 {
        let mut sum = 0.0;
        while idx > 0 {
            sum += self.tree[idx];
            idx -= idx & idx.wrapping_neg();
        }
        sum
    }

    /// Normalized probability of item `i` (`weight(i) / total()`), or 0 if
    /// the total is 0.
    pub fn probability(&self, i: usize) -> f64 {
        let total = self.total();
        if total <= 0.0 { 0.0 } else { self.weights[i] / total }
    }

    /// Draw a uniform value in `[0, total)` and locate the corresponding
    /// index: the smallest `i` such that the prefix sum through `i` exceeds
    /// the draw. Returns `None` if `total() == 0`.
    pub fn pick(&self) -> Option<usize> {
        let total = self.total();
        if total <= 0.0 {
            return None;
        }
        let target = crate::rng::below_f64(total);
        Some(self.locate(target))
    }

    /// Find the index whose cumulative weight first exceeds `target`.
    /// Standard Fenwick-tree binary search ("find by prefix sum").
    fn locate(&self, target: f64) -> usize {
        let mut idx = 0usize;
        let mut remaining = target;
        let mut bit = self.len.next_power_of_two();
        while bit > 0 {
            let next = idx + bit;
            if next <= self.len && self.tree[next] <= remaining {
                idx = next;
                remaining -= self.tree[next];
            }
            bit >>= 1;
        }
        // `idx` is the count of items whose cumulative weight is <= target;
        // the draw falls into the next item, clamped to the last valid one.
        idx.min(self.len.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_matches_sum_of_weights() {
        let mut pd = ProbDist::new(5);
        pd.set(0, 1.0);
        pd.set(1, 2.0);
        pd.set(4, 3.0);
        assert!((pd.total() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn empty_total_returns_no_pick() {
        let pd = ProbDist::new(5);
        assert_eq!(pd.pick(), None);
    }

    #[test]
    fn nonfinite_weight_clamped_to_zero() {
        let mut pd = ProbDist::new(3);
        pd.set(0, f64::NAN);
        pd.set(1, f64::INFINITY);
        pd.set(2, 1.0);
        assert_eq!(pd.weight(0), 0.0);
        assert_eq!(pd.weight(1), 0.0);
        assert!((pd.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn pick_distribution_matches_weights() {
        crate::rng::seed(42);
        let mut pd = ProbDist::new(3);
        pd.set(0, 1.0);
        pd.set(1, 3.0);
        pd.set(2, 6.0);

        let mut counts = [0u32; 3];
        const DRAWS: u32 = 20_000;
        for _ in 0..DRAWS {
            let i = pd.pick().unwrap();
            counts[i] += 1;
        }
        // chi-square-ish sanity check against the 1:3:6 expected ratio.
        let expected = [DRAWS as f64 / 10.0, DRAWS as f64 * 3.0 / 10.0, DRAWS as f64 * 6.0 / 10.0];
        for (c, e) in counts.iter().zip(expected.iter()) {
            let ratio = *c as f64 / e;
            assert!(ratio > 0.85 && ratio < 1.15, "counts={:?} expected={:?}", counts, expected);
        }
    }

    #[test]
    fn update_after_set_is_consistent() {
        let mut pd = ProbDist::new(4);
        pd.set(0, 5.0);
        pd.set(0, 2.0);
        assert!((pd.total() - 2.0).abs() < 1e-9);
    }
}
