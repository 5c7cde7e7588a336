//! Wall-clock time allocation.
//!
//! Splits a move's time budget into a *desired* deadline (stop searching
//! and play once this elapses, under normal conditions) and a *worst-case*
//! deadline (never search past this, even mid-playout), interpolated across
//! fuseki/chuban/yose using the `FUSEKI_END_PERCENT`/`YOSE_START_PERCENT`
//! breakpoints, and corrected for network round-trip
//! lag so a GTP frontend talking to a remote client doesn't overrun its
//! clock waiting for the `genmove` response to arrive.

use std::time::Duration;

use crate::constants::{
    BYOYOMI_TIME_EXTENSION, FUSEKI_END_PERCENT, MAIN_TIME_EXTENSION, N, YOSE_START_PERCENT,
};

/// Remaining clock state as reported by the GTP collaborator (`time_left`).
#[derive(Debug, Clone, Copy)]
pub struct ClockState {
    pub main_time_remaining: Duration,
    pub byoyomi_time: Duration,
    pub byoyomi_stones_remaining: u32,
}

impl ClockState {
    pub fn in_byoyomi(&self) -> bool {
        self.main_time_remaining.is_zero() && self.byoyomi_stones_remaining > 0
    }
}

/// A move's allocated time budget.
#[derive(Debug, Clone, Copy)]
pub struct Allocation {
    pub desired: Duration,
    pub worst: Duration,
}

pub struct TimeControl {
    /// Estimated network round-trip overhead, subtracted from the worst
    /// deadline so a remote frontend's clock doesn't expire while our
    /// response is still in flight.
    pub net_lag: Duration,
}

impl Default for TimeControl {
    fn default() -> Self {
        TimeControl { net_lag: Duration::from_millis(200) }
    }
}

impl TimeControl {
    /// How far into the game `move_number` is, as a percent of total board
    /// points — the same units `FUSEKI_END_PERCENT`/`YOSE_START_PERCENT` use.
    fn phase_percent(move_number: usize) -> u32 {
        ((move_number * 100) / (N * N).max(1)).min(100) as u32
    }

    /// Relative weight this phase gets versus an even split of the
    /// remaining time: fuseki and yose move faster, the middlegame gets
    /// more thinking time.
    fn phase_factor(move_number: usize) -> f64 {
        let percent = Self::phase_percent(move_number);
        if percent < FUSEKI_END_PERCENT {
            0.8
        } else if percent > YOSE_START_PERCENT {
            0.6
        } else {
            1.2
        }
    }

    /// Allocate a budget for the move about to be searched.
    pub fn allocate(&self, clock: &ClockState, move_number: usize) -> Allocation {
        if clock.in_byoyomi() {
            let per_stone = clock
                .byoyomi_time
                .checked_div(clock.byoyomi_stones_remaining.max(1))
                .unwrap_or(clock.byoyomi_time);
            let desired = per_stone;
            let worst = per_stone.mul_f64(BYOYOMI_TIME_EXTENSION).saturating_sub(self.net_lag);
            return Allocation { desired, worst };
        }

        let estimated_moves_left = ((N * N) as isize - move_number as isize).max(10) as u32;
        let base = clock
            .main_time_remaining
            .checked_div(estimated_moves_left)
            .unwrap_or(Duration::ZERO);
        let desired = base.mul_f64(Self::phase_factor(move_number));
        let worst = desired.mul_f64(MAIN_TIME_EXTENSION).saturating_sub(self.net_lag);
        Allocation { desired, worst }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byoyomi_splits_evenly_across_remaining_stones() {
        let tc = TimeControl::default();
        let clock = ClockState {
            main_time_remaining: Duration::ZERO,
            byoyomi_time: Duration::from_secs(30),
            byoyomi_stones_remaining: 5,
        };
        let alloc = tc.allocate(&clock, 120);
        assert_eq!(alloc.desired, Duration::from_secs(6));
    }

    #[test]
    fn middlegame_gets_more_time_than_fuseki() {
        let tc = TimeControl::default();
        let clock = ClockState {
            main_time_remaining: Duration::from_secs(600),
            byoyomi_time: Duration::ZERO,
            byoyomi_stones_remaining: 0,
        };
        let fuseki = tc.allocate(&clock, 2);
        let chuban = tc.allocate(&clock, (N * N) / 3);
        assert!(chuban.desired > fuseki.desired);
    }
}
