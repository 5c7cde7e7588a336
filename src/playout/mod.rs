//! Random-game simulation for position evaluation.
//!
//! Two collaborating pieces, matching the component split in the design:
//! [`policy`] is the Coulom-style Elo playout policy (per-point gamma
//! products from matched features, sampled via a Fenwick-tree [`ProbDist`](crate::probdist::ProbDist));
//! [`runner`] drives a full playout to completion using that policy, with
//! the mercy rule, AMAF bookkeeping, and ownermap recording layered on top.

pub mod policy;
pub mod runner;

pub use policy::{EloPolicy, FeatureFamily};
pub use runner::mcplayout;
