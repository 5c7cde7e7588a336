//! A parallel Monte-Carlo tree search engine for square-grid territorial
//! board games, with a Coulom-style Elo playout policy.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions and engine parameters
//! - [`position`] - Core game logic (board state, moves, captures)
//! - [`patterns`] - 3x3 and large-pattern matching
//! - [`tactics`] - Self-atari and atari-fixing queries
//! - [`probdist`] - Fenwick-tree weighted pick
//! - [`ownermap`] - Territory accumulator fed by finished playouts
//! - [`playout`] - Elo playout policy and playout runner
//! - [`mcts`] - Arena-of-indices tree, selection, priors, workers, controller
//! - [`rng`] - Thread-local PRNG
//! - [`config`] - Engine configuration string parsing
//! - [`error`] - Engine-wide error type
//! - [`gtp`] - Line-oriented command surface
//!
//! ## Example
//!
//! ```
//! use moyo::position::{Position, play_move, parse_coord, str_coord};
//! use moyo::mcts::{SearchConfig, SearchController, ClockState};
//! use std::time::Duration;
//!
//! let mut pos = Position::new();
//! play_move(&mut pos, parse_coord("D4")).unwrap();
//!
//! let controller = SearchController::new(pos, SearchConfig { threads: 1, ..SearchConfig::default() });
//! let clock = ClockState {
//!     main_time_remaining: Duration::from_millis(50),
//!     byoyomi_time: Duration::ZERO,
//!     byoyomi_stones_remaining: 0,
//! };
//! let best = controller.genmove(&clock);
//! println!("best move: {}", str_coord(best));
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod gtp;
pub mod mcts;
pub mod ownermap;
pub mod patterns;
pub mod playout;
pub mod position;
pub mod probdist;
pub mod rng;
pub mod tactics;
