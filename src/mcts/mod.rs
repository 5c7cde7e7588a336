//! Parallel Monte-Carlo tree search: arena-of-indices tree, UCB1-AMAF
//! selection, a prior seeder, worker threads, and the search controller
//! that ties them together with wall-clock time control.

pub mod arena;
pub mod controller;
pub mod node;
pub mod prior;
pub mod selection;
pub mod time_control;
pub mod tree;
pub mod worker;

pub use controller::{Budget, SearchConfig, SearchController, ThreadModel};
pub use node::{Node, NodeId};
pub use time_control::ClockState;
pub use tree::Tree;
