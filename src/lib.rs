//! A search-based solver for thirteen-slot patience: thirteen descending
//! columns, four same-suit foundations and forced moves to the foundations
//! once every foundation has been started.
pub mod board;
pub mod config;
pub mod error;
pub mod metrics;
pub mod moves;
pub mod replay;
pub mod session;
pub mod solver;
