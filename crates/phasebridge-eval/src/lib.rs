//! Episode driving on top of the model and router crates.
//!
//! # Architecture
//!
//! ```text
//! EpisodeConfig (game, seed, step limit)
//!     ↓
//! run_episode: start → [ForwardModel::evaluate → embed_action → PhaseRouter::step]* → finalize
//!     ↓
//! EpisodeOutcome (steps, total reward, final phase, score)
//!     ↓ many episodes
//! evaluate_parallel (one scoped thread and router per episode, shared model)
//!     ↓
//! RewardSummary
//! ```
//!
//! An outer optimizer typically draws fresh seeds with [`draw_seeds`], evaluates a candidate
//! parameter vector on them with [`evaluate_parallel`] and uses the summary as its fitness.

pub use self::{episode::*, parallel::*};

pub mod episode;
pub mod parallel;
pub mod summary;
