//! Phase-routing bridge between a policy and a process-backed game.
//!
//! The game runs outside this crate behind the [`GameSession`](session::GameSession)
//! contract. A [`PhaseRouter`](router::PhaseRouter) owns one session at a time and turns it
//! into a gym-style step loop:
//!
//! ```text
//! start(game, seed) ──▶ Active ──step──▶ Active ──step (done)──▶ Done ──step──▶ Done (no-op)
//!        ▲                 │                                       │
//!        └──── finalize ◀──┴───────────────────────────────────────┘
//! ```
//!
//! Each step slices the combined action vector down to the segment of the phase the game
//! last reported, encodes it as an action line and forwards it. A failing session moves the
//! router to `Done`; the session is still released by `finalize` or on drop.
//!
//! # Modules
//!
//! - [`session`] - Contracts implemented by game integrations
//! - [`router`] - The [`PhaseRouter`](router::PhaseRouter) state machine

pub mod router;
pub mod session;
