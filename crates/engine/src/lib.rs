//! Atomic seat-state engine over Redis.
//!
//! All seat mutation happens inside server-side Lua scripts; Redis executing
//! one script at a time is the only concurrency-control primitive this crate
//! relies on. Two keys per showtime:
//!
//! - `seats:{showtime_id}`: hash, one canonical JSON record per seat
//! - `available:{showtime_id}`: integer counter of available seats
//!
//! The counter is an optimization; the hash is the source of truth.

pub mod error;
pub mod runtime;
pub mod scripts;
pub mod seats;

pub use error::EngineError;
pub use runtime::ScriptRuntime;
pub use seats::{
    CleanupOutcome, ConfirmOutcome, ExtendOutcome, ReleaseOutcome, ReserveOutcome, SeatEngine,
    SeatFailure, SeatSnapshot, SeatSpec, StatusOutcome,
};
