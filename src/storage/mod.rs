//! Storage for the previously seen leaderboard.
//!
//! Only the immediately previous snapshot is kept, so a restarted process
//! reports a diff instead of re-sending the whole board.
//!
//! ## Layout
//!
//! ```text
//! {state_file}        # Raw JSON of the last adopted snapshot
//! {state_file}.tmp    # Write buffer, renamed over state_file
//! ```

pub mod local;

// Re-export for convenience
pub use local::SnapshotStore;
