//! Resolution overlay and matching.
//!
//! Resolutions live in an overlay next to the blocks, never inside them. Undoing a
//! resolution deletes its overlay entry and the pending item reappears on the next
//! aggregation.

pub mod matcher;
pub mod score;
pub mod store;
pub mod types;

pub use matcher::{find_resolution_candidates, ResolutionCandidate, ResolutionMatcher};
pub use score::overlap_score;
pub use store::{JsonFileStore, MemoryStore, ResolutionStore};
pub use types::{Overlay, Resolution, ResolutionMethod};
