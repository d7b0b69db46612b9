//! Pending-item lifecycle: identity, aggregation, staleness, and threads.

pub mod aggregate;
pub mod key;
pub mod staleness;
pub mod threads;

pub use aggregate::{aggregate_pending, aggregate_scoped, age_in_days, unresolved, PendingItem};
pub use key::{normalize, PendingKey};
pub use staleness::{is_stale, stale_report, STALE_THRESHOLD_DAYS};
pub use threads::{get_thread_for_pending, group_by_thread, ThreadIndex};
