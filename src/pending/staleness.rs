//! Age-based staleness policy.

use super::aggregate::PendingItem;

/// Pending work older than this many days is stale. Shared by every consumer.
pub const STALE_THRESHOLD_DAYS: i64 = 14;

pub fn is_stale(age_in_days: i64) -> bool {
    age_in_days > STALE_THRESHOLD_DAYS
}

/// Stale, unresolved items in the order they were given.
pub fn stale_report(items: &[PendingItem]) -> Vec<&PendingItem> {
    items
        .iter()
        .filter(|item| item.is_stale && item.resolution.is_none())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_exclusive() {
        assert!(!is_stale(0));
        assert!(!is_stale(14));
        assert!(is_stale(15));
        assert!(is_stale(400));
    }
}
