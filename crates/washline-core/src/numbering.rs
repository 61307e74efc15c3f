//! Queue position assignment within a `(date, floor)` partition
//!
//! Numbers are display-order labels, not a dense index: deletions leave
//! gaps and nothing compacts them. The caller reads the partition's
//! current numbers immediately before insert; the store's uniqueness
//! constraint catches the remaining race.

/// Next queue number for a partition: max + 1, or 1 when empty.
pub fn next_number(existing: &[u32]) -> u32 {
    existing.iter().copied().max().map_or(1, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_partition_starts_at_one() {
        assert_eq!(next_number(&[]), 1);
    }

    #[test]
    fn continues_from_max() {
        assert_eq!(next_number(&[1, 2, 3]), 4);
    }

    #[test]
    fn gaps_are_not_reclaimed() {
        assert_eq!(next_number(&[1, 2, 5]), 6);
        assert_eq!(next_number(&[7]), 8);
    }

    #[test]
    fn order_does_not_matter() {
        assert_eq!(next_number(&[5, 1, 3]), 6);
    }
}
