//! Sequential "prefix + zero-padded integer" id scheme.
//!
//! The CRUD engine derives the next id from a MAX aggregate filtered by
//! prefix; this module holds the pure parse/format step. The whole scheme is
//! a non-atomic read-then-format: two units of work generating against the
//! same prefix concurrently can compute the same next id. Serialize callers
//! per prefix, or use a database-native sequence, where that matters.

/// Compute the next id in the sequence from the current maximum.
///
/// `previous` is the stored maximum matching the prefix, or `None` when no
/// row matches. The remainder after the prefix is parsed as an integer;
/// absence or a parse failure counts as zero, so the sequence starts at 1.
pub fn next_in_sequence(previous: Option<&str>, prefix: &str, pad_width: usize) -> String {
    let current = previous
        .and_then(|v| v.get(prefix.len()..))
        .and_then(|rest| rest.parse::<u64>().ok())
        .unwrap_or(0);

    format!("{prefix}{:0>width$}", current + 1, width = pad_width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_stored_maximum() {
        assert_eq!(next_in_sequence(Some("CUST0002"), "CUST", 4), "CUST0003");
    }

    #[test]
    fn starts_at_one_when_no_match() {
        assert_eq!(next_in_sequence(None, "CUST", 4), "CUST0001");
    }

    #[test]
    fn parse_failure_counts_as_zero() {
        assert_eq!(next_in_sequence(Some("CUSTxyz"), "CUST", 4), "CUST0001");
    }

    #[test]
    fn grows_past_the_pad_width() {
        assert_eq!(next_in_sequence(Some("INV9999"), "INV", 4), "INV10000");
    }

    #[test]
    fn pad_width_applies_to_the_number_only() {
        assert_eq!(next_in_sequence(Some("A7"), "A", 3), "A008");
    }
}
