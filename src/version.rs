//! Ordering for dotted data-file version labels (`v0.3.0`, `v0.3`, `v1.2.3.4`).
//!
//! Parsing is lenient: one leading `v` is stripped, and any segment that is
//! not a non-negative integer counts as `0`. Missing trailing segments also
//! count as `0`, so `v0.3` and `v0.3.0` are equal.

use std::cmp::Ordering;

/// Split a version label into its numeric segments.
pub fn segments(version: &str) -> Vec<u64> {
    let trimmed = version.strip_prefix('v').unwrap_or(version);
    trimmed
        .split('.')
        .map(|segment| segment.parse::<u64>().unwrap_or(0))
        .collect()
}

/// Compare two version labels segment by segment.
pub fn compare(a: &str, b: &str) -> Ordering {
    let left = segments(a);
    let right = segments(b);
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    Ordering::Equal
}

pub fn less_than(a: &str, b: &str) -> bool {
    compare(a, b) == Ordering::Less
}

pub fn greater_than(a: &str, b: &str) -> bool {
    compare(a, b) == Ordering::Greater
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_zero_segments_are_equal() {
        assert_eq!(compare("v0.3", "v0.3.0"), Ordering::Equal);
        assert_eq!(compare("v1", "v1.0.0.0"), Ordering::Equal);
        assert_eq!(compare("0.3.0", "v0.3.0"), Ordering::Equal);
    }

    #[test]
    fn segments_compare_numerically_not_lexically() {
        assert_eq!(compare("v0.10.0", "v0.9.0"), Ordering::Greater);
        assert_eq!(compare("v0.2.9", "v0.3.0"), Ordering::Less);
        assert!(less_than("v0.3.0", "v0.3.1"));
        assert!(greater_than("v1.0.0", "v0.99.99"));
    }

    #[test]
    fn extra_segments_break_ties() {
        assert_eq!(compare("v0.3.0.1", "v0.3.0"), Ordering::Greater);
        assert_eq!(compare("v0.3", "v0.3.0.1"), Ordering::Less);
    }

    #[test]
    fn malformed_segments_parse_as_zero() {
        assert_eq!(segments("vx.3.beta"), vec![0, 3, 0]);
        assert_eq!(compare("v0.x.1", "v0.0.1"), Ordering::Equal);
        assert_eq!(compare("", "v0"), Ordering::Equal);
        assert_eq!(compare("v-1.0", "v0.0"), Ordering::Equal);
    }

    #[test]
    fn only_one_leading_v_is_stripped() {
        assert_eq!(segments("vv1.2"), vec![0, 2]);
    }
}
