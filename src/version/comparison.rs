//! Dotted version comparison for store and platform version strings.
//!
//! Store metadata and installed-package metadata rarely agree on a version
//! format: one side reports `2.1`, the other `2.1.0`, build suffixes such as
//! `+42` or `-beta` show up on either. This module compares them without
//! failing on any input.
//!
//! # Parsing rule
//!
//! A version string is split on `.`. Every character that is not an ASCII
//! digit is removed from each segment and the remainder is parsed as a
//! non-negative integer. Empty or unparsable segments count as `0`. The
//! shorter sequence is padded with trailing zeros before comparison.
//!
//! # Examples
//!
//! ```rust
//! use inapp_update::version::VersionComparator;
//!
//! assert!(VersionComparator::is_newer("2.2.0", "2.1.0"));
//! assert!(!VersionComparator::is_newer("1.2", "1.2.0"));
//! assert!(VersionComparator::is_newer("1.2-beta", "1.1.9"));
//! assert!(!VersionComparator::is_newer("1.2.3+build", "1.2.3"));
//! ```

use std::cmp::Ordering;

/// Comparison helpers for dot-delimited version strings.
///
/// All methods are pure and total: any pair of strings can be compared and
/// no method performs I/O.
pub struct VersionComparator;

impl VersionComparator {
    /// Returns `true` only when `remote` is strictly newer than `local`.
    ///
    /// Equal versions (including versions that only differ by zero padding
    /// or stripped non-digit characters) are not newer.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use inapp_update::version::VersionComparator;
    ///
    /// assert!(VersionComparator::is_newer("1", ""));
    /// assert!(!VersionComparator::is_newer("", ""));
    /// assert!(!VersionComparator::is_newer("", "1"));
    /// ```
    pub fn is_newer(remote: &str, local: &str) -> bool {
        Self::compare(remote, local) == Ordering::Greater
    }

    /// Total ordering of two version strings under the parsing rule.
    ///
    /// The first differing segment decides; missing trailing segments are
    /// treated as zero.
    pub fn compare(left: &str, right: &str) -> Ordering {
        let left = Self::parse_segments(left);
        let right = Self::parse_segments(right);
        let len = left.len().max(right.len());

        (0..len)
            .map(|i| {
                let l = left.get(i).copied().unwrap_or(0);
                let r = right.get(i).copied().unwrap_or(0);
                l.cmp(&r)
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }

    /// Decomposes a version string into its numeric segments.
    ///
    /// Always returns at least one segment, since splitting an empty string
    /// yields a single empty segment that parses to `0`.
    ///
    /// ```rust
    /// use inapp_update::version::VersionComparator;
    ///
    /// assert_eq!(VersionComparator::parse_segments("v1.2-rc3.x"), vec![1, 23, 0]);
    /// assert_eq!(VersionComparator::parse_segments(""), vec![0]);
    /// assert_eq!(VersionComparator::parse_segments(".5."), vec![0, 5, 0]);
    /// ```
    pub fn parse_segments(version: &str) -> Vec<u64> {
        version.split('.').map(parse_segment).collect()
    }
}

fn parse_segment(segment: &str) -> u64 {
    let digits: String = segment.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Shorthand for [`VersionComparator::is_newer`].
pub fn is_newer(remote: &str, local: &str) -> bool {
    VersionComparator::is_newer(remote, local)
}
