use crate::error::{Result, WalkError};

/// NSEC3 hashes are compared by their leading base32hex digits; four of
/// them give a 2^20 keyspace, coarse but plenty for progress statistics.
/// Full-length hashes are kept separately for the crackable artifact.
pub const HASH_PREFIX_LEN: usize = 4;
pub const PREFIX_RADIX: u64 = 32;

/// Total size of the truncated keyspace: 32^4
pub const KEYSPACE: u64 = PREFIX_RADIX
    * PREFIX_RADIX
    * PREFIX_RADIX
    * PREFIX_RADIX;

/// Integer value of a hash's leading prefix digits (base32hex: 0-9, a-v)
pub fn prefix_value(hash: &str) -> Result<u64> {
    if hash.len() < HASH_PREFIX_LEN {
        return Err(WalkError::Parse(format!("Hash too short: {}", hash)));
    }
    let mut value = 0u64;
    for c in hash.chars().take(HASH_PREFIX_LEN) {
        let digit = match c {
            '0'..='9' => c as u64 - '0' as u64,
            'a'..='v' => c as u64 - 'a' as u64 + 10,
            'A'..='V' => c as u64 - 'A' as u64 + 10,
            _ => return Err(WalkError::Parse(format!("Invalid base32hex digit: {}", c))),
        };
        value = value * PREFIX_RADIX + digit;
    }
    Ok(value)
}

/// Modular distance from `low` to `high`; ranges may straddle the
/// keyspace's wrap point, in which case the length is
/// `(KEYSPACE - low) + high`
pub fn range_length(low: &str, high: &str) -> Result<u64> {
    let low = prefix_value(low)?;
    let high = prefix_value(high)?;
    if high >= low {
        Ok(high - low)
    } else {
        Ok(KEYSPACE - low + high)
    }
}

/// Whether `hash` falls strictly inside `(low, high)`, wraparound-aware.
/// Endpoints themselves are not inside: the left endpoint is the range's
/// own owner and the right one belongs to the next range.
pub fn hash_covered(hash: &str, low: &str, high: &str) -> bool {
    let hash = hash.to_lowercase();
    let low = low.to_lowercase();
    let high = high.to_lowercase();

    if low < high {
        low < hash && hash < high
    } else if low > high {
        // Wraps past the keyspace maximum
        hash > low || hash < high
    } else {
        false
    }
}

/// Running coverage estimate over the discovered ranges
///
/// A statistical approximation, not a guarantee: random draws re-hit
/// covered territory ever more often, so the true remaining work is
/// usually higher than `estimated_remaining` suggests.
#[derive(Clone, Debug, Default)]
pub struct CoverageStats {
    covered: u64,
    count: usize,
}

impl CoverageStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_range(&mut self, length: u64) {
        self.covered = (self.covered + length).min(KEYSPACE);
        self.count += 1;
    }

    pub fn found(&self) -> usize {
        self.count
    }

    pub fn covered(&self) -> u64 {
        self.covered
    }

    /// Fraction of the keyspace covered, in [0, 1]
    pub fn fraction(&self) -> f64 {
        self.covered as f64 / KEYSPACE as f64
    }

    pub fn average_length(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.covered as f64 / self.count as f64
        }
    }

    /// Keyspace left divided by the average discovered-range length
    pub fn estimated_remaining(&self) -> u64 {
        let avg = self.average_length();
        if avg <= 0.0 {
            return 0;
        }
        ((KEYSPACE - self.covered) as f64 / avg) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_value() {
        assert_eq!(prefix_value("0000").unwrap(), 0);
        assert_eq!(prefix_value("0001").unwrap(), 1);
        assert_eq!(prefix_value("000v").unwrap(), 31);
        assert_eq!(prefix_value("vvvv").unwrap(), KEYSPACE - 1);
        assert_eq!(
            prefix_value("0p9mhaveqvm6t7vbl5lop2u3t2rp3tom").unwrap(),
            prefix_value("0p9m").unwrap()
        );
        assert!(prefix_value("0z00").is_err());
        assert!(prefix_value("0p").is_err());
    }

    #[test]
    fn test_range_length_wraparound() {
        // high < low wraps: (KEYSPACE - low) + high
        let low = "vvv0";
        let high = "0003";
        let expected = (KEYSPACE - prefix_value(low).unwrap()) + prefix_value(high).unwrap();
        assert_eq!(range_length(low, high).unwrap(), expected);
        assert_eq!(range_length(low, high).unwrap(), 31 + 3);
    }

    #[test]
    fn test_range_length_plain() {
        assert_eq!(range_length("0001", "0004").unwrap(), 3);
        assert_eq!(range_length("aaaa", "aaaa").unwrap(), 0);
    }

    #[test]
    fn test_hash_covered() {
        assert!(hash_covered("bbbb", "aaaa", "cccc"));
        assert!(!hash_covered("aaaa", "aaaa", "cccc"));
        assert!(!hash_covered("cccc", "aaaa", "cccc"));
        assert!(!hash_covered("dddd", "aaaa", "cccc"));
    }

    #[test]
    fn test_hash_covered_wraparound() {
        // Range from near the top back around to the bottom
        assert!(hash_covered("vvvv", "vvv0", "0003"));
        assert!(hash_covered("0001", "vvv0", "0003"));
        assert!(!hash_covered("5555", "vvv0", "0003"));
        assert!(!hash_covered("vvv0", "vvv0", "0003"));
    }

    #[test]
    fn test_coverage_monotone_and_bounded() {
        let mut stats = CoverageStats::new();
        let mut last = 0;
        for _ in 0..100 {
            stats.add_range(KEYSPACE / 64);
            assert!(stats.covered() >= last);
            assert!(stats.covered() <= KEYSPACE);
            last = stats.covered();
        }
        assert!(stats.fraction() <= 1.0);
    }

    #[test]
    fn test_estimated_remaining() {
        let mut stats = CoverageStats::new();
        assert_eq!(stats.estimated_remaining(), 0);

        stats.add_range(KEYSPACE / 4);
        // Three quarters left at one quarter per range
        assert_eq!(stats.estimated_remaining(), 3);
    }
}
