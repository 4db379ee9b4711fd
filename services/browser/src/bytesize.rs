//! Human readable byte sizes in SI (base 1000) units.

use std::fmt;

const UNIT: i64 = 1000;

/// SI prefixes for 10^3 through 10^18. `i64::MAX` is about 9.2 EB, so the
/// table covers every byte count.
const PREFIXES: [char; 6] = ['k', 'M', 'G', 'T', 'P', 'E'];

/// A byte count which displays in SI units, e.g. `1.2 MB`.
///
/// Counts below 1000 (including negative counts) display as whole bytes,
/// `999 B`. Larger counts display with one decimal digit, truncated, so the
/// number shown is always in `[1.0, 1000.0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SiBytes(pub i64);

impl fmt::Display for SiBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0;
        if bytes < UNIT {
            return write!(f, "{bytes} B");
        }

        // `divisor * UNIT <= bytes` whenever the divisor grows, so it cannot overflow.
        let mut divisor = UNIT;
        let mut exponent = 0;
        while bytes / divisor >= UNIT {
            divisor *= UNIT;
            exponent += 1;
        }

        let tenths = i128::from(bytes) * 10 / i128::from(divisor);
        write!(
            f,
            "{}.{} {}B",
            tenths / 10,
            tenths % 10,
            PREFIXES[exponent]
        )
    }
}

/// Format a byte count in SI units. See [SiBytes].
pub fn format_si(bytes: i64) -> String {
    SiBytes(bytes).to_string()
}
