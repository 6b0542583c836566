//! Minimum line-coverage gate.

/// Tolerance absorbing floating point noise in reported percentages.
pub const EPSILON: f64 = 1e-6;

/// Result of comparing measured line coverage with the required minimum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// No threshold (zero or negative) was configured.
    Disabled,
    Met,
    Below { shortfall: f64 },
}

impl Verdict {
    pub fn passed(&self) -> bool {
        !matches!(self, Verdict::Below { .. })
    }
}

/// Compares `line_percent` against `threshold`.
///
/// A threshold of zero or less disables the gate. Otherwise coverage within
/// `EPSILON` below the threshold still counts as met.
pub fn check(line_percent: f64, threshold: f64) -> Verdict {
    if threshold <= 0.0 {
        return Verdict::Disabled;
    }
    if line_percent + EPSILON < threshold {
        Verdict::Below {
            shortfall: threshold - line_percent,
        }
    } else {
        Verdict::Met
    }
}
