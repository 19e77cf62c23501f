use std::cmp::Ordering;

/// Weight in kg, compared with a tolerance through [`float_cmp::approx_eq!()`].
/// Tallies are summed in varying orders (placements, removals, replays), so a load that exactly
/// matches a capacity must not be rejected over rounding noise.
#[derive(Debug, Clone, Copy)]
pub struct FPA(pub f64);

impl FPA {
    /// Whether adding `extra` to `used` stays within `capacity`.
    pub fn fits(used: f64, extra: f64, capacity: f64) -> bool {
        FPA(used + extra) <= FPA(capacity)
    }
}

impl PartialEq<Self> for FPA {
    fn eq(&self, other: &Self) -> bool {
        float_cmp::approx_eq!(f64, self.0, other.0, epsilon = 1e-9, ulps = 4)
    }
}

impl PartialOrd<Self> for FPA {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.eq(other) {
            true => Some(Ordering::Equal),
            false => self.0.partial_cmp(&other.0),
        }
    }
}
