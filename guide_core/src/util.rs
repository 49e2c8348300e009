//! Common time helpers for guide_core.

/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: f64 = 1_000.0;

/// Convert a millisecond count to seconds.
#[inline]
pub fn ms_to_secs(ms: f64) -> f64 {
    ms / MILLIS_PER_SEC
}

/// Exposure duration in seconds. Unlike integer division this keeps
/// sub-second exposures (e.g. 500 ms -> 0.5 s).
#[inline]
pub fn exposure_secs(exposure_ms: u32) -> f64 {
    ms_to_secs(f64::from(exposure_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_second_exposures_are_not_truncated() {
        assert_eq!(exposure_secs(500), 0.5);
        assert_eq!(exposure_secs(2500), 2.5);
        assert_eq!(exposure_secs(0), 0.0);
    }
}
