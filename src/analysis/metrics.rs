//! Rate calculations shared by every aggregation level.
//!
//! All zero-denominator handling lives here so per-event, per-bucket and
//! overall figures follow one convention.

/// ROI reported when an event made money without spending any.
///
/// This is a display flag, not a percentage. Callers must check for it
/// (see [`crate::models::RoiValue::is_sentinel`]) before doing arithmetic.
pub const ROI_SENTINEL: f64 = 9999.0;

/// Return on investment as a percentage of expenses.
///
/// Zero expenses resolve to [`ROI_SENTINEL`] when there is revenue and to
/// 0 otherwise, so the result is always finite.
pub fn roi(revenue: f64, expenses: f64) -> f64 {
    if expenses > 0.0 {
        ((revenue - expenses) / expenses) * 100.0
    } else if revenue > 0.0 {
        ROI_SENTINEL
    } else {
        0.0
    }
}

/// Clients acquired per attendee, as a percentage. 0 with no attendees.
pub fn conversion_rate(clients: u64, attendees: u64) -> f64 {
    if attendees > 0 {
        (clients as f64 / attendees as f64) * 100.0
    } else {
        0.0
    }
}

/// Mean of `total` over `count`, 0 for an empty set.
pub fn average(total: u64, count: usize) -> f64 {
    if count > 0 {
        total as f64 / count as f64
    } else {
        0.0
    }
}

/// Replace NaN and infinities with 0 before they reach a sum.
pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roi_with_expenses() {
        assert_eq!(roi(1500.0, 500.0), 200.0);
        assert_eq!(roi(250.0, 500.0), -50.0);
        assert_eq!(roi(0.0, 500.0), -100.0);
    }

    #[test]
    fn test_roi_zero_expenses() {
        assert_eq!(roi(1000.0, 0.0), ROI_SENTINEL);
        assert_eq!(roi(0.0, 0.0), 0.0);
        assert_eq!(roi(-10.0, 0.0), 0.0);
    }

    #[test]
    fn test_conversion_rate() {
        assert_eq!(conversion_rate(2, 10), 20.0);
        assert_eq!(conversion_rate(5, 0), 0.0);
        assert_eq!(conversion_rate(0, 0), 0.0);
    }

    #[test]
    fn test_average() {
        assert_eq!(average(30, 3), 10.0);
        assert_eq!(average(7, 0), 0.0);
    }

    #[test]
    fn test_finite_or_zero() {
        assert_eq!(finite_or_zero(12.5), 12.5);
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
    }
}
