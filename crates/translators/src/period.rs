//! Period translation.

use carebridge_fhir::Period;
use chrono::{DateTime, Utc};

/// Converts between a `(start, end)` timestamp pair and a [`Period`].
pub struct PeriodTranslator;

impl PeriodTranslator {
    /// `None` when neither side is set.
    pub fn to_period(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Option<Period> {
        (start.is_some() || end.is_some()).then_some(Period { start, end })
    }

    /// Writes each side the period carries; absent sides leave the target
    /// untouched.
    pub fn apply(
        period: Option<&Period>,
        start: &mut Option<DateTime<Utc>>,
        end: &mut Option<DateTime<Utc>>,
    ) {
        let Some(period) = period else {
            return;
        };
        if let Some(s) = period.start {
            *start = Some(s);
        }
        if let Some(e) = period.end {
            *end = Some(e);
        }
    }
}
