//! Eligibility evaluation — pure checks over an ad snapshot and an instant.

use adserve_core::Ad;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why an ad cannot be shown right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibleReason {
    /// `start_date > end_date`. Fail safe: such an ad never runs.
    MalformedWindow,
    NotStarted,
    Expired,
    BudgetExhausted,
}

/// Evaluate an ad against the current instant.
///
/// Pure function over the snapshot it is given; safe to call with a slightly
/// stale counter value, at the cost of a bounded budget overshoot (see the
/// counter ledger).
pub fn ineligibility_reason(ad: &Ad, now: DateTime<Utc>) -> Option<IneligibleReason> {
    if let (Some(start), Some(end)) = (ad.start_date, ad.end_date) {
        if start > end {
            return Some(IneligibleReason::MalformedWindow);
        }
    }
    if let Some(start) = ad.start_date {
        if now < start {
            return Some(IneligibleReason::NotStarted);
        }
    }
    if let Some(end) = ad.end_date {
        if now > end {
            return Some(IneligibleReason::Expired);
        }
    }
    if ad.max_views > 0 && ad.total_views >= ad.max_views {
        return Some(IneligibleReason::BudgetExhausted);
    }
    None
}

/// True when the ad is currently displayable.
pub fn is_eligible(ad: &Ad, now: DateTime<Utc>) -> bool {
    ineligibility_reason(ad, now).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn ad() -> Ad {
        let now = Utc::now();
        Ad {
            id: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
            asset_id: None,
            target_url: "https://example.com".to_string(),
            start_date: None,
            end_date: None,
            max_views: 0,
            total_views: 0,
            total_clicks: 0,
            payload: serde_json::Value::Null,
            layout: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    // 1. Window checks ------------------------------------------------------

    #[test]
    fn test_unbounded_window_always_eligible() {
        let ad = ad();
        assert!(is_eligible(&ad, date(2000, 1, 1)));
        assert!(is_eligible(&ad, date(2050, 1, 1)));
    }

    #[test]
    fn test_window_bounds() {
        let mut ad = ad();
        ad.start_date = Some(date(2024, 1, 1));
        ad.end_date = Some(date(2024, 1, 31));

        assert!(is_eligible(&ad, date(2024, 1, 15)));
        assert!(is_eligible(&ad, date(2024, 1, 1)));
        assert!(is_eligible(&ad, date(2024, 1, 31)));
        assert_eq!(
            ineligibility_reason(&ad, date(2023, 12, 31)),
            Some(IneligibleReason::NotStarted)
        );
        assert_eq!(
            ineligibility_reason(&ad, date(2024, 2, 1)),
            Some(IneligibleReason::Expired)
        );
    }

    #[test]
    fn test_open_ended_window() {
        let mut ad = ad();
        ad.start_date = Some(date(2024, 1, 1));
        assert!(is_eligible(&ad, date(2049, 6, 1)));
        assert!(!is_eligible(&ad, date(2023, 6, 1)));

        let mut ad = self::ad();
        ad.end_date = Some(date(2024, 1, 31));
        assert!(is_eligible(&ad, date(2000, 6, 1)));
        assert!(!is_eligible(&ad, date(2024, 6, 1)));
    }

    #[test]
    fn test_malformed_window_never_eligible() {
        let mut ad = ad();
        ad.start_date = Some(date(2024, 2, 1));
        ad.end_date = Some(date(2024, 1, 1));

        // Ineligible even at instants inside either bound.
        for day in [date(2023, 12, 1), date(2024, 1, 15), date(2024, 3, 1)] {
            assert_eq!(
                ineligibility_reason(&ad, day),
                Some(IneligibleReason::MalformedWindow)
            );
        }
    }

    // 2. Budget checks ------------------------------------------------------

    #[test]
    fn test_zero_max_views_is_unlimited() {
        let mut ad = ad();
        ad.total_views = u64::MAX;
        assert!(is_eligible(&ad, Utc::now()));
    }

    #[test]
    fn test_budget_exhaustion() {
        let mut ad = ad();
        ad.max_views = 100;
        ad.total_views = 99;
        assert!(is_eligible(&ad, Utc::now()));

        ad.total_views = 100;
        assert_eq!(
            ineligibility_reason(&ad, Utc::now()),
            Some(IneligibleReason::BudgetExhausted)
        );

        // Overshoot past the budget stays ineligible.
        ad.total_views = 103;
        assert!(!is_eligible(&ad, Utc::now()));
    }
}
