//! Ad selection — picks one eligible ad from a candidate set.

use crate::eligibility::is_eligible;
use adserve_core::{Ad, AdId};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

/// How the selector breaks ties when several ads are eligible.
///
/// Weighted selection is a deliberate extension point: add a variant here
/// rather than changing the selection entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Every eligible ad has equal probability.
    UniformRandom,
    /// Prefer a specific ad; fall back to uniform-random over the other
    /// eligible candidates when it is missing or no longer eligible.
    ExplicitId(AdId),
}

/// Select one eligible ad from `candidates`, or `None` when nothing is
/// currently displayable. Stateless across calls.
pub fn select_ad<'a>(
    candidates: &'a [Ad],
    now: DateTime<Utc>,
    policy: SelectionPolicy,
) -> Option<&'a Ad> {
    select_ad_with(&mut rand::thread_rng(), candidates, now, policy)
}

/// Same as [`select_ad`] with a caller-supplied RNG, so random tie-breaks
/// can be reproduced.
pub fn select_ad_with<'a, R: Rng + ?Sized>(
    rng: &mut R,
    candidates: &'a [Ad],
    now: DateTime<Utc>,
    policy: SelectionPolicy,
) -> Option<&'a Ad> {
    let eligible: Vec<&Ad> = candidates.iter().filter(|ad| is_eligible(ad, now)).collect();

    if eligible.is_empty() {
        debug!(candidates = candidates.len(), "No eligible ad for placement");
        return None;
    }

    // A single survivor needs no randomness; keeps one-ad groups deterministic.
    if eligible.len() == 1 {
        return Some(eligible[0]);
    }

    if let SelectionPolicy::ExplicitId(wanted) = policy {
        if let Some(ad) = eligible.iter().find(|ad| ad.id == wanted) {
            return Some(ad);
        }
        debug!(ad_id = %wanted, "Requested ad not eligible, falling back to random");
    }

    eligible.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn ad() -> Ad {
        let now = Utc::now();
        Ad {
            id: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
            asset_id: None,
            target_url: String::new(),
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

    fn expired_ad() -> Ad {
        let mut ad = ad();
        ad.start_date = Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        ad.end_date = Some(Utc.with_ymd_and_hms(2020, 1, 31, 0, 0, 0).unwrap());
        ad
    }

    #[test]
    fn test_empty_candidate_set() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(select_ad_with(&mut rng, &[], Utc::now(), SelectionPolicy::UniformRandom).is_none());
    }

    #[test]
    fn test_no_eligible_candidates() {
        let mut rng = StdRng::seed_from_u64(7);
        let ads = vec![expired_ad(), expired_ad()];
        for policy in [
            SelectionPolicy::UniformRandom,
            SelectionPolicy::ExplicitId(ads[0].id),
        ] {
            assert!(select_ad_with(&mut rng, &ads, Utc::now(), policy).is_none());
        }
    }

    #[test]
    fn test_single_eligible_ad_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(7);
        let ads = vec![expired_ad(), ad(), expired_ad()];
        for _ in 0..50 {
            let chosen =
                select_ad_with(&mut rng, &ads, Utc::now(), SelectionPolicy::UniformRandom).unwrap();
            assert_eq!(chosen.id, ads[1].id);
        }
    }

    #[test]
    fn test_uniform_random_reaches_all_eligible() {
        let mut rng = StdRng::seed_from_u64(42);
        let ads = vec![ad(), ad(), ad()];
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let chosen =
                select_ad_with(&mut rng, &ads, Utc::now(), SelectionPolicy::UniformRandom).unwrap();
            seen.insert(chosen.id);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_explicit_id_returns_requested_ad() {
        let mut rng = StdRng::seed_from_u64(42);
        let ads = vec![ad(), ad(), ad()];
        let wanted = ads[2].id;
        for _ in 0..20 {
            let chosen = select_ad_with(
                &mut rng,
                &ads,
                Utc::now(),
                SelectionPolicy::ExplicitId(wanted),
            )
            .unwrap();
            assert_eq!(chosen.id, wanted);
        }
    }

    #[test]
    fn test_explicit_id_falls_back_when_ineligible() {
        let mut rng = StdRng::seed_from_u64(42);
        let ineligible = expired_ad();
        let wanted = ineligible.id;
        let ads = vec![ineligible, ad(), ad()];

        for _ in 0..100 {
            let chosen = select_ad_with(
                &mut rng,
                &ads,
                Utc::now(),
                SelectionPolicy::ExplicitId(wanted),
            )
            .unwrap();
            assert_ne!(chosen.id, wanted, "must never return the ineligible ad");
        }
    }

    #[test]
    fn test_explicit_id_unknown_falls_back() {
        let mut rng = StdRng::seed_from_u64(42);
        let ads = vec![ad(), ad()];
        let chosen = select_ad_with(
            &mut rng,
            &ads,
            Utc::now(),
            SelectionPolicy::ExplicitId(Uuid::new_v4()),
        );
        assert!(chosen.is_some());
    }

    #[test]
    fn test_budget_exhausted_ad_excluded_after_increment() {
        let mut nearly_spent = ad();
        nearly_spent.max_views = 100;
        nearly_spent.total_views = 99;
        let now = Utc::now() + Duration::seconds(1);

        let ads = vec![nearly_spent];
        assert!(select_ad(&ads, now, SelectionPolicy::UniformRandom).is_some());

        let mut ads = ads;
        ads[0].total_views = 100;
        assert!(select_ad(&ads, now, SelectionPolicy::UniformRandom).is_none());
    }
}
