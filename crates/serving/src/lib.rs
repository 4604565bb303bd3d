//! Serving — the render-path facade.
//!
//! A render request names a group (or a specific ad). The server filters the
//! group's ads through eligibility, picks one, records the impression, and
//! returns a renderable placement. Click tracking runs independently of the
//! render that granted the impression.

use adserve_core::config::ServingConfig;
use adserve_core::{effective_layout, Ad, AdGroup, AdId, AdServeError, AdServeResult};
use adserve_delivery::{is_eligible, select_ad, SelectionPolicy};
use adserve_ledger::CounterLedger;
use adserve_store::AdStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// One filled placement, ready for the rendering collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdPlacement {
    pub ad_id: AdId,
    pub group_id: Uuid,
    pub asset_id: Option<Uuid>,
    /// Click-through destination. Empty when the ad has no target.
    pub target_url: String,
    /// Opaque presentation data carried from the ad record.
    pub payload: serde_json::Value,
    /// Resolved field layout: ad override, else group default.
    pub layout: Option<serde_json::Value>,
}

/// Render-path entry point. Takes its collaborators explicitly; owns none
/// of their state.
pub struct AdServer {
    store: Arc<AdStore>,
    ledger: Arc<CounterLedger>,
    config: ServingConfig,
}

impl AdServer {
    pub fn new(store: Arc<AdStore>, ledger: Arc<CounterLedger>, config: ServingConfig) -> Self {
        info!(
            fallback_url = %config.fallback_url,
            "Ad server initialized"
        );
        Self {
            store,
            ledger,
            config,
        }
    }

    /// Fill a placement from a group, identified by handle.
    ///
    /// `Ok(None)` means nothing is eligible right now; callers render an
    /// empty slot. An unknown handle is a configuration error.
    pub fn serve_group(
        &self,
        handle: &str,
        policy: SelectionPolicy,
        now: DateTime<Utc>,
    ) -> AdServeResult<Option<AdPlacement>> {
        let group = self
            .store
            .group_by_handle(handle)
            .ok_or_else(|| AdServeError::UnknownGroup(handle.to_string()))?;

        let candidates = self.fresh_candidates(group.id);
        let chosen = select_ad(&candidates, now, policy).cloned();

        match chosen {
            Some(ad) => {
                self.ledger.record_impression(ad.id);
                metrics::counter!("ads.served").increment(1);
                Ok(Some(self.placement(ad, &group)))
            }
            None => {
                metrics::counter!("ads.no_fill").increment(1);
                debug!(handle = handle, "No eligible ad in group");
                Ok(None)
            }
        }
    }

    /// Fill a placement with a specific ad. The singleton candidate still
    /// passes through eligibility: an exhausted or out-of-window ad is not
    /// shown just because it was named directly.
    pub fn serve_ad(&self, ad_id: AdId, now: DateTime<Utc>) -> AdServeResult<Option<AdPlacement>> {
        let Some(mut ad) = self.store.get_ad(ad_id) else {
            return Err(AdServeError::UnknownAd(ad_id));
        };
        self.overlay_counters(&mut ad);

        if !is_eligible(&ad, now) {
            metrics::counter!("ads.no_fill").increment(1);
            return Ok(None);
        }

        let group = self
            .store
            .get_group(ad.group_id)
            .ok_or_else(|| AdServeError::UnknownGroup(ad.group_id.to_string()))?;

        self.ledger.record_impression(ad.id);
        metrics::counter!("ads.served").increment(1);
        Ok(Some(self.placement(ad, &group)))
    }

    /// Record a click and return the redirect target. Unknown ids are a
    /// silent no-op (`None`): a stale tracking link must not fail. A click
    /// on an ad that has since become ineligible still counts.
    pub fn click_through(&self, ad_id: AdId) -> Option<String> {
        let ad = self.store.get_ad(ad_id)?;
        self.ledger.track(ad_id, ad.total_views, ad.total_clicks);
        self.ledger.record_click(ad_id);

        if ad.target_url.is_empty() {
            Some(self.config.fallback_url.clone())
        } else {
            Some(ad.target_url)
        }
    }

    /// Group candidates with live counters overlaid, so eligibility sees
    /// at-most-mildly-stale totals instead of the persisted snapshot.
    fn fresh_candidates(&self, group_id: Uuid) -> Vec<Ad> {
        let mut ads = self.store.ads_in_group(group_id);
        for ad in &mut ads {
            self.overlay_counters(ad);
        }
        ads
    }

    /// Tracking is idempotent, so first contact seeds the ledger from the
    /// stored snapshot and every later call just reads the live totals.
    fn overlay_counters(&self, ad: &mut Ad) {
        self.ledger.track(ad.id, ad.total_views, ad.total_clicks);
        if let Some(snap) = self.ledger.totals(&ad.id) {
            ad.total_views = snap.total_views;
            ad.total_clicks = snap.total_clicks;
        }
    }

    fn placement(&self, ad: Ad, group: &AdGroup) -> AdPlacement {
        let layout = effective_layout(&ad, group).cloned();
        AdPlacement {
            ad_id: ad.id,
            group_id: group.id,
            asset_id: ad.asset_id,
            target_url: ad.target_url,
            payload: ad.payload,
            layout,
        }
    }
}
