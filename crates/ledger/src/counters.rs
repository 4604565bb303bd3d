//! In-process authoritative counters backed by DashMap and atomics.
//!
//! The increment is the unit of atomicity: concurrent increments on the same
//! ad are all applied via `fetch_add`, with no lock held across a request.
//! Eligibility is checked at selection time, never here, so a tight
//! `max_views` budget can overshoot by at most the number of renders in
//! flight when the last increment lands.

use adserve_core::AdId;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

#[derive(Debug, Default)]
struct AdCounters {
    views: AtomicU64,
    clicks: AtomicU64,
    flushed_views: AtomicU64,
    flushed_clicks: AtomicU64,
}

/// Live totals for one ad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub total_views: u64,
    pub total_clicks: u64,
}

/// Unflushed increments for one ad, handed to the persistence sink.
#[derive(Debug, Clone, Copy)]
pub struct CounterDelta {
    pub ad_id: AdId,
    pub views: u64,
    pub clicks: u64,
}

/// Lock-free impression/click ledger.
///
/// Only tracked ads accumulate counts; an increment for an unknown id is a
/// logged no-op so a stale or tampered tracking request cannot fail.
pub struct CounterLedger {
    counters: DashMap<AdId, AdCounters>,
}

impl CounterLedger {
    pub fn new() -> Self {
        Self {
            counters: DashMap::new(),
        }
    }

    /// Register an ad, seeding its persisted totals. Idempotent: re-tracking
    /// an already-tracked ad keeps the live counters.
    pub fn track(&self, ad_id: AdId, total_views: u64, total_clicks: u64) {
        self.counters.entry(ad_id).or_insert_with(|| AdCounters {
            views: AtomicU64::new(total_views),
            clicks: AtomicU64::new(total_clicks),
            flushed_views: AtomicU64::new(total_views),
            flushed_clicks: AtomicU64::new(total_clicks),
        });
    }

    /// Stop counting for a deleted ad. Unflushed increments are dropped.
    pub fn untrack(&self, ad_id: &AdId) {
        self.counters.remove(ad_id);
    }

    /// Count one impression. Never re-validates eligibility: an impression
    /// already granted by the selector is always counted.
    pub fn record_impression(&self, ad_id: AdId) {
        match self.counters.get(&ad_id) {
            Some(entry) => {
                entry.views.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("ads.impressions").increment(1);
            }
            None => {
                debug!(ad_id = %ad_id, "Impression for untracked ad ignored");
                metrics::counter!("ads.impressions_unknown").increment(1);
            }
        }
    }

    /// Count one click. Does not require a prior impression.
    pub fn record_click(&self, ad_id: AdId) {
        match self.counters.get(&ad_id) {
            Some(entry) => {
                entry.clicks.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("ads.clicks").increment(1);
            }
            None => {
                debug!(ad_id = %ad_id, "Click for untracked ad ignored");
                metrics::counter!("ads.clicks_unknown").increment(1);
            }
        }
    }

    /// Live totals for an ad, or `None` when it is not tracked.
    pub fn totals(&self, ad_id: &AdId) -> Option<CounterSnapshot> {
        self.counters.get(ad_id).map(|entry| CounterSnapshot {
            total_views: entry.views.load(Ordering::Acquire),
            total_clicks: entry.clicks.load(Ordering::Acquire),
        })
    }

    /// Extract all increments not yet handed to the sink.
    ///
    /// Counters are monotonic, so swapping the flushed watermark up to the
    /// current value is loss-free even while increments keep arriving:
    /// anything landing after the load is picked up by the next drain.
    /// Assumes a single draining task.
    pub fn drain_deltas(&self) -> Vec<CounterDelta> {
        let mut deltas = Vec::new();
        for entry in self.counters.iter() {
            let views = entry.views.load(Ordering::Acquire);
            let clicks = entry.clicks.load(Ordering::Acquire);
            let flushed_views = entry.flushed_views.swap(views, Ordering::AcqRel);
            let flushed_clicks = entry.flushed_clicks.swap(clicks, Ordering::AcqRel);

            let view_delta = views.saturating_sub(flushed_views);
            let click_delta = clicks.saturating_sub(flushed_clicks);
            if view_delta > 0 || click_delta > 0 {
                deltas.push(CounterDelta {
                    ad_id: *entry.key(),
                    views: view_delta,
                    clicks: click_delta,
                });
            }
        }
        deltas
    }

    pub fn tracked_count(&self) -> usize {
        self.counters.len()
    }
}

impl Default for CounterLedger {
    fn default() -> Self {
        Self::new()
    }
}
