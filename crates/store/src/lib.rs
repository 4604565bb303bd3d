//! In-memory ad/group store backed by DashMap.
//!
//! Production: replace with PostgreSQL (sqlx) or similar ACID store.
//! This provides the same API surface for development and testing.
//! Counters are deliberately absent from the update surface: they belong to
//! the counter ledger and are only overlaid onto snapshots at render time.

pub mod requests;

use adserve_core::{Ad, AdGroup, AdId, AdServeError, AdServeResult};
use chrono::Utc;
use dashmap::DashMap;
use crate::requests::{CreateAdRequest, CreateGroupRequest, UpdateAdRequest};
use tracing::info;
use uuid::Uuid;

/// Thread-safe in-memory store for ad groups and ads.
pub struct AdStore {
    groups: DashMap<Uuid, AdGroup>,
    ads: DashMap<AdId, Ad>,
}

impl AdStore {
    pub fn new() -> Self {
        Self {
            groups: DashMap::new(),
            ads: DashMap::new(),
        }
    }

    // ─── Groups ────────────────────────────────────────────────────────────

    pub fn create_group(&self, req: CreateGroupRequest) -> AdServeResult<AdGroup> {
        if self.group_by_handle(&req.handle).is_some() {
            return Err(AdServeError::DuplicateHandle(req.handle));
        }
        let now = Utc::now();
        let group = AdGroup {
            id: Uuid::new_v4(),
            handle: req.handle,
            name: req.name,
            layout: req.layout,
            created_at: now,
            updated_at: now,
        };
        self.groups.insert(group.id, group.clone());
        Ok(group)
    }

    pub fn get_group(&self, id: Uuid) -> Option<AdGroup> {
        self.groups.get(&id).map(|r| r.value().clone())
    }

    pub fn group_by_handle(&self, handle: &str) -> Option<AdGroup> {
        self.groups
            .iter()
            .find(|r| r.value().handle == handle)
            .map(|r| r.value().clone())
    }

    pub fn list_groups(&self) -> Vec<AdGroup> {
        let mut groups: Vec<AdGroup> = self.groups.iter().map(|r| r.value().clone()).collect();
        groups.sort_by(|a, b| a.handle.cmp(&b.handle));
        groups
    }

    // ─── Ads ───────────────────────────────────────────────────────────────

    /// Create an ad. Referencing a nonexistent group is a configuration
    /// error surfaced here, at save time, never at render time.
    pub fn create_ad(&self, req: CreateAdRequest) -> AdServeResult<Ad> {
        if !self.groups.contains_key(&req.group_id) {
            return Err(AdServeError::UnknownGroup(req.group_id.to_string()));
        }
        let now = Utc::now();
        let ad = Ad {
            id: Uuid::new_v4(),
            group_id: req.group_id,
            asset_id: req.asset_id,
            target_url: req.target_url,
            start_date: req.start_date,
            end_date: req.end_date,
            max_views: req.max_views,
            total_views: 0,
            total_clicks: 0,
            payload: req.payload,
            layout: req.layout,
            created_at: now,
            updated_at: now,
        };
        self.ads.insert(ad.id, ad.clone());
        info!(ad_id = %ad.id, group_id = %ad.group_id, "Ad created");
        Ok(ad)
    }

    pub fn get_ad(&self, id: AdId) -> Option<Ad> {
        self.ads.get(&id).map(|r| r.value().clone())
    }

    /// Administrative edit of everything except the counters.
    pub fn update_ad(&self, id: AdId, req: UpdateAdRequest) -> AdServeResult<Ad> {
        if let Some(group_id) = req.group_id {
            if !self.groups.contains_key(&group_id) {
                return Err(AdServeError::UnknownGroup(group_id.to_string()));
            }
        }
        let mut entry = self
            .ads
            .get_mut(&id)
            .ok_or(AdServeError::UnknownAd(id))?;
        let ad = entry.value_mut();
        if let Some(group_id) = req.group_id {
            ad.group_id = group_id;
        }
        if let Some(asset_id) = req.asset_id {
            ad.asset_id = asset_id;
        }
        if let Some(url) = req.target_url {
            ad.target_url = url;
        }
        if let Some(start) = req.start_date {
            ad.start_date = start;
        }
        if let Some(end) = req.end_date {
            ad.end_date = end;
        }
        if let Some(max_views) = req.max_views {
            ad.max_views = max_views;
        }
        if let Some(payload) = req.payload {
            ad.payload = payload;
        }
        if let Some(layout) = req.layout {
            ad.layout = layout;
        }
        ad.updated_at = Utc::now();
        Ok(ad.clone())
    }

    pub fn delete_ad(&self, id: AdId) -> bool {
        self.ads.remove(&id).is_some()
    }

    /// Candidate list for a placement: every ad owned by the group,
    /// eligibility unfiltered.
    pub fn ads_in_group(&self, group_id: Uuid) -> Vec<Ad> {
        let mut ads: Vec<Ad> = self
            .ads
            .iter()
            .filter(|r| r.value().group_id == group_id)
            .map(|r| r.value().clone())
            .collect();
        ads.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        ads
    }

    pub fn list_ads(&self) -> Vec<Ad> {
        self.ads.iter().map(|r| r.value().clone()).collect()
    }

    pub fn ad_count(&self) -> usize {
        self.ads.len()
    }

    // ─── Demo Data ─────────────────────────────────────────────────────────

    /// Seed a couple of groups and ads for the demo host.
    pub fn seed_demo_data(&self) -> AdServeResult<()> {
        use chrono::Duration;
        let now = Utc::now();

        let sidebar = self.create_group(CreateGroupRequest {
            handle: "sidebar".to_string(),
            name: "Sidebar".to_string(),
            layout: Some(serde_json::json!({"fields": ["heading", "body"]})),
        })?;
        let footer = self.create_group(CreateGroupRequest {
            handle: "footer".to_string(),
            name: "Footer".to_string(),
            layout: None,
        })?;

        let ads = vec![
            ("Spring Sale", sidebar.id, Some(now - Duration::days(7)), Some(now + Duration::days(21)), 0),
            ("Newsletter Signup", sidebar.id, None, None, 0),
            ("Limited Preview", sidebar.id, Some(now - Duration::days(1)), Some(now + Duration::days(2)), 500),
            ("Expired Promo", sidebar.id, Some(now - Duration::days(60)), Some(now - Duration::days(30)), 0),
            ("Partner Banner", footer.id, None, None, 10_000),
        ];

        for (title, group_id, start_date, end_date, max_views) in ads {
            self.create_ad(CreateAdRequest {
                group_id,
                asset_id: Some(Uuid::new_v4()),
                target_url: format!("https://example.com/{}", title.to_lowercase().replace(' ', "-")),
                start_date,
                end_date,
                max_views,
                payload: serde_json::json!({"title": title}),
                layout: None,
            })?;
        }

        info!(groups = 2, ads = self.ad_count(), "Demo data seeded");
        Ok(())
    }
}

impl Default for AdStore {
    fn default() -> Self {
        Self::new()
    }
}
