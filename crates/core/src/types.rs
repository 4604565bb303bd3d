use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an ad. Assigned at creation, never reused.
pub type AdId = Uuid;

/// A rotating advertisement placement.
///
/// Counters are owned by the counter ledger; `total_views` and
/// `total_clicks` on a stored record are the last persisted snapshot and
/// may lag the live values by a small number of in-flight renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ad {
    pub id: AdId,
    /// Owning group. Required; validated at save time, trusted at render time.
    pub group_id: Uuid,
    /// Linked creative asset. Absent for text/link-only ads.
    pub asset_id: Option<Uuid>,
    /// Click-through target. May be empty for ads without a destination.
    pub target_url: String,
    /// Start of the active window; no lower bound when absent.
    pub start_date: Option<DateTime<Utc>>,
    /// End of the active window; no upper bound when absent.
    pub end_date: Option<DateTime<Utc>>,
    /// Impression budget. `0` means unlimited.
    pub max_views: u64,
    pub total_views: u64,
    pub total_clicks: u64,
    /// Opaque presentation data (title, body fields). Carried, not interpreted.
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Ad-level field-layout override. Falls back to the group default.
    #[serde(default)]
    pub layout: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named bucket of ads sharing a placement context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdGroup {
    pub id: Uuid,
    /// URL-safe unique name, used to resolve placements.
    pub handle: String,
    /// Display label.
    pub name: String,
    /// Group-level default field layout.
    #[serde(default)]
    pub layout: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resolve the field layout for an ad: ad-level override first, else the
/// owning group's default.
pub fn effective_layout<'a>(ad: &'a Ad, group: &'a AdGroup) -> Option<&'a serde_json::Value> {
    ad.layout.as_ref().or(group.layout.as_ref())
}
