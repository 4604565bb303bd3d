//! Administrative request payloads.
//!
//! Double-`Option` fields on the update request distinguish "leave as is"
//! (outer `None`) from "clear the value" (`Some(None)`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub layout: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAdRequest {
    pub group_id: Uuid,
    #[serde(default)]
    pub asset_id: Option<Uuid>,
    #[serde(default)]
    pub target_url: String,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_views: u64,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub layout: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAdRequest {
    pub group_id: Option<Uuid>,
    pub asset_id: Option<Option<Uuid>>,
    pub target_url: Option<String>,
    pub start_date: Option<Option<DateTime<Utc>>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub max_views: Option<u64>,
    pub payload: Option<serde_json::Value>,
    pub layout: Option<Option<serde_json::Value>>,
}
