// Response shapes of the web console API
//
// Each endpoint wraps its payload in a single top-level key; the
// `*Response` envelopes make that key mandatory so a missing key fails
// with a deserialization error instead of yielding an empty value.
// Unknown fields are kept in `extra` so `info` can show the full record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Envelopes ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct DevicesResponse {
    pub devices: Vec<DeviceRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccountDetailsResponse {
    pub account_details: Vec<LinkedService>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlayerInfoResponse {
    pub player_info: PlayerInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueueInfoResponse {
    pub queue_info: QueueInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResponse {
    pub browse_list: Vec<Station>,
}

// ── Devices ──────────────────────────────────────────────────────────

/// One device as listed by `/api/devices-v2/device`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub serial_number: String,
    pub device_type: String,
    /// Display name chosen by the owner (e.g. "Kitchen").
    pub account_name: String,
    /// Remote-control capability tags. Empty means not controllable.
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeviceRecord {
    pub fn is_controllable(&self) -> bool {
        !self.capabilities.is_empty()
    }
}

// ── Player / queue ───────────────────────────────────────────────────

/// Current player state of a device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    /// `PLAYING`, `PAUSED`, `IDLE`, ... or absent when nothing is loaded.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub info_text: Option<InfoText>,
    #[serde(default)]
    pub volume: Option<PlayerVolume>,
    #[serde(default)]
    pub provider: Option<Provider>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlayerInfo {
    /// Title of the current item, if any.
    pub fn title(&self) -> Option<&str> {
        self.info_text.as_ref()?.title.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoText {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sub_text1: Option<String>,
    #[serde(default)]
    pub sub_text2: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerVolume {
    #[serde(default)]
    pub volume: Option<i64>,
    #[serde(default)]
    pub mute_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    #[serde(default)]
    pub provider_name: Option<String>,
}

/// Current play queue of a device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueInfo {
    #[serde(default)]
    pub queue: Option<Vec<Value>>,
    #[serde(default)]
    pub queue_size: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Service linkage ──────────────────────────────────────────────────

/// A third-party integration linked to the account (e.g. `TUNE_IN`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedService {
    pub service: String,
    #[serde(default)]
    pub accounts: Vec<ServiceAccount>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One linked account of a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccount {
    pub customer_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Search ───────────────────────────────────────────────────────────

/// A radio station returned by a TuneIn search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// Guide id used to queue the station.
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
