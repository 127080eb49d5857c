//! Models for the two Google Takeout export shapes the transfer accepts.
//! Fields default so partial dumps still parse; unknown fields are ignored.

use serde::Deserialize;

/// One entry of a Takeout subscriptions export.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubscriptionRecord {
    pub content_details: SubscriptionActivity,
    pub snippet: SubscriptionSnippet,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubscriptionActivity {
    pub activity_type: String,
    pub new_item_count: i64,
    pub total_item_count: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubscriptionSnippet {
    pub title: String,
    pub published_at: String,
    pub resource_id: ChannelRef,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelRef {
    pub channel_id: String,
}

/// One entry of a Takeout playlist export.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaylistItemRecord {
    pub content_details: VideoDetails,
    pub snippet: PlaylistItemSnippet,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoDetails {
    pub video_id: String,
    pub video_published_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaylistItemSnippet {
    pub playlist_id: String,
    pub position: i64,
}

pub fn parse_subscriptions(raw: &str) -> Result<Vec<SubscriptionRecord>, serde_json::Error> {
    serde_json::from_str(raw)
}

pub fn parse_playlist_items(raw: &str) -> Result<Vec<PlaylistItemRecord>, serde_json::Error> {
    serde_json::from_str(raw)
}
