use serde::{Deserialize, Serialize};

/// A label attached to one or more clients, used to scope report queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientLabel {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// Listing entry for a server-side report, as returned by the stats API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDescriptor {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(rename = "type", default)]
    pub report_type: String,
    #[serde(default)]
    pub requires_time_range: bool,
}
