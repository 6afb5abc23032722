//! Delay report snapshot as delivered by the reporting API and push endpoint.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::ReportStatus;

/// Opaque report identifier assigned by the reporting API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub String);

impl ReportId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReportId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Where a delay was observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Mode of transport the report concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    Bus,
    Train,
    Metro,
    Tram,
}

/// How badly service is affected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
}

/// Reported cause of the delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayCategory {
    Mechanical,
    Signal,
    Weather,
    Accident,
    Crowding,
    StaffShortage,
    Other,
}

/// Display info for the user who submitted a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportAuthor {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A single user-submitted transit-delay observation.
///
/// Required fields must be present on the wire; a payload missing any of
/// them fails to parse. Vote counters arriving negative are clamped to zero
/// and an unrecognised status reads as `Pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayReport {
    pub id: ReportId,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ReportAuthor>,
    pub location: Location,
    pub transport_type: TransportType,
    pub line: String,
    pub severity: Severity,
    pub category: DelayCategory,
    pub description: String,
    /// Estimated delay in minutes
    pub estimated_delay: u32,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(deserialize_with = "lenient_status")]
    pub status: ReportStatus,
    #[serde(deserialize_with = "clamped_count")]
    pub upvotes: u32,
    #[serde(deserialize_with = "clamped_count")]
    pub downvotes: u32,
    /// ISO-8601 submission time, as sent by the API
    pub reported_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<String>,
    #[serde(default)]
    pub verified_by: Vec<String>,
}

impl DelayReport {
    /// Whether `user_id` submitted this report.
    ///
    /// Callers use this to keep owners from voting on their own reports.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Whether the report is currently in the verified state.
    pub fn is_verified(&self) -> bool {
        self.status == ReportStatus::Verified
    }
}

fn clamped_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, i64::from(u32::MAX)) as u32)
}

fn lenient_status<'de, D>(deserializer: D) -> Result<ReportStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(ReportStatus::parse_or_pending(&raw))
}
