//! Typed events delivered over the push channel.
//!
//! The endpoint sends named events whose body is JSON:
//!
//! ```text
//! event: delay
//! data: {"type":"report_verified","report":{...}}
//!
//! event: route
//! data: {"type":"route_affected","routeId":"r1","affectedSegments":["s2"],"newDuration":41}
//! ```
//!
//! Required fields are checked here. A payload that fails to parse is
//! rejected as a whole; it is never partially delivered.

use std::fmt;
use std::str::FromStr;

use delaywatch_core::DelayReport;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Event category, as named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Report created or changed
    Delay,
    /// Route impact changed
    Route,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Delay, Category::Route];

    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Delay => "delay",
            Category::Route => "route",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| Error::UnknownCategory(s.to_string()))
    }
}

/// What happened to the report in a [`DelayUpdate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayUpdateKind {
    NewReport,
    ReportVerified,
    ReportResolved,
    ReportUpdated,
}

/// A report was created or changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayUpdate {
    #[serde(rename = "type")]
    pub kind: DelayUpdateKind,
    pub report: DelayReport,
}

/// Whether a route is impacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteUpdateKind {
    RouteAffected,
    RouteClear,
}

/// A route's exposure to incidents changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteUpdate {
    #[serde(rename = "type")]
    pub kind: RouteUpdateKind,
    pub route_id: String,
    pub affected_segments: Vec<String>,
    /// Adjusted travel time in minutes, when the server recomputed it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_duration: Option<f64>,
}

/// An event received from the push channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Delay(DelayUpdate),
    Route(RouteUpdate),
}

impl ChannelEvent {
    /// Parse an event body for a known category.
    pub fn parse(category: Category, data: &str) -> Result<Self> {
        let malformed = |source| Error::Malformed { category, source };
        match category {
            Category::Delay => serde_json::from_str(data).map(ChannelEvent::Delay),
            Category::Route => serde_json::from_str(data).map(ChannelEvent::Route),
        }
        .map_err(malformed)
    }

    /// Parse a named event as received from the transport.
    pub fn parse_named(name: &str, data: &str) -> Result<Self> {
        Self::parse(name.parse()?, data)
    }

    pub fn category(&self) -> Category {
        match self {
            ChannelEvent::Delay(_) => Category::Delay,
            ChannelEvent::Route(_) => Category::Route,
        }
    }

    pub fn as_delay(&self) -> Option<&DelayUpdate> {
        match self {
            ChannelEvent::Delay(update) => Some(update),
            ChannelEvent::Route(_) => None,
        }
    }

    pub fn as_route(&self) -> Option<&RouteUpdate> {
        match self {
            ChannelEvent::Route(update) => Some(update),
            ChannelEvent::Delay(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delaywatch_core::ReportStatus;

    const DELAY: &str = r#"{
        "type": "report_verified",
        "report": {
            "id": "r-9",
            "userId": "u-1",
            "location": {"lat": 50.06, "lng": 19.94},
            "transportType": "tram",
            "line": "52",
            "severity": "moderate",
            "category": "signal",
            "description": "Signal failure at Rondo Mogilskie",
            "estimatedDelay": 12,
            "status": "verified",
            "upvotes": 8,
            "downvotes": 1,
            "reportedAt": "2026-10-19T07:00:00Z",
            "verifiedBy": ["u-3", "u-4"]
        }
    }"#;

    #[test]
    fn parses_delay_event() {
        let event = ChannelEvent::parse_named("delay", DELAY).unwrap();
        let update = event.as_delay().unwrap();
        assert_eq!(update.kind, DelayUpdateKind::ReportVerified);
        assert_eq!(update.report.status, ReportStatus::Verified);
        assert_eq!(update.report.verified_by.len(), 2);
        assert_eq!(event.category(), Category::Delay);
    }

    #[test]
    fn parses_route_event_with_optional_duration() {
        let event = ChannelEvent::parse(
            Category::Route,
            r#"{"type":"route_affected","routeId":"r1","affectedSegments":["s1","s2"],"newDuration":41.5}"#,
        )
        .unwrap();
        let update = event.as_route().unwrap();
        assert_eq!(update.kind, RouteUpdateKind::RouteAffected);
        assert_eq!(update.affected_segments, vec!["s1", "s2"]);
        assert_eq!(update.new_duration, Some(41.5));

        let clear = ChannelEvent::parse(
            Category::Route,
            r#"{"type":"route_clear","routeId":"r1","affectedSegments":[]}"#,
        )
        .unwrap();
        assert_eq!(clear.as_route().unwrap().new_duration, None);
    }

    #[test]
    fn missing_segments_is_malformed() {
        let err = ChannelEvent::parse(Category::Route, r#"{"type":"route_clear","routeId":"r1"}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Malformed { category: Category::Route, .. }));
    }

    #[test]
    fn unknown_update_type_is_malformed() {
        let err = ChannelEvent::parse(
            Category::Route,
            r#"{"type":"route_closed","routeId":"r1","affectedSegments":[]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(ChannelEvent::parse(Category::Delay, "{not json").is_err());
    }

    #[test]
    fn category_names_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn unknown_report_status_still_delivers_as_pending() {
        let data = DELAY
            .replace(r#""status": "verified""#, r#""status": "archived""#)
            .replace(r#""upvotes": 8"#, r#""upvotes": -3"#);
        let event = ChannelEvent::parse(Category::Delay, &data).unwrap();
        let report = &event.as_delay().unwrap().report;
        assert_eq!(report.status, ReportStatus::Pending);
        assert_eq!(report.upvotes, 0);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = ChannelEvent::parse_named("weather", "{}").unwrap_err();
        assert!(matches!(err, Error::UnknownCategory(name) if name == "weather"));
    }
}
