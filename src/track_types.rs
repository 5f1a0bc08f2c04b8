use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single recorded sample (<trkpt>).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
    pub ele: Option<f64>,
    pub time: Option<DateTime<Utc>>,
}

impl Waypoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            ele: None,
            time: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_ele(mut self, ele: f64) -> Self {
        self.ele = Some(ele);
        self
    }

    /// Elevation used for bounds and height mapping; absent counts as 0.0.
    pub fn ele_or_zero(&self) -> f64 {
        self.ele.unwrap_or(0.0)
    }
}

/// A GPX track segment (<trkseg>). May be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Segment {
    pub points: Vec<Waypoint>,
}

/// All segments found in a document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub segments: Vec<Segment>,
    pub is_valid: bool,
    pub error: Option<String>,
}

impl Track {
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let is_valid = segments.iter().any(|s| !s.points.is_empty());
        Self {
            segments,
            is_valid,
            error: None,
        }
    }

    /// A track whose source text could not be parsed.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            segments: Vec::new(),
            is_valid: false,
            error: Some(error.into()),
        }
    }

    pub fn waypoint_count(&self) -> usize {
        self.segments.iter().map(|s| s.points.len()).sum()
    }

    /// Every waypoint in segment-then-point order.
    pub fn waypoints(&self) -> impl Iterator<Item = &Waypoint> {
        self.segments.iter().flat_map(|s| s.points.iter())
    }
}
