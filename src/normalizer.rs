use serde::Serialize;

use crate::options::{ElevationMode, NormalizeOptions};
use crate::track_types::*;

/// Axis-aligned range over every waypoint of a track. Missing elevation counts as 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingEnvelope {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_ele: f64,
    pub max_ele: f64,
}

impl BoundingEnvelope {
    /// Returns `None` when the track has no waypoints.
    pub fn of(track: &Track) -> Option<Self> {
        let mut points = track.waypoints();
        let first = points.next()?;
        let ele = first.ele_or_zero();
        let mut env = Self {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lon: first.lon,
            max_lon: first.lon,
            min_ele: ele,
            max_ele: ele,
        };
        for pt in points {
            env.include(pt);
        }
        Some(env)
    }

    fn include(&mut self, pt: &Waypoint) {
        let ele = pt.ele_or_zero();
        self.min_lat = self.min_lat.min(pt.lat);
        self.max_lat = self.max_lat.max(pt.lat);
        self.min_lon = self.min_lon.min(pt.lon);
        self.max_lon = self.max_lon.max(pt.lon);
        self.min_ele = self.min_ele.min(ele);
        self.max_ele = self.max_ele.max(ele);
    }

    // Keep the max - half-range form, not (min + max) / 2.
    pub fn lat_offset(&self) -> f64 {
        self.max_lat - (self.max_lat - self.min_lat) / 2.0
    }

    pub fn lon_offset(&self) -> f64 {
        self.max_lon - (self.max_lon - self.min_lon) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A normalized point tagged with the index of the segment it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentPoint {
    pub segment: usize,
    #[serde(flatten)]
    pub point: NormalizedPoint,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTrack {
    /// Number of segments in the source track, empty ones included.
    pub segment_count: usize,
    pub envelope: Option<BoundingEnvelope>,
    pub points: Vec<SegmentPoint>,
}

impl NormalizedTrack {
    /// Flat `x, y, z, x, y, z, ...` buffer for a single continuous line.
    pub fn positions(&self) -> Vec<f64> {
        self.points
            .iter()
            .flat_map(|sp| [sp.point.x, sp.point.y, sp.point.z])
            .collect()
    }

    /// One polyline per source segment; empty segments stay empty.
    pub fn segment_polylines(&self) -> Vec<Vec<NormalizedPoint>> {
        let mut lines = vec![Vec::new(); self.segment_count];
        for sp in &self.points {
            lines[sp.segment].push(sp.point);
        }
        lines
    }
}

/// Center the track on the origin and scale it into scene units.
pub fn normalize(track: &Track, opts: &NormalizeOptions) -> NormalizedTrack {
    let segment_count = track.segments.len();
    let Some(env) = BoundingEnvelope::of(track) else {
        return NormalizedTrack {
            segment_count,
            envelope: None,
            points: Vec::new(),
        };
    };

    let offset_lat = env.lat_offset();
    let offset_lon = env.lon_offset();
    let scale = opts.scale_factor;

    let mut points = Vec::with_capacity(track.waypoint_count());
    for (segment, seg) in track.segments.iter().enumerate() {
        for pt in &seg.points {
            let y = match opts.elevation_mode {
                ElevationMode::Flat => 0.0,
                ElevationMode::ElevationScaled => {
                    (pt.ele_or_zero() - env.min_ele) / opts.elevation_divisor
                }
            };
            points.push(SegmentPoint {
                segment,
                point: NormalizedPoint {
                    x: (pt.lat - offset_lat) * scale,
                    y: y * scale,
                    z: (pt.lon - offset_lon) * scale,
                },
            });
        }
    }

    NormalizedTrack {
        segment_count,
        envelope: Some(env),
        points,
    }
}
