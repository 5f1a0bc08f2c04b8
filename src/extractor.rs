use chrono::{DateTime, NaiveDateTime, Utc};

use crate::document::{Element, Node, NodeKind};
use crate::parser::parse_document;
use crate::track_types::*;

/// Parse GPX text and extract its track. Structural XML failures end up in `Track::error`.
pub fn load_track(xml: &str) -> Track {
    match parse_document(xml) {
        Ok(root) => extract(&root),
        Err(e) => {
            log::warn!("GPX document rejected: {e}");
            Track::failed(e.to_string())
        }
    }
}

/// Walk the whole tree depth-first and collect every <trkseg> in document order.
pub fn extract(root: &Element) -> Track {
    let mut segments = Vec::new();
    collect_segments(root, &mut segments);
    Track::from_segments(segments)
}

fn collect_segments(element: &Element, segments: &mut Vec<Segment>) {
    if element.kind() == NodeKind::TrackSegment {
        segments.push(parse_segment(element));
    }

    for child in &element.children {
        if let Node::Element(e) = child {
            collect_segments(e, segments);
        }
    }
}

/// Only direct <trkpt> children belong to the segment.
fn parse_segment(element: &Element) -> Segment {
    let points = element
        .child_elements()
        .filter(|e| e.name == "trkpt")
        .filter_map(parse_point)
        .collect();
    Segment { points }
}

fn parse_point(element: &Element) -> Option<Waypoint> {
    let lat = element.attribute("lat").and_then(parse_number);
    let lon = element.attribute("lon").and_then(parse_number);
    let (Some(lat), Some(lon)) = (lat, lon) else {
        log::debug!(
            "skipping trkpt with lat={:?} lon={:?}",
            element.attribute("lat"),
            element.attribute("lon")
        );
        return None;
    };

    let mut point = Waypoint::new(lat, lon);
    for child in element.child_elements() {
        match child.name.as_str() {
            "ele" => {
                let text = child.text();
                point.ele = parse_number(&text);
                if point.ele.is_none() {
                    log::debug!("ignoring unparseable elevation {text:?}");
                }
            }
            "time" => {
                let text = child.text();
                point.time = parse_time(&text);
                if point.time.is_none() {
                    log::debug!("ignoring unparseable time {text:?}");
                }
            }
            _ => {}
        }
    }

    Some(point)
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// RFC 3339 first; timestamps without an offset are taken as UTC.
fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|t| t.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_simple_track() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <trk>
    <name>Morning Run</name>
    <trkseg>
      <trkpt lat="35.0" lon="139.0"><ele>10.0</ele><time>2025-01-01T06:00:00Z</time></trkpt>
      <trkpt lat="35.001" lon="139.001"><ele>11.0</ele></trkpt>
      <trkpt lat="35.002" lon="139.002"/>
    </trkseg>
  </trk>
</gpx>"#;
        let track = load_track(xml);
        assert!(track.is_valid);
        assert!(track.error.is_none());
        assert_eq!(track.segments.len(), 1);

        let points = &track.segments[0].points;
        assert_eq!(points.len(), 3);
        assert!((points[1].lat - 35.001).abs() < 1e-10);
        assert!((points[1].lon - 139.001).abs() < 1e-10);
        assert_eq!(points[0].ele, Some(10.0));
        assert_eq!(points[2].ele, None);
        assert_eq!(
            points[0].time,
            Some(Utc.with_ymd_and_hms(2025, 1, 1, 6, 0, 0).unwrap())
        );
        assert_eq!(points[1].time, None);
    }

    #[test]
    fn test_segments_in_document_order() {
        let xml = r#"<gpx>
  <trk>
    <trkseg><trkpt lat="1" lon="1"/></trkseg>
    <trkseg></trkseg>
  </trk>
  <trk>
    <trkseg><trkpt lat="3" lon="3"/><trkpt lat="4" lon="4"/></trkseg>
  </trk>
</gpx>"#;
        let track = load_track(xml);
        let lens: Vec<usize> = track.segments.iter().map(|s| s.points.len()).collect();
        assert_eq!(lens, vec![1, 0, 2]);
        assert_eq!(track.segments[2].points[0].lat, 3.0);
    }

    #[test]
    fn test_deeply_nested_segment_found() {
        let xml = r#"<gpx><a><b><c><trkseg><trkpt lat="1" lon="2"/></trkseg></c></b></a></gpx>"#;
        let track = load_track(xml);
        assert_eq!(track.segments.len(), 1);
        assert_eq!(track.waypoint_count(), 1);
    }

    #[test]
    fn test_nested_segment_follows_outer() {
        let xml = r#"<gpx><trkseg>
  <trkpt lat="1" lon="1"/>
  <trkseg><trkpt lat="2" lon="2"/></trkseg>
</trkseg></gpx>"#;
        let track = load_track(xml);
        assert_eq!(track.segments.len(), 2);
        assert_eq!(track.segments[0].points.len(), 1);
        assert_eq!(track.segments[0].points[0].lat, 1.0);
        assert_eq!(track.segments[1].points[0].lat, 2.0);
    }

    #[test]
    fn test_only_direct_trkpt_children() {
        let xml = r#"<gpx><trkseg><extensions><trkpt lat="9" lon="9"/></extensions><trkpt lat="1" lon="1"/></trkseg></gpx>"#;
        let track = load_track(xml);
        assert_eq!(track.segments.len(), 1);
        assert_eq!(track.segments[0].points.len(), 1);
        assert_eq!(track.segments[0].points[0].lat, 1.0);
    }

    #[test]
    fn test_invalid_points_skipped() {
        let xml = r#"<gpx><trkseg>
  <trkpt lat="1" lon="1"/>
  <trkpt lat="2"/>
  <trkpt lon="3"/>
  <trkpt lat="abc" lon="4"/>
  <trkpt lat="NaN" lon="5"/>
  <trkpt lat=" 6 " lon="6"/>
</trkseg></gpx>"#;
        let track = load_track(xml);
        let lats: Vec<f64> = track.waypoints().map(|p| p.lat).collect();
        assert_eq!(lats, vec![1.0, 6.0]);
        assert!(track.error.is_none());
    }

    #[test]
    fn test_bad_child_values_left_absent() {
        let xml = r#"<gpx><trkseg>
  <trkpt lat="1" lon="1"><ele>high</ele><time>yesterday</time><speed>5</speed></trkpt>
</trkseg></gpx>"#;
        let track = load_track(xml);
        let pt = &track.segments[0].points[0];
        assert_eq!(pt.ele, None);
        assert_eq!(pt.time, None);
    }

    #[test]
    fn test_time_formats() {
        assert_eq!(
            parse_time("2025-01-01T09:00:00+09:00"),
            Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_time("2025-01-01T00:00:00"),
            Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
        );
        assert!(parse_time("2025-01-01T00:00:00.250Z").is_some());
        assert!(parse_time("").is_none());
    }

    #[test]
    fn test_no_points_is_valid_but_empty() {
        let track = load_track(r#"<gpx><trk><trkseg/></trk></gpx>"#);
        assert!(!track.is_valid);
        assert!(track.error.is_none());
        assert_eq!(track.segments.len(), 1);
    }

    #[test]
    fn test_malformed_xml_sets_error() {
        let track = load_track("<gpx><trk><trkseg></trk></gpx>");
        assert!(!track.is_valid);
        assert!(track.segments.is_empty());
        assert!(!track.error.unwrap().is_empty());
    }

    #[test]
    fn test_excessive_nesting_sets_error() {
        let n = 100_000;
        let xml = format!("<gpx>{}{}</gpx>", "<a>".repeat(n), "</a>".repeat(n));
        let track = load_track(&xml);
        assert!(!track.is_valid);
        assert!(track.segments.is_empty());
        assert!(track.error.unwrap().contains("nested deeper"));
    }

    #[test]
    fn test_escaped_coordinates() {
        let track = load_track(r#"<gpx><trkseg><trkpt lat="1&#46;5" lon="2"/></trkseg></gpx>"#);
        assert_eq!(track.segments[0].points.len(), 1);
        assert_eq!(track.segments[0].points[0].lat, 1.5);
    }

    #[test]
    fn test_prefixed_elements() {
        let xml = r#"<g:gpx xmlns:g="http://www.topografix.com/GPX/1/1"><g:trkseg><g:trkpt lat="1" lon="2"><g:ele>3</g:ele></g:trkpt></g:trkseg></g:gpx>"#;
        let track = load_track(xml);
        assert_eq!(track.segments[0].points[0].ele, Some(3.0));
    }
}
