// Report input - JSON-lines surveillance reports
//
// One object per line:
// {"time": 1700000000000, "track": "AAL12", "lat": 40.1, "lon": -75.2,
//  "alt": 11000, "speed": 250, "course": 90, "coasted": false}
// Only time, track, lat and lon are required.

use std::collections::BTreeMap;
use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::point::Point;
use crate::track::Track;

/// Format-specific payload carried by every parsed point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFlags {
    /// The sensor extrapolated this report rather than observing it
    pub coasted: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportRecord {
    pub time: i64,
    pub track: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub alt: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub course: Option<f64>,
    #[serde(default)]
    pub coasted: bool,
}

impl ReportRecord {
    pub fn into_point(self) -> Result<Point<ReportFlags>, crate::error::PointError> {
        Point::builder()
            .time(self.time)
            .lat_long(self.lat, self.lon)
            .maybe_altitude(self.alt)
            .maybe_speed(self.speed)
            .maybe_course(self.course)
            .track_id(self.track)
            .payload(ReportFlags { coasted: self.coasted })
            .build()
    }
}

/// Parses every non-blank line; the first bad line aborts with its line number
pub fn read_reports(reader: impl BufRead) -> Result<Vec<Point<ReportFlags>>, InputError> {
    let mut points = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: ReportRecord =
            serde_json::from_str(&line).map_err(|source| InputError::Json { line: idx + 1, source })?;
        let point = record.into_point().map_err(|source| InputError::Point { line: idx + 1, source })?;
        points.push(point);
    }
    Ok(points)
}

/// Groups points into one track per track id, ordered by id
///
/// Points without a track id are dropped.
pub fn group_into_tracks<P>(points: Vec<Point<P>>) -> Vec<Track<P>> {
    let mut by_id: BTreeMap<String, Vec<Point<P>>> = BTreeMap::new();
    for p in points {
        if let Some(id) = p.track_id() {
            let id = id.to_string();
            by_id.entry(id).or_default().push(p);
        }
    }
    by_id.into_values().filter_map(|pts| Track::new(pts).ok()).collect()
}
