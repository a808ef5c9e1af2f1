// Encounter output - one record per associated track pair

use std::io::Write;

use serde::Serialize;

use crate::error::SeparationError;
use crate::separation::{SeparationPrediction, TrackPair};

/// Summary of one track pair's closest approach
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncounterRecord {
    pub track1: String,
    pub track2: String,
    pub overlap_start: i64,
    pub overlap_end: i64,
    pub min_lateral_nm: f64,
    pub time_of_min_lateral: i64,
    pub vertical_at_min_lateral_ft: f64,
    /// Projection made at the first sample of the overlap
    pub prediction: SeparationPrediction,
}

impl EncounterRecord {
    pub fn from_pair<P: Clone>(pair: &TrackPair<P>) -> Result<Self, SeparationError> {
        let overlap = pair.time_overlap().ok_or(SeparationError::NoOverlap)?;
        let series = pair.separation_info()?;
        let (min_lateral_nm, time_of_min_lateral) = series.minimum_horizontal_separation();
        Ok(EncounterRecord {
            track1: pair.track1().track_id().unwrap_or_default().to_string(),
            track2: pair.track2().track_id().unwrap_or_default().to_string(),
            overlap_start: overlap.start,
            overlap_end: overlap.end,
            min_lateral_nm,
            time_of_min_lateral,
            vertical_at_min_lateral_ft: series.vertical_separation_at(time_of_min_lateral)?,
            prediction: SeparationPrediction::new(pair, overlap.start)?,
        })
    }
}

/// Trait for output handlers
pub trait OutputHandler: Send {
    /// Handle one finished encounter
    fn handle_encounter(&mut self, record: &EncounterRecord) -> std::io::Result<()>;
}

/// JSON-lines output to any writer
pub struct JsonLinesOutput<W> {
    writer: W,
}

impl<W: Write + Send> JsonLinesOutput<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesOutput { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> OutputHandler for JsonLinesOutput<W> {
    fn handle_encounter(&mut self, record: &EncounterRecord) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::full_point;
    use crate::track::Track;

    fn named_track(id: &str, lat: f64) -> Track {
        Track::new(
            (0..=20)
                .map(|i| {
                    let p = full_point(i * 1_000, lat, -75.0 + 0.001 * i as f64, 8_000.0, 250.0, 90.0);
                    p.into_builder().track_id(id).build().unwrap()
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_encounter_record() {
        let pair = TrackPair::new(named_track("A", 40.0), named_track("B", 40.02));
        let record = EncounterRecord::from_pair(&pair).unwrap();
        assert_eq!(record.track1, "A");
        assert_eq!(record.track2, "B");
        assert_eq!((record.overlap_start, record.overlap_end), (0, 20_000));
        assert!((record.min_lateral_nm - 1.2).abs() < 0.01, "{}", record.min_lateral_nm);
        assert_eq!(record.vertical_at_min_lateral_ft, 0.0);
    }

    #[test]
    fn test_json_lines_output() {
        let pair = TrackPair::new(named_track("A", 40.0), named_track("B", 40.02));
        let record = EncounterRecord::from_pair(&pair).unwrap();

        let mut out = JsonLinesOutput::new(Vec::new());
        out.handle_encounter(&record).unwrap();
        out.handle_encounter(&record).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["track1"], "A");
        assert_eq!(value["prediction"]["time"], 0);
    }
}
