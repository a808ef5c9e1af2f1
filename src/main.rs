// Airprox - Main Entry Point
// Copyright (C) 2026 airprox contributors
// Licensed under Apache-2.0
//
// Reads surveillance reports, cleans each track, streams the cleaned points
// through the pairing engine and reports the closest approach of every pair
// of tracks that came near each other.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

use airprox::config::Config;
use airprox::error::PairingError;
use airprox::input::{group_into_tracks, read_reports, ReportFlags};
use airprox::output::{EncounterRecord, JsonLinesOutput, OutputHandler};
use airprox::pairing::{PairingConfig, PointPairFinder};
use airprox::point::Point;
use airprox::separation::TrackPair;
use airprox::smoothing::{
    core_smoothing_with, outage_aware_smoothing_with, AltitudeSmoother, CompositeCleaner, DataCleaner, MutableSmoother,
};
use airprox::track::Track;
use clap::Parser;
use tracing::{debug, info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    let pairing = config.pairing()?;
    info!(
        "Pairing window {} ms, distance {} NM, threshold {:.0}",
        pairing.time_window_ms(),
        pairing.pairing_distance_nm(),
        pairing.pairing_threshold()
    );

    let reader: Box<dyn BufRead> = match &config.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let reports = read_reports(reader)?;
    let raw_tracks = group_into_tracks(reports);
    info!("Read {} tracks", raw_tracks.len());

    let is_coasted = |p: &Point<ReportFlags>| p.payload().coasted;
    let mut cleaner = if config.outage_aware {
        outage_aware_smoothing_with(is_coasted)
    } else {
        core_smoothing_with(is_coasted)
    };
    if config.smooth_altitudes {
        let smoother = AltitudeSmoother::new(config.altitude_step_secs * 1_000)?;
        cleaner = cleaner.then(MutableSmoother::new(CompositeCleaner::new().then(smoother)));
    }

    let raw_count = raw_tracks.len();
    let tracks: Vec<Track<ReportFlags>> = raw_tracks.into_iter().filter_map(|t| cleaner.clean(t)).collect();
    if tracks.len() < raw_count {
        info!("{} of {} tracks did not survive cleaning", raw_count - tracks.len(), raw_count);
    }

    let candidates = associate_tracks(&tracks, &pairing)?;
    info!("{} candidate track pairs", candidates.len());

    let mut output = JsonLinesOutput::new(BufWriter::new(io::stdout()));
    for (a, b) in candidates {
        let pair = TrackPair::new(tracks[a].clone(), tracks[b].clone());
        match EncounterRecord::from_pair(&pair) {
            Ok(record) => output.handle_encounter(&record)?,
            Err(e) => warn!(
                "Skipping {} / {}: {}",
                tracks[a].track_id().unwrap_or("?"),
                tracks[b].track_id().unwrap_or("?"),
                e
            ),
        }
    }
    output.into_inner().flush()?;

    Ok(())
}

/// Indices of track pairs with at least one cross-track point pair
fn associate_tracks<P>(
    tracks: &[Track<P>],
    pairing: &PairingConfig,
) -> Result<BTreeSet<(usize, usize)>, PairingError>
where
    P: Clone,
{
    let index_of: HashMap<&str, usize> = tracks
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.track_id().map(|id| (id, i)))
        .collect();

    let mut stream: Vec<Point<P>> = tracks.iter().flat_map(|t| t.points().iter().cloned()).collect();
    stream.sort_by_key(|p| p.time());

    let mut finder = PointPairFinder::from_config(pairing)?;
    let mut candidates = BTreeSet::new();
    for point in stream {
        for pair in finder.accept(point)? {
            let newer = pair.newer.track_id().and_then(|id| index_of.get(id));
            let older = pair.older.track_id().and_then(|id| index_of.get(id));
            if let (Some(&a), Some(&b)) = (newer, older) {
                if a != b {
                    candidates.insert((a.min(b), a.max(b)));
                }
            }
        }
    }
    debug!("Pairing index peaked at {} points", finder.size_high_water_mark());
    Ok(candidates)
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) {
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .with_writer(io::stderr);

    if verbose {
        subscriber.with_max_level(tracing::Level::DEBUG).init();
        info!("Verbose logging enabled (DEBUG level)");
    } else {
        subscriber.with_max_level(tracing::Level::INFO).init();
    }
}
