//! `guide replay`: drive the predictor over a recorded trace.

use std::path::Path;

use eyre::Result;
use guide_config::Config;
use guide_core::{ReplayStats, ReplayStep, replay};
use guide_traits::ManualClock;
use serde_json::json;

use crate::{build_guide, save_profile};

pub fn run(cfg: &Config, trace: &Path, json: bool) -> Result<()> {
    let rows = guide_config::load_trace_csv(trace)?;
    tracing::info!(rows = rows.len(), trace = %trace.display(), "replaying trace");

    let clock = ManualClock::new();
    let mut guide = build_guide(cfg, clock.clone())?;
    let steps = replay(&mut guide, &clock, &rows);
    let stats = ReplayStats::from_steps(&steps);

    if json {
        for s in &steps {
            println!("{}", step_json(s));
        }
        println!(
            "{}",
            json!({
                "cycles": stats.cycles,
                "dropped_frames": stats.dropped_frames,
                "inference_cycles": stats.inference_cycles,
                "rms_measurement": stats.rms_measurement,
                "control_gain": guide.control_gain(),
                "min_points_for_inference": guide.min_points_for_inference(),
            })
        );
    } else {
        println!(
            "{:>6} {:>10} {:>12} {:>12} {:>10}  drift",
            "cycle", "time_s", "measurement", "modified", "control"
        );
        for s in &steps {
            println!("{}", step_text(s));
        }
        println!(
            "Replayed {} cycles ({} dropped, {} with drift inference); RMS measurement {:.4}",
            stats.cycles, stats.dropped_frames, stats.inference_cycles, stats.rms_measurement
        );
        print!("{}", guide.settings_summary());
    }

    save_profile(guide.into_store())
}

fn step_json(s: &ReplayStep) -> serde_json::Value {
    json!({
        "cycle": s.index,
        "timestamp": s.timestamp,
        "measurement": s.measurement,
        "modified_measurement": s.modified_measurement,
        "control": s.control,
        "inference": s.inference_active,
    })
}

fn step_text(s: &ReplayStep) -> String {
    let opt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"));
    format!(
        "{:>6} {:>10.3} {:>12} {:>12} {:>10.4}  {}",
        s.index,
        s.timestamp,
        opt(s.measurement),
        opt(s.modified_measurement),
        s.control,
        if s.inference_active { "yes" } else { "no" }
    )
}
