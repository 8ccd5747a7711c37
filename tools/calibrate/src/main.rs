//! Monte Carlo calibration of the curve number table.
//!
//! Draws candidate parameter vectors uniformly from the harness's parameter
//! space with a seeded RNG, scores them in parallel against the observed peak
//! discharges and writes every trial plus the best decoded table as JSON.

use anyhow::{bail, Context, Result};
use augur_core::{
    CalibrationHarness, CalibrationSettings, Catchment, CurveNumberTable, DecodedParameters,
    SoilClassifier, UnclassifiedPolicy, UniformParameter,
};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use std::{fs, path::PathBuf};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "calibrate", about = "Search curve number tables against observed peak discharges")]
struct Args {
    /// JSON array of catchment records with q10/q30/q100.
    #[arg(short, long)]
    input: PathBuf,

    /// Number of random candidates.
    #[arg(short = 'n', long, default_value_t = 1000)]
    iterations: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Calibration settings JSON; missing fields take their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also search the depth/sand/clay soil thresholds.
    #[arg(long)]
    optimize_thresholds: bool,

    /// Negate scores (for maximising samplers); the best trial is then the highest.
    #[arg(long)]
    reverse_score: bool,

    /// Catchments no soil rule matches: reject the candidate or exclude them.
    #[arg(long)]
    unclassified: Option<UnclassifiedPolicy>,

    /// Soil classifier when thresholds are not searched (fixed, regional).
    #[arg(long)]
    classifier: Option<SoilClassifier>,

    /// Named table scored first as the baseline (redcross, augur).
    #[arg(long, default_value = "redcross")]
    baseline: String,

    /// Output JSON file.
    #[arg(short, long, default_value = "calibration.json")]
    output: PathBuf,
}

// ── Output types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Trial {
    vector: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct Best {
    trial: usize,
    score: f64,
    vector: Vec<f64>,
    parameters: DecodedParameters,
}

#[derive(Serialize)]
struct CalibrationRecord {
    seed: u64,
    settings: CalibrationSettings,
    parameter_space: Vec<UniformParameter>,
    baseline: String,
    trials: Vec<Trial>,
    best: Best,
}

// ── Sampling ──────────────────────────────────────────────────────────────────

fn draw(space: &[UniformParameter], rng: &mut StdRng) -> Vec<f64> {
    space.iter().map(|p| rng.gen_range(p.low..=p.high)).collect()
}

fn load_settings(args: &Args) -> Result<CalibrationSettings> {
    let mut settings: CalibrationSettings = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => CalibrationSettings::default(),
    };
    settings.optimize_soil_thresholds |= args.optimize_thresholds;
    settings.reverse_score |= args.reverse_score;
    if let Some(p) = args.unclassified {
        settings.unclassified = p;
    }
    if let Some(c) = args.classifier {
        settings.classifier = c;
    }
    Ok(settings)
}

/// Index and score of the best scored trial: the lowest, or the highest when
/// scores are negated. Failed trials never win.
fn best_trial(trials: &[Trial], reversed: bool) -> Option<(usize, f64)> {
    let sign = if reversed { -1.0 } else { 1.0 };
    trials
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.score.map(|s| (i, s)))
        .min_by(|a, b| (sign * a.1).total_cmp(&(sign * b.1)))
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    if args.iterations == 0 {
        bail!("--iterations must be at least 1");
    }

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading catchments {}", args.input.display()))?;
    let catchments: Vec<Catchment> = serde_json::from_str(&text)
        .with_context(|| format!("parsing catchments {}", args.input.display()))?;
    for (i, c) in catchments.iter().enumerate() {
        if c.is_flat() {
            eprintln!("[warn] {} has zero slope; its hydrograph is all zero", c.label(i));
        }
    }
    let settings = load_settings(&args)?;
    let harness = CalibrationHarness::new(catchments, settings)?;
    let space = harness.parameter_space();

    eprintln!(
        "[calibrate] {} catchments, {} parameters, {} candidates, seed {}",
        harness.catchments().len(),
        space.len(),
        args.iterations,
        args.seed
    );

    let baseline = CurveNumberTable::named(&args.baseline)?;
    let mut rng = StdRng::seed_from_u64(args.seed);
    let candidates: Vec<Vec<f64>> = std::iter::once(harness.encode(&baseline, None))
        .chain((0..args.iterations).map(|_| draw(&space, &mut rng)))
        .collect();

    let scores: Vec<_> = candidates.par_iter().map(|v| harness.evaluate(v)).collect();

    let mut failures = 0usize;
    let trials: Vec<Trial> = candidates
        .into_iter()
        .zip(scores)
        .map(|(vector, result)| match result {
            Ok(score) => Trial { vector, score: Some(score), error: None },
            Err(e) => {
                failures += 1;
                Trial { vector, score: None, error: Some(e.to_string()) }
            }
        })
        .collect();
    if failures > 0 {
        eprintln!("[warn] {failures} candidates failed to simulate");
    }

    let Some((best_idx, best_score)) = best_trial(&trials, harness.settings().reverse_score) else {
        bail!("no candidate could be scored");
    };
    let best_vector = trials[best_idx].vector.clone();
    let parameters = harness.decode(&best_vector)?;

    if let Some(baseline_score) = trials[0].score {
        eprintln!("[calibrate] baseline '{}' score {:.3}", args.baseline, baseline_score);
    }
    eprintln!("[calibrate] best score {best_score:.3} (trial {best_idx})");
    eprint!("{}", parameters.table);
    if let Some(t) = parameters.thresholds {
        eprintln!("thresholds: depth {:.3} m, sand {:.3}, clay {:.3}", t.depth, t.sand, t.clay);
    }

    let record = CalibrationRecord {
        seed: args.seed,
        settings: *harness.settings(),
        parameter_space: space,
        baseline: args.baseline.clone(),
        trials,
        best: Best { trial: best_idx, score: best_score, vector: best_vector, parameters },
    };
    fs::write(&args.output, serde_json::to_string_pretty(&record)?)
        .with_context(|| format!("writing {}", args.output.display()))?;
    eprintln!("  -> {}", args.output.display());

    Ok(())
}
