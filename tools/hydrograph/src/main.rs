//! Design hydrographs for a catchment dataset.
//!
//! Reads a JSON array of catchment records, classifies their soils, runs the
//! curve-number pipeline and reports the 10/30/100 year peak discharges next
//! to the observed values when the dataset carries them.

use anyhow::{bail, Context, Result};
use augur_core::calibration::{column_rmse, relative_difference};
use augur_core::catchment::reclassify_slope_gradient;
use augur_core::soil::resolve_unclassified;
use augur_core::{
    cn_factor, compute_hydrograph, Catchment, CurveNumberTable, Hydrograph,
    HydrographConfig, HyetogramMethod, PeakflowConstant, SoilClassifier, SoilGroup, SoilThresholds,
    UnclassifiedPolicy, RETURN_PERIODS,
};
use clap::Parser;
use rayon::prelude::*;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "hydrograph", about = "Run the SCS-CN design hydrograph over a catchment dataset")]
struct Args {
    /// JSON array of catchment records.
    #[arg(short, long)]
    input: PathBuf,

    /// Named curve number table (redcross, augur).
    #[arg(long, default_value = "redcross")]
    cn_table: String,

    /// JSON file holding a 5×4 curve number matrix; overrides --cn-table.
    #[arg(long)]
    cn_file: Option<PathBuf>,

    /// Soil classifier (fixed, regional).
    #[arg(long, default_value = "fixed")]
    classifier: SoilClassifier,

    /// Depth,sand,clay thresholds for the fixed rule set, e.g. 1.3,0.35,0.25.
    #[arg(long, value_delimiter = ',')]
    thresholds: Option<Vec<f64>>,

    /// Catchments no soil rule matches: reject the run or exclude them.
    #[arg(long, default_value = "reject")]
    unclassified: UnclassifiedPolicy,

    /// Pipeline configuration JSON; missing fields take their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Peakflow constant (scs, rational); overrides the config file.
    #[arg(long)]
    peakflow: Option<PeakflowConstant>,

    /// Hyetogram method (structured, constant); overrides the config file.
    #[arg(long)]
    hyetogram: Option<HyetogramMethod>,

    /// Snap slope gradients to the 0.08 / 0.3 / 0.7 classes before running.
    #[arg(long)]
    reclassify_slope: bool,

    /// Write the full hydrographs to this JSON file.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

// ── Output types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct CatchmentResult {
    row: usize,
    name: String,
    soil_group: SoilGroup,
    cn_factor: f64,
    peaks: [f64; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    observed: Option<[f64; 3]>,
    hydrograph: Hydrograph,
}

// ── Inputs ────────────────────────────────────────────────────────────────────

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {what} {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {what} {}", path.display()))
}

fn load_table(args: &Args) -> Result<CurveNumberTable> {
    match &args.cn_file {
        Some(path) => read_json(path, "curve number table"),
        None => Ok(CurveNumberTable::named(&args.cn_table)?),
    }
}

fn load_config(args: &Args) -> Result<HydrographConfig> {
    let mut config: HydrographConfig = match &args.config {
        Some(path) => read_json(path, "config")?,
        None => HydrographConfig::default(),
    };
    if let Some(k) = args.peakflow {
        config.geometry.peakflow = k;
    }
    if let Some(m) = args.hyetogram {
        config.hyetogram = m;
    }
    Ok(config)
}

fn select_classifier(args: &Args) -> Result<SoilClassifier> {
    match args.thresholds.as_deref() {
        None => Ok(args.classifier),
        Some(&[depth, sand, clay]) => {
            if args.classifier == SoilClassifier::Regional {
                bail!("--thresholds only applies to the fixed rule set");
            }
            Ok(SoilClassifier::Parametrized(SoilThresholds { depth, sand, clay }))
        }
        Some(other) => bail!("--thresholds takes depth,sand,clay; got {} values", other.len()),
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    let mut catchments: Vec<Catchment> = read_json(&args.input, "catchments")?;
    if catchments.is_empty() {
        bail!("{} holds no catchments", args.input.display());
    }
    if args.reclassify_slope {
        for c in &mut catchments {
            c.slope_gradient = reclassify_slope_gradient(c.slope_gradient);
        }
    }
    let table = load_table(&args)?;
    let config = load_config(&args)?;
    let classifier = select_classifier(&args)?;

    eprintln!(
        "[hydrograph] {} catchments, classifier {:?}, peakflow {:?}, hyetogram {:?}",
        catchments.len(),
        classifier,
        config.geometry.peakflow,
        config.hyetogram
    );
    eprint!("{table}");

    let groups = classifier.classify_all(&catchments);
    for (i, (c, g)) in catchments.iter().zip(&groups).enumerate() {
        if g.is_none() {
            eprintln!("[warn] {} matches no soil rule", c.label(i));
        }
    }
    let included = resolve_unclassified(&groups, args.unclassified)?;
    if included.len() < catchments.len() {
        eprintln!("[hydrograph] {} catchments excluded", catchments.len() - included.len());
    }

    for &(row, _) in &included {
        if catchments[row].is_flat() {
            eprintln!("[warn] {} has zero slope; its hydrograph is all zero", catchments[row].label(row));
        }
    }

    let results = included
        .par_iter()
        .map(|&(row, group)| -> Result<CatchmentResult> {
            let c = &catchments[row];
            let hydrograph = compute_hydrograph(c, group, &c.precipitation, &table, &config)
                .with_context(|| format!("catchment {}", c.label(row)))?;
            Ok(CatchmentResult {
                row,
                name: c.label(row),
                soil_group: group,
                cn_factor: cn_factor(c, &table, group),
                peaks: hydrograph.peaks(),
                observed: c.observed_peaks(),
                hydrograph,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // ── Report ────────────────────────────────────────────────────────────────
    print!("{:<16} {:>3} {:>6}", "catchment", "grp", "cn");
    for r in RETURN_PERIODS {
        print!(" {:>9} {:>9} {:>7}", format!("q{r}"), "obs", "diff%");
    }
    println!();
    println!("{}", "-".repeat(16 + 4 + 7 + 3 * 28));

    let mut observed = Vec::new();
    let mut simulated = Vec::new();
    for r in &results {
        let sim = &r.peaks;
        print!("{:<16} {:>3} {:>6.1}", r.name, r.soil_group.label(), r.cn_factor);
        match r.observed {
            Some(obs) => {
                for (s, o) in sim.iter().zip(obs) {
                    print!(" {:>9.1} {:>9.1} {:>+7.1}", s, o, relative_difference(o, *s));
                }
                observed.push(obs);
                simulated.push(*sim);
            }
            None => {
                for s in sim {
                    print!(" {:>9.1} {:>9} {:>7}", s, "-", "-");
                }
            }
        }
        println!();
    }

    if !observed.is_empty() {
        let rmse = column_rmse(&observed, &simulated);
        println!();
        for (r, e) in RETURN_PERIODS.iter().zip(rmse) {
            println!("RMSE q{r:<4} {e:>9.2}");
        }
        println!("RMSE mean  {:>9.2}  ({} catchments)", rmse.iter().sum::<f64>() / 3.0, observed.len());
    }

    if let Some(path) = &args.output {
        fs::write(path, serde_json::to_string_pretty(&results)?)
            .with_context(|| format!("writing {}", path.display()))?;
        eprintln!("  -> {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["hydrograph", "-i", "catchments.json"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn classifier_flag_without_thresholds() {
        assert_eq!(select_classifier(&args(&[])).unwrap(), SoilClassifier::default());
        assert_eq!(
            select_classifier(&args(&["--classifier", "regional"])).unwrap(),
            SoilClassifier::Regional
        );
    }

    #[test]
    fn three_thresholds_build_the_parametrized_rules() {
        let c = select_classifier(&args(&["--thresholds", "1.3,0.35,0.25"])).unwrap();
        assert_eq!(
            c,
            SoilClassifier::Parametrized(SoilThresholds { depth: 1.3, sand: 0.35, clay: 0.25 })
        );
    }

    #[test]
    fn thresholds_need_exactly_three_values() {
        for given in ["1.3,0.35", "1.3,0.35,0.25,0.1"] {
            let err = select_classifier(&args(&["--thresholds", given])).unwrap_err();
            assert!(err.to_string().contains("depth,sand,clay"), "{given}: {err}");
        }
    }

    #[test]
    fn thresholds_are_rejected_for_the_regional_rules() {
        let err = select_classifier(&args(&["--classifier", "regional", "--thresholds", "1.3,0.35,0.25"]))
            .unwrap_err();
        assert!(err.to_string().contains("fixed rule set"), "{err}");
    }
}
