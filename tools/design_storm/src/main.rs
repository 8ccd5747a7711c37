//! Gumbel return levels from annual maxima.
//!
//! Input is a JSON object mapping a catchment name to its annual maxima
//! series. Without `--catchments` the fitted levels are printed and written
//! as JSON. With `--catchments` the 10/30/100 year levels are written into the
//! matching catchment records (p10/p30/p100 for rainfall, q10/q30/q100 for
//! discharge).

use anyhow::{bail, Context, Result};
use augur_core::precipitation::Gumbel;
use augur_core::Catchment;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::{collections::BTreeMap, fs, path::PathBuf};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Series {
    /// Annual maximum rainfall depths (mm).
    Precipitation,
    /// Annual maximum discharges (m³/s).
    Discharge,
}

#[derive(Parser, Debug)]
#[command(name = "design_storm", about = "Fit Gumbel return levels to annual maxima")]
struct Args {
    /// JSON object: catchment name → annual maxima.
    #[arg(short, long)]
    input: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Series::Precipitation)]
    series: Series,

    /// Return periods in years (ignored with --catchments, which uses 10,30,100).
    #[arg(short, long, value_delimiter = ',', default_value = "10,30,100")]
    periods: Vec<f64>,

    /// Catchment dataset to fill in, matched by name.
    #[arg(long)]
    catchments: Option<PathBuf>,

    /// Output JSON file.
    #[arg(short, long, default_value = "design_storms.json")]
    output: PathBuf,
}

#[derive(Serialize)]
struct Levels {
    location: f64,
    scale: f64,
    periods: Vec<f64>,
    levels: Vec<f64>,
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let series: BTreeMap<String, Vec<f64>> = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", args.input.display()))?;
    if series.is_empty() {
        bail!("{} holds no series", args.input.display());
    }

    let mut fits = BTreeMap::new();
    for (name, maxima) in &series {
        let fit = Gumbel::fit(maxima).with_context(|| format!("fitting {name}"))?;
        fits.insert(name.as_str(), fit);
    }
    eprintln!("[design_storm] fitted {} series ({:?})", fits.len(), args.series);

    match &args.catchments {
        None => {
            let mut out = BTreeMap::new();
            for (name, fit) in &fits {
                let levels = args
                    .periods
                    .iter()
                    .map(|&r| fit.return_level(r))
                    .collect::<augur_core::Result<Vec<_>>>()
                    .with_context(|| format!("return levels of {name}"))?;
                print!("{name:<20}");
                for (r, x) in args.periods.iter().zip(&levels) {
                    print!("  R{r:<4} {x:>9.2}");
                }
                println!();
                out.insert(
                    *name,
                    Levels { location: fit.location, scale: fit.scale, periods: args.periods.clone(), levels },
                );
            }
            fs::write(&args.output, serde_json::to_string_pretty(&out)?)
                .with_context(|| format!("writing {}", args.output.display()))?;
        }
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading catchments {}", path.display()))?;
            let mut catchments: Vec<Catchment> = serde_json::from_str(&text)
                .with_context(|| format!("parsing catchments {}", path.display()))?;

            let mut filled = 0usize;
            for (i, c) in catchments.iter_mut().enumerate() {
                let Some(fit) = c.name.as_deref().and_then(|n| fits.get(n)) else {
                    eprintln!("[warn] no series for catchment {}", c.label(i));
                    continue;
                };
                let levels = fit.design_levels()?;
                match args.series {
                    Series::Precipitation => c.precipitation = levels.into(),
                    Series::Discharge => {
                        let [q10, q30, q100] = levels;
                        c.q10 = Some(q10);
                        c.q30 = Some(q30);
                        c.q100 = Some(q100);
                    }
                }
                filled += 1;
            }
            eprintln!("[design_storm] filled {filled} of {} catchments", catchments.len());
            fs::write(&args.output, serde_json::to_string_pretty(&catchments)?)
                .with_context(|| format!("writing {}", args.output.display()))?;
        }
    }

    eprintln!("  -> {}", args.output.display());
    Ok(())
}
