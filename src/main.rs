use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Parser, Subcommand};

use bodymetrics::classify::{ClassificationResult, Classifier, WaistAssessment, assess_waist};
use bodymetrics::domain::{HeightInput, Measurement, Region, Sex, WeightInput};
use bodymetrics::server::{self, AppState, ClassifyResponse, build_response, region_list};
use bodymetrics::thresholds::RegionTables;

/// Width of the text BMI chart in columns.
const CHART_WIDTH: usize = 70;

/// BMI and obesity-risk calculator with region-specific thresholds.
#[derive(Parser, Debug)]
#[command(name = "bodymetrics")]
#[command(about = "BMI, body ratios and obesity risk from body measurements")]
#[command(version)]
struct Args {
    /// JSON file overriding region threshold tables.
    /// Can also be set via BODYMETRICS_TABLES environment variable.
    #[arg(long, global = true, value_name = "FILE", env = "BODYMETRICS_TABLES")]
    tables: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a full set of measurements.
    Classify(ClassifyArgs),

    /// Assess risk from waist circumference alone (height unknown).
    Waist {
        /// Waist circumference in cm.
        #[arg(long)]
        waist_cm: f64,

        /// Biological sex (male or female).
        #[arg(long)]
        sex: Sex,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show the active BMI threshold tables.
    Regions {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Run the JSON HTTP API.
    Serve {
        /// Port number for the web server.
        /// Can also be set via BODYMETRICS_PORT environment variable.
        #[arg(long, env = "BODYMETRICS_PORT", default_value = "8080")]
        port: u16,
    },
}

#[derive(clap::Args, Debug)]
#[command(group(ArgGroup::new("height").required(true).args(["height_cm", "feet"])))]
#[command(group(ArgGroup::new("weight").required(true).args(["weight_kg", "weight_lb"])))]
struct ClassifyArgs {
    /// Height in centimeters.
    #[arg(long)]
    height_cm: Option<f64>,

    /// Height in feet (may be fractional, e.g. 5.3).
    #[arg(long)]
    feet: Option<f64>,

    /// Additional inches on top of --feet.
    #[arg(long, requires = "feet")]
    inches: Option<f64>,

    /// Weight in kilograms.
    #[arg(long)]
    weight_kg: Option<f64>,

    /// Weight in pounds.
    #[arg(long)]
    weight_lb: Option<f64>,

    /// Waist circumference in cm.
    #[arg(long)]
    waist_cm: Option<f64>,

    /// Hip circumference in cm.
    #[arg(long)]
    hip_cm: Option<f64>,

    /// Age in years.
    #[arg(long)]
    age: Option<u32>,

    /// Biological sex (male or female).
    #[arg(long)]
    sex: Option<Sex>,

    /// Threshold profile: general, asian, pacific-islander or custom.
    #[arg(long, default_value = "general")]
    region: Region,

    /// Muscular or athletic build.
    #[arg(long)]
    muscular: bool,

    /// Estimate body fat percentage (needs --age and --sex).
    #[arg(long)]
    body_fat: bool,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

impl ClassifyArgs {
    /// Builds the measurement, normalizing units once at the boundary.
    fn to_measurement(&self) -> Result<Measurement> {
        let height = match (self.height_cm, self.feet) {
            (Some(cm), _) => HeightInput::Centimeters(cm),
            (None, Some(feet)) => HeightInput::FeetInches {
                feet,
                inches: self.inches.unwrap_or(0.0),
            },
            (None, None) => bail!("a height is required (--height-cm or --feet)"),
        };
        let weight = match (self.weight_kg, self.weight_lb) {
            (Some(kg), _) => WeightInput::Kilograms(kg),
            (None, Some(lb)) => WeightInput::Pounds(lb),
            (None, None) => bail!("a weight is required (--weight-kg or --weight-lb)"),
        };

        Ok(Measurement {
            waist_cm: self.waist_cm,
            hip_cm: self.hip_cm,
            age: self.age,
            sex: self.sex,
            region: self.region,
            is_muscular: self.muscular,
            estimate_body_fat: self.body_fat,
            ..Measurement::from_inputs(height, weight)
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let tables = match &args.tables {
        Some(path) => RegionTables::load(path)
            .with_context(|| format!("Failed to load threshold tables from {}", path.display()))?,
        None => RegionTables::standard(),
    };
    let classifier = Classifier::new(tables);

    match args.command {
        Command::Classify(classify_args) => {
            let measurement = classify_args.to_measurement()?;
            let response =
                build_response(&classifier, &measurement).context("Classification failed")?;

            if classify_args.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_classification(&response);
            }
        }
        Command::Waist {
            waist_cm,
            sex,
            json,
        } => {
            let assessment = assess_waist(waist_cm, Some(sex)).context("Waist assessment failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&assessment)?);
            } else {
                print_waist(waist_cm, sex, &assessment);
            }
        }
        Command::Regions { json } => {
            if json {
                let regions = region_list(classifier.tables());
                println!("{}", serde_json::to_string_pretty(&regions)?);
            } else {
                print_regions(&classifier);
            }
        }
        Command::Serve { port } => {
            let state = Arc::new(AppState { classifier });
            let static_dir = find_static_dir();
            if let Some(dir) = &static_dir {
                println!("Static files: {}", dir.display());
            }
            server::run_server(state, port, static_dir).await?;
        }
    }

    Ok(())
}

/// Prints a classification result as text.
fn print_classification(response: &ClassifyResponse) {
    let r: &ClassificationResult = &response.result;

    println!();
    println!("=== Body Metrics ({} profile) ===", r.region);
    println!();
    println!("BMI: {:.1} ({})", r.bmi, r.category);

    if let Some(whtr) = r.whtr {
        println!("Waist-to-Height Ratio (WHtR): {:.2}", whtr);
    }
    if let Some(whr) = r.whr {
        println!("Waist-to-Hip Ratio (WHR): {:.2}", whr);
    }
    if let Some(waist) = &r.waist_risk {
        println!("Waist: {}", waist.message);
    }
    if let Some(bf) = r.body_fat_pct {
        println!("Estimated Body Fat: {:.1}%", bf);
    }

    println!(
        "Healthy weight for your height: {:.1} - {:.1} kg",
        r.ideal_weight_range.low_kg, r.ideal_weight_range.high_kg
    );

    if let Some(advisory) = r.advisory {
        println!();
        println!("Note: {}", advisory.message());
    }

    println!();
    println!(
        "{:<4}{}{:>4}",
        response.chart.axis_min,
        response.chart.render_text(CHART_WIDTH),
        response.chart.axis_max
    );
    println!("    {}", response.chart.legend());
}

/// Prints a waist-only assessment as text.
fn print_waist(waist_cm: f64, sex: Sex, assessment: &WaistAssessment) {
    println!("Waist {:.1} cm ({}): {}", waist_cm, sex, assessment.message);
}

/// Prints the active threshold tables.
fn print_regions(classifier: &Classifier) {
    for (region, table) in classifier.tables().iter() {
        println!();
        println!("{} ({})", region.display_name(), region.key());
        for band in table.bands() {
            match band.high {
                Some(high) => println!(
                    "  {:12} {:>5.1} - {:<5.1}",
                    band.category.display_name(),
                    band.low,
                    high
                ),
                None => println!("  {:12} {:>5.1} +", band.category.display_name(), band.low),
            }
        }
    }
}

/// Locates an optional `static/` frontend directory.
///
/// The working directory wins over the directory holding the binary.
fn find_static_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok();
    let mut roots = vec![Path::new("")];
    if let Some(exe_dir) = exe.as_deref().and_then(Path::parent) {
        roots.push(exe_dir);
    }
    first_static_dir(&roots)
}

/// Returns `<root>/static` for the first root where it is a directory.
fn first_static_dir(roots: &[&Path]) -> Option<PathBuf> {
    roots
        .iter()
        .map(|root| root.join("static"))
        .find(|dir| dir.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_metric_classify() {
        let args = Args::try_parse_from([
            "bodymetrics",
            "classify",
            "--height-cm",
            "175",
            "--weight-kg",
            "70",
            "--sex",
            "male",
            "--region",
            "asian",
        ])
        .unwrap();

        let Command::Classify(c) = args.command else {
            panic!("expected classify subcommand");
        };
        let m = c.to_measurement().unwrap();
        assert_eq!(m.height_cm, 175.0);
        assert_eq!(m.weight_kg, 70.0);
        assert_eq!(m.sex, Some(Sex::Male));
        assert_eq!(m.region, Region::Asian);
    }

    #[test]
    fn test_args_parse_imperial_classify() {
        let args = Args::try_parse_from([
            "bodymetrics",
            "classify",
            "--feet",
            "5",
            "--inches",
            "7",
            "--weight-lb",
            "154.3",
            "--body-fat",
            "--age",
            "30",
        ])
        .unwrap();

        let Command::Classify(c) = args.command else {
            panic!("expected classify subcommand");
        };
        let m = c.to_measurement().unwrap();
        assert!((m.height_cm - 170.18).abs() < 1e-9);
        assert!((m.weight_kg - 69.989).abs() < 0.001);
        assert!(m.estimate_body_fat);
        assert_eq!(m.age, Some(30));
    }

    #[test]
    fn test_args_require_height_and_weight() {
        assert!(Args::try_parse_from(["bodymetrics", "classify", "--weight-kg", "70"]).is_err());
        assert!(Args::try_parse_from(["bodymetrics", "classify", "--height-cm", "170"]).is_err());
    }

    #[test]
    fn test_args_reject_conflicting_units() {
        assert!(
            Args::try_parse_from([
                "bodymetrics",
                "classify",
                "--height-cm",
                "170",
                "--feet",
                "5",
                "--weight-kg",
                "70",
            ])
            .is_err()
        );
    }

    #[test]
    fn test_args_reject_unknown_region() {
        assert!(
            Args::try_parse_from([
                "bodymetrics",
                "classify",
                "--height-cm",
                "170",
                "--weight-kg",
                "70",
                "--region",
                "atlantis",
            ])
            .is_err()
        );
    }

    #[test]
    fn test_args_parse_waist() {
        let args =
            Args::try_parse_from(["bodymetrics", "waist", "--waist-cm", "95", "--sex", "F"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Waist {
                sex: Sex::Female,
                ..
            }
        ));
    }

    #[test]
    fn test_first_static_dir_prefers_earlier_root() {
        let base = std::env::temp_dir().join(format!("bodymetrics-static-{}", std::process::id()));
        let without = base.join("cwd");
        let with = base.join("bin");
        let _ = std::fs::remove_dir_all(&base);
        std::fs::create_dir_all(&without).unwrap();
        std::fs::create_dir_all(with.join("static")).unwrap();

        assert_eq!(
            first_static_dir(&[without.as_path(), with.as_path()]),
            Some(with.join("static"))
        );
        assert_eq!(first_static_dir(&[without.as_path()]), None);

        std::fs::create_dir_all(without.join("static")).unwrap();
        assert_eq!(
            first_static_dir(&[without.as_path(), with.as_path()]),
            Some(without.join("static"))
        );

        std::fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn test_args_tables_is_global() {
        let args =
            Args::try_parse_from(["bodymetrics", "regions", "--tables", "tables.json"]).unwrap();
        assert_eq!(args.tables, Some(PathBuf::from("tables.json")));
    }
}
