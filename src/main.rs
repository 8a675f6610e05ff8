//! Skysweep entry point
//!
//! Loads the survey inputs, runs one planning pass, and writes the
//! flightpath log and the GeoJSON result map.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use glam::DVec2;

use skysweep::loader::{WordTable, parse_no_fly_zones, parse_sensor_records, resolve_sensors};
use skysweep::map::{format_flightpath, render_map};
use skysweep::plan::planner::Planner;
use skysweep::{PlanConfig, SurveyError, SurveyResult};

#[derive(Debug, Parser)]
#[command(name = "skysweep", about = "Plan a sensor survey flight")]
struct Args {
    /// No-fly zone GeoJSON file
    #[arg(long)]
    zones: PathBuf,

    /// Sensor list JSON file
    #[arg(long)]
    sensors: PathBuf,

    /// Word table JSON file (location code -> coordinates)
    #[arg(long)]
    words: PathBuf,

    /// Start longitude
    #[arg(long, allow_hyphen_values = true)]
    start_lng: f64,

    /// Start latitude
    #[arg(long, allow_hyphen_values = true)]
    start_lat: f64,

    /// Seed for the recovery heading generator
    #[arg(long, default_value_t = 5678)]
    seed: u64,

    /// Move budget override
    #[arg(long)]
    budget: Option<u32>,

    /// Output file prefix
    #[arg(long, default_value = "survey")]
    out: String,
}

fn read_input(path: &Path) -> SurveyResult<String> {
    fs::read_to_string(path).map_err(|source| SurveyError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_output(path: &Path, contents: &str) -> SurveyResult<()> {
    fs::write(path, contents).map_err(|source| SurveyError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn run(args: &Args) -> SurveyResult<()> {
    let zones = parse_no_fly_zones(&read_input(&args.zones)?)?;
    let records = parse_sensor_records(&read_input(&args.sensors)?)?;
    let words = WordTable::from_json(&read_input(&args.words)?)?;
    let sensors = resolve_sensors(records, &words)?;

    let mut config = PlanConfig::default();
    if let Some(budget) = args.budget {
        config.budget = budget;
    }

    let start = DVec2::new(args.start_lng, args.start_lat);
    log::info!(
        "Planning run: {} sensors, {} zones, seed {}, budget {}",
        sensors.len(),
        zones.len(),
        args.seed,
        config.budget
    );

    let result = Planner::seeded(config, zones, sensors, start, args.seed).run();
    log::info!(
        "Run ended in phase {:?}: {} moves used, {} sensors read, {} missed",
        result.phase,
        result.log.len(),
        result.visited.len(),
        result.remaining.len()
    );

    let flightpath_file = PathBuf::from(format!("{}-flightpath.txt", args.out));
    write_output(&flightpath_file, &format_flightpath(&result.log))?;
    log::info!("Wrote {}", flightpath_file.display());

    let all_sensors: Vec<_> = result
        .visited
        .iter()
        .chain(result.remaining.iter())
        .cloned()
        .collect();
    let map = render_map(&all_sensors, &result.path);
    let map_json = serde_json::to_string_pretty(&map).map_err(|source| SurveyError::Json {
        context: "result map",
        source,
    })?;
    let map_file = PathBuf::from(format!("{}-readings.geojson", args.out));
    write_output(&map_file, &map_json)?;
    log::info!("Wrote {}", map_file.display());

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    if let Err(err) = run(&args) {
        log::error!("{err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
