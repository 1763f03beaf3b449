use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use dronegeo_core::profile::flight_path_file_name;
use dronegeo_core::records;
use dronegeo_core::target::{target_file_name, TargetAggregator};
use dronegeo_core::{angle, profile_folder, DmsAngle, GeoConfig, MapExtent};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod interactive;

use interactive::{Session, SessionOptions};

#[derive(Parser, Debug)]
#[command(name = "dronegeo", version)]
#[command(about = "Geolocate targets in drone photographs", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, env = "DRONEGEO_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the GPS fix and capture time of every photo in a folder
    Profile {
        folder: PathBuf,
        /// Output CSV (default: <folder>_flist.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Sort by capture time instead of directory order
        #[arg(long)]
        chronological: bool,
    },
    /// Mark targets in photos and project them onto the ground
    Target {
        folder: PathBuf,
        /// Height above ground in meters
        #[arg(long)]
        altitude: Option<f64>,
        /// Heading of the image top, degrees counter-clockwise from north
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        heading: f64,
        /// Use the photo's recorded image direction when present
        #[arg(long)]
        heading_from_exif: bool,
        #[command(flatten)]
        camera: CameraArgs,
        /// Output CSV (default: target_<folder>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Merge saved flight paths and targets in a directory
    Summary {
        dir: PathBuf,
        /// Write the merged targets to this CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert between decimal degrees and degrees/minutes/seconds
    Convert {
        /// Decimal degrees, or degrees minutes seconds with --dms
        #[arg(required = true, num_args = 1..=3, allow_negative_numbers = true)]
        values: Vec<f64>,
        /// Interpret the values as degrees minutes seconds
        #[arg(long)]
        dms: bool,
    },
}

/// Camera overrides on top of the configuration file.
#[derive(Args, Debug, Default)]
struct CameraArgs {
    #[arg(long)]
    focal_length: Option<f64>,
    #[arg(long)]
    sensor_width: Option<f64>,
    #[arg(long)]
    sensor_height: Option<f64>,
}

impl CameraArgs {
    fn apply(&self, config: &mut GeoConfig) {
        if let Some(v) = self.focal_length {
            config.camera.focal_length_mm = v;
        }
        if let Some(v) = self.sensor_width {
            config.camera.sensor_width_mm = v;
        }
        if let Some(v) = self.sensor_height {
            config.camera.sensor_height_mm = v;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Profile {
            folder,
            output,
            chronological,
        } => profile(&folder, output, chronological, &config),
        Commands::Target {
            folder,
            altitude,
            heading,
            heading_from_exif,
            camera,
            output,
        } => {
            let mut config = config;
            camera.apply(&mut config);
            config.validate().context("invalid camera settings")?;
            let options = SessionOptions {
                folder,
                altitude_m: altitude,
                heading_deg: heading,
                heading_from_exif,
            };
            target(options, output, config)
        }
        Commands::Summary { dir, output } => summary(&dir, output),
        Commands::Convert { values, dms } => convert(&values, dms),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<GeoConfig> {
    match path {
        Some(path) => GeoConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(GeoConfig::default()),
    }
}

fn print_extent(extent: Option<MapExtent>) {
    if let Some(e) = extent {
        println!(
            "extent: lat {:.6} .. {:.6}, lon {:.6} .. {:.6}",
            e.min_lat, e.max_lat, e.min_lon, e.max_lon
        );
    }
}

fn profile(folder: &Path, output: Option<PathBuf>, chronological: bool, config: &GeoConfig) -> Result<()> {
    let mut profile = profile_folder(folder, config);
    if chronological {
        profile.sort_chronologically();
    }

    for record in &profile.records {
        let time = record.timestamp.as_deref().unwrap_or("-");
        match record.fix {
            Some(fix) => println!(
                "{}\t{time}\t{}\t{}\t{}",
                record.fname, fix.lat, fix.lon, fix.alt
            ),
            None => println!("{}\t{time}\t-\t-\t-", record.fname),
        }
    }
    for diagnostic in &profile.diagnostics {
        eprintln!("skipped {}: {}", diagnostic.path.display(), diagnostic.error);
    }
    print_extent(profile.extent());
    if let Some(area) = &config.survey_area {
        println!("{} fix(es) inside the survey area", profile.count_within(area));
    }

    let output = output.unwrap_or_else(|| PathBuf::from(flight_path_file_name(folder)));
    records::save_flight_path(&output, &profile.records)
        .with_context(|| format!("records were printed above but not saved to {}", output.display()))?;
    println!("saved {} record(s) to {}", profile.records.len(), output.display());
    Ok(())
}

fn target(options: SessionOptions, output: Option<PathBuf>, config: GeoConfig) -> Result<()> {
    let output = output.unwrap_or_else(|| PathBuf::from(target_file_name(&options.folder)));
    let mut aggregator = TargetAggregator::new(config);

    let stdin = std::io::stdin();
    let mut session = Session::new(stdin.lock(), std::io::stdout());
    session.run(&mut aggregator, &options)?;

    println!("total: {} target(s)", aggregator.len());
    println!("file, lat_deg, lon_deg");
    for record in aggregator.records() {
        println!("{}, {}, {}", record.file(), record.lat_deg(), record.lon_deg());
    }

    if let Err(e) = records::save_targets(&output, aggregator.records()) {
        warn!(error = %e, "save failed, printing CSV");
        let mut stdout = std::io::stdout().lock();
        records::write_targets(&mut stdout, aggregator.records())?;
        stdout.flush()?;
        return Err(e).context("targets were printed above but not saved");
    }
    println!("saved to {}", output.display());
    Ok(())
}

fn summary(dir: &Path, output: Option<PathBuf>) -> Result<()> {
    let merged = records::collect_summary(dir)
        .with_context(|| format!("cannot summarize {}", dir.display()))?;

    for diagnostic in &merged.diagnostics {
        eprintln!("skipped {}: {}", diagnostic.path.display(), diagnostic.error);
    }
    println!("{} route point(s), {} target(s)", merged.routes.len(), merged.targets.len());
    print_extent(merged.extent());

    if let Some(output) = output {
        records::save_target_rows(&output, &merged.targets)?;
        info!(path = %output.display(), "merged targets saved");
    }
    Ok(())
}

fn convert(values: &[f64], dms: bool) -> Result<()> {
    if !dms {
        let [degrees] = values else {
            bail!("expected one decimal degree value, got {}", values.len());
        };
        println!("{}", angle::to_dms(*degrees));
        return Ok(());
    }

    let [d, m, s] = values else {
        bail!("--dms expects degrees minutes seconds");
    };
    if d.fract() != 0.0 || m.fract() != 0.0 || *m < 0.0 || *s < 0.0 {
        bail!("degrees and minutes must be whole numbers, minutes and seconds non-negative");
    }
    if d.abs() > 360.0 {
        bail!("degrees out of range: {d}");
    }
    let dms = DmsAngle::from_signed_parts(*d, *m, *s);
    println!("{}", angle::to_decimal(&dms));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_target_flags() {
        let cli = Cli::parse_from([
            "dronegeo",
            "target",
            "flight_01",
            "--altitude",
            "80",
            "--heading",
            "-15",
            "--focal-length",
            "8.8",
        ]);
        let Commands::Target {
            folder,
            altitude,
            heading,
            camera,
            ..
        } = cli.command
        else {
            panic!("expected target command");
        };
        assert_eq!(folder, PathBuf::from("flight_01"));
        assert_eq!(altitude, Some(80.0));
        assert_eq!(heading, -15.0);

        let mut config = GeoConfig::default();
        camera.apply(&mut config);
        assert_eq!(config.camera.focal_length_mm, 8.8);
        assert_eq!(config.camera.sensor_width_mm, 17.3);
    }

    #[test]
    fn test_cli_parses_convert() {
        let cli = Cli::parse_from(["dronegeo", "convert", "--dms", "-37", "17", "11.209"]);
        assert!(matches!(
            cli.command,
            Commands::Convert { ref values, dms: true } if values == &[-37.0, 17.0, 11.209]
        ));
    }

    #[test]
    fn test_convert_validation() {
        assert!(convert(&[37.286447], false).is_ok());
        assert!(convert(&[37.0, 17.0, 11.209], true).is_ok());
        assert!(convert(&[37.5, 17.0, 11.0], true).is_err());
        assert!(convert(&[37.0, 17.0], true).is_err());
        assert!(convert(&[1.0, 2.0], false).is_err());
        assert!(convert(&[400.0, 0.0, 0.0], true).is_err());
    }

    #[test]
    fn test_convert_negative_zero_degrees() {
        let cli = Cli::parse_from(["dronegeo", "convert", "--dms", "-0", "30", "0"]);
        let Commands::Convert { values, .. } = cli.command else {
            panic!("expected convert command");
        };
        assert!(values[0].is_sign_negative());
        let dms = DmsAngle::from_signed_parts(values[0], values[1], values[2]);
        assert_eq!(angle::to_decimal(&dms), -0.5);
        assert!(convert(&values, true).is_ok());
    }

    #[test]
    fn test_profile_writes_flight_path() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("flight");
        std::fs::create_dir(&folder).unwrap();
        std::fs::write(folder.join("DJI_0001.JPG"), dronegeo_core::fixtures::reference_jpeg()).unwrap();

        let output = dir.path().join("flight_flist.csv");
        profile(&folder, Some(output.clone()), true, &GeoConfig::default()).unwrap();
        let rows = records::read_flight_rows(&output).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].lat, Some(37.286447));
    }

    #[test]
    fn test_missing_config_file() {
        assert!(load_config(Some(Path::new("/no/such/config.json"))).is_err());
        assert_eq!(load_config(None).unwrap(), GeoConfig::default());
    }
}
