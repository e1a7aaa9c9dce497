//! species-sorter: prepares a per-label image dataset for classifier training.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

mod config;
mod data;
mod logging;
mod training;

use crate::config::Settings;
use crate::data::{
    inspect, organize, Dataset, EntryWarning, InspectOptions, InspectReport, OrganizeOptions,
    SplitPlan, TransferMode,
};

/// Sort raw images into per-label folders and launch training runs
#[derive(Parser, Debug)]
#[command(name = "species-sorter", version)]
struct Args {
    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides it
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Also write logs to a timestamped file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Settings file (defaults to settings.json in the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy each image listed in the manifest into its label folder
    Organize {
        /// Manifest with one `image_name label` pair per line
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Directory holding the raw images
        #[arg(short, long)]
        raw_images: Option<PathBuf>,

        /// Output root; one subdirectory per label is created inside
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Move images instead of copying them
        #[arg(long = "move")]
        move_files: bool,

        /// Print the run report as JSON instead of the summary lines
        #[arg(long)]
        json: bool,
    },

    /// Report class counts and problem images in an organized tree
    Inspect {
        /// Organized output tree (defaults to the organizer output)
        dir: Option<PathBuf>,

        /// Flag near-black frames (slow: decodes and clusters every image)
        #[arg(long)]
        detect_black: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Preview the train/validation split of an organized tree
    Split {
        dir: Option<PathBuf>,

        #[arg(long)]
        train_fraction: Option<f64>,

        #[arg(long)]
        seed: Option<u64>,

        /// Write the full plan as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Write the default settings to a file
    InitConfig {
        /// Destination (defaults to the user config directory)
        path: Option<PathBuf>,
    },

    /// Launch an external training run
    Train {
        #[command(subcommand)]
        job: TrainJob,

        /// Print the command instead of running it
        #[arg(long, global = true)]
        dry_run: bool,
    },
}

#[derive(Subcommand, Debug)]
enum TrainJob {
    /// Fine-tune the image classifier on the organized tree
    Classifier {
        #[arg(long)]
        data_dir: Option<PathBuf>,

        #[arg(long)]
        epochs: Option<u32>,
    },

    /// Train the object detector from its annotation config
    Detector {
        #[arg(long)]
        data: Option<PathBuf>,

        #[arg(long)]
        epochs: Option<u32>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::setup_logging(&args.log_level, args.log_dir.as_deref()) {
        eprintln!("Failed to set up logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let load_settings =
        || Settings::load(args.config.as_deref()).context("loading settings");

    match args.command {
        Command::InitConfig { path } => {
            let path = path
                .or_else(Settings::default_path)
                .context("could not determine config directory")?;
            Settings::default().save(&path)?;
            println!("{}", path.display());
            Ok(ExitCode::SUCCESS)
        }

        Command::Organize {
            manifest,
            raw_images,
            output,
            move_files,
            json,
        } => {
            let defaults = load_settings()?.organizer;
            let options = OrganizeOptions {
                manifest: manifest.unwrap_or(defaults.manifest),
                raw_images_dir: raw_images.unwrap_or(defaults.raw_images_dir),
                output_dir: output.unwrap_or(defaults.output_dir),
                transfer: if move_files {
                    TransferMode::Move
                } else {
                    defaults.transfer
                },
            };
            run_organize(&options, json)
        }

        Command::Inspect {
            dir,
            detect_black,
            json,
        } => {
            let settings = load_settings()?;
            let dir = dir.unwrap_or(settings.organizer.output_dir);
            let dataset = Dataset::open(&dir)?;
            let report = inspect(
                &dataset,
                &InspectOptions {
                    detect_black: detect_black || settings.detect_black,
                    expected_classes: Some(settings.classifier.num_classes),
                },
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_inspect_report(&report);
            }

            Ok(if report.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            })
        }

        Command::Split {
            dir,
            train_fraction,
            seed,
            output,
        } => {
            let settings = load_settings()?;
            let dir = dir.unwrap_or(settings.organizer.output_dir);
            let dataset = Dataset::open(&dir)?;
            let plan = SplitPlan::new(
                &dataset,
                train_fraction.unwrap_or(settings.classifier.train_fraction),
                seed.unwrap_or(settings.split_seed),
            )?;

            for class in &plan.classes {
                println!("{:<24} train {:>5}  val {:>5}", class.name, class.train, class.val);
            }
            println!("total train {}  val {}", plan.train.len(), plan.val.len());

            if let Some(path) = output {
                plan.write_json(&path)?;
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Train { job, dry_run } => {
            let settings = load_settings()?;
            let cmd = match job {
                TrainJob::Classifier { data_dir, epochs } => {
                    let mut job = settings.classifier;
                    if let Some(data_dir) = data_dir {
                        job.data_dir = data_dir;
                    }
                    if let Some(epochs) = epochs {
                        job.epochs = epochs;
                    }
                    let dataset = job.validate()?;
                    info!("Classes: {:?}", dataset.class_names());
                    job.command()
                }
                TrainJob::Detector { data, epochs } => {
                    let mut job = settings.detector;
                    if let Some(data) = data {
                        job.data = data;
                    }
                    if let Some(epochs) = epochs {
                        job.epochs = epochs;
                    }
                    job.validate()?;
                    job.command()
                }
            };

            if dry_run {
                println!("{}", training::describe(&cmd));
            } else {
                training::launch(cmd)?;
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_inspect_report(report: &InspectReport) {
    for class in &report.classes {
        println!("{:<24} {}", class.name, class.images);
    }
    println!("{} images in {} classes.", report.total_images, report.classes.len());
    if let Some((expected, found)) = report.class_count_mismatch {
        println!("Classifier expects {} classes, found {}.", expected, found);
    }
    for path in &report.undecodable {
        println!("undecodable: {}", path.display());
    }
    for path in &report.near_black {
        println!("near-black: {}", path.display());
    }
}

fn run_organize(options: &OrganizeOptions, json: bool) -> Result<ExitCode> {
    let report = match organize(options) {
        Ok(report) => report,
        Err(e) if e.is_configuration() => {
            return Err(e).context("invalid organizer configuration");
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        for line in report.summary.report_lines(&options.raw_images_dir) {
            println!("{}", line);
        }
    }

    if report.summary.has_failures() {
        let first = report
            .warnings
            .iter()
            .find(|w| matches!(w, EntryWarning::TransferFailed { .. }));
        if let Some(warning) = first {
            warn!("First transfer failure at line {}", warning.line());
        }
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}
