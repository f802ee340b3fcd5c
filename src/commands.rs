//! Command handlers

use crate::cli::{Cli, Commands, OutputFormat};
use crate::config::Config;
use crate::detector::YoloDetector;
use crate::error::{Error, Result};
use crate::output::{output_batch, output_run};
use crate::pipeline::{run_batch, run_image};
use crate::scanner::{scan_directory, validate_image};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    // Load config
    let mut config = Config::load()?;

    // Override from CLI args; the resulting value is immutable for the run
    if let Some(ref model) = cli.model {
        config.model_path = Some(model.clone());
    }
    if let Some(ref classes) = cli.classes {
        config.classes_path = Some(classes.clone());
    }
    if let Some(threshold) = cli.threshold {
        config.confidence_threshold = threshold;
    }
    if let Some(ref output_dir) = cli.output_dir {
        config.output_dir = Some(output_dir.clone());
    }
    config.validate()?;

    let output_format = cli.format.unwrap_or_default();

    match &cli.command {
        Commands::Detect { image } => cmd_detect(&cli, &config, image.clone(), output_format),

        Commands::Batch { folder } => cmd_batch(&cli, &config, folder.clone(), output_format),

        Commands::Config {
            show,
            set_model,
            set_classes,
            set_threshold,
            set_scale_factor,
            set_output_dir,
            reset,
        } => cmd_config(
            *show,
            set_model.clone(),
            set_classes.clone(),
            *set_threshold,
            *set_scale_factor,
            set_output_dir.clone(),
            *reset,
        ),
    }
}

fn cmd_detect(
    cli: &Cli,
    config: &Config,
    image: PathBuf,
    output_format: OutputFormat,
) -> Result<()> {
    validate_image(&image)?;

    if cli.verbose {
        eprintln!("Loading model: {:?}", config.model_path);
    }
    let detector = YoloDetector::from_config(config)?;

    if cli.verbose {
        eprintln!("Running detection: {}", image.display());
    }
    let run = run_image(&detector, &image, config)?;

    // A single detection still rewrites the CSV as a one-image batch
    crate::export::write_csv(&config.csv_path(), std::slice::from_ref(&run))?;

    output_run(output_format, &run)?;
    Ok(())
}

fn cmd_batch(
    cli: &Cli,
    config: &Config,
    folder: PathBuf,
    output_format: OutputFormat,
) -> Result<()> {
    let images = scan_directory(&folder)?;

    if images.is_empty() {
        return Err(Error::ImageNotFound(format!(
            "no images found in {}",
            folder.display()
        )));
    }

    if cli.verbose {
        eprintln!("Found {} images in {}", images.len(), folder.display());
    }

    let detector = YoloDetector::from_config(config)?;

    // Progress over the strictly sequential batch
    let progress = ProgressBar::new(images.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let report = run_batch(&detector, &images, config, |_, path| {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();
        progress.set_message(filename);
        progress.inc(1);
    });
    match &report {
        Ok(_) => progress.finish_with_message("done"),
        Err(_) => progress.abandon_with_message("aborted"),
    }
    let report = report?;

    output_batch(output_format, &report)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_config(
    show: bool,
    set_model: Option<PathBuf>,
    set_classes: Option<PathBuf>,
    set_threshold: Option<f32>,
    set_scale_factor: Option<f64>,
    set_output_dir: Option<PathBuf>,
    reset: bool,
) -> Result<()> {
    let mut config = if reset {
        Config::default()
    } else {
        Config::load()?
    };
    let mut changed = reset;

    if let Some(path) = set_model {
        config.model_path = Some(path);
        changed = true;
    }
    if let Some(path) = set_classes {
        config.classes_path = Some(path);
        changed = true;
    }
    if let Some(threshold) = set_threshold {
        config.confidence_threshold = threshold;
        changed = true;
    }
    if let Some(scale_factor) = set_scale_factor {
        config.scale_factor_m2 = scale_factor;
        changed = true;
    }
    if let Some(dir) = set_output_dir {
        config.output_dir = Some(dir);
        changed = true;
    }

    if changed {
        config.validate()?;
        config.save()?;
        println!("Configuration saved.");
    }

    if show || !changed {
        println!("{}", config);
    }

    Ok(())
}
