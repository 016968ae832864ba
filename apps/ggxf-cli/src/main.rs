use clap::{Parser, Subcommand};
use ggxf_model::{ConfigError, Model, ModelError};
use ggxf_project::{LoadOptions, LoadedModel, ProjectResult, open_model};
use std::path::{Path, PathBuf};
use tracing::{Level, debug};

#[derive(Parser)]
#[command(name = "ggxf-cli")]
#[command(about = "GGXF CLI - inspect and evaluate gridded geodetic models", long_about = None)]
struct Cli {
    /// Skip groups that fail configuration, reporting them
    #[arg(long, global = true)]
    best_effort: bool,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a GGXF document and configure its model
    Validate {
        /// Path to the GGXF YAML or JSON file
        model_path: PathBuf,
    },
    /// Describe content, parameters, groups and grids
    Summary {
        /// Path to the GGXF YAML or JSON file
        model_path: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every grid, depth-first
    Grids {
        /// Path to the GGXF YAML or JSON file
        model_path: PathBuf,
    },
    /// Evaluate all parameters at a point
    #[command(allow_negative_numbers = true)]
    Evaluate {
        /// Path to the GGXF YAML or JSON file
        model_path: PathBuf,
        /// First interpolation coordinate
        x: f64,
        /// Second interpolation coordinate
        y: f64,
        /// Evaluation epoch, as a decimal year or ISO date
        #[arg(long)]
        epoch: Option<String>,
        /// Reference epoch the change is measured from
        #[arg(long)]
        ref_epoch: Option<String>,
    },
}

fn main() -> ProjectResult<()> {
    let cli = Cli::parse();
    if cli.verbose {
        tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();
    } else {
        tracing_subscriber::fmt::init();
    }

    let options = if cli.best_effort {
        LoadOptions::best_effort()
    } else {
        LoadOptions::default()
    };

    match cli.command {
        Commands::Validate { model_path } => cmd_validate(&model_path, &options),
        Commands::Summary { model_path, json } => cmd_summary(&model_path, &options, json),
        Commands::Grids { model_path } => cmd_grids(&model_path, &options),
        Commands::Evaluate {
            model_path,
            x,
            y,
            epoch,
            ref_epoch,
        } => cmd_evaluate(
            &model_path,
            &options,
            (x, y),
            epoch.as_deref(),
            ref_epoch.as_deref(),
        ),
    }
}

fn load(model_path: &Path, options: &LoadOptions) -> ProjectResult<Model> {
    let LoadedModel { model, errors } = open_model(model_path, options)?;
    report_excluded(&errors);
    Ok(model)
}

fn report_excluded(errors: &[ConfigError]) {
    if errors.is_empty() {
        return;
    }
    eprintln!("{} group(s) excluded:", errors.len());
    for err in errors {
        eprintln!("  ✗ {err}");
    }
}

fn cmd_validate(model_path: &Path, options: &LoadOptions) -> ProjectResult<()> {
    println!("Validating model: {}", model_path.display());
    let model = load(model_path, options)?;
    println!(
        "✓ {} model is valid ({} groups, {} grids, {} parameters)",
        model.content(),
        model.groups().len(),
        model.grids().count(),
        model.parameters().len()
    );
    Ok(())
}

fn cmd_summary(model_path: &Path, options: &LoadOptions, json: bool) -> ProjectResult<()> {
    let model = load(model_path, options)?;
    let summary = model.summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Content: {}", summary.content);
    for (key, value) in &summary.metadata {
        println!("  {key}: {value}");
    }
    println!("Parameters:");
    for parameter in &summary.parameters {
        println!("  {} ({})", parameter.name(), parameter.unit());
    }
    for group in &summary.groups {
        println!(
            "Group {} - {} interpolation, {} grids",
            group.name,
            group.interpolation_method,
            group.grids.len()
        );
        println!("  parameters: {}", group.parameters.join(", "));
        if !group.time_functions.is_empty() {
            println!("  time functions: {}", group.time_functions.join(", "));
        }
    }
    Ok(())
}

fn cmd_grids(model_path: &Path, options: &LoadOptions) -> ProjectResult<()> {
    let model = load(model_path, options)?;
    let mut any = false;
    for (group, grid) in model.grids() {
        any = true;
        let (i_count, j_count) = grid.size();
        let extent = grid.extent();
        let priority = grid
            .priority()
            .map_or_else(String::new, |p| format!(", priority {p}"));
        println!(
            "  {:<10} {} [{}] {}x{} nodes, x {}..{}, y {}..{}{}",
            grid.display_id(),
            grid.name(),
            group.name(),
            i_count,
            j_count,
            extent.x_min,
            extent.x_max,
            extent.y_min,
            extent.y_max,
            priority
        );
    }
    if !any {
        println!("No grids found in model");
    }
    Ok(())
}

fn cmd_evaluate(
    model_path: &Path,
    options: &LoadOptions,
    xy: (f64, f64),
    epoch: Option<&str>,
    ref_epoch: Option<&str>,
) -> ProjectResult<()> {
    let model = load(model_path, options)?;
    let epoch = epoch.map(ggxf_time::parse_epoch).transpose()?;
    let ref_epoch = ref_epoch.map(ggxf_time::parse_epoch).transpose()?;
    debug!(?xy, ?epoch, ?ref_epoch, "evaluating");

    let values = model
        .evaluate(xy, epoch, ref_epoch)
        .map_err(ModelError::from)?;
    match values {
        Some(values) => {
            for (parameter, value) in model.parameters().iter().zip(values) {
                println!("{:<36} {value:.6} {}", parameter.name(), parameter.unit());
            }
        }
        None => println!("Point ({}, {}) is outside the model coverage", xy.0, xy.1),
    }
    Ok(())
}
