//! `aql coating` command - Coating thickness statistics and checks

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{display_id, find_inspection, load_table, open_project};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::coating::{self, CoatingCheck, CoatingKind, CoatingRequirements, CoatingStats, Reading};
use crate::core::loader;
use crate::core::project::Project;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum CoatingCommands {
    /// Compute statistics for a list of readings
    Stats(StatsArgs),

    /// Append readings to an inspection
    Add(AddArgs),

    /// Check an inspection's readings against the coating requirements
    Check(CheckArgs),
}

#[derive(clap::Args, Debug)]
pub struct StatsArgs {
    /// Thickness readings
    #[arg(required = true, allow_negative_numbers = true)]
    pub values: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Inspection ID or short ID (INSP@N)
    pub id: String,

    /// Thickness readings
    #[arg(required = true, allow_negative_numbers = true)]
    pub values: Vec<String>,

    /// Unit of the readings
    #[arg(long, short = 'u')]
    pub unit: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Inspection ID or short ID (INSP@N)
    pub id: String,
}

pub fn run(cmd: CoatingCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CoatingCommands::Stats(args) => run_stats(args, global),
        CoatingCommands::Add(args) => run_add(args, global),
        CoatingCommands::Check(args) => run_check(args, global),
    }
}

/// Numbers are stored as numbers; anything else is kept verbatim
fn to_reading(raw: &str) -> Reading {
    raw.trim()
        .parse::<f64>()
        .map(Reading::from)
        .unwrap_or_else(|_| Reading::from(raw))
}

fn print_stats(stats: &CoatingStats, unit: &str) {
    if stats.readings == 0 {
        println!("{} No valid readings", style("!").yellow());
        return;
    }

    let rows: [(&str, f64); 8] = [
        ("Mean", stats.mean),
        ("Max", stats.max),
        ("Min", stats.min),
        ("Range", stats.range),
        ("Std deviation", stats.std_deviation),
        ("Mean + 3σ", stats.mean_plus_3sigma),
        ("Mean - 3σ", stats.mean_minus_3sigma),
        ("CV %", stats.cv_percent),
    ];

    println!("{}: {}", style("Readings").bold(), stats.readings);
    for (label, value) in rows {
        let unit = if label == "CV %" { "" } else { unit };
        println!("{:<15} {} {}", style(label).bold(), value, style(unit).dim());
    }
}

fn run_stats(args: StatsArgs, global: &GlobalOpts) -> Result<()> {
    let readings: Vec<Reading> = args.values.iter().map(|v| to_reading(v)).collect();
    let stats = coating::compute(&readings);
    let project = Project::open(global.project.as_deref()).ok();
    let configured = Config::load_for(project.as_ref())?.default_format;

    match global.format.resolve(configured.as_deref(), OutputFormat::Auto) {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats).into_diagnostic()?),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&stats).into_diagnostic()?),
        OutputFormat::Tsv => {
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                stats.readings,
                stats.mean,
                stats.max,
                stats.min,
                stats.range,
                stats.std_deviation,
                stats.mean_plus_3sigma,
                stats.mean_minus_3sigma,
                stats.cv_percent
            );
        }
        _ => print_stats(&stats, ""),
    }
    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load_for(Some(&project))?;
    let table = load_table(&config, Some(&project))?;
    let requirements = config.coating_requirements()?;
    let (_, mut insp) = find_inspection(&project, &table, &args.id)?;

    if let Some(unit) = args.unit {
        insp.coating.unit = unit;
    }
    let start = insp.coating.readings.len();
    insp.coating
        .readings
        .extend(args.values.iter().map(|v| to_reading(v)));
    loader::save_entity(&project, &insp)?;

    println!(
        "{} Added {} reading(s) to {}",
        style("✓").green(),
        args.values.len(),
        style(display_id(&project, &insp.id)).cyan()
    );

    if !global.quiet {
        for (i, raw) in args.values.iter().enumerate() {
            if !coating::is_coating_value_valid(CoatingKind::Local, raw, &requirements) {
                println!(
                    "   {} reading {} ({}) is below the local minimum of {} {}",
                    style("!").yellow(),
                    start + i + 1,
                    raw,
                    requirements.threshold(CoatingKind::Local),
                    insp.coating.unit
                );
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct CheckOutput<'a> {
    requirements: &'a CoatingRequirements,
    #[serde(flatten)]
    check: &'a CoatingCheck,
    passed: bool,
}

fn run_check(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let config = Config::load_for(Some(&project))?;
    let table = load_table(&config, Some(&project))?;
    let requirements = config.coating_requirements()?;
    let (_, insp) = find_inspection(&project, &table, &args.id)?;

    let check = coating::check(&insp.coating.readings, &requirements);
    let unit = insp.coating.unit.as_str();

    match global.format.resolve(config.default_format.as_deref(), OutputFormat::Auto) {
        f @ (OutputFormat::Json | OutputFormat::Yaml) => {
            let output = CheckOutput {
                requirements: &requirements,
                check: &check,
                passed: check.passed(),
            };
            if f == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
            } else {
                print!("{}", serde_yml::to_string(&output).into_diagnostic()?);
            }
        }
        OutputFormat::Id => println!("{}", if check.passed() { "pass" } else { "fail" }),
        _ => {
            if !global.quiet {
                print_stats(&check.stats, unit);
                println!();
            }

            match check.mean_ok {
                Some(true) => println!(
                    "{} Mean {} {} meets the minimum of {}",
                    style("✓").green(),
                    check.stats.mean,
                    unit,
                    requirements.threshold(CoatingKind::Mean)
                ),
                Some(false) => println!(
                    "{} Mean {} {} is below the minimum of {}",
                    style("✗").red(),
                    check.stats.mean,
                    unit,
                    requirements.threshold(CoatingKind::Mean)
                ),
                None => println!("{} No readings to check", style("!").yellow()),
            }

            if check.local_failures.is_empty() {
                if check.mean_ok.is_some() {
                    println!(
                        "{} All readings meet the local minimum of {}",
                        style("✓").green(),
                        requirements.threshold(CoatingKind::Local)
                    );
                }
            } else {
                for &i in &check.local_failures {
                    println!(
                        "{} Reading {} ({}) is below the local minimum of {}",
                        style("✗").red(),
                        i + 1,
                        insp.coating.readings[i],
                        requirements.threshold(CoatingKind::Local)
                    );
                }
            }

            let verdict = if check.passed() {
                style("pass").green()
            } else {
                style("fail").red()
            };
            println!("{}: {}", style("Coating").bold(), verdict);
        }
    }

    Ok(())
}
