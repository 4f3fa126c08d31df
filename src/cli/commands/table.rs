//! `aql table` command - Ac/Re table display and validation

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::load_table;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::project::Project;
use crate::core::sampling::{InspectionStep, SampleLetter};
use crate::core::table::AcReTable;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum TableCommands {
    /// Show the Ac/Re table in effect
    Show(ShowArgs),

    /// Validate the configured table (or a given file)
    Validate(ValidateArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Only show one sample letter
    #[arg(long, short = 'l')]
    pub letter: Option<SampleLetter>,
}

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Table file to validate instead of the configured one
    pub file: Option<PathBuf>,
}

pub fn run(cmd: TableCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TableCommands::Show(args) => run_show(args, global),
        TableCommands::Validate(args) => run_validate(args, global),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::open(global.project.as_deref()).ok();
    let config = Config::load_for(project.as_ref())?;
    let table = load_table(&config, project.as_ref())?;

    let letters: Vec<SampleLetter> = match args.letter {
        Some(letter) => vec![letter],
        None => table.letters().collect(),
    };

    let format = global.format.resolve(config.default_format.as_deref(), OutputFormat::Tsv);
    match format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let subset: std::collections::BTreeMap<_, _> = letters
                .iter()
                .map(|&l| {
                    let row: std::collections::BTreeMap<_, _> =
                        table.row(l).into_iter().map(|(s, e)| (s, *e)).collect();
                    (l, row)
                })
                .collect();
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&subset).into_diagnostic()?);
            } else {
                print!("{}", serde_yml::to_string(&subset).into_diagnostic()?);
            }
        }
        OutputFormat::Id => {
            for letter in letters {
                println!("{}", letter);
            }
        }
        OutputFormat::Md => {
            println!("| Letter | Size | First | Second | Third | Fourth | Fifth |");
            println!("|---|---|---|---|---|---|---|");
            for letter in letters {
                let cells: Vec<String> = table
                    .row(letter)
                    .iter()
                    .map(|(_, e)| format!("{}/{}", e.ac, e.re))
                    .collect();
                println!(
                    "| {} | {} | {} |",
                    letter,
                    letter.sample_size(),
                    cells.join(" | ")
                );
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            print!("{:<7} {:<5} ", style("LETTER").bold(), style("SIZE").bold());
            for step in InspectionStep::ALL {
                print!("{:<8} ", style(step.to_string().to_uppercase()).bold());
            }
            println!();
            println!("{}", "-".repeat(7 + 5 + 9 * InspectionStep::COUNT + 2));

            for letter in letters {
                print!("{:<7} {:<5} ", style(letter.as_str()).cyan(), letter.sample_size());
                for step in InspectionStep::ALL {
                    let cell = match table.entry(letter, step) {
                        Ok(e) => format!("{}/{}", e.ac, e.re),
                        Err(_) => "-".to_string(),
                    };
                    print!("{:<8} ", cell);
                }
                println!();
            }

            if !global.quiet {
                println!();
                println!(
                    "Cells are {} per step; {} means no acceptance at that step.",
                    style("Ac/Re").cyan(),
                    style("#").cyan()
                );
            }
        }
    }

    Ok(())
}

fn run_validate(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let (table, source) = match args.file {
        Some(path) => (AcReTable::load(&path)?, path.display().to_string()),
        None => {
            let project = Project::open(global.project.as_deref()).ok();
            let config = Config::load_for(project.as_ref())?;
            let source = config
                .acre_table
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in table".to_string());
            (load_table(&config, project.as_ref())?, source)
        }
    };

    // Loading already validated the entries; gaps are only reported
    let missing = table.missing();
    if !missing.is_empty() && !global.quiet {
        println!(
            "{} {} letter/step combination(s) have no entry:",
            style("!").yellow(),
            missing.len()
        );
        for (letter, step) in &missing {
            println!("   {} {}/{}", style("•").dim(), letter, step);
        }
    }

    println!(
        "{} {} is valid ({} letters)",
        style("✓").green(),
        style(source).cyan(),
        table.letters().count()
    );
    Ok(())
}
