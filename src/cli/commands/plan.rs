//! `aql plan` command - Sample plan lookup for a batch quantity

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::load_table;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::project::Project;
use crate::core::sampling::{resolve_str, InspectionStep, SampleLetter};
use crate::core::table::{AcReTable, Acceptance};
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct PlanArgs {
    /// Number of units in the batch
    #[arg(allow_negative_numbers = true)]
    pub quantity: String,
}

#[derive(Debug, Serialize)]
struct PlanStep {
    step: InspectionStep,
    size: usize,
    ac: Acceptance,
    re: u32,
}

#[derive(Debug, Serialize)]
struct PlanOutput {
    batch_quantity: String,
    letter: SampleLetter,
    size: usize,
    steps: Vec<PlanStep>,
}

fn plan_steps(table: &AcReTable, letter: SampleLetter) -> Result<Vec<PlanStep>> {
    InspectionStep::ALL
        .iter()
        .map(|&step| {
            let entry = table.entry(letter, step)?;
            Ok(PlanStep {
                step,
                size: entry.size,
                ac: entry.ac,
                re: entry.re,
            })
        })
        .collect()
}

pub fn run(args: PlanArgs, global: &GlobalOpts) -> Result<()> {
    let project = Project::open(global.project.as_deref()).ok();
    let config = Config::load_for(project.as_ref())?;
    let table = load_table(&config, project.as_ref())?;

    let plan = resolve_str(&args.quantity)?;
    let output = PlanOutput {
        batch_quantity: args.quantity.trim().to_string(),
        letter: plan.letter,
        size: plan.size,
        steps: plan_steps(&table, plan.letter)?,
    };

    match global.format.resolve(config.default_format.as_deref(), OutputFormat::Tsv) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&output).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", output.letter),
        OutputFormat::Md => {
            println!(
                "Batch of {}: letter **{}**, {} samples per step",
                output.batch_quantity, output.letter, output.size
            );
            println!();
            println!("| Step | Size | Ac | Re |");
            println!("|---|---|---|---|");
            for s in &output.steps {
                println!("| {} | {} | {} | {} |", s.step, s.size, s.ac, s.re);
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            println!(
                "{}: {}  {}: {}  {}: {}",
                style("Batch").bold(),
                output.batch_quantity,
                style("Letter").bold(),
                style(output.letter).cyan(),
                style("Samples/step").bold(),
                output.size
            );
            if global.quiet {
                return Ok(());
            }
            println!();
            println!(
                "{:<8} {:<6} {:<4} {:<4}",
                style("STEP").bold(),
                style("SIZE").bold(),
                style("AC").bold(),
                style("RE").bold()
            );
            for s in &output.steps {
                println!(
                    "{:<8} {:<6} {:<4} {:<4}",
                    s.step.to_string(),
                    s.size,
                    s.ac.to_string(),
                    s.re
                );
            }
        }
    }

    Ok(())
}
