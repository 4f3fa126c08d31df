//! `aql insp` command - Batch inspection management

use clap::{Subcommand, ValueEnum};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{
    display_id, find_inspection, format_short_id, load_table, locate_inspection, open_project,
    styled_status, truncate_str,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::decision::Decision;
use crate::core::loader;
use crate::core::project::Project;
use crate::core::run::{Action, InspectionStatus};
use crate::core::sampling::{resolve_str, InspectionStep};
use crate::core::shortid::ShortIdIndex;
use crate::core::table::AcReTable;
use crate::core::tolerance::{classify, Classification, Dimension};
use crate::core::Config;
use crate::entities::Inspection;

#[derive(Subcommand, Debug)]
pub enum InspCommands {
    /// List inspections
    List(ListArgs),

    /// Start a new inspection
    New(NewArgs),

    /// Show an inspection's details
    Show(IdArgs),

    /// Show the current step, counts and verdict
    Status(IdArgs),

    /// Record a measurement
    Measure(MeasureArgs),

    /// Move on to the next step after an advance decision
    Advance(IdArgs),

    /// Change the batch quantity (starts the measurements over)
    Requantify(RequantifyArgs),

    /// Print the measurements as a plain mapping
    Report(IdArgs),

    /// Edit an inspection in your editor
    Edit(IdArgs),
}

/// Inspection status filter
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusFilter {
    InProgress,
    Pass,
    Reject,
    All,
}

impl StatusFilter {
    fn matches(self, status: InspectionStatus) -> bool {
        match self {
            StatusFilter::InProgress => status == InspectionStatus::InProgress,
            StatusFilter::Pass => status == InspectionStatus::Pass,
            StatusFilter::Reject => status == InspectionStatus::Reject,
            StatusFilter::All => true,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by inspection status
    #[arg(long, short = 's', default_value = "all")]
    pub status: StatusFilter,

    /// Search in title, lot number and product
    #[arg(long)]
    pub search: Option<String>,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Inspection title
    #[arg(long, short = 't')]
    pub title: String,

    /// Batch quantity (the sample plan is resolved from it)
    #[arg(long, short = 'Q', allow_hyphen_values = true)]
    pub quantity: Option<String>,

    /// Dimension as CODE:NOMINAL:PLUS:MINUS[:DESCRIPTION] (repeatable)
    #[arg(long = "dim", short = 'd', required = true)]
    pub dims: Vec<Dimension>,

    /// User-defined lot number
    #[arg(long, short = 'l')]
    pub lot: Option<String>,

    /// Product or part under inspection
    #[arg(long, short = 'p')]
    pub product: Option<String>,

    /// Notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Inspection ID or short ID (INSP@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct MeasureArgs {
    /// Inspection ID or short ID (INSP@N)
    pub id: String,

    /// Dimension code
    #[arg(long = "dim", short = 'd', required_unless_present = "interactive")]
    pub dim: Option<String>,

    /// Sample number within the step (1-based)
    #[arg(long, short = 's', required_unless_present = "interactive")]
    pub sample: Option<usize>,

    /// Step to record into (default: the current step)
    #[arg(long)]
    pub step: Option<InspectionStep>,

    /// Measured value; omit or pass "" to clear the slot
    #[arg(allow_negative_numbers = true)]
    pub value: Option<String>,

    /// Prompt for every empty slot of the current step
    #[arg(long, short = 'i', conflicts_with_all = ["dim", "sample", "value"])]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct RequantifyArgs {
    /// Inspection ID or short ID (INSP@N)
    pub id: String,

    /// New batch quantity
    #[arg(allow_negative_numbers = true)]
    pub quantity: String,
}

/// Run an inspection subcommand
pub fn run(cmd: InspCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        InspCommands::List(args) => run_list(args, global),
        InspCommands::New(args) => run_new(args, global),
        InspCommands::Show(args) => run_show(args, global),
        InspCommands::Status(args) => run_status(args, global),
        InspCommands::Measure(args) => run_measure(args, global),
        InspCommands::Advance(args) => run_advance(args, global),
        InspCommands::Requantify(args) => run_requantify(args, global),
        InspCommands::Report(args) => run_report(args, global),
        InspCommands::Edit(args) => run_edit(args, global),
    }
}

/// Project, config and Ac/Re table for a command
fn context(global: &GlobalOpts) -> Result<(Project, Config, AcReTable)> {
    let project = open_project(global)?;
    let config = Config::load_for(Some(&project))?;
    let table = load_table(&config, Some(&project))?;
    Ok((project, config, table))
}

fn parse_quantity(raw: &str) -> Result<i64> {
    // Validate through the resolver so bad input carries its diagnostic
    resolve_str(raw)?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| miette::miette!("Invalid batch quantity: '{}'", raw))
}

fn print_notice(decision: Decision, notice: Option<&str>) {
    let Some(notice) = notice else {
        return;
    };
    let marker = match decision {
        Decision::Pass => style("✓").green(),
        Decision::Reject => style("✗").red(),
        Decision::Advance(_) => style("→").yellow(),
        Decision::Pending => style("•").dim(),
    };
    println!("{} {}", marker, notice);
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config, table) = context(global)?;

    let mut inspections: Vec<Inspection> = loader::load_all::<Inspection>(&project)?
        .into_iter()
        .filter_map(|(path, mut insp)| match insp.run.recompute(&table) {
            Ok(_) => Some(insp),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot evaluate inspection");
                None
            }
        })
        .filter(|i| args.status.matches(i.run.inspection_status))
        .filter(|i| match args.search {
            Some(ref search) => {
                let needle = search.to_lowercase();
                [Some(i.title.as_str()), i.lot_number.as_deref(), i.product.as_deref()]
                    .into_iter()
                    .flatten()
                    .any(|s| s.to_lowercase().contains(&needle))
            }
            None => true,
        })
        .collect();

    inspections.sort_by(|a, b| a.created.cmp(&b.created));
    if let Some(limit) = args.limit {
        inspections.truncate(limit);
    }

    if args.count {
        println!("{}", inspections.len());
        return Ok(());
    }

    if inspections.is_empty() {
        if !global.quiet {
            println!("No inspections found.");
        }
        return Ok(());
    }

    let mut short_ids = ShortIdIndex::load(&project);
    short_ids.rebuild(inspections.iter().map(|i| i.id.to_string()));
    if let Err(e) = short_ids.save(&project) {
        tracing::warn!(error = %e, "cannot save short id index");
    }

    match global.format.resolve(config.default_format.as_deref(), OutputFormat::Tsv) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&inspections).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&inspections).into_diagnostic()?);
        }
        OutputFormat::Id => {
            for insp in &inspections {
                println!("{}", insp.id);
            }
        }
        OutputFormat::Md => {
            println!("| Short | ID | Title | Lot # | Qty | Plan | Step | NC | Status |");
            println!("|---|---|---|---|---|---|---|---|---|");
            for insp in &inspections {
                println!(
                    "| @{} | {} | {} | {} | {} | {} | {} | {} | {} |",
                    short_ids.get_short_id(&insp.id.to_string()).unwrap_or_default(),
                    format_short_id(&insp.id),
                    insp.title,
                    insp.lot_number.as_deref().unwrap_or("-"),
                    quantity_cell(insp),
                    plan_cell(insp),
                    insp.run.current_step,
                    insp.run.total_non_conformities,
                    insp.run.inspection_status
                );
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            println!(
                "{:<8} {:<17} {:<26} {:<12} {:<8} {:<5} {:<7} {:<4} {:<12}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("TITLE").bold(),
                style("LOT #").bold(),
                style("QTY").bold(),
                style("PLAN").bold(),
                style("STEP").bold(),
                style("NC").bold(),
                style("STATUS").bold()
            );
            println!("{}", "-".repeat(106));

            for insp in &inspections {
                let short_id = short_ids
                    .get_short_id(&insp.id.to_string())
                    .map(|n| format!("@{}", n))
                    .unwrap_or_default();
                println!(
                    "{:<8} {:<17} {:<26} {:<12} {:<8} {:<5} {:<7} {:<4} {:<12}",
                    style(short_id).cyan(),
                    format_short_id(&insp.id),
                    truncate_str(&insp.title, 24),
                    truncate_str(insp.lot_number.as_deref().unwrap_or(""), 12),
                    quantity_cell(insp),
                    plan_cell(insp),
                    insp.run.current_step.to_string(),
                    insp.run.total_non_conformities,
                    styled_status(insp.run.inspection_status)
                );
            }

            if !global.quiet {
                println!();
                println!(
                    "{} inspection(s) found. Use {} to reference by short ID.",
                    style(inspections.len()).cyan(),
                    style("INSP@N").cyan()
                );
            }
        }
    }

    Ok(())
}

fn quantity_cell(insp: &Inspection) -> String {
    insp.run
        .batch_quantity
        .map(|q| q.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn plan_cell(insp: &Inspection) -> String {
    insp.run
        .plan
        .map(|p| format!("{}/{}", p.letter, p.size))
        .unwrap_or_else(|| "-".to_string())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config, table) = context(global)?;

    let mut insp = Inspection::new(args.title, args.dims, config.author())?;
    insp.lot_number = args.lot;
    insp.product = args.product;
    insp.notes = args.notes;

    if let Some(ref raw) = args.quantity {
        let batch_quantity = parse_quantity(raw)?;
        insp.run
            .apply(Action::EstablishPlan { batch_quantity }, &table)?;
    }

    let path = loader::save_entity(&project, &insp)?;

    let mut short_ids = ShortIdIndex::load(&project);
    let short_id = short_ids.add(insp.id.to_string());
    if let Err(e) = short_ids.save(&project) {
        tracing::warn!(error = %e, "cannot save short id index");
    }

    match global.format {
        OutputFormat::Id => println!("{}", insp.id),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&insp).into_diagnostic()?);
        }
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&insp).into_diagnostic()?),
        _ => {
            println!(
                "{} Created inspection {}",
                style("✓").green(),
                style(format!("@{}", short_id)).cyan()
            );
            if global.quiet {
                return Ok(());
            }
            println!("   {}", style(path.display()).dim());
            println!(
                "   {} | {}",
                style(insp.lot_number.as_deref().unwrap_or("(no lot #)")).yellow(),
                style(&insp.title).white()
            );
            match insp.run.plan {
                Some(plan) => println!(
                    "   Plan: letter {} with {} samples per step, {} dimension(s)",
                    style(plan.letter).cyan(),
                    plan.size,
                    insp.run.dimensions.len()
                ),
                None => println!(
                    "   No batch quantity yet; set one with {}",
                    style("aql insp requantify").yellow()
                ),
            }
        }
    }

    Ok(())
}

fn run_show(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config, table) = context(global)?;
    let (_, insp) = find_inspection(&project, &table, &args.id)?;

    match global.format.resolve(config.default_format.as_deref(), OutputFormat::Auto) {
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&insp).into_diagnostic()?),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&insp).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", insp.id),
        _ => print_inspection(&insp),
    }

    Ok(())
}

fn print_inspection(insp: &Inspection) {
    let run = &insp.run;

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&insp.id.to_string()).cyan());
    println!("{}: {}", style("Title").bold(), style(&insp.title).yellow());
    if let Some(ref lot) = insp.lot_number {
        println!("{}: {}", style("Lot Number").bold(), lot);
    }
    if let Some(ref product) = insp.product {
        println!("{}: {}", style("Product").bold(), product);
    }
    println!("{}: {}", style("Batch Quantity").bold(), quantity_cell(insp));
    println!("{}: {}", style("Plan").bold(), plan_cell(insp));
    println!("{}: {}", style("Step").bold(), run.current_step);
    println!("{}: {}", style("Status").bold(), styled_status(run.inspection_status));
    println!("{}", style("─".repeat(60)).dim());

    println!();
    println!("{} ({}):", style("Dimensions").bold(), run.dimensions.len());
    for dim in &run.dimensions {
        print!(
            "  {} {} +{}/-{} [{} .. {}]",
            style(&dim.code).cyan(),
            dim.nominal,
            dim.tolerance_plus,
            dim.tolerance_minus,
            dim.lower_limit(),
            dim.upper_limit()
        );
        if !dim.description.is_empty() {
            print!("  {}", style(&dim.description).dim());
        }
        println!();

        if run.plan.is_some() {
            let cells: Vec<String> = run
                .measurements
                .window(&dim.code, run.current_step)
                .iter()
                .map(|raw| match classify(dim, raw) {
                    Classification::Unmeasured => style("·".to_string()).dim().to_string(),
                    Classification::Conforming => raw.to_string(),
                    Classification::NonConforming | Classification::Unparsable => {
                        style(raw.to_string()).red().to_string()
                    }
                })
                .collect();
            println!("     {}", cells.join("  "));
        }
    }

    if !insp.coating.readings.is_empty() {
        println!();
        let readings: Vec<String> = insp.coating.readings.iter().map(|r| r.to_string()).collect();
        println!(
            "{} ({}): {}",
            style("Coating").bold(),
            insp.coating.unit,
            readings.join(", ")
        );
    }

    if let Some(ref notice) = run.notification {
        println!();
        print_notice(run.decision, Some(notice));
    }

    if let Some(ref notes) = insp.notes {
        if !notes.is_empty() {
            println!();
            println!("{}", style("Notes:").bold());
            println!("{}", notes);
        }
    }

    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {} | {}: {} | {}: {}",
        style("Author").dim(),
        insp.author,
        style("Created").dim(),
        insp.created.format("%Y-%m-%d %H:%M"),
        style("Revision").dim(),
        insp.entity_revision
    );
}

fn run_status(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config, table) = context(global)?;
    let (_, insp) = find_inspection(&project, &table, &args.id)?;
    let view = insp.run.status_view(&table)?;

    match global.format.resolve(config.default_format.as_deref(), OutputFormat::Auto) {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view).into_diagnostic()?),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&view).into_diagnostic()?),
        OutputFormat::Id => println!("{}", view.inspection_status),
        OutputFormat::Md => {
            println!("| Dimension | Non-conforming | Checked | Complete |");
            println!("|---|---|---|---|");
            for dim in &insp.run.dimensions {
                println!(
                    "| {} | {} | {} | {} |",
                    dim.code,
                    view.per_dimension_counts.get(&dim.code).copied().unwrap_or(0),
                    insp.run.total_samples_checked.get(&dim.code).copied().unwrap_or(0),
                    view.per_dimension_complete.get(&dim.code).copied().unwrap_or(false)
                );
            }
            println!();
            println!(
                "**{}** at the {} step: {} non-conformities, {}/{} samples",
                view.inspection_status,
                view.current_step,
                view.total_non_conformities,
                view.samples_checked,
                view.samples_required
            );
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            println!(
                "{} {} | {} {} | {} {}",
                style("Status").bold(),
                styled_status(view.inspection_status),
                style("Step").bold(),
                view.current_step,
                style("Plan").bold(),
                plan_cell(&insp)
            );
            println!(
                "{} {} | {} {}/{}",
                style("Non-conformities").bold(),
                view.total_non_conformities,
                style("Samples").bold(),
                view.samples_checked,
                view.samples_required
            );

            if !global.quiet && !insp.run.dimensions.is_empty() {
                println!();
                println!(
                    "{:<12} {:<6} {:<9} {:<8}",
                    style("DIMENSION").bold(),
                    style("NC").bold(),
                    style("CHECKED").bold(),
                    style("COMPLETE").bold()
                );
                let size = insp.run.plan.map(|p| p.size).unwrap_or(0);
                for dim in &insp.run.dimensions {
                    let complete = view.per_dimension_complete.get(&dim.code).copied().unwrap_or(false);
                    println!(
                        "{:<12} {:<6} {:<9} {:<8}",
                        truncate_str(&dim.code, 12),
                        view.per_dimension_counts.get(&dim.code).copied().unwrap_or(0),
                        format!(
                            "{}/{}",
                            insp.run.total_samples_checked.get(&dim.code).copied().unwrap_or(0),
                            size
                        ),
                        if complete { "yes" } else { "no" }
                    );
                }
            }

            if let Some(ref notice) = view.notification_message {
                println!();
                print_notice(insp.run.decision, Some(notice));
            }
        }
    }

    Ok(())
}

/// Apply one action, persist the result and report the notice
fn apply_and_save(
    project: &Project,
    table: &AcReTable,
    insp: &mut Inspection,
    action: Action,
) -> Result<Option<String>> {
    let notice = insp.run.apply(action, table)?;
    loader::save_entity(project, insp)?;
    Ok(notice)
}

fn run_measure(args: MeasureArgs, global: &GlobalOpts) -> Result<()> {
    let (project, _, table) = context(global)?;
    let (_, mut insp) = find_inspection(&project, &table, &args.id)?;

    if args.interactive {
        return run_measure_interactive(&project, &table, &mut insp, global);
    }

    let (Some(code), Some(sample)) = (args.dim, args.sample) else {
        return Err(miette::miette!("--dim and --sample are required (or use -i)"));
    };
    let size = insp
        .run
        .plan
        .map(|p| p.size)
        .ok_or_else(|| miette::miette!("No sample plan yet; set a batch quantity first"))?;
    if sample == 0 || sample > size {
        return Err(miette::miette!(
            "Sample number {} is out of range; this plan has samples 1..={}",
            sample,
            size
        ));
    }

    let step = args.step.unwrap_or(insp.run.current_step);
    let raw = args.value.unwrap_or_default();
    let action = Action::Record {
        code: code.clone(),
        step,
        sample: sample - 1,
        raw: raw.clone(),
    };
    let notice = apply_and_save(&project, &table, &mut insp, action)?;

    if !global.quiet {
        let verdict = insp
            .run
            .dimension(&code)
            .map(|dim| classify(dim, &raw))
            .unwrap_or(Classification::Unmeasured);
        let marker = match verdict {
            Classification::Unmeasured => style("·").dim(),
            Classification::Conforming => style("✓").green(),
            Classification::NonConforming => style("✗").red(),
            Classification::Unparsable => style("?").red(),
        };
        println!(
            "{} {} sample {} ({} step): {}",
            marker,
            style(&code).cyan(),
            sample,
            step,
            if raw.trim().is_empty() { "cleared" } else { raw.trim() }
        );
    }
    print_notice(insp.run.decision, notice.as_deref());
    Ok(())
}

fn run_measure_interactive(
    project: &Project,
    table: &AcReTable,
    insp: &mut Inspection,
    global: &GlobalOpts,
) -> Result<()> {
    let size = insp
        .run
        .plan
        .map(|p| p.size)
        .ok_or_else(|| miette::miette!("No sample plan yet; set a batch quantity first"))?;
    let step = insp.run.current_step;
    let theme = ColorfulTheme::default();

    if !global.quiet {
        println!(
            "{} step, {} samples per dimension. Leave a value empty to skip it.",
            style(step).cyan(),
            size
        );
    }

    let codes: Vec<String> = insp.run.dimensions.iter().map(|d| d.code.clone()).collect();
    for code in codes {
        for sample in 0..size {
            if insp.run.decision != Decision::Pending {
                break;
            }
            let already = insp.run.measurements.get(&code, step, sample).unwrap_or("");
            if !already.trim().is_empty() {
                continue;
            }

            let raw: String = Input::with_theme(&theme)
                .with_prompt(format!("{} sample {}", code, sample + 1))
                .allow_empty(true)
                .interact_text()
                .into_diagnostic()?;
            if raw.trim().is_empty() {
                continue;
            }

            let action = Action::Record {
                code: code.clone(),
                step,
                sample,
                raw,
            };
            let notice = apply_and_save(project, table, insp, action)?;
            print_notice(insp.run.decision, notice.as_deref());
        }
    }

    Ok(())
}

fn run_advance(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let (project, _, table) = context(global)?;
    let (_, mut insp) = find_inspection(&project, &table, &args.id)?;

    let from = insp.run.current_step;
    let notice = apply_and_save(&project, &table, &mut insp, Action::AdvanceStep)?;

    println!(
        "{} {} advanced from the {} step to the {} step",
        style("✓").green(),
        style(display_id(&project, &insp.id)).cyan(),
        from,
        style(insp.run.current_step).yellow()
    );
    print_notice(insp.run.decision, notice.as_deref());
    Ok(())
}

fn run_requantify(args: RequantifyArgs, global: &GlobalOpts) -> Result<()> {
    let (project, _, table) = context(global)?;
    let (_, mut insp) = find_inspection(&project, &table, &args.id)?;

    let batch_quantity = parse_quantity(&args.quantity)?;
    apply_and_save(
        &project,
        &table,
        &mut insp,
        Action::EstablishPlan { batch_quantity },
    )?;

    if let Some(plan) = insp.run.plan {
        println!(
            "{} {} now uses letter {} with {} samples per step",
            style("✓").green(),
            style(display_id(&project, &insp.id)).cyan(),
            style(plan.letter).cyan(),
            plan.size
        );
    }
    if !global.quiet {
        println!("   Measurements were cleared; inspection restarts at the first step.");
    }
    Ok(())
}

fn run_report(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config, table) = context(global)?;
    let (_, insp) = find_inspection(&project, &table, &args.id)?;
    let report = insp.report();

    match global.format.resolve(config.default_format.as_deref(), OutputFormat::Yaml) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }
        OutputFormat::Tsv => {
            for (code, values) in &report.measurements {
                println!("{}\t{}", code, values.join("\t"));
            }
        }
        OutputFormat::Md => {
            println!("| Dimension | Values |");
            println!("|---|---|");
            for (code, values) in &report.measurements {
                let shown: Vec<&str> = values.iter().map(String::as_str).filter(|v| !v.is_empty()).collect();
                println!("| {} | {} |", code, shown.join(", "));
            }
        }
        OutputFormat::Id => println!("{}", insp.id),
        OutputFormat::Yaml | OutputFormat::Auto => {
            print!("{}", serde_yml::to_string(&report).into_diagnostic()?);
        }
    }

    Ok(())
}

fn run_edit(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config, table) = context(global)?;
    // Located without parsing so a broken file can still be repaired
    let path = locate_inspection(&project, &args.id)?;

    println!(
        "Opening {} in {}...",
        style(path.display()).cyan(),
        style(config.editor()).yellow()
    );
    config.run_editor(&path).into_diagnostic()?;

    // Re-read so a broken edit is reported right away
    let (_, insp) = find_inspection(&project, &table, &args.id)?;
    println!(
        "{} {} is {}",
        style("✓").green(),
        style(display_id(&project, &insp.id)).cyan(),
        styled_status(insp.run.inspection_status)
    );
    Ok(())
}
