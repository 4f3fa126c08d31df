use clap::Parser;
use miette::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use aql::cli::{Cli, Commands};

/// Log filter from `AQL_LOG`, else `warn` (or `debug` with --verbose)
fn init_tracing(verbose: bool) {
    let default = if verbose { "aql=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("AQL_LOG").unwrap_or_else(|_| EnvFilter::new(default)))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> Result<()> {
    // Reset SIGPIPE so piping into `head` terminates quietly instead of panicking
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(global.verbose);

    match cli.command {
        Commands::Init(args) => aql::cli::commands::init::run(args, &global),
        Commands::Plan(args) => aql::cli::commands::plan::run(args, &global),
        Commands::Table(cmd) => aql::cli::commands::table::run(cmd, &global),
        Commands::Insp(cmd) => aql::cli::commands::insp::run(cmd, &global),
        Commands::Coating(cmd) => aql::cli::commands::coating::run(cmd, &global),
        Commands::Completions(args) => aql::cli::commands::completions::run(args),
    }
}
