//! Assay CLI - configuration-driven data quality pipeline.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let directive = logging::filter_directive(cli.verbose, cli.quiet, cli.log_level.as_deref());
    let guard = match logging::init(&directive, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to initialise logging: {}", e);
            std::process::exit(1);
        }
    };

    let verbose = cli.verbose > 0;
    let result = match cli.command {
        Commands::Validate {
            file,
            config,
            output,
            format,
            report,
            strict,
        } => commands::validate::run(file, config, output, format, report, strict, verbose),

        Commands::Check { config, json } => commands::check::run(config, json, verbose),

        Commands::Inspect { file, json } => commands::inspect::run(file, json, verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        // Flush the file writer; exit skips destructors.
        drop(guard);
        std::process::exit(1);
    }
}
