//! Doc QA CLI - Legibility gate for scanned documents and photos.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::check::{self, CheckArgs};
use commands::{Cli, Commands, ExitCode};
use config::AppConfig;

/// Log level for a `-v` count; warnings only by default.
const fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbose: u8) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::new(log_level(verbose)))
        .init();
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let args = match cli.command {
        Some(Commands::Check(args)) => args,
        None => cli.check,
    };
    if args.paths.is_empty() {
        eprintln!("error: No paths specified. Use --help for usage information.");
        return ExitCode::Error.into();
    }

    let args = CheckArgs::with_config(args, &AppConfig::load());

    match check::run(&args) {
        Ok(result) => result.exit_code.into(),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error.into()
        }
    }
}
