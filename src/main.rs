mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use yansi::Paint;

use std::process::ExitCode;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("WRAPGEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    if args.no_color {
        yansi::disable();
    }

    match cli::run(&args, std::io::stderr()) {
        Ok(summary) => {
            eprintln!("{}", summary.line());
            if summary.errors > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::from(2)
        }
    }
}
