//! The `isle-gen` binary entry point.

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use isle_config::CliArgs;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match isle_app::run(&args) {
        Ok(report) => {
            for file in &report.files {
                println!("{}", file.display());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("isle-gen: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
