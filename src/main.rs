//! OpenAPI DTO - command-line front end.
//!
//! Merges the path documents stored in a documents directory into one OpenAPI 3.0
//! document per API version and visibility bucket, and publishes them as HTML pages.
//!
//! # Usage
//!
//! ```bash
//! openapi-dto merge --docs ./docs [--version <N|*>] [--format json|yaml]
//! openapi-dto publish --docs ./docs --template ./index.html [--version <N|*>]
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! openapi-dto -v merge --docs ./docs
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_dto::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI DTO starting...");

    cli::run(args)?;

    info!("Done");

    Ok(())
}
