//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use std::error::Error;
use std::io;

use osm2sql_cli::CliError;
use structured_logger::{Builder, json::new_writer};

const LOG_LEVEL_ENV: &str = "OSM2SQL_LOG";

fn main() {
    setup_logging();
    if let Err(err) = osm2sql_cli::run() {
        if let CliError::ArgumentParsing(clap_err) = &err {
            clap_err.exit();
        }
        eprintln!("osm2sql: {err}");
        let mut cause = err.source();
        while let Some(inner) = cause {
            eprintln!("  caused by: {inner}");
            cause = inner.source();
        }
        std::process::exit(1);
    }
}

fn setup_logging() {
    let level = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_owned());
    Builder::with_level(&level)
        .with_target_writer("*", new_writer(io::stderr()))
        .init();
}
