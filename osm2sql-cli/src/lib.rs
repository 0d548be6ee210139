//! Command-line interface for converting OSM XML extracts into SQLite.
#![forbid(unsafe_code)]

use std::io;
use std::num::NonZeroU64;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use osm2sql_core::DEFAULT_TAG_TYPE;
use osm2sql_data::fs::metadata;
use osm2sql_data::{ConversionReport, ConvertOptions, DEFAULT_PROGRESS_INTERVAL, convert_file};
use serde::{Deserialize, Serialize};

mod error;

pub use error::CliError;

const ARG_OSM: &str = "osm";
const ARG_DATABASE: &str = "database";
const ARG_VALIDATE: &str = "validate";
const ARG_PROGRESS_INTERVAL: &str = "progress-interval";
const ARG_DEFAULT_TAG_TYPE: &str = "default-tag-type";
const ENV_OSM: &str = "OSM2SQL_CMDS_CONVERT_OSM";
const ENV_DATABASE: &str = "OSM2SQL_CMDS_CONVERT_DATABASE";

/// Run the osm2sql CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Convert(args) => {
            let report = run_convert(args)?;
            info!(
                "converted {} nodes and {} ways ({} rows)",
                report.nodes,
                report.ways,
                report.rows.total()
            );
        }
    }
    Ok(())
}

fn run_convert(args: ConvertArgs) -> Result<ConversionReport, CliError> {
    let config = args.into_config()?;
    config.validate_paths()?;
    let options = config.into_options();
    convert_file(&options).map_err(|source| CliError::Convert {
        osm: options.osm.clone(),
        database: options.database.clone(),
        source: Box::new(source),
    })
}

#[derive(Debug, Parser)]
#[command(
    name = "osm2sql",
    about = "Convert OpenStreetMap XML extracts into normalised SQLite tables",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert an `.osm` or `.osm.bz2` extract into an SQLite database.
    Convert(ConvertArgs),
}

/// CLI arguments for the `convert` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "convert",
    long_about = "Read nodes and ways from an OSM XML extract and append them \
                 to the nodes, nodes_tags, ways, ways_nodes and ways_tags \
                 tables. Options can come from CLI flags, configuration \
                 files, or environment variables.",
    about = "Convert an OSM XML extract into SQLite tables"
)]
#[ortho_config(prefix = "OSM2SQL")]
struct ConvertArgs {
    /// Path to the OpenStreetMap XML file, optionally bzip2-compressed.
    #[arg(long = ARG_OSM, value_name = "path")]
    #[serde(default)]
    osm: Option<Utf8PathBuf>,
    /// Path to the SQLite database to create or append to.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    database: Option<Utf8PathBuf>,
    /// Check every shaped element against the table schema (slow).
    #[arg(long = ARG_VALIDATE)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    validate: bool,
    /// Number of elements between progress log lines.
    #[arg(long = ARG_PROGRESS_INTERVAL, value_name = "count")]
    #[serde(default)]
    progress_interval: Option<u64>,
    /// Type recorded for tag keys without a colon.
    #[arg(long = ARG_DEFAULT_TAG_TYPE, value_name = "type")]
    #[serde(default)]
    default_tag_type: Option<String>,
}

impl ConvertArgs {
    fn into_config(self) -> Result<ConvertConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ConvertConfig::try_from(merged)
    }
}

/// Resolved `convert` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConvertConfig {
    osm: Utf8PathBuf,
    database: Utf8PathBuf,
    validate: bool,
    progress_interval: NonZeroU64,
    default_tag_type: String,
}

impl ConvertConfig {
    fn validate_paths(&self) -> Result<(), CliError> {
        match metadata(&self.osm) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                return Err(CliError::SourcePathNotFile {
                    field: ARG_OSM,
                    path: self.osm.clone(),
                });
            }
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                return Err(CliError::MissingSourceFile {
                    field: ARG_OSM,
                    path: self.osm.clone(),
                });
            }
            Err(source) => {
                return Err(CliError::InspectSourcePath {
                    field: ARG_OSM,
                    path: self.osm.clone(),
                    source,
                });
            }
        }
        // Missing or unreadable databases are left for the sink to report.
        if metadata(&self.database).is_ok_and(|meta| meta.is_dir()) {
            return Err(CliError::OutputIsDirectory {
                path: self.database.clone(),
            });
        }
        Ok(())
    }

    fn into_options(self) -> ConvertOptions {
        let mut options = ConvertOptions::new(self.osm, self.database);
        options.validate = self.validate;
        options.progress_interval = self.progress_interval;
        options.default_tag_type = self.default_tag_type;
        options
    }
}

impl TryFrom<ConvertArgs> for ConvertConfig {
    type Error = CliError;

    fn try_from(args: ConvertArgs) -> Result<Self, Self::Error> {
        let osm = args.osm.ok_or(CliError::MissingArgument {
            field: ARG_OSM,
            env: ENV_OSM,
        })?;
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_DATABASE,
        })?;
        let progress_interval = match args.progress_interval {
            Some(count) => NonZeroU64::new(count).ok_or(CliError::InvalidProgressInterval)?,
            None => DEFAULT_PROGRESS_INTERVAL,
        };
        let default_tag_type = args
            .default_tag_type
            .unwrap_or_else(|| DEFAULT_TAG_TYPE.to_owned());
        Ok(Self {
            osm,
            database,
            validate: args.validate,
            progress_interval,
            default_tag_type,
        })
    }
}

#[cfg(test)]
mod tests;
