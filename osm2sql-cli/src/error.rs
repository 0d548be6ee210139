//! Error types emitted by the osm2sql CLI.
//!
//! Keep this error type reasonably small, as CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use osm2sql_data::ConvertError;
use thiserror::Error;

/// Errors emitted by the osm2sql CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The database path names a directory.
    #[error("database path {path:?} is a directory")]
    OutputIsDirectory { path: Utf8PathBuf },
    /// The progress interval must be positive.
    #[error("progress interval must be greater than zero")]
    InvalidProgressInterval,
    /// The conversion itself failed.
    #[error("failed to convert {osm:?} into {database:?}")]
    Convert {
        osm: Utf8PathBuf,
        database: Utf8PathBuf,
        #[source]
        source: Box<ConvertError>,
    },
}
