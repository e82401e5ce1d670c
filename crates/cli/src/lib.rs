//! Rendering and setup shared by the `orc-metadata` and `orc-statistics` tools

pub mod metadata;
pub mod statistics;

use std::io::Write;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use config::Config;
use orcfile::{OrcFile, RandomAccessSource, ReadOptions};
use tracing::{debug, error, warn};

/// Command line arguments common to both tools
#[derive(Parser, Debug)]
pub struct Args {
    /// ORC files to inspect
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Initialize tracing with an environment filter, logging to stderr.
///
/// Set RUST_LOG to control the level, e.g. RUST_LOG=debug. Defaults to warn
/// so that chunk length anomalies are reported without further noise.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Library read options derived from the application configuration
pub fn read_options(config: &Config) -> ReadOptions {
    ReadOptions {
        tail_size_guess: config.reader.tail_size_guess,
    }
}

/// Renders every file named in `args` to `out`.
///
/// A file that fails to open or render is logged and skipped; the remaining
/// files are still processed and the exit code reports the failure.
pub fn run<W, F>(args: &Args, out: &mut W, render: F) -> ExitCode
where
    W: Write,
    F: Fn(&OrcFile, &Config) -> Result<String>,
{
    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    let options = read_options(&config);
    debug!("Tail size guess: {} bytes", options.tail_size_guess);

    let mut failed = false;
    for path in &args.files {
        let rendered = OrcFile::open(path, &options)
            .map_err(anyhow::Error::from)
            .and_then(|file| render_file(file, &config, &render));

        let written = rendered.and_then(|text| Ok(out.write_all(text.as_bytes())?));
        if let Err(e) = written {
            error!("{}: {:#}", path, e);
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Renders one opened file and closes it whether or not rendering succeeded
pub fn render_file<S, F>(file: OrcFile<S>, config: &Config, render: F) -> Result<String>
where
    S: RandomAccessSource,
    F: Fn(&OrcFile<S>, &Config) -> Result<String>,
{
    let rendered = render(&file, config);
    let name = file.name().to_string();
    match (rendered, file.close()) {
        (Ok(text), Ok(())) => Ok(text),
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), closed) => {
            if let Err(close_err) = closed {
                warn!(name = %name, "Failed to close file after render error: {}", close_err);
            }
            Err(e)
        }
    }
}
