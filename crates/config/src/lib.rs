use anyhow::{Context, Result};
use config_rs::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// File tail reading configuration
    #[serde(default)]
    pub reader: ReaderSettings,

    /// Output rendering configuration
    #[serde(default)]
    pub output: OutputSettings,
}

/// Configuration for reading ORC file tails
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderSettings {
    /// Trailing bytes read when opening a file (default: 16384).
    /// Must exceed 255, the largest possible postscript.
    #[serde(default = "default_tail_size_guess")]
    pub tail_size_guess: u64,
}

/// Configuration for the dumping tools' output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Indent JSON output (default: true)
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

// Default value functions
fn default_tail_size_guess() -> u64 {
    16 * 1024
}

fn default_pretty() -> bool {
    true
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            tail_size_guess: default_tail_size_guess(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
        }
    }
}

impl Config {
    /// Load Config with layered configuration priority:
    /// 1. Default values
    /// 2. TOML file (if provided)
    /// 3. Environment variables (ORC_READER__*, ORC_OUTPUT__*)
    pub fn load(config_file: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder()
            .set_default("reader.tail_size_guess", default_tail_size_guess())?
            .set_default("output.pretty", default_pretty())?;

        // Add TOML file if provided
        if let Some(file_path) = config_file {
            let path = Path::new(file_path);
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            builder = builder.add_source(File::from(path));
        }

        // e.g. ORC_READER__TAIL_SIZE_GUESS=65536
        builder = builder.add_source(
            Environment::with_prefix("ORC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let app_config: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// Load Config from a TOML file
    ///
    /// Environment variables can still override values from the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let path = path
            .to_str()
            .with_context(|| format!("Configuration path is not UTF-8: {}", path.display()))?;
        Self::load(Some(path))
    }

    /// Create a new Config from environment variables with defaults
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.reader.validate()?;
        Ok(())
    }
}

impl ReaderSettings {
    /// Validate the reader configuration
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.tail_size_guess > 255,
            "reader.tail_size_guess must exceed 255 bytes, got {}",
            self.tail_size_guess
        );
        Ok(())
    }
}
