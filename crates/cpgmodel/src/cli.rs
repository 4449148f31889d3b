//! Command-line surface and config loading

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use cpgmodel_java::{ExtractConfig, OutputFormat};

#[derive(Parser, Debug)]
#[command(
    name = "cpgmodel",
    version,
    about = "Extract a normalized class model of a Java project from a Joern server",
    long_about = "Imports PROJECT_DIR into the Joern server listening on PORT, normalizes \
                  its classes and writes one length-prefixed frame per class to stdout, \
                  followed by a -1 frame."
)]
pub struct Cli {
    /// Root directory of the Java sources to analyze
    pub project_dir: String,

    /// Port of the Joern server
    pub port: u16,

    /// Host of the Joern server
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Log file, appended to
    #[arg(long, default_value = "cpgmodel.log")]
    pub log_file: PathBuf,

    /// TOML file overriding batching thresholds and connection retry
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Payload format of each frame (literal or json)
    #[arg(long, default_value_t = OutputFormat::Literal)]
    pub format: OutputFormat,

    /// Name of the project on the server (defaults to a fresh cpgmodel-<uuid>)
    #[arg(long)]
    pub project_name: Option<String>,
}

/// Use forward slashes and an upper-case drive letter for Windows paths
pub fn normalize_project_dir(raw: &str, windows: bool) -> String {
    if !windows {
        return raw.to_string();
    }
    let path = raw.replace('\\', "/");
    let mut chars = path.chars();
    match (chars.next(), chars.next()) {
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic() => {
            format!("{}{}", drive.to_ascii_uppercase(), &path[1..])
        }
        _ => path,
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<ExtractConfig> {
    let Some(path) = path else {
        return Ok(ExtractConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}
