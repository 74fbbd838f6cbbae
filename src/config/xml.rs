//! XML configuration support.
//! - Loads optional settings from config.xml (quick_xml + serde).
//! - A missing file is not an error; a malformed or unknown field is.
//!
//! Notes:
//! - This module only reads the config file; directory validation happens elsewhere.
//! - Values are layered: defaults < XML < CLI. `FileConfig::apply` performs the middle step.

use anyhow::{anyhow, Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use super::paths::default_config_path;
use super::types::{Config, LogLevel, Strategy};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    #[serde(rename = "source")]
    source: Option<String>,
    #[serde(rename = "destination")]
    destination: Option<String>,
    #[serde(rename = "strategy")]
    strategy: Option<String>,
    #[serde(rename = "jobs", default, deserialize_with = "de_u64_trimmed_opt")]
    jobs: Option<u64>,
    #[serde(rename = "log_level")]
    log_level: Option<String>,
    #[serde(rename = "log_file")]
    log_file: Option<String>,
    #[serde(rename = "poll_interval_ms", default, deserialize_with = "de_u64_trimmed_opt")]
    poll_interval_ms: Option<u64>,
}

// Custom deserializer that trims surrounding whitespace for optional u64
fn de_u64_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| s.trim().parse::<u64>().ok()))
}

/// Settings read from the config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileConfig {
    pub source: Option<PathBuf>,
    pub destination: Option<PathBuf>,
    pub strategy: Option<Strategy>,
    pub jobs: Option<usize>,
    pub log_level: Option<LogLevel>,
    pub log_file: Option<PathBuf>,
    pub poll_interval: Option<Duration>,
}

impl FileConfig {
    /// Overlay the values present in the file onto `cfg`.
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(p) = &self.source {
            cfg.source_root = p.clone();
        }
        if let Some(p) = &self.destination {
            cfg.destination_root = p.clone();
        }
        if let Some(s) = self.strategy {
            cfg.strategy = s;
        }
        if let Some(j) = self.jobs {
            cfg.jobs = Some(j);
        }
        if let Some(l) = &self.log_level {
            cfg.log_level = l.clone();
        }
        if let Some(p) = &self.log_file {
            cfg.log_file = Some(p.clone());
        }
        if let Some(d) = self.poll_interval {
            cfg.poll_interval = d;
        }
    }
}

fn non_empty_path(s: Option<&str>) -> Option<PathBuf> {
    s.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(PathBuf::from)
}

fn xml_to_file_config(parsed: XmlConfig) -> Result<FileConfig> {
    let strategy = parsed
        .strategy
        .as_deref()
        .map(|s| Strategy::parse(s).ok_or_else(|| anyhow!("invalid <strategy>: '{s}'")))
        .transpose()?;
    let log_level = parsed
        .log_level
        .as_deref()
        .map(|s| LogLevel::from_str(s).map_err(|e| anyhow!("invalid <log_level>: {e}")))
        .transpose()?;
    Ok(FileConfig {
        source: non_empty_path(parsed.source.as_deref()),
        destination: non_empty_path(parsed.destination.as_deref()),
        strategy,
        jobs: parsed.jobs.map(|j| j as usize).filter(|j| *j > 0),
        log_level,
        log_file: non_empty_path(parsed.log_file.as_deref()),
        poll_interval: parsed
            .poll_interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis),
    })
}

/// Load settings from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_file_config(parsed).with_context(|| format!("config xml '{}'", path.display()))
}

/// Load settings from the config path in use, if that file exists.
pub fn load_config_from_xml() -> Result<Option<FileConfig>> {
    let Some(path) = default_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok(None);
    }
    load_config_from_xml_path(&path).map(Some)
}
