use config::{File, FileFormat};
use log::{debug, info};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::fmt;
use std::path::Path;

use crate::error::{AgentError, Result};

/// Top-level exporter configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExporterConfig {
    /// Configured exporters, scraped in this order
    #[serde(default)]
    pub exporters: Vec<ExporterSpec>,
}

/// A single named exporter: where the data comes from and how to read it
#[derive(Debug, Deserialize, Clone)]
pub struct ExporterSpec {
    /// Metric name, unique across all exporters
    pub name: String,
    /// Where the raw payload is fetched from
    #[serde(flatten)]
    pub source: SourceSpec,
    /// Refresh interval in seconds
    #[serde(default)]
    pub interval: u64,
    /// Metric semantics
    #[serde(default)]
    pub metric_type: MetricKind,
    /// How a scalar is extracted from the payload
    #[serde(default)]
    pub parser: ParserSpec,
    /// Constant labels attached to the metric
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// Help text
    #[serde(default)]
    pub description: String,
}

impl ExporterSpec {
    /// Refresh interval as a duration
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval)
    }
}

/// Source of the raw payload
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceSpec {
    /// Shell command, run through `sh -c`
    Command { command: String },
    /// HTTP GET endpoint
    Http { url: String },
    /// Local file
    File { file_path: String },
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Command { command } => write!(f, "command `{}`", command),
            SourceSpec::Http { url } => write!(f, "http {}", url),
            SourceSpec::File { file_path } => write!(f, "file {}", file_path),
        }
    }
}

/// Strategy for extracting a single number from a payload
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParserSpec {
    /// First capture group of the first match
    Regex { pattern: String },
    /// Dot-separated path into a JSON document
    Json {
        #[serde(default)]
        json_path: String,
    },
    /// Zero-based line of the trimmed payload
    Line {
        #[serde(default)]
        line_num: usize,
    },
    /// Zero-based token after splitting on a delimiter
    Split {
        split: String,
        #[serde(default)]
        index: usize,
    },
    /// The whole trimmed payload
    #[default]
    Raw,
}

/// Metric type
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    #[default]
    Gauge,
    Counter,
}

/// Logging level
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level
    #[default]
    Info,
    /// Debug level
    Debug,
    /// Trace level
    Trace,
}

impl ExporterConfig {
    /// Check constraints the deserializer cannot express
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for exporter in &self.exporters {
            if exporter.name.trim().is_empty() {
                return Err(AgentError::Config("Exporter with empty name".to_string()));
            }
            if !seen.insert(exporter.name.as_str()) {
                return Err(AgentError::Config(format!(
                    "Duplicate exporter name: {}",
                    exporter.name
                )));
            }
        }
        Ok(())
    }
}

/// Config file format implied by the file extension
fn file_format(path: &Path) -> Result<FileFormat> {
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("yaml" | "yml") => Ok(FileFormat::Yaml),
        Some("json") => Ok(FileFormat::Json),
        Some("toml") => Ok(FileFormat::Toml),
        Some(other) => Err(AgentError::Config(format!(
            "Unsupported config format .{} for {}",
            other,
            path.display()
        ))),
        None => Err(AgentError::Config(format!(
            "Cannot infer config format of {}",
            path.display()
        ))),
    }
}

impl ExporterConfig {
    /// Read, deserialize and validate an exporter configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let format = file_format(path)?;
        debug!("Reading {:?} exporter configuration from {}", format, path.display());

        let loaded: Self = config::Config::builder()
            .add_source(File::from(path).format(format).required(true))
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| AgentError::Config(format!("{}: {}", path.display(), e)))?;

        loaded.validate()?;
        info!("Loaded {} exporters from {}", loaded.exporters.len(), path.display());

        Ok(loaded)
    }
}

/// Load exporter configuration from a file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ExporterConfig> {
    ExporterConfig::from_file(path.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_load_yaml_exporters() {
        let file = write_config(
            ".yaml",
            r#"
exporters:
  - name: load_average
    type: command
    command: "cat /proc/loadavg"
    interval: 15
    metric_type: gauge
    parser:
      type: split
      split: " "
      index: 0
    labels:
      host: local
    description: "One minute load average"
  - name: active_connections
    type: http
    url: "http://localhost:8080/status"
    interval: 30
    metric_type: counter
    parser:
      type: json
      json_path: "connections.active"
  - name: queue_depth
    type: file
    file_path: /var/run/queue
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.exporters.len(), 3);

        let load = &config.exporters[0];
        assert_eq!(load.name, "load_average");
        assert_eq!(
            load.source,
            SourceSpec::Command { command: "cat /proc/loadavg".to_string() }
        );
        assert_eq!(load.interval, 15);
        assert_eq!(load.metric_type, MetricKind::Gauge);
        assert_eq!(load.parser, ParserSpec::Split { split: " ".to_string(), index: 0 });
        assert_eq!(load.labels.get("host").map(String::as_str), Some("local"));

        let conns = &config.exporters[1];
        assert_eq!(conns.metric_type, MetricKind::Counter);
        assert_eq!(
            conns.parser,
            ParserSpec::Json { json_path: "connections.active".to_string() }
        );

        let queue = &config.exporters[2];
        assert_eq!(queue.source, SourceSpec::File { file_path: "/var/run/queue".to_string() });
        assert_eq!(queue.interval, 0);
        assert_eq!(queue.parser, ParserSpec::Raw);
        assert!(queue.labels.is_empty());
        assert!(queue.description.is_empty());
    }

    #[test]
    fn test_load_json_exporters() {
        let file = write_config(
            ".json",
            r#"{"exporters":[{"name":"lines","type":"file","file_path":"/tmp/x","interval":5,
               "parser":{"type":"line","line_num":2}}]}"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.exporters[0].parser, ParserSpec::Line { line_num: 2 });
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = load_config("/definitely/not/here/export.yaml").unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(file_format(Path::new("export.YML")).unwrap(), FileFormat::Yaml);
        assert_eq!(file_format(Path::new("/etc/export.toml")).unwrap(), FileFormat::Toml);
        assert!(matches!(file_format(Path::new("export")), Err(AgentError::Config(_))));
    }

    #[test]
    fn test_toml_exporters() {
        let file = write_config(
            ".toml",
            r#"
[[exporters]]
name = "disk_free"
type = "command"
command = "df --output=avail / | tail -1"
metric_type = "gauge"
interval = 60
"#,
        );

        let config = ExporterConfig::from_file(file.path()).unwrap();
        assert_eq!(config.exporters[0].interval(), std::time::Duration::from_secs(60));
        assert_eq!(config.exporters[0].parser, ParserSpec::Raw);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_config(".ini2", "exporters = []");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }

    #[test]
    fn test_unknown_source_type_rejected() {
        let file = write_config(
            ".yaml",
            "exporters:\n  - name: x\n    type: ftp\n    url: ftp://host\n",
        );
        assert!(matches!(load_config(file.path()), Err(AgentError::Config(_))));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let file = write_config(
            ".yaml",
            r#"
exporters:
  - name: dup
    type: file
    file_path: /a
  - name: dup
    type: file
    file_path: /b
"#,
        );
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Duplicate exporter name: dup"));
    }
}
