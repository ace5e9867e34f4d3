use std::io::{self, Write};

use env_logger::fmt::Formatter;
use env_logger::{Builder, Env};
use log::Record;

use crate::config::LogLevel;

/// Environment variable whose filter directives take precedence over `--log-level`
pub const FILTER_ENV: &str = "RUST_LOG";

impl LogLevel {
    /// Directive understood by the env_logger filter parser
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// `2024-05-01T12:00:00.123 INFO  custom_exporter::server: message`
fn write_record(buf: &mut Formatter, record: &Record<'_>) -> io::Result<()> {
    writeln!(
        buf,
        "{} {:<5} {}: {}",
        chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
        record.level(),
        record.target(),
        record.args()
    )
}

fn builder(env: Env<'_>) -> Builder {
    let mut builder = Builder::from_env(env);
    builder.format(write_record);
    builder
}

/// Install the global logger, filtering at `level` unless `RUST_LOG` is set
pub fn init(level: LogLevel) {
    builder(Env::new().filter_or(FILTER_ENV, level.directive())).init();
}
