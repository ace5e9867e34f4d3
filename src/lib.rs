//! A Prometheus exporter that turns command, HTTP and file output into metrics

pub mod cache;
pub mod collector;
pub mod config;
pub mod error;
pub mod fetch;
pub mod parser;
pub mod server;
pub mod util;

pub use util::logging::init as init_logging;

/// Re-export of commonly used types for convenience
pub mod prelude {
    pub use crate::cache::{CacheEntry, MetricCache};
    pub use crate::collector::{Collector, ExporterCollector, MetricDescriptor};
    pub use crate::config::{
        ExporterConfig, ExporterSpec, LogLevel, MetricKind, ParserSpec, SourceSpec, load_config,
    };
    pub use crate::error::{AgentError, Result};
    pub use crate::fetch::{Fetch, FetchError, SourceFetcher};
    pub use crate::parser::{ParseError, parse};
}

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
