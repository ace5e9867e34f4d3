mod core;
mod exporter;
mod metric;

// Re-export public items
pub use self::core::Collector;
pub use exporter::ExporterCollector;
pub use metric::MetricDescriptor;
