//! Core collector trait
use prometheus::core::Desc;
use prometheus::proto::MetricFamily;

/// Base trait for scrape-time metric collectors
#[async_trait::async_trait]
pub trait Collector: Send + Sync + 'static {
    /// Descriptors of every metric this collector can produce
    fn describe(&self) -> Vec<Desc>;

    /// Run one scrape cycle and return the resulting metric families
    async fn collect(&self) -> Vec<MetricFamily>;
}
