use std::sync::Arc;

use log::{debug, error, info, trace};
use prometheus::core::Desc;
use prometheus::proto::MetricFamily;

use super::core::Collector;
use super::metric::MetricDescriptor;
use crate::cache::{CacheEntry, MetricCache};
use crate::config::{ExporterConfig, ExporterSpec};
use crate::error::Result;
use crate::fetch::{Fetch, SourceFetcher};
use crate::parser;

/// An exporter spec paired with its validated metric descriptor
struct Exporter {
    spec: ExporterSpec,
    descriptor: MetricDescriptor,
}

/// Collector that turns configured exporters into metrics at scrape time
///
/// Each exporter is served from the cache while its entry is younger than the
/// exporter's interval, otherwise it is fetched, parsed and materialized
/// inline. A failing exporter still yields a metric, with value `0.0`.
pub struct ExporterCollector<F: Fetch = SourceFetcher> {
    exporters: Vec<Exporter>,
    fetcher: F,
    cache: Arc<MetricCache<MetricFamily>>,
}

impl ExporterCollector<SourceFetcher> {
    /// Create a collector using the production source fetcher
    pub fn new(config: &ExporterConfig) -> Result<Self> {
        Self::with_fetcher(config, SourceFetcher::new()?)
    }
}

impl<F: Fetch> ExporterCollector<F> {
    /// Create a collector with a custom fetcher
    pub fn with_fetcher(config: &ExporterConfig, fetcher: F) -> Result<Self> {
        config.validate()?;

        let exporters = config
            .exporters
            .iter()
            .map(|spec| {
                Ok(Exporter {
                    descriptor: MetricDescriptor::from_spec(spec)?,
                    spec: spec.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!("Registered {} exporters", exporters.len());

        Ok(Self {
            exporters,
            fetcher,
            cache: Arc::new(MetricCache::new()),
        })
    }

    /// Handle to the metric cache
    pub fn cache(&self) -> Arc<MetricCache<MetricFamily>> {
        Arc::clone(&self.cache)
    }

    /// Number of configured exporters
    pub fn len(&self) -> usize {
        self.exporters.len()
    }

    /// Whether no exporters are configured
    pub fn is_empty(&self) -> bool {
        self.exporters.is_empty()
    }

    /// Fetch and parse the current value of an exporter
    async fn resolve_value(&self, exporter: &Exporter) -> Result<f64> {
        let raw = self.fetcher.fetch(&exporter.spec.source).await?;
        Ok(parser::parse(&raw, &exporter.spec.parser)?)
    }

    /// Produce the metric for a single exporter, refreshing it if stale
    async fn collect_exporter(&self, exporter: &Exporter) -> MetricFamily {
        let name = exporter.descriptor.name();

        if let Some(entry) = self.cache.get_fresh(name, exporter.spec.interval()).await {
            trace!("Serving cached value {} for {}", entry.value, name);
            return entry.metric;
        }

        debug!("Refreshing {} from {}", name, exporter.spec.source);
        let value = match self.resolve_value(exporter).await {
            Ok(value) => value,
            Err(e) => {
                error!("Error fetching data for {}: {}", name, e);
                0.0
            }
        };

        let metric = exporter.descriptor.materialize(value);
        self.cache
            .put(name, CacheEntry::new(metric.clone(), value))
            .await;

        metric
    }
}

#[async_trait::async_trait]
impl<F: Fetch> Collector for ExporterCollector<F> {
    fn describe(&self) -> Vec<Desc> {
        self.exporters
            .iter()
            .map(|exporter| exporter.descriptor.desc().clone())
            .collect()
    }

    async fn collect(&self) -> Vec<MetricFamily> {
        let mut families = Vec::with_capacity(self.exporters.len());

        // Exporters are processed one at a time within a scrape
        for exporter in &self.exporters {
            families.push(self.collect_exporter(exporter).await);
        }

        let cached = self.cache.len().await;
        trace!("Scrape produced {} families, {} cached", families.len(), cached);
        families
    }
}
