use prometheus::core::Desc;
use prometheus::proto::{Counter, Gauge, Metric, MetricFamily, MetricType};

use crate::config::{ExporterSpec, MetricKind};
use crate::error::{AgentError, Result};

/// Validated metric identity for one exporter
///
/// Construction fails for names or labels the exposition format cannot carry,
/// so materializing a value at scrape time cannot fail.
#[derive(Debug, Clone)]
pub struct MetricDescriptor {
    kind: MetricKind,
    desc: Desc,
}

impl MetricDescriptor {
    /// Build and validate the descriptor for an exporter
    pub fn from_spec(spec: &ExporterSpec) -> Result<Self> {
        // The exposition format rejects empty help text
        let help = if spec.description.trim().is_empty() {
            spec.name.clone()
        } else {
            spec.description.clone()
        };

        let desc = Desc::new(spec.name.clone(), help, vec![], spec.labels.clone())
            .map_err(|e| AgentError::Config(format!("Invalid metric {}: {}", spec.name, e)))?;

        Ok(Self {
            kind: spec.metric_type,
            desc,
        })
    }

    /// Metric name
    pub fn name(&self) -> &str {
        &self.desc.fq_name
    }

    /// Protocol descriptor
    pub fn desc(&self) -> &Desc {
        &self.desc
    }

    /// Build a single-sample metric family carrying `value` as is
    ///
    /// Counters are snapshots of an external total, so negative and NaN
    /// readings are passed through rather than rejected.
    pub fn materialize(&self, value: f64) -> MetricFamily {
        let mut metric = Metric::default();
        metric.set_label(self.desc.const_label_pairs.clone().into());

        let field_type = match self.kind {
            MetricKind::Gauge => {
                let mut gauge = Gauge::default();
                gauge.set_value(value);
                metric.set_gauge(gauge);
                MetricType::GAUGE
            }
            MetricKind::Counter => {
                let mut counter = Counter::default();
                counter.set_value(value);
                metric.set_counter(counter);
                MetricType::COUNTER
            }
        };

        let mut family = MetricFamily::default();
        family.set_name(self.desc.fq_name.clone());
        family.set_help(self.desc.help.clone());
        family.set_field_type(field_type);
        family.set_metric(vec![metric].into());
        family
    }
}
