//! Metrics Module
//!
//! Pull-based reporting of cache size and lookup counters.
//!
//! A host registers anything implementing [`Collector`] with its metrics
//! system. [`render_text`] formats a collector in the Prometheus text
//! exposition format for hosts that serve it over HTTP.

use std::hash::Hash;

use crate::cache::SharedCache;

// == Metric Metadata ==
/// Kind of a reported series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

/// Static description of a series: name, help text and label keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub label_keys: &'static [&'static str],
}

/// One point-in-time reading of a series.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: &'static str,
    /// Label key/value pairs, in the order of the descriptor's label keys
    pub labels: Vec<(&'static str, &'static str)>,
    pub value: f64,
}

/// Current number of cache entries.
pub const CACHE_SIZE: MetricDesc = MetricDesc {
    name: "cache_size",
    help: "Size of the LRU Cache which holds the rate limits.",
    kind: MetricKind::Gauge,
    label_keys: &[],
};

/// Cache lookups, split by `type` into `hit` and `miss`.
pub const CACHE_ACCESS_COUNT: MetricDesc = MetricDesc {
    name: "cache_access_count",
    help: "Cache access counts.",
    kind: MetricKind::Counter,
    label_keys: &["type"],
};

// == Collector ==
/// Source of metrics that an external collection system pulls from.
pub trait Collector {
    /// Static metadata for every series this collector reports.
    fn describe(&self) -> Vec<MetricDesc>;

    /// A consistent snapshot of every series.
    fn collect(&self) -> Vec<Sample>;
}

impl<K, V> Collector for SharedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn describe(&self) -> Vec<MetricDesc> {
        vec![CACHE_SIZE, CACHE_ACCESS_COUNT]
    }

    fn collect(&self) -> Vec<Sample> {
        let (stats, size) = {
            let cache = self.lock();
            (cache.stats(), cache.len())
        };

        vec![
            Sample {
                name: CACHE_ACCESS_COUNT.name,
                labels: vec![("type", "hit")],
                value: stats.hits as f64,
            },
            Sample {
                name: CACHE_ACCESS_COUNT.name,
                labels: vec![("type", "miss")],
                value: stats.misses as f64,
            },
            Sample {
                name: CACHE_SIZE.name,
                labels: Vec::new(),
                value: size as f64,
            },
        ]
    }
}

// == Text Exposition ==
/// Renders a collector in the Prometheus text exposition format.
pub fn render_text(collector: &dyn Collector) -> String {
    let samples = collector.collect();
    let mut out = String::new();

    for desc in collector.describe() {
        out.push_str(&format!("# HELP {} {}\n", desc.name, desc.help));
        out.push_str(&format!("# TYPE {} {}\n", desc.name, desc.kind.as_str()));

        for sample in samples.iter().filter(|s| s.name == desc.name) {
            out.push_str(sample.name);
            if !sample.labels.is_empty() {
                let labels: Vec<String> = sample
                    .labels
                    .iter()
                    .map(|(key, value)| format!("{}=\"{}\"", key, value))
                    .collect();
                out.push_str(&format!("{{{}}}", labels.join(",")));
            }
            out.push_str(&format!(" {}\n", sample.value));
        }
    }

    out
}
