//! Metric binding lookup.
//!
//! Nodes and links carry an optional bind key. An external metric source maps
//! bind keys to numeric values by exact string match. A missing key, or a
//! missing binding, means "no data"; what that looks like on screen is the
//! presentation layer's business.

use crate::types::{Link, Node};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One named sample as delivered by a time-series backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub name: String,
    pub value: f64,
}

impl MetricSample {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Anything that can resolve a bind key to a value.
pub trait MetricSource {
    fn value(&self, bind: &str) -> Option<f64>;
}

impl MetricSource for HashMap<String, f64> {
    fn value(&self, bind: &str) -> Option<f64> {
        self.get(bind).copied()
    }
}

impl MetricSource for BTreeMap<String, f64> {
    fn value(&self, bind: &str) -> Option<f64> {
        self.get(bind).copied()
    }
}

/// First sample with a matching name wins.
impl MetricSource for [MetricSample] {
    fn value(&self, bind: &str) -> Option<f64> {
        self.iter().find(|m| m.name == bind).map(|m| m.value)
    }
}

impl MetricSource for Vec<MetricSample> {
    fn value(&self, bind: &str) -> Option<f64> {
        self.as_slice().value(bind)
    }
}

/// Resolve an optional bind key against a source.
pub fn resolve<S: MetricSource + ?Sized>(source: &S, bind: Option<&str>) -> Option<f64> {
    bind.and_then(|key| source.value(key))
}

impl Node {
    pub fn metric_value<S: MetricSource + ?Sized>(&self, source: &S) -> Option<f64> {
        resolve(source, self.metric_bind.as_deref())
    }
}

impl Link {
    pub fn metric_value<S: MetricSource + ?Sized>(&self, source: &S) -> Option<f64> {
        resolve(source, self.metric_bind.as_deref())
    }

    pub fn secondary_metric_value<S: MetricSource + ?Sized>(&self, source: &S) -> Option<f64> {
        resolve(source, self.metric_bind_sec.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<MetricSample> {
        vec![
            MetricSample::new("core: ICMP ping", 1.0),
            MetricSample::new("edge: ICMP ping", 0.0),
            MetricSample::new("core: ICMP ping", 5.0),
        ]
    }

    #[test]
    fn exact_match_only() {
        let src = samples();
        assert_eq!(src.value("core: ICMP ping"), Some(1.0));
        assert_eq!(src.value("core: icmp ping"), None);
        assert_eq!(src.value("core"), None);
    }

    #[test]
    fn missing_binding_means_no_data() {
        let node = Node::new("core", 0.0, 0.0, "router");
        assert_eq!(node.metric_value(&samples()), None);

        let bound = node.with_metric_bind("edge: ICMP ping");
        assert_eq!(bound.metric_value(&samples()), Some(0.0));
    }

    #[test]
    fn links_resolve_both_bindings() {
        let mut map = HashMap::new();
        map.insert("rx".to_string(), 450.0);
        map.insert("tx".to_string(), 120.0);

        let link = Link::new("a", "b")
            .with_metric_bind("rx")
            .with_secondary_bind("tx");
        assert_eq!(link.metric_value(&map), Some(450.0));
        assert_eq!(link.secondary_metric_value(&map), Some(120.0));
        assert_eq!(Link::new("a", "b").metric_value(&map), None);
    }
}
