//! Tagged metric naming: [`TagMap`] and [`MetricName`].

pub mod metric_name;
pub mod tags;

pub use metric_name::{MetricName, MetricNameBuilder};
pub use tags::TagMap;
