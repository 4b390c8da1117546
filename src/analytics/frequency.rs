//! Frequency counts grouped by classification dimensions.

use crate::analytics::volume::Measurable;
use crate::chain::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A grouping dimension: maps a record to its bucket label.
pub type Dimension<'d, P> = &'d dyn Fn(&Record<P>) -> String;

/// Count tree. The root counts every record; each level below splits by
/// the next dimension.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyNode {
    /// Records under this node
    pub count: u64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub children: BTreeMap<String, FrequencyNode>,
}

impl FrequencyNode {
    /// Count at a bucket path, 0 when the path does not exist.
    pub fn get(&self, path: &[&str]) -> u64 {
        let mut node = self;
        for label in path {
            match node.children.get(*label) {
                Some(child) => node = child,
                None => return 0,
            }
        }
        node.count
    }

    fn insert(&mut self, labels: &[String]) {
        self.count += 1;
        if let Some((first, rest)) = labels.split_first() {
            self.children.entry(first.clone()).or_default().insert(rest);
        }
    }
}

/// Count records by one or more dimensions, nested in the given order.
pub fn frequency<'a, P, I>(records: I, dimensions: &[Dimension<'_, P>]) -> FrequencyNode
where
    P: 'a,
    I: IntoIterator<Item = &'a Record<P>>,
{
    let mut root = FrequencyNode::default();
    for record in records {
        let labels: Vec<String> = dimensions.iter().map(|dim| dim(record)).collect();
        root.insert(&labels);
    }
    root
}

/// Dimension: direction label.
pub fn by_direction<P: Measurable>(record: &Record<P>) -> String {
    record.payload().direction().as_str().to_string()
}
