use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Labels attached to a resource: key to list of values.
pub type Labels = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelOperation {
    Add,
    AddValues,
    Remove,
    RemoveValues,
}

/// One label mutation sent with a PATCH request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelChange {
    pub op: LabelOperation,
    pub key: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelChanges {
    pub labels: Vec<LabelChange>,
}

impl LabelChanges {
    #[must_use]
    pub fn single(op: LabelOperation, key: impl Into<String>, values: Vec<String>) -> Self {
        Self { labels: vec![LabelChange { op, key: key.into(), values }] }
    }
}
