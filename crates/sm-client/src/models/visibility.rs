use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::labels::Labels;

/// Grants a platform access to a service plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Empty for plans visible on every platform.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub platform_id: String,
    pub service_plan_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibilities {
    #[serde(default, alias = "items")]
    pub visibilities: Vec<Visibility>,
}
