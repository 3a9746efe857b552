use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A service offering from a broker catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub bindable: bool,
    #[serde(default)]
    pub plan_updateable: bool,
    #[serde(default)]
    pub catalog_id: String,
    #[serde(default)]
    pub catalog_name: String,
    pub broker_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,

    /// Filled in by `ServiceManagerClient::list_offerings`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plans: Vec<ServicePlan>,
    /// Filled in by `ServiceManagerClient::list_offerings`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub broker_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceOfferings {
    #[serde(default, alias = "items")]
    pub service_offerings: Vec<ServiceOffering>,
}

/// A plan of a service offering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServicePlan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub catalog_id: String,
    #[serde(default)]
    pub catalog_name: String,
    #[serde(default)]
    pub free: bool,
    #[serde(default)]
    pub bindable: bool,
    #[serde(default)]
    pub plan_updateable: bool,
    pub service_offering_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServicePlans {
    #[serde(default, alias = "items")]
    pub service_plans: Vec<ServicePlan>,
}
