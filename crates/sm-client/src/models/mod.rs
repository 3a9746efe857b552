//! Data models for Service Manager API resources.
//!
//! Field names follow the API's snake_case JSON. List responses accept both
//! the collection-named key (`platforms`, ...) and the newer `items` key.

mod broker;
mod info;
mod labels;
mod offering;
mod platform;
mod visibility;

pub use broker::{Broker, Brokers};
pub use info::Info;
pub use labels::{LabelChange, LabelChanges, LabelOperation, Labels};
pub use offering::{ServiceOffering, ServiceOfferings, ServicePlan, ServicePlans};
pub use platform::{BasicCredentials, Credentials, Platform, Platforms};
pub use visibility::{Visibilities, Visibility};
