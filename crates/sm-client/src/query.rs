//! Query parameters accepted by Service Manager list and mutation calls.

use std::collections::BTreeMap;

/// Field, label and general query parameters.
///
/// Field and label queries are joined with `" and "`; general parameters
/// are raw `key=value` pairs passed through as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    pub field_query: Vec<String>,
    pub label_query: Vec<String>,
    pub general_params: Vec<String>,
}

impl Parameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field query criterion, e.g. `name = my-platform`.
    #[must_use]
    pub fn field(mut self, criterion: impl Into<String>) -> Self {
        self.field_query.push(criterion.into());
        self
    }

    /// Add a label query criterion, e.g. `env in (dev, prod)`.
    #[must_use]
    pub fn label(mut self, criterion: impl Into<String>) -> Self {
        self.label_query.push(criterion.into());
        self
    }

    /// Add a general `key=value` parameter.
    #[must_use]
    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.general_params.push(format!("{key}={value}"));
        self
    }

    /// Copy only the general parameters, dropping field and label queries.
    #[must_use]
    pub fn general_only(&self) -> Self {
        Self { general_params: self.general_params.clone(), ..Self::default() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.field_query.is_empty() && self.label_query.is_empty() && self.general_params.is_empty()
    }

    /// Encode as a form-urlencoded query string with sorted keys.
    #[must_use]
    pub fn encode(&self) -> String {
        let field_query = self.field_query.join(" and ");
        let label_query = self.label_query.join(" and ");
        let mut values: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        if !self.field_query.is_empty() {
            values.entry("fieldQuery").or_default().push(&field_query);
        }
        if !self.label_query.is_empty() {
            values.entry("labelQuery").or_default().push(&label_query);
        }
        for param in &self.general_params {
            let (key, value) = param.split_once('=').unwrap_or((param.as_str(), ""));
            values.entry(key).or_default().push(value);
        }

        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, entries) in &values {
            for value in entries {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

/// Append encoded parameters to a path, adding `?` only when needed.
#[must_use]
pub fn build_url(path: &str, query: Option<&Parameters>) -> String {
    let encoded = query.map(Parameters::encode).unwrap_or_default();
    if encoded.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{encoded}")
    }
}
