//! the `google_container_cluster` data source
//!
//! [DataGoogleContainerCluster] is the construct: it carries the arguments of the data block
//! ([DataGoogleContainerClusterConfig]), synthesizes them as HCL or terraform JSON and hands out
//! references into the resolved state of the cluster ([ClusterReference]).
mod blocks;

pub use blocks::*;

use crate::naming;
use crate::path::{AttributePath, DataSourceAddress};
use crate::reference::OutputReference;
use crate::resolve::Resolve;
use crate::schema::{self, Block, SchemaError};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const TF_RESOURCE_TYPE: &str = schema::GOOGLE_CONTAINER_CLUSTER;

/// Arguments of the data block
///
/// `name` is required, everything else is optional. Deserializing rejects unknown fields and
/// wrongly typed values instead of coercing them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataGoogleContainerClusterConfig {
    /// The name of the cluster, unique within the project and location.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The location (region or zone) of the cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// The project the cluster belongs to. Falls back to the provider project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    /// Addresses of resources this data source depends on, e.g. `google_project_service.container`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    /// HCL expression producing a map or set of strings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub for_each: Option<String>,
    /// Provider reference: `google` or `google.<alias>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<Lifecycle>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Lifecycle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_before_destroy: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prevent_destroy: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore_changes: Vec<String>,
}

impl DataGoogleContainerClusterConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_depends_on(mut self, address: impl Into<String>) -> Self {
        self.depends_on.push(address.into());
        self
    }

    pub fn with_for_each(mut self, expression: impl Into<String>) -> Self {
        self.for_each = Some(expression.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    /// Construction time checks
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }

        if self.count.is_some() && self.for_each.is_some() {
            return Err(ConfigError::CountAndForEach);
        }

        for dependency in &self.depends_on {
            let valid = dependency.split('.').count() >= 2
                && dependency.split('.').all(naming::is_valid_name);
            if !valid {
                return Err(ConfigError::InvalidDependency(dependency.clone()));
            }
        }

        if let Some(provider) = &self.provider {
            let mut parts = provider.split('.');
            let valid = parts.next().is_some_and(naming::is_valid_name)
                && parts.next().map_or(true, naming::is_valid_name)
                && parts.next().is_none();
            if !valid {
                return Err(ConfigError::InvalidProvider(provider.clone()));
            }
        }

        if let Some(for_each) = &self.for_each {
            parse_expression(for_each)?;
        }

        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("construct id {0:?} is not a valid terraform name")]
    InvalidConstructId(String),
    #[error("name must not be empty")]
    EmptyName,
    #[error("count and for_each are mutually exclusive")]
    CountAndForEach,
    #[error("depends_on entry {0:?} is not a resource address")]
    InvalidDependency(String),
    #[error("provider {0:?} must be <provider> or <provider>.<alias>")]
    InvalidProvider(String),
    #[error("invalid expression {expression:?}")]
    InvalidExpression {
        expression: String,
        #[source]
        source: hcl_edit::parser::Error,
    },
    #[error("unable to render hcl")]
    Render(#[from] hcl::Error),
}

fn parse_expression(expression: &str) -> Result<hcl::Expression, ConfigError> {
    let parsed: hcl_edit::expr::Expression =
        expression
            .parse()
            .map_err(|source| ConfigError::InvalidExpression {
                expression: expression.to_string(),
                source,
            })?;
    Ok(parsed.into())
}

/// `a.b.c` as traversal expression
fn address_expression(address: &str) -> hcl::Expression {
    let mut parts = address.split('.');
    let first = parts.next().unwrap_or_default();
    let mut traversal = hcl::Traversal::builder(hcl::Variable::unchecked(first));
    for part in parts {
        traversal = traversal.attr(hcl::Identifier::sanitized(part));
    }
    traversal.build().into()
}

/// A `google_container_cluster` data source
#[derive(Debug, Clone)]
pub struct DataGoogleContainerCluster {
    address: DataSourceAddress,
    config: DataGoogleContainerClusterConfig,
}

impl DataGoogleContainerCluster {
    pub const TF_RESOURCE_TYPE: &'static str = TF_RESOURCE_TYPE;

    /// Create the data source `data.google_container_cluster.<id>`
    ///
    /// Arguments are checked when debug assertions are enabled.
    pub fn new(
        id: impl Into<String>,
        config: DataGoogleContainerClusterConfig,
    ) -> Result<Self, ConfigError> {
        let id = id.into();

        if cfg!(debug_assertions) {
            if !naming::is_valid_name(&id) {
                return Err(ConfigError::InvalidConstructId(id));
            }
            config.validate()?;
        }

        tracing::debug!(%id, name = %config.name, "data source created");
        Ok(Self {
            address: DataSourceAddress::new(TF_RESOURCE_TYPE.to_string(), id),
            config,
        })
    }

    pub fn address(&self) -> &DataSourceAddress {
        &self.address
    }

    /// Fully qualified name, e.g. `data.google_container_cluster.primary`
    pub fn fqn(&self) -> String {
        self.address.to_string()
    }

    pub fn config(&self) -> &DataGoogleContainerClusterConfig {
        &self.config
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.config.name = name.into();
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.config.id = Some(id.into());
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.config.location = Some(location.into());
    }

    pub fn set_project(&mut self, project: impl Into<String>) {
        self.config.project = Some(project.into());
    }

    pub fn reset_id(&mut self) {
        self.config.id = None;
    }

    pub fn reset_location(&mut self) {
        self.config.location = None;
    }

    pub fn reset_project(&mut self) {
        self.config.project = None;
    }

    /// Schema arguments of the data block, in schema order
    pub fn synthesize_attributes(&self) -> IndexMap<String, Value> {
        let mut attributes = IndexMap::new();
        attributes.insert("name".to_string(), Value::from(self.config.name.as_str()));
        for (key, value) in [
            ("id", &self.config.id),
            ("location", &self.config.location),
            ("project", &self.config.project),
        ] {
            if let Some(value) = value {
                attributes.insert(key.to_string(), Value::from(value.as_str()));
            }
        }
        attributes
    }

    /// Data block in HCL native syntax
    pub fn to_hcl(&self) -> Result<String, ConfigError> {
        let mut block = hcl::Block::builder("data")
            .add_label(TF_RESOURCE_TYPE)
            .add_label(self.address.name());

        for (key, value) in self.synthesize_attributes() {
            if let Value::String(value) = value {
                block = block.add_attribute((key, value));
            }
        }

        if let Some(count) = self.config.count {
            block = block.add_attribute(("count", u64::from(count)));
        }
        if let Some(for_each) = &self.config.for_each {
            block = block.add_attribute(("for_each", parse_expression(for_each)?));
        }
        if let Some(provider) = &self.config.provider {
            block = block.add_attribute(("provider", address_expression(provider)));
        }
        if !self.config.depends_on.is_empty() {
            let dependencies: Vec<hcl::Expression> = self
                .config
                .depends_on
                .iter()
                .map(|address| address_expression(address))
                .collect();
            block = block.add_attribute(("depends_on", hcl::Expression::Array(dependencies)));
        }
        if let Some(lifecycle) = &self.config.lifecycle {
            let mut lifecycle_block = hcl::Block::builder("lifecycle");
            if let Some(value) = lifecycle.create_before_destroy {
                lifecycle_block = lifecycle_block.add_attribute(("create_before_destroy", value));
            }
            if let Some(value) = lifecycle.prevent_destroy {
                lifecycle_block = lifecycle_block.add_attribute(("prevent_destroy", value));
            }
            if !lifecycle.ignore_changes.is_empty() {
                let ignored: Vec<hcl::Expression> = lifecycle
                    .ignore_changes
                    .iter()
                    .map(|name| hcl::Variable::unchecked(name.as_str()).into())
                    .collect();
                lifecycle_block =
                    lifecycle_block.add_attribute(("ignore_changes", hcl::Expression::Array(ignored)));
            }
            block = block.add_block(lifecycle_block.build());
        }

        let body = hcl::Body::builder().add_block(block.build()).build();
        Ok(hcl::format::to_string(&body)?)
    }

    /// Data block in terraform JSON syntax
    pub fn to_json(&self) -> serde_json::Value {
        let mut block = serde_json::Map::new();
        for (key, value) in self.synthesize_attributes() {
            if let Value::String(value) = value {
                block.insert(key, value.into());
            }
        }

        if let Some(count) = self.config.count {
            block.insert("count".into(), count.into());
        }
        if let Some(for_each) = &self.config.for_each {
            block.insert("for_each".into(), format!("${{{for_each}}}").into());
        }
        if let Some(provider) = &self.config.provider {
            block.insert("provider".into(), provider.clone().into());
        }
        if !self.config.depends_on.is_empty() {
            block.insert("depends_on".into(), self.config.depends_on.clone().into());
        }
        if let Some(lifecycle) = &self.config.lifecycle {
            let mut lifecycle_block = serde_json::Map::new();
            if let Some(value) = lifecycle.create_before_destroy {
                lifecycle_block.insert("create_before_destroy".into(), value.into());
            }
            if let Some(value) = lifecycle.prevent_destroy {
                lifecycle_block.insert("prevent_destroy".into(), value.into());
            }
            if !lifecycle.ignore_changes.is_empty() {
                lifecycle_block.insert(
                    "ignore_changes".into(),
                    lifecycle.ignore_changes.clone().into(),
                );
            }
            block.insert("lifecycle".into(), lifecycle_block.into());
        }

        serde_json::json!({
            "data": {
                TF_RESOURCE_TYPE: {
                    self.address.name(): block
                }
            }
        })
    }

    /// Token referencing the top level field `name`
    pub fn attribute(&self, name: &str) -> Result<String, SchemaError> {
        let schema = schema::google_container_cluster();
        let (schema_name, _) = schema.field(name).ok_or_else(|| SchemaError::UnknownField {
            path: String::new(),
            name: name.to_string(),
        })?;
        Ok(self
            .address
            .interpolation(&AttributePath::root().attr(schema_name)))
    }

    /// Typed access to the resolved state of this data source
    pub fn bind<'a>(&'a self, resolver: &'a dyn Resolve) -> ClusterReference<'a> {
        self.bind_with_schema(resolver, schema::google_container_cluster())
    }

    /// Like [Self::bind], against a schema loaded at runtime (e.g. a newer provider version)
    pub fn bind_with_schema<'a>(
        &'a self,
        resolver: &'a dyn Resolve,
        schema: &'a Block,
    ) -> ClusterReference<'a> {
        OutputReference::root(resolver, &self.address, schema).into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::resolve::StateResolver;
    use pretty_assertions::assert_eq;

    fn cluster() -> DataGoogleContainerCluster {
        DataGoogleContainerCluster::new(
            "primary",
            DataGoogleContainerClusterConfig::new("my-cluster")
                .with_location("europe-west1")
                .with_project("my-project"),
        )
        .unwrap()
    }

    #[test]
    fn fqn_and_tokens() {
        let cluster = cluster();
        assert_eq!(cluster.fqn(), "data.google_container_cluster.primary");
        assert_eq!(
            cluster.attribute("masterVersion").unwrap(),
            "${data.google_container_cluster.primary.master_version}"
        );
        assert!(cluster.attribute("not_a_field").is_err());
    }

    #[test]
    fn resets() {
        let mut cluster = cluster();
        cluster.set_id("projects/my-project/locations/europe-west1/clusters/my-cluster");
        assert_eq!(cluster.synthesize_attributes().len(), 4);

        cluster.reset_id();
        cluster.reset_project();
        let keys: Vec<_> = cluster.synthesize_attributes().into_keys().collect();
        assert_eq!(keys, vec!["name", "location"]);
    }

    #[cfg(debug_assertions)]
    #[test]
    fn constructor_checks() {
        let config = DataGoogleContainerClusterConfig::new("my-cluster");

        assert!(matches!(
            DataGoogleContainerCluster::new("1st", config.clone()),
            Err(ConfigError::InvalidConstructId(_))
        ));
        assert!(matches!(
            DataGoogleContainerCluster::new("primary", DataGoogleContainerClusterConfig::new("")),
            Err(ConfigError::EmptyName)
        ));
        assert!(matches!(
            DataGoogleContainerCluster::new(
                "primary",
                config.clone().with_count(1).with_for_each("var.clusters")
            ),
            Err(ConfigError::CountAndForEach)
        ));
        assert!(matches!(
            DataGoogleContainerCluster::new("primary", config.clone().with_depends_on("nodot")),
            Err(ConfigError::InvalidDependency(_))
        ));
        assert!(matches!(
            DataGoogleContainerCluster::new("primary", config.clone().with_provider("google.a.b")),
            Err(ConfigError::InvalidProvider(_))
        ));
        assert!(matches!(
            DataGoogleContainerCluster::new("primary", config.with_for_each("{ unclosed")),
            Err(ConfigError::InvalidExpression { .. })
        ));
    }

    #[test]
    fn config_rejects_wrong_types() {
        let config: Result<DataGoogleContainerClusterConfig, _> =
            serde_json::from_value(serde_json::json!({"name": "my-cluster", "count": "2"}));
        assert!(config.is_err());

        let config: Result<DataGoogleContainerClusterConfig, _> =
            serde_json::from_value(serde_json::json!({"name": 42}));
        assert!(config.is_err());

        let config: Result<DataGoogleContainerClusterConfig, _> =
            serde_json::from_value(serde_json::json!({"name": "my-cluster", "zone": "a"}));
        assert!(config.is_err());

        let config: DataGoogleContainerClusterConfig = serde_json::from_value(
            serde_json::json!({"name": "my-cluster", "location": "us-central1", "count": 2}),
        )
        .unwrap();
        assert_eq!(
            config,
            DataGoogleContainerClusterConfig::new("my-cluster")
                .with_location("us-central1")
                .with_count(2)
        );
    }

    #[test]
    fn json_synthesis() {
        let cluster = DataGoogleContainerCluster::new(
            "primary",
            DataGoogleContainerClusterConfig::new("my-cluster")
                .with_location("europe-west1")
                .with_provider("google.beta")
                .with_depends_on("google_project_service.container")
                .with_lifecycle(Lifecycle {
                    prevent_destroy: Some(true),
                    ignore_changes: vec!["location".to_string()],
                    ..Default::default()
                }),
        )
        .unwrap();

        assert_eq!(
            cluster.to_json(),
            serde_json::json!({
                "data": {
                    "google_container_cluster": {
                        "primary": {
                            "name": "my-cluster",
                            "location": "europe-west1",
                            "provider": "google.beta",
                            "depends_on": ["google_project_service.container"],
                            "lifecycle": {
                                "prevent_destroy": true,
                                "ignore_changes": ["location"]
                            }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn hcl_synthesis_parses_back() {
        let cluster = DataGoogleContainerCluster::new(
            "primary",
            DataGoogleContainerClusterConfig::new("my-cluster")
                .with_location("europe-west1")
                .with_count(1)
                .with_depends_on("google_project_service.container")
                .with_lifecycle(Lifecycle {
                    ignore_changes: vec!["location".to_string()],
                    ..Default::default()
                }),
        )
        .unwrap();

        let rendered = cluster.to_hcl().unwrap();
        let body: hcl::Body = hcl::from_str(&rendered).unwrap();
        let block = body.blocks().next().expect("data block");

        assert_eq!(block.identifier.as_str(), "data");
        let labels: Vec<_> = block.labels.iter().map(|label| label.as_str()).collect();
        assert_eq!(labels, vec!["google_container_cluster", "primary"]);

        let attributes: IndexMap<_, _> = block
            .body
            .attributes()
            .map(|attribute| (attribute.key.as_str(), &attribute.expr))
            .collect();
        assert_eq!(
            attributes["name"],
            &hcl::Expression::String("my-cluster".into())
        );
        assert!(matches!(
            attributes["count"],
            hcl::Expression::Number(count) if count.as_u64() == Some(1)
        ));
        assert!(matches!(attributes["depends_on"], hcl::Expression::Array(_)));
        assert_eq!(block.body.blocks().count(), 1);
    }

    #[test]
    fn bind_resolves_through_facade() {
        let cluster = cluster();
        let state: StateResolver = serde_json::json!({
            "name": "my-cluster",
            "endpoint": "34.1.2.3",
            "release_channel": [{"channel": "REGULAR"}]
        })
        .into();

        let bound = cluster.bind(&state);
        assert_eq!(bound.endpoint().unwrap(), "34.1.2.3");
        assert_eq!(
            bound
                .release_channel()
                .unwrap()
                .get(0)
                .unwrap()
                .channel()
                .unwrap(),
            "REGULAR"
        );
    }
}
