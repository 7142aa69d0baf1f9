//! resolved data source instances loaded from terraform
//!
//! [ClusterStates] accepts three input shapes:
//! - terraform state v4 (`terraform.tfstate`): `resources[]` with `"mode": "data"`
//! - `terraform show -json`: `values.root_module`, child modules included
//! - a bare attribute object, stored under a caller supplied name
//!
//! Instances are keyed by their address below `data.google_container_cluster`, e.g. `primary`,
//! `primary[0]`, `primary["blue"]` or `module.gke.primary`.
use crate::cluster::TF_RESOURCE_TYPE;
use crate::resolve::{ResolveError, StateResolver};
use crate::rewrite::ReferenceNormalizer;
use crate::schema::{self, Block, Field};
use crate::value::Value;
use crate::visit::VisitTraversalsMut;
use hcl::eval::{Evaluate, FuncArgs, FuncDef, ParamType};
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    Int(u64),
    String(String),
}

/// Address of one data source instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_new::new)]
pub struct InstanceAddress {
    module: Option<String>,
    name: String,
    index: Option<IndexKey>,
}

impl InstanceAddress {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn from_json(module: Option<&str>, name: &str, index: Option<&serde_json::Value>) -> Self {
        let index = match index {
            Some(serde_json::Value::Number(number)) => number.as_u64().map(IndexKey::Int),
            Some(serde_json::Value::String(key)) => Some(IndexKey::String(key.clone())),
            _ => None,
        };
        Self::new(module.map(str::to_string), name.to_string(), index)
    }
}

impl std::fmt::Display for InstanceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(module) = &self.module {
            write!(f, "{module}.")?;
        }
        f.write_str(&self.name)?;
        match &self.index {
            Some(IndexKey::Int(index)) => write!(f, "[{index}]"),
            Some(IndexKey::String(key)) => write!(f, "[{key:?}]"),
            None => Ok(()),
        }
    }
}

/// Collection of resolved `google_container_cluster` instances
#[derive(Debug, Default)]
pub struct ClusterStates {
    instances: IndexMap<String, (InstanceAddress, Value)>,
}

impl ClusterStates {
    /// Add an instance, replacing (and returning) an instance with the same address
    pub fn insert(&mut self, address: InstanceAddress, attributes: impl Into<Value>) -> Option<Value> {
        let key = address.to_string();
        tracing::debug!(instance = %key, "instance added");
        self.instances
            .insert(key, (address, attributes.into()))
            .map(|(_, previous)| previous)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.instances.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.instances.get(name).map(|(_, attributes)| attributes)
    }

    /// Resolver over the instance `name`
    pub fn resolver(&self, name: &str) -> Result<StateResolver, ResolveError> {
        self.get(name)
            .cloned()
            .map(StateResolver::new)
            .ok_or_else(|| ResolveError::UnknownInstance(name.to_string()))
    }

    /// The only instance, or the instance `name`
    pub fn single_or(&self, name: Option<&str>) -> Result<StateResolver, ResolveError> {
        match (name, self.instances.len()) {
            (Some(name), _) => self.resolver(name),
            (None, 1) => Ok(StateResolver::new(self.instances[0].1.clone())),
            (None, len) => Err(ResolveError::AmbiguousInstance(len)),
        }
    }
}

impl ClusterStates {
    /// Load instances from `json`, detecting its shape
    ///
    /// A bare attribute object is stored as `fallback_name`. Returns the number of instances added.
    pub fn load_str(&mut self, json: &str, fallback_name: &str) -> Result<usize, LoadError> {
        let raw: serde_json::Value = serde_json::from_str(json)?;

        if raw.get("resources").is_some() && raw.get("version").is_some() {
            let state: StateV4 = serde_json::from_value(raw)?;
            return self.load_state_v4(state);
        }

        if raw.get("format_version").is_some() {
            let show: ShowOutput = serde_json::from_value(raw)?;
            let Some(values) = show.values else {
                tracing::debug!("show output without values");
                return Ok(0);
            };
            return Ok(self.load_module(&values.root_module));
        }

        if !raw.is_object() {
            return Err(LoadError::UnknownFormat);
        }

        tracing::debug!(name = fallback_name, "raw attribute object");
        self.insert(
            InstanceAddress::new(None, fallback_name.to_string(), None),
            raw,
        );
        Ok(1)
    }

    fn load_state_v4(&mut self, state: StateV4) -> Result<usize, LoadError> {
        if state.version != 4 {
            return Err(LoadError::UnsupportedStateVersion(state.version));
        }

        let mut count = 0;
        for resource in state.resources {
            if resource.mode != "data" || resource.resource_type != TF_RESOURCE_TYPE {
                tracing::trace!(resource_type = %resource.resource_type, name = %resource.name, "skipped");
                continue;
            }

            for instance in resource.instances {
                let address = InstanceAddress::from_json(
                    resource.module.as_deref(),
                    &resource.name,
                    instance.index_key.as_ref(),
                );
                self.insert(address, instance.attributes);
                count += 1;
            }
        }

        Ok(count)
    }

    fn load_module(&mut self, module: &ShowModule) -> usize {
        let mut count = 0;
        for resource in &module.resources {
            if resource.mode != "data" || resource.resource_type != TF_RESOURCE_TYPE {
                continue;
            }

            let address = InstanceAddress::from_json(
                module.address.as_deref(),
                &resource.name,
                resource.index.as_ref(),
            );
            self.insert(address, resource.values.clone());
            count += 1;
        }

        for child in &module.child_modules {
            count += self.load_module(child);
        }
        count
    }

    pub fn load_file(&mut self, file_path: &Path) -> Result<usize, LoadError> {
        let file_path = file_path.canonicalize().map_err(|source| LoadError::Io {
            path: file_path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %file_path.display(), "loading file");

        let contents = std::fs::read_to_string(&file_path).map_err(|source| LoadError::Io {
            path: file_path.clone(),
            source,
        })?;

        let fallback_name = file_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.load_str(&contents, &fallback_name)
            .map_err(|error| error.in_file(&file_path))
    }

    /// Load every `*.tfstate` and `*.json` file of a directory
    pub fn load_directory(&mut self, dir_path: &Path) -> Result<usize, LoadError> {
        let io_error = |source| LoadError::Io {
            path: dir_path.to_path_buf(),
            source,
        };

        let mut files: Vec<PathBuf> = vec![];
        for dir_entry in std::fs::read_dir(dir_path).map_err(io_error)? {
            let dir_entry = dir_entry.map_err(io_error)?;
            if !dir_entry.file_type().map_err(io_error)?.is_file() {
                continue;
            }

            let path = dir_entry.path();
            let is_state_file = path
                .extension()
                .is_some_and(|extension| extension == "tfstate" || extension == "json");
            if is_state_file {
                files.push(path);
            }
        }

        if files.is_empty() {
            return Err(LoadError::NoFilesFound(dir_path.to_path_buf()));
        }

        // read_dir order is platform dependent
        files.sort();

        let mut count = 0;
        for file_path in files {
            count += self.load_file(&file_path)?;
        }
        Ok(count)
    }
}

impl ClusterStates {
    /// `data.google_container_cluster` as seen by expressions
    ///
    /// Only root module instances are visible. Keys are rewritten to schema names. `count`
    /// instances become a list and must be numbered from 0 without gaps, `for_each` instances
    /// become an object.
    fn data_object(&self, schema: &Block) -> Result<Value, EvaluateError> {
        let mut grouped: IndexMap<&str, Instances> = IndexMap::new();

        for (address, attributes) in self.instances.values() {
            if address.module.is_some() {
                continue;
            }

            let attributes = with_schema_keys(attributes, schema);
            let name = address.name.as_str();

            let entry = match grouped.entry(name) {
                Entry::Vacant(vacant) => {
                    vacant.insert(Instances::new(&address.index, attributes));
                    continue;
                }
                Entry::Occupied(occupied) => occupied.into_mut(),
            };
            match (entry, &address.index) {
                (Instances::Count(items), Some(IndexKey::Int(index))) => {
                    items.push((*index, attributes));
                }
                (Instances::ForEach(items), Some(IndexKey::String(key))) => {
                    items.insert(key.clone(), attributes);
                }
                _ => return Err(EvaluateError::MixedInstanceKeys(name.to_string())),
            }
        }

        let mut clusters: IndexMap<String, Value> = IndexMap::new();
        for (name, instances) in grouped {
            let value = match instances {
                Instances::Single(attributes) => attributes,
                Instances::ForEach(items) => Value::Object(items),
                Instances::Count(mut items) => {
                    items.sort_by_key(|(index, _)| *index);
                    let gap = items
                        .iter()
                        .zip(0u64..)
                        .find(|((index, _), expected)| index != expected);
                    if let Some(((index, _), _)) = gap {
                        return Err(EvaluateError::SparseCount {
                            name: name.to_string(),
                            index: *index,
                        });
                    }
                    Value::Array(items.into_iter().map(|(_, attributes)| attributes).collect())
                }
            };
            clusters.insert(name.to_string(), value);
        }

        let mut data = IndexMap::new();
        data.insert(TF_RESOURCE_TYPE.to_string(), Value::Object(clusters));
        Ok(Value::Object(data))
    }

    /// Evaluate an hcl expression against the loaded instances
    ///
    /// ```
    /// # use tfgke::state::{ClusterStates, InstanceAddress};
    /// let mut states = ClusterStates::default();
    /// states.insert(
    ///     InstanceAddress::new(None, "primary".into(), None),
    ///     serde_json::json!({"name": "my-cluster", "nodePool": [{"nodeCount": 3}]}),
    /// );
    ///
    /// let value = states
    ///     .evaluate("data.google_container_cluster.primary.nodePool[0].node_count * 2")
    ///     .unwrap();
    /// assert_eq!(value.as_f64(), Some(6.0));
    /// ```
    pub fn evaluate(&self, expression: &str) -> anyhow::Result<Value> {
        let parsed: hcl_edit::expr::Expression = expression.parse()?;
        let mut expression: hcl::Expression = parsed.into();

        let schema = schema::google_container_cluster();
        let mut normalizer = ReferenceNormalizer::new(TF_RESOURCE_TYPE, schema);
        expression.visit_traversals_mut(&mut normalizer);
        if let Some(issue) = normalizer.into_issues().into_iter().next() {
            return Err(issue.into());
        }
        tracing::debug!(%expression, "normalized");

        let mut context = hcl::eval::Context::new();
        context.declare_var("data", hcl::Value::from(self.data_object(schema)?));
        context.declare_func(
            "tolist",
            FuncDef::builder().param(ParamType::Any).build(tolist),
        );

        let value = expression.evaluate(&context)?;
        Ok(value.into())
    }
}

/// Instances sharing a name, before they become a value of `data.google_container_cluster`
enum Instances {
    Single(Value),
    Count(Vec<(u64, Value)>),
    ForEach(IndexMap<String, Value>),
}

impl Instances {
    fn new(index: &Option<IndexKey>, attributes: Value) -> Self {
        match index {
            None => Instances::Single(attributes),
            Some(IndexKey::Int(index)) => Instances::Count(vec![(*index, attributes)]),
            Some(IndexKey::String(key)) => {
                Instances::ForEach(IndexMap::from([(key.clone(), attributes)]))
            }
        }
    }
}

/// Sets are stored as lists already
fn tolist(args: FuncArgs) -> Result<hcl::Value, String> {
    match &args[0] {
        hcl::Value::Array(items) => Ok(hcl::Value::Array(items.clone())),
        other => Err(format!("tolist expects a set or list, got {other:?}")),
    }
}

/// Rename object keys of nested blocks to their schema names
///
/// Values of attributes (maps in particular) keep their keys.
fn with_schema_keys(value: &Value, block: &Block) -> Value {
    let Value::Object(object) = value else {
        return value.clone();
    };

    object
        .iter()
        .map(|(key, value)| match block.field(key) {
            Some((name, Field::Attribute(_))) => (name.to_string(), value.clone()),
            Some((name, Field::Block(nested))) => {
                let value = match value {
                    Value::Array(items) => Value::Array(
                        items
                            .iter()
                            .map(|item| with_schema_keys(item, &nested.block))
                            .collect(),
                    ),
                    value => with_schema_keys(value, &nested.block),
                };
                (name.to_string(), value)
            }
            None => (key.clone(), value.clone()),
        })
        .collect::<IndexMap<_, _>>()
        .into()
}

#[derive(Debug, Deserialize)]
struct StateV4 {
    version: u64,
    #[serde(default)]
    resources: Vec<StateResource>,
}

#[derive(Debug, Deserialize)]
struct StateResource {
    #[serde(default)]
    module: Option<String>,
    mode: String,
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    #[serde(default)]
    instances: Vec<StateInstance>,
}

#[derive(Debug, Deserialize)]
struct StateInstance {
    #[serde(default)]
    index_key: Option<serde_json::Value>,
    #[serde(default)]
    attributes: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ShowOutput {
    #[serde(default)]
    values: Option<ShowValues>,
}

#[derive(Debug, Deserialize)]
struct ShowValues {
    root_module: ShowModule,
}

#[derive(Debug, Deserialize)]
struct ShowModule {
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    resources: Vec<ShowResource>,
    #[serde(default)]
    child_modules: Vec<ShowModule>,
}

#[derive(Debug, Deserialize)]
struct ShowResource {
    mode: String,
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    #[serde(default)]
    index: Option<serde_json::Value>,
    #[serde(default)]
    values: serde_json::Value,
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("no state files found in {0:?}")]
    NoFilesFound(PathBuf),
    #[error("unable to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse state")]
    Json(#[from] serde_json::Error),
    #[error("unsupported state version {0}, expected 4")]
    UnsupportedStateVersion(u64),
    #[error("neither terraform state, show output nor an attribute object")]
    UnknownFormat,
    #[error("failed to load {path:?}")]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<LoadError>,
    },
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum EvaluateError {
    #[error("instances of {0:?} mix count, for_each and unindexed addresses")]
    MixedInstanceKeys(String),
    #[error("count instances of {name:?} are not numbered from 0 without gaps (found index {index})")]
    SparseCount { name: String, index: u64 },
}

impl LoadError {
    fn in_file(self, path: &Path) -> Self {
        LoadError::InFile {
            path: path.to_path_buf(),
            source: Box::new(self),
        }
    }
}

/// Utility macro to create [ClusterStates] from json strings
///
/// A single document is stored as `main` when it is a bare attribute object
/// ```
/// # use tfgke::cluster_states;
/// let states = cluster_states!(r#"{"name": "my-cluster"}"#);
/// assert!(states.get("main").is_some());
/// ```
///
/// Multiple documents with fallback names
/// ```
/// # use tfgke::cluster_states;
/// let states = cluster_states! {
///   "blue" => r#"{"name": "blue-cluster"}"#,
///   "green" => r#"{"name": "green-cluster"}"#
/// };
/// assert_eq!(states.len(), 2);
/// ```
///
/// # Panic
/// Panics on invalid input
///
/// ```should_panic
/// # use tfgke::cluster_states;
/// cluster_states!("[1, 2]");
/// ```
#[macro_export]
macro_rules! cluster_states {
    { $json:expr } => {
        $crate::cluster_states! { "main" => $json }
    };
    { $($name:expr => $json:expr),+ } => {{
        let mut states = $crate::state::ClusterStates::default();
        $(
            states.load_str($json, $name).expect("state must load");
        )+
        states
    }};
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::schema::SchemaError;
    use pretty_assertions::assert_eq;

    const STATE_V4: &str = r#"{
        "version": 4,
        "terraform_version": "1.5.7",
        "serial": 3,
        "lineage": "5d0e5a4b-0000-0000-0000-000000000000",
        "outputs": {},
        "resources": [
            {
                "mode": "data",
                "type": "google_container_cluster",
                "name": "primary",
                "provider": "provider[\"registry.terraform.io/hashicorp/google\"]",
                "instances": [
                    {"schema_version": 0, "attributes": {"name": "primary", "endpoint": "34.1.2.3"}}
                ]
            },
            {
                "mode": "data",
                "type": "google_container_cluster",
                "name": "regional",
                "instances": [
                    {"index_key": 0, "attributes": {"name": "eu"}},
                    {"index_key": 1, "attributes": {"name": "us"}}
                ]
            },
            {
                "module": "module.gke",
                "mode": "data",
                "type": "google_container_cluster",
                "name": "this",
                "instances": [{"attributes": {"name": "module-cluster"}}]
            },
            {
                "mode": "managed",
                "type": "google_container_cluster",
                "name": "managed",
                "instances": [{"attributes": {"name": "ignored"}}]
            },
            {
                "mode": "data",
                "type": "google_client_config",
                "name": "current",
                "instances": [{"attributes": {"project": "ignored"}}]
            }
        ]
    }"#;

    #[test]
    fn state_v4() {
        let mut states = ClusterStates::default();
        assert_eq!(states.load_str(STATE_V4, "unused").unwrap(), 4);

        let names: Vec<_> = states.names().collect();
        assert_eq!(
            names,
            vec!["primary", "regional[0]", "regional[1]", "module.gke.this"]
        );
        assert_eq!(
            states.get("regional[1]").unwrap().as_object().unwrap()["name"],
            Value::from("us")
        );
        assert!(matches!(
            states.resolver("managed"),
            Err(ResolveError::UnknownInstance(_))
        ));
    }

    #[test]
    fn unsupported_version() {
        let mut states = ClusterStates::default();
        assert!(matches!(
            states.load_str(r#"{"version": 3, "resources": []}"#, "x"),
            Err(LoadError::UnsupportedStateVersion(3))
        ));
        assert!(matches!(
            states.load_str("[]", "x"),
            Err(LoadError::UnknownFormat)
        ));
    }

    #[test]
    fn show_json_with_child_modules() {
        let states = cluster_states!(
            r#"{
                "format_version": "1.0",
                "terraform_version": "1.5.7",
                "values": {
                    "root_module": {
                        "resources": [{
                            "address": "data.google_container_cluster.primary",
                            "mode": "data",
                            "type": "google_container_cluster",
                            "name": "primary",
                            "values": {"name": "primary"}
                        }],
                        "child_modules": [{
                            "address": "module.gke",
                            "resources": [{
                                "address": "module.gke.data.google_container_cluster.this[\"blue\"]",
                                "mode": "data",
                                "type": "google_container_cluster",
                                "name": "this",
                                "index": "blue",
                                "values": {"name": "blue"}
                            }]
                        }]
                    }
                }
            }"#
        );

        let names: Vec<_> = states.names().collect();
        assert_eq!(names, vec!["primary", "module.gke.this[\"blue\"]"]);
    }

    #[test]
    fn evaluate_normalizes_and_indexes() {
        let mut states = ClusterStates::default();
        states.load_str(STATE_V4, "unused").unwrap();
        states.insert(
            InstanceAddress::new(None, "cdk".into(), None),
            serde_json::json!({
                "addonsConfig": [{"httpLoadBalancing": [{"disabled": true}]}],
                "masterAuthorizedNetworksConfig": [{
                    "cidrBlocks": [{"cidrBlock": "10.0.0.0/8", "displayName": "internal"}]
                }],
                "resourceLabels": {"costCenter": "42"}
            }),
        );

        assert_eq!(
            states
                .evaluate("data.google_container_cluster.cdk.addonsConfig[0].httpLoadBalancing[0].disabled")
                .unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            states
                .evaluate("tolist(data.google_container_cluster.cdk.master_authorized_networks_config[0].cidr_blocks)[0].display_name")
                .unwrap(),
            Value::from("internal")
        );
        assert_eq!(
            states
                .evaluate(r#"data.google_container_cluster.cdk.resource_labels["costCenter"]"#)
                .unwrap(),
            Value::from("42")
        );
        assert_eq!(
            states
                .evaluate("\"${data.google_container_cluster.regional[1].name}-${data.google_container_cluster.primary.endpoint}\"")
                .unwrap(),
            Value::from("us-34.1.2.3")
        );
    }

    #[test]
    fn evaluate_set_elements() {
        let states = cluster_states!(
            r#"{
                "masterAuthorizedNetworksConfig": [{
                    "cidrBlocks": [{"cidrBlock": "10.0.0.0/8", "displayName": "internal"}]
                }]
            }"#
        );

        assert_eq!(
            states
                .evaluate("tolist(data.google_container_cluster.main.masterAuthorizedNetworksConfig[0].cidrBlocks)[0].displayName")
                .unwrap(),
            Value::from("internal")
        );

        let error = states
            .evaluate("tolist(data.google_container_cluster.main.master_authorized_networks_config[0].cidr_blocks)[0].nope")
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<SchemaError>(),
            Some(SchemaError::UnknownField { name, .. }) if name == "nope"
        ));
    }

    fn state_with_index_keys(keys: &[&str]) -> String {
        let instances: Vec<String> = keys
            .iter()
            .map(|key| format!(r#"{{"index_key": {key}, "attributes": {{"name": "c"}}}}"#))
            .collect();
        format!(
            r#"{{"version": 4, "resources": [{{
                "mode": "data", "type": "google_container_cluster", "name": "p",
                "instances": [{}]
            }}]}}"#,
            instances.join(",")
        )
    }

    #[test]
    fn evaluate_count_instances() {
        let mut states = ClusterStates::default();
        states
            .load_str(&state_with_index_keys(&["1", "0"]), "unused")
            .unwrap();
        for index in 0..2 {
            assert_eq!(
                states
                    .evaluate(&format!("data.google_container_cluster.p[{index}].name"))
                    .unwrap(),
                Value::from("c")
            );
        }
        assert!(states
            .evaluate("data.google_container_cluster.p[2].name")
            .is_err());

        for keys in [&["18446744073709551615"][..], &["100000000000"], &["0", "2"]] {
            let mut states = ClusterStates::default();
            states.load_str(&state_with_index_keys(keys), "unused").unwrap();
            let error = states
                .evaluate("data.google_container_cluster.p[0].name")
                .unwrap_err();
            assert!(
                matches!(
                    error.downcast_ref::<EvaluateError>(),
                    Some(EvaluateError::SparseCount { name, .. }) if name == "p"
                ),
                "{keys:?}: {error}"
            );
        }
    }

    #[test]
    fn evaluate_rejects_mixed_instance_keys() {
        for keys in [&["0", "\"blue\""][..], &["\"blue\"", "0"], &["null", "0"]] {
            let mut states = ClusterStates::default();
            states.load_str(&state_with_index_keys(keys), "unused").unwrap();
            let error = states
                .evaluate("data.google_container_cluster.p")
                .unwrap_err();
            assert_eq!(
                error.downcast_ref::<EvaluateError>(),
                Some(&EvaluateError::MixedInstanceKeys("p".to_string())),
                "{keys:?}"
            );
        }
    }

    #[test]
    fn evaluate_rejects_unknown_fields() {
        let states = cluster_states!(r#"{"name": "primary"}"#);
        let error = states
            .evaluate("data.google_container_cluster.main.not_a_field")
            .unwrap_err();
        assert!(error.to_string().contains("not_a_field"));
    }
}
