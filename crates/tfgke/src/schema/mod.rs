//! terraform provider schema
//!
//! The schema is the single source of truth for accessor names, types and nesting. It is read
//! from the JSON format printed by `terraform providers schema -json`, either the full document
//! or a single schema entry (`{"version": 0, "block": {...}}`).
//!
//! Attributes whose type is a list/set/single object are lifted into nested blocks when a schema
//! is loaded, so [crate::reference::ComplexList] only ever has to deal with [NestedBlock]s.
mod types;

pub use types::AttributeType;

use crate::naming;
use crate::path::{AttributePath, Segment};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const GOOGLE_CONTAINER_CLUSTER: &str = "google_container_cluster";

const GOOGLE_CONTAINER_CLUSTER_MANIFEST: &str = include_str!("google_container_cluster.json");

/// Embedded schema of the `google_container_cluster` data source
pub fn google_container_cluster() -> &'static Block {
    static SCHEMA: OnceLock<SchemaEntry> = OnceLock::new();
    &SCHEMA
        .get_or_init(|| {
            SchemaEntry::from_json(GOOGLE_CONTAINER_CLUSTER_MANIFEST)
                .expect("embedded google_container_cluster manifest must parse")
        })
        .block
}

/// Output of `terraform providers schema -json`
#[derive(Debug, Deserialize)]
struct ProviderSchemasDocument {
    #[serde(default)]
    provider_schemas: IndexMap<String, ProviderSchema>,
}

/// Schemas of a single provider
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProviderSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<SchemaEntry>,
    #[serde(default)]
    pub resource_schemas: IndexMap<String, SchemaEntry>,
    #[serde(default)]
    pub data_source_schemas: IndexMap<String, SchemaEntry>,
}

impl ProviderSchema {
    /// Parse either a `terraform providers schema -json` document or a single provider entry
    ///
    /// For full documents the google provider (`.../google` or `.../google-beta`) is preferred,
    /// otherwise the first provider is used.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let raw: serde_json::Value = serde_json::from_str(json)?;

        let mut schema: ProviderSchema = if raw.get("provider_schemas").is_some() {
            let document: ProviderSchemasDocument = serde_json::from_value(raw)?;
            let mut providers = document.provider_schemas;
            let key = providers
                .keys()
                .find(|key| key.ends_with("/google") || key.ends_with("/google-beta"))
                .or_else(|| providers.keys().next())
                .cloned()
                .ok_or(SchemaError::NoProvider)?;

            tracing::debug!(provider = %key, "selected provider schema");
            providers.swap_remove(&key).ok_or(SchemaError::NoProvider)?
        } else {
            serde_json::from_value(raw)?
        };

        for entry in schema
            .resource_schemas
            .values_mut()
            .chain(schema.data_source_schemas.values_mut())
            .chain(schema.provider.iter_mut())
        {
            entry.block.normalize();
        }

        Ok(schema)
    }

    pub fn data_source(&self, name: &str) -> Result<&Block, SchemaError> {
        self.data_source_schemas
            .get(name)
            .map(|entry| &entry.block)
            .ok_or_else(|| SchemaError::NoDataSource(name.to_string()))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchemaEntry {
    #[serde(default)]
    pub version: u64,
    pub block: Block,
}

impl SchemaEntry {
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let mut entry: SchemaEntry = serde_json::from_str(json)?;
        entry.block.normalize();
        Ok(entry)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Block {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Attribute>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub block_types: IndexMap<String, NestedBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub ty: AttributeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub computed: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

impl Attribute {
    /// A read-only attribute, as produced for object-typed attributes lifted into blocks
    pub fn computed(ty: AttributeType) -> Self {
        Self {
            ty,
            description: None,
            required: false,
            optional: false,
            computed: true,
            sensitive: false,
            deprecated: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NestedBlock {
    pub nesting_mode: NestingMode,
    pub block: Block,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
}

impl NestedBlock {
    /// Sets can not be indexed in terraform expressions without `tolist()`
    pub fn wraps_set(&self) -> bool {
        self.nesting_mode == NestingMode::Set
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self.nesting_mode, NestingMode::List | NestingMode::Set)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NestingMode {
    Single,
    Group,
    List,
    Set,
    Map,
}

/// A field of a [Block], looked up by name
#[derive(Debug, Clone, Copy)]
pub enum Field<'s> {
    Attribute(&'s Attribute),
    Block(&'s NestedBlock),
}

/// The schema node a path points at
#[derive(Debug, Clone, Copy)]
pub enum Node<'s> {
    Block(&'s Block),
    /// A single instance of a nested block has not been selected yet
    Nested(&'s NestedBlock),
    Type(&'s AttributeType),
}

impl Block {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.field(name).and_then(|(_, field)| match field {
            Field::Attribute(attribute) => Some(attribute),
            Field::Block(_) => None,
        })
    }

    pub fn block_type(&self, name: &str) -> Option<&NestedBlock> {
        self.field(name).and_then(|(_, field)| match field {
            Field::Block(nested) => Some(nested),
            Field::Attribute(_) => None,
        })
    }

    /// Look up a field by its schema name or its camelCase accessor name
    ///
    /// Returns the schema (snake_case) name along with the field.
    pub fn field(&self, name: &str) -> Option<(&str, Field<'_>)> {
        if let Some((key, attribute)) = self.attributes.get_key_value(name) {
            return Some((key.as_str(), Field::Attribute(attribute)));
        }
        if let Some((key, nested)) = self.block_types.get_key_value(name) {
            return Some((key.as_str(), Field::Block(nested)));
        }

        let snake = naming::snake_case(name);
        if snake == name {
            return None;
        }
        self.field(&snake)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .keys()
            .chain(self.block_types.keys())
            .map(String::as_str)
    }

    /// Resolve `path` to the schema node it points at
    pub fn walk(&self, path: &AttributePath) -> Result<Node<'_>, SchemaError> {
        let mut node = Node::Block(self);
        let mut walked = AttributePath::root();

        for segment in path.segments() {
            node = match (node, segment) {
                (Node::Block(block), Segment::Attr(name)) => match block.field(name) {
                    Some((_, Field::Attribute(attribute))) => Node::Type(&attribute.ty),
                    Some((_, Field::Block(nested))) if !nested.is_indexed() => {
                        Node::Block(&nested.block)
                    }
                    Some((_, Field::Block(nested))) => Node::Nested(nested),
                    None => {
                        return Err(SchemaError::UnknownField {
                            path: walked.to_string(),
                            name: name.clone(),
                        })
                    }
                },
                (Node::Nested(nested), Segment::Index { .. }) => Node::Block(&nested.block),
                (Node::Type(ty), Segment::Index { .. }) => match ty.element() {
                    Some(element) => Node::Type(element),
                    None => {
                        return Err(SchemaError::NotIndexable {
                            path: walked.to_string(),
                        })
                    }
                },
                (Node::Type(ty), Segment::Attr(name)) => match ty.attribute(name) {
                    Some(element) => Node::Type(element),
                    None => {
                        return Err(SchemaError::UnknownField {
                            path: walked.to_string(),
                            name: name.clone(),
                        })
                    }
                },
                (Node::Nested(_), Segment::Attr(name)) => {
                    return Err(SchemaError::IndexRequired {
                        path: walked.to_string(),
                        name: name.clone(),
                    })
                }
                (Node::Block(_), Segment::Index { .. }) => {
                    return Err(SchemaError::NotIndexable {
                        path: walked.to_string(),
                    })
                }
            };
            walked.push(segment.clone());
        }

        Ok(node)
    }

    /// `path` with schema names and set indices marked, ready to be rendered as an expression
    pub fn canonical_path(&self, path: &AttributePath) -> Result<AttributePath, SchemaError> {
        self.walk(path)?;

        let mut canonical = AttributePath::root();
        let mut current = Some(self);
        let mut in_set = false;

        for segment in path.segments() {
            match segment {
                Segment::Attr(name) => {
                    let field = current.and_then(|block| block.field(name));
                    match field {
                        Some((schema_name, Field::Block(nested))) => {
                            canonical.push(Segment::Attr(schema_name.to_string()));
                            in_set = nested.wraps_set();
                            current = Some(&nested.block);
                        }
                        Some((schema_name, Field::Attribute(attribute))) => {
                            canonical.push(Segment::Attr(schema_name.to_string()));
                            in_set = matches!(attribute.ty, AttributeType::Set(_));
                            current = None;
                        }
                        None => {
                            canonical.push(segment.clone());
                            in_set = false;
                        }
                    }
                }
                Segment::Index { index, .. } => {
                    canonical.push(Segment::Index {
                        index: *index,
                        from_set: in_set,
                    });
                    in_set = false;
                }
            }
        }

        Ok(canonical)
    }

    /// Lift object typed attributes into nested blocks (recursively)
    fn normalize(&mut self) {
        let lifted: Vec<String> = self
            .attributes
            .iter()
            .filter(|(_, attribute)| attribute.ty.as_object_collection().is_some())
            .map(|(name, _)| name.clone())
            .collect();

        for name in lifted {
            let Some(attribute) = self.attributes.shift_remove(&name) else {
                continue;
            };
            let Some((nesting_mode, fields)) = attribute.ty.as_object_collection() else {
                continue;
            };

            let block = Block {
                attributes: fields
                    .iter()
                    .map(|(k, ty)| (k.clone(), Attribute::computed(ty.clone())))
                    .collect(),
                block_types: Default::default(),
                description: attribute.description.clone(),
                deprecated: attribute.deprecated,
            };

            tracing::trace!(%name, ?nesting_mode, "lifted object attribute into block");
            self.block_types.insert(
                name,
                NestedBlock {
                    nesting_mode,
                    block,
                    min_items: None,
                    max_items: None,
                },
            );
        }

        for nested in self.block_types.values_mut() {
            nested.block.normalize();
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    #[error("unable to parse schema")]
    Parse(#[from] serde_json::Error),
    #[error("schema document contains no provider")]
    NoProvider,
    #[error("no data source named {0:?} in schema")]
    NoDataSource(String),
    #[error("unknown field {name:?} at {path:?}")]
    UnknownField { path: String, name: String },
    #[error("{name:?} at {path:?} is declared as {declared}, not {expected}")]
    TypeMismatch {
        path: String,
        name: String,
        expected: &'static str,
        declared: String,
    },
    #[error("{name:?} at {path:?} is a repeated block and must be indexed")]
    IndexRequired { path: String, name: String },
    #[error("{path:?} can not be indexed")]
    NotIndexable { path: String },
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn embedded_manifest_parses() {
        let schema = google_container_cluster();
        assert!(schema.attribute("name").unwrap().required);
        assert!(schema.attribute("location").unwrap().optional);
        assert!(schema.attribute("project").unwrap().optional);
        assert!(schema.attribute("id").unwrap().optional);
        assert!(schema.block_type("addons_config").is_some());
    }

    #[test]
    fn only_name_is_required() {
        let schema = google_container_cluster();
        let required: Vec<_> = schema
            .attributes
            .iter()
            .filter(|(_, attribute)| attribute.required)
            .map(|(name, _)| name.as_str())
            .collect();
        assert_eq!(required, vec!["name"]);
    }

    fn check_names(block: &Block, path: &str) {
        for name in block.field_names() {
            assert_eq!(
                naming::snake_case(&naming::camel_case(name)),
                name,
                "{path}.{name} does not survive the camelCase round trip"
            );
        }
        for (name, nested) in &block.block_types {
            check_names(&nested.block, &format!("{path}.{name}"));
        }
    }

    #[test]
    fn manifest_names_round_trip() {
        check_names(google_container_cluster(), "google_container_cluster");
    }

    #[test]
    fn field_accepts_camel_case() {
        let schema = google_container_cluster();
        let (name, field) = schema.field("masterAuthorizedNetworksConfig").unwrap();
        assert_eq!(name, "master_authorized_networks_config");
        assert!(matches!(field, Field::Block(_)));
    }

    #[test]
    fn walk() {
        let schema = google_container_cluster();

        let path = "addons_config[0].http_load_balancing[0].disabled".parse().unwrap();
        let Node::Type(ty) = schema.walk(&path).unwrap() else {
            panic!("expected type");
        };
        assert_eq!(ty, &AttributeType::Bool);

        let path = "node_pool[0].node_config".parse().unwrap();
        assert!(matches!(schema.walk(&path).unwrap(), Node::Nested(_)));

        let path = "node_pool.node_config".parse().unwrap();
        assert!(matches!(
            schema.walk(&path),
            Err(SchemaError::IndexRequired { .. })
        ));

        let path = "addons_config[0].not_a_field".parse().unwrap();
        assert!(matches!(
            schema.walk(&path),
            Err(SchemaError::UnknownField { .. })
        ));
    }

    #[test]
    fn canonical_path() {
        let schema = google_container_cluster();
        let path = "masterAuthorizedNetworksConfig[0].cidrBlocks[1].cidrBlock"
            .parse()
            .unwrap();

        assert_eq!(
            schema.canonical_path(&path).unwrap(),
            AttributePath::root()
                .attr("master_authorized_networks_config")
                .index(0)
                .attr("cidr_blocks")
                .set_index(1)
                .attr("cidr_block")
        );

        let path = "nodeLocations[0]".parse().unwrap();
        assert_eq!(
            schema.canonical_path(&path).unwrap(),
            AttributePath::root().attr("node_locations").set_index(0)
        );

        let path = "resource_labels.someLabel".parse().unwrap();
        assert_eq!(
            schema.canonical_path(&path).unwrap().to_string(),
            "resource_labels.someLabel"
        );
    }

    #[test]
    fn sets_are_marked() {
        let schema = google_container_cluster();
        let networks = schema
            .block_type("master_authorized_networks_config")
            .unwrap();
        assert!(networks.block.block_type("cidr_blocks").unwrap().wraps_set());
        assert!(!networks.wraps_set());
    }

    #[test]
    fn object_attributes_are_lifted() {
        let schema = SchemaEntry::from_json(
            r#"{
                "version": 0,
                "block": {
                    "attributes": {
                        "name": {"type": "string", "required": true},
                        "cidr_blocks": {
                            "type": ["set", ["object", {"cidr_block": "string", "display_name": "string"}]],
                            "computed": true
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        assert!(schema.block.attribute("cidr_blocks").is_none());
        let nested = schema.block.block_type("cidr_blocks").unwrap();
        assert_eq!(nested.nesting_mode, NestingMode::Set);
        assert_eq!(
            nested.block.attribute("display_name").unwrap().ty,
            AttributeType::String
        );
    }

    #[test]
    fn provider_schemas_document() {
        let schema = ProviderSchema::from_json(
            r#"{
                "format_version": "1.0",
                "provider_schemas": {
                    "registry.terraform.io/hashicorp/random": {},
                    "registry.terraform.io/hashicorp/google": {
                        "data_source_schemas": {
                            "google_container_cluster": {
                                "version": 0,
                                "block": {"attributes": {"name": {"type": "string", "required": true}}}
                            }
                        }
                    }
                }
            }"#,
        )
        .unwrap();

        let block = schema.data_source(GOOGLE_CONTAINER_CLUSTER).unwrap();
        assert!(block.attribute("name").unwrap().required);
        assert!(matches!(
            schema.data_source("google_compute_network"),
            Err(SchemaError::NoDataSource(_))
        ));
    }
}
