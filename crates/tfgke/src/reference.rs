//! generic output references
//!
//! One [OutputReference] + [ComplexList] pair serves every block of the schema. A reference is
//! "a block instance at a path"; each getter looks the field up in the block schema, appends it
//! to the path and asks the [Resolve]r. Nothing is cached, defaulted or recovered.
use crate::path::{AttributePath, DataSourceAddress};
use crate::resolve::{Resolve, ResolveError};
use crate::schema::{AttributeType, Block, Field, NestedBlock, NestingMode, SchemaError};
use crate::value::Value;
use indexmap::IndexMap;
use std::marker::PhantomData;

#[derive(thiserror::Error, Debug)]
pub enum ReferenceError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Declared type a getter expects
#[derive(Debug, Clone, Copy, PartialEq)]
enum Expected {
    String,
    Bool,
    Number,
    StringList,
    NumberList,
    BoolList,
    StringMap,
    NumberMap,
    BoolMap,
}

impl Expected {
    fn name(self) -> &'static str {
        match self {
            Expected::String => "string",
            Expected::Bool => "bool",
            Expected::Number => "number",
            Expected::StringList => "list(string)",
            Expected::NumberList => "list(number)",
            Expected::BoolList => "list(bool)",
            Expected::StringMap => "map(string)",
            Expected::NumberMap => "map(number)",
            Expected::BoolMap => "map(bool)",
        }
    }

    fn accepts(self, ty: &AttributeType) -> bool {
        use AttributeType as T;

        let element = |inner: &AttributeType| match (self, inner) {
            (_, T::Dynamic) => true,
            (Expected::StringList | Expected::StringMap, T::String) => true,
            (Expected::NumberList | Expected::NumberMap, T::Number) => true,
            (Expected::BoolList | Expected::BoolMap, T::Bool) => true,
            _ => false,
        };

        match (self, ty) {
            (_, T::Dynamic) => true,
            (Expected::String, T::String) => true,
            (Expected::Bool, T::Bool) => true,
            (Expected::Number, T::Number) => true,
            (Expected::StringList | Expected::NumberList | Expected::BoolList, T::List(inner))
            | (Expected::StringList | Expected::NumberList | Expected::BoolList, T::Set(inner)) => {
                element(inner)
            }
            (Expected::StringMap | Expected::NumberMap | Expected::BoolMap, T::Map(inner)) => {
                element(inner)
            }
            _ => false,
        }
    }
}

/// One resolved instance of a schema block
#[derive(Clone)]
pub struct OutputReference<'a> {
    resolver: &'a dyn Resolve,
    address: &'a DataSourceAddress,
    block: &'a Block,
    path: AttributePath,
}

impl std::fmt::Debug for OutputReference<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputReference")
            .field("address", &self.address)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl<'a> OutputReference<'a> {
    /// Reference to the data source itself
    pub fn root(
        resolver: &'a dyn Resolve,
        address: &'a DataSourceAddress,
        block: &'a Block,
    ) -> Self {
        Self {
            resolver,
            address,
            block,
            path: AttributePath::root(),
        }
    }

    pub fn path(&self) -> &AttributePath {
        &self.path
    }

    pub fn block(&self) -> &'a Block {
        self.block
    }

    pub fn address(&self) -> &'a DataSourceAddress {
        self.address
    }

    /// Token referencing this block instance in terraform configuration
    pub fn interpolation(&self) -> String {
        self.address.interpolation(&self.path)
    }

    /// Token referencing the field `name` of this block instance
    pub fn interpolation_for_attribute(&self, name: &str) -> Result<String, SchemaError> {
        let (name, _) = self.lookup(name)?;
        Ok(self.address.interpolation(&self.path.clone().attr(name)))
    }

    fn lookup(&self, name: &str) -> Result<(&'a str, Field<'a>), SchemaError> {
        self.block
            .field(name)
            .ok_or_else(|| SchemaError::UnknownField {
                path: self.path.to_string(),
                name: name.to_string(),
            })
    }

    fn attribute_path(&self, name: &str, expected: Expected) -> Result<AttributePath, SchemaError> {
        let (schema_name, field) = self.lookup(name)?;
        let Field::Attribute(attribute) = field else {
            return Err(SchemaError::TypeMismatch {
                path: self.path.to_string(),
                name: schema_name.to_string(),
                expected: expected.name(),
                declared: "block".to_string(),
            });
        };

        if !expected.accepts(&attribute.ty) {
            return Err(SchemaError::TypeMismatch {
                path: self.path.to_string(),
                name: schema_name.to_string(),
                expected: expected.name(),
                declared: attribute.ty.to_string(),
            });
        }

        Ok(self.path.clone().attr(schema_name))
    }

    fn resolve_non_null(&self, path: &AttributePath) -> Result<Value, ResolveError> {
        match self.resolver.resolve(path)? {
            Value::Null => Err(ResolveError::Null {
                path: path.to_string(),
            }),
            value => Ok(value),
        }
    }

    fn typed<T>(
        &self,
        name: &str,
        expected: Expected,
        cast: impl Fn(&Value) -> Option<T>,
    ) -> Result<T, ReferenceError> {
        let path = self.attribute_path(name, expected)?;
        let value = self.resolve_non_null(&path)?;
        cast(&value).ok_or_else(|| {
            ResolveError::TypeMismatch {
                path: path.to_string(),
                expected: expected.name(),
                found: value.kind(),
            }
            .into()
        })
    }

    fn typed_list<T>(
        &self,
        name: &str,
        expected: Expected,
        cast: impl Fn(&Value) -> Option<T>,
    ) -> Result<Vec<T>, ReferenceError> {
        self.typed(name, expected, |value| {
            value.as_array()?.iter().map(&cast).collect()
        })
    }

    fn typed_map<T>(
        &self,
        name: &str,
        expected: Expected,
        cast: impl Fn(&Value) -> Option<T>,
    ) -> Result<IndexMap<String, T>, ReferenceError> {
        self.typed(name, expected, |value| {
            value
                .as_object()?
                .iter()
                .map(|(k, v)| Some((k.clone(), cast(v)?)))
                .collect()
        })
    }

    pub fn string(&self, name: &str) -> Result<String, ReferenceError> {
        self.typed(name, Expected::String, |v| v.as_str().map(str::to_string))
    }

    pub fn boolean(&self, name: &str) -> Result<bool, ReferenceError> {
        self.typed(name, Expected::Bool, Value::as_bool)
    }

    pub fn number(&self, name: &str) -> Result<f64, ReferenceError> {
        self.typed(name, Expected::Number, Value::as_f64)
    }

    pub fn string_list(&self, name: &str) -> Result<Vec<String>, ReferenceError> {
        self.typed_list(name, Expected::StringList, |v| {
            v.as_str().map(str::to_string)
        })
    }

    pub fn number_list(&self, name: &str) -> Result<Vec<f64>, ReferenceError> {
        self.typed_list(name, Expected::NumberList, Value::as_f64)
    }

    pub fn boolean_list(&self, name: &str) -> Result<Vec<bool>, ReferenceError> {
        self.typed_list(name, Expected::BoolList, Value::as_bool)
    }

    pub fn string_map(&self, name: &str) -> Result<IndexMap<String, String>, ReferenceError> {
        self.typed_map(name, Expected::StringMap, |v| v.as_str().map(str::to_string))
    }

    pub fn number_map(&self, name: &str) -> Result<IndexMap<String, f64>, ReferenceError> {
        self.typed_map(name, Expected::NumberMap, Value::as_f64)
    }

    pub fn boolean_map(&self, name: &str) -> Result<IndexMap<String, bool>, ReferenceError> {
        self.typed_map(name, Expected::BoolMap, Value::as_bool)
    }

    /// Untyped value of any field, nested blocks included. `null` is returned as is.
    pub fn value(&self, name: &str) -> Result<Value, ReferenceError> {
        let (schema_name, _) = self.lookup(name)?;
        Ok(self.resolver.resolve(&self.path.clone().attr(schema_name))?)
    }

    /// The whole block instance
    pub fn resolve(&self) -> Result<Value, ResolveError> {
        self.resolver.resolve(&self.path)
    }

    /// Repeated nested block `name`
    pub fn list(&self, name: &str) -> Result<ComplexList<'a>, SchemaError> {
        let (schema_name, field) = self.lookup(name)?;
        match field {
            Field::Block(nested) if nested.is_indexed() => Ok(ComplexList {
                parent: self.clone(),
                attribute: schema_name,
                nested,
            }),
            Field::Block(nested) => Err(SchemaError::TypeMismatch {
                path: self.path.to_string(),
                name: schema_name.to_string(),
                expected: "list of blocks",
                declared: format!("{:?} block", nested.nesting_mode).to_lowercase(),
            }),
            Field::Attribute(attribute) => Err(SchemaError::TypeMismatch {
                path: self.path.to_string(),
                name: schema_name.to_string(),
                expected: "list of blocks",
                declared: attribute.ty.to_string(),
            }),
        }
    }

    /// Single nested block `name`
    pub fn object(&self, name: &str) -> Result<OutputReference<'a>, SchemaError> {
        let (schema_name, field) = self.lookup(name)?;
        match field {
            Field::Block(nested)
                if matches!(nested.nesting_mode, NestingMode::Single | NestingMode::Group) =>
            {
                Ok(self.child(&nested.block, self.path.clone().attr(schema_name)))
            }
            _ => Err(SchemaError::TypeMismatch {
                path: self.path.to_string(),
                name: schema_name.to_string(),
                expected: "single block",
                declared: match field {
                    Field::Attribute(attribute) => attribute.ty.to_string(),
                    Field::Block(nested) => format!("{:?} block", nested.nesting_mode).to_lowercase(),
                },
            }),
        }
    }

    fn child(&self, block: &'a Block, path: AttributePath) -> OutputReference<'a> {
        OutputReference {
            resolver: self.resolver,
            address: self.address,
            block,
            path,
        }
    }
}

/// Index based access to the instances of a repeated nested block
#[derive(Clone, Debug)]
pub struct ComplexList<'a> {
    parent: OutputReference<'a>,
    attribute: &'a str,
    nested: &'a NestedBlock,
}

impl<'a> ComplexList<'a> {
    /// Whether the list wraps a set (indexing needs `tolist()` in expressions)
    pub fn wraps_set(&self) -> bool {
        self.nested.wraps_set()
    }

    pub fn block(&self) -> &'a Block {
        &self.nested.block
    }

    pub fn path(&self) -> AttributePath {
        self.parent.path.clone().attr(self.attribute)
    }

    pub fn interpolation(&self) -> String {
        self.parent.address.interpolation(&self.path())
    }

    fn element_path(&self, index: usize) -> AttributePath {
        if self.wraps_set() {
            self.path().set_index(index)
        } else {
            self.path().index(index)
        }
    }

    /// Instance at `index`
    ///
    /// The resolver decides whether the instance exists; an index past the end fails with
    /// [ResolveError::IndexOutOfRange].
    pub fn get(&self, index: usize) -> Result<OutputReference<'a>, ResolveError> {
        let path = self.element_path(index);
        self.parent.resolve_non_null(&path)?;
        Ok(self.parent.child(&self.nested.block, path))
    }

    pub fn len(&self) -> Result<usize, ResolveError> {
        let path = self.path();
        match self.parent.resolve_non_null(&path)? {
            Value::Array(items) => Ok(items.len()),
            other => Err(ResolveError::NotAList {
                path: path.to_string(),
                found: other.kind(),
            }),
        }
    }

    pub fn is_empty(&self) -> Result<bool, ResolveError> {
        self.len().map(|len| len == 0)
    }

    pub fn iter(&self) -> Result<impl Iterator<Item = OutputReference<'a>> + '_, ResolveError> {
        let len = self.len()?;
        Ok((0..len).map(|index| {
            self.parent
                .child(&self.nested.block, self.element_path(index))
        }))
    }
}

/// [ComplexList] whose instances are converted into a typed facade
#[derive(Clone, Debug)]
pub struct TypedList<'a, T> {
    list: ComplexList<'a>,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: From<OutputReference<'a>>> TypedList<'a, T> {
    pub fn new(list: ComplexList<'a>) -> Self {
        Self {
            list,
            _marker: PhantomData,
        }
    }

    pub fn get(&self, index: usize) -> Result<T, ResolveError> {
        self.list.get(index).map(T::from)
    }

    pub fn len(&self) -> Result<usize, ResolveError> {
        self.list.len()
    }

    pub fn is_empty(&self) -> Result<bool, ResolveError> {
        self.list.is_empty()
    }

    pub fn iter(&self) -> Result<std::vec::IntoIter<T>, ResolveError> {
        let items: Vec<T> = self.list.iter()?.map(T::from).collect();
        Ok(items.into_iter())
    }

    pub fn interpolation(&self) -> String {
        self.list.interpolation()
    }

    pub fn untyped(&self) -> &ComplexList<'a> {
        &self.list
    }
}

/// Schema conformance of a typed facade accessor, used by [output_reference!]
#[doc(hidden)]
pub fn field_issue(block: &Block, name: &str, kind: &str) -> Option<String> {
    let expected = match kind {
        "string" => Some(Expected::String),
        "boolean" => Some(Expected::Bool),
        "number" => Some(Expected::Number),
        "string_list" => Some(Expected::StringList),
        "number_list" => Some(Expected::NumberList),
        "string_map" => Some(Expected::StringMap),
        "boolean_map" => Some(Expected::BoolMap),
        "number_map" => Some(Expected::NumberMap),
        "list" => None,
        _ => return Some(format!("{name}: unknown accessor kind {kind}")),
    };

    let Some((schema_name, field)) = block.field(name) else {
        return Some(format!("{name}: not in schema"));
    };
    if schema_name != name {
        return Some(format!("{name}: schema name is {schema_name}"));
    }

    match (field, expected) {
        (Field::Attribute(attribute), Some(expected)) if expected.accepts(&attribute.ty) => None,
        (Field::Block(nested), None) if nested.is_indexed() => None,
        (Field::Attribute(attribute), _) => {
            Some(format!("{name}: declared as {}, accessor is {kind}", attribute.ty))
        }
        (Field::Block(_), _) => Some(format!("{name}: declared as block, accessor is {kind}")),
    }
}

/// Declare a typed facade over an [OutputReference]
///
/// Each line declares one accessor: `<kind> <field> [: <Facade>] [= "<schema name>"];`.
/// The schema name defaults to the field name. Kinds map to the getters of [OutputReference]
/// (`string`, `boolean`, `number`, `string_list`, `number_list`, `string_map`, `boolean_map`,
/// `number_map`); `list` returns a [TypedList] of the given facade.
///
/// ```
/// tfgke::output_reference! {
///     /// `release_channel`
///     pub struct ReleaseChannel {
///         string channel;
///     }
/// }
/// ```
#[macro_export]
macro_rules! output_reference {
    (@name $field:ident = $attr:literal) => { $attr };
    (@name $field:ident) => { stringify!($field) };

    (@getter string $field:ident $(= $attr:literal)?) => {
        pub fn $field(&self) -> Result<String, $crate::reference::ReferenceError> {
            self.0.string($crate::output_reference!(@name $field $(= $attr)?))
        }
    };
    (@getter boolean $field:ident $(= $attr:literal)?) => {
        pub fn $field(&self) -> Result<bool, $crate::reference::ReferenceError> {
            self.0.boolean($crate::output_reference!(@name $field $(= $attr)?))
        }
    };
    (@getter number $field:ident $(= $attr:literal)?) => {
        pub fn $field(&self) -> Result<f64, $crate::reference::ReferenceError> {
            self.0.number($crate::output_reference!(@name $field $(= $attr)?))
        }
    };
    (@getter string_list $field:ident $(= $attr:literal)?) => {
        pub fn $field(&self) -> Result<Vec<String>, $crate::reference::ReferenceError> {
            self.0.string_list($crate::output_reference!(@name $field $(= $attr)?))
        }
    };
    (@getter number_list $field:ident $(= $attr:literal)?) => {
        pub fn $field(&self) -> Result<Vec<f64>, $crate::reference::ReferenceError> {
            self.0.number_list($crate::output_reference!(@name $field $(= $attr)?))
        }
    };
    (@getter string_map $field:ident $(= $attr:literal)?) => {
        pub fn $field(
            &self,
        ) -> Result<$crate::indexmap::IndexMap<String, String>, $crate::reference::ReferenceError> {
            self.0.string_map($crate::output_reference!(@name $field $(= $attr)?))
        }
    };
    (@getter boolean_map $field:ident $(= $attr:literal)?) => {
        pub fn $field(
            &self,
        ) -> Result<$crate::indexmap::IndexMap<String, bool>, $crate::reference::ReferenceError> {
            self.0.boolean_map($crate::output_reference!(@name $field $(= $attr)?))
        }
    };
    (@getter number_map $field:ident $(= $attr:literal)?) => {
        pub fn $field(
            &self,
        ) -> Result<$crate::indexmap::IndexMap<String, f64>, $crate::reference::ReferenceError> {
            self.0.number_map($crate::output_reference!(@name $field $(= $attr)?))
        }
    };
    (@getter list $field:ident : $child:ident $(= $attr:literal)?) => {
        pub fn $field(
            &self,
        ) -> Result<$crate::reference::TypedList<'a, $child<'a>>, $crate::schema::SchemaError> {
            self.0
                .list($crate::output_reference!(@name $field $(= $attr)?))
                .map($crate::reference::TypedList::new)
        }
    };

    (@check $issues:ident $block:ident $kind:ident $field:ident $(: $child:ident)? $(= $attr:literal)?) => {
        let name = $crate::output_reference!(@name $field $(= $attr)?);
        if let Some(issue) = $crate::reference::field_issue($block, name, stringify!($kind)) {
            $issues.push(issue);
        }
        $(
            if let Some(nested) = $block.block_type(name) {
                $issues.extend(
                    $child::schema_issues(&nested.block)
                        .into_iter()
                        .map(|issue| format!("{}.{}", name, issue)),
                );
            }
        )?
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $kind:ident $field:ident $(: $child:ident)? $(= $attr:literal)? ; )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name<'a>($crate::reference::OutputReference<'a>);

        impl<'a> From<$crate::reference::OutputReference<'a>> for $name<'a> {
            fn from(reference: $crate::reference::OutputReference<'a>) -> Self {
                Self(reference)
            }
        }

        impl<'a> $name<'a> {
            /// Untyped reference, for fields without a typed accessor
            pub fn reference(&self) -> &$crate::reference::OutputReference<'a> {
                &self.0
            }

            pub fn interpolation(&self) -> String {
                self.0.interpolation()
            }

            /// Accessors of this facade that do not match `block`
            pub fn schema_issues(block: &$crate::schema::Block) -> Vec<String> {
                let mut issues: Vec<String> = vec![];
                $( $crate::output_reference!(@check issues block $kind $field $(: $child)? $(= $attr)?); )*
                issues
            }

            $( $crate::output_reference!(@getter $kind $field $(: $child)? $(= $attr)?); )*
        }
    };
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::resolve::StateResolver;
    use crate::schema::{self, GOOGLE_CONTAINER_CLUSTER};
    use pretty_assertions::assert_eq;

    fn address() -> DataSourceAddress {
        DataSourceAddress::new(GOOGLE_CONTAINER_CLUSTER.into(), "primary".into())
    }

    fn state() -> StateResolver {
        serde_json::json!({
            "name": "primary",
            "initial_node_count": 3,
            "node_locations": ["europe-west1-b", "europe-west1-c"],
            "resource_labels": {"env": "prod"},
            "description": null,
            "master_authorized_networks_config": [{
                "gcp_public_cidrs_access_enabled": false,
                "cidr_blocks": [
                    {"cidr_block": "10.0.0.0/8", "display_name": "internal"},
                    {"cidr_block": "192.168.0.0/16", "display_name": "office"}
                ]
            }],
            "node_pool": [
                {"name": "default-pool", "node_count": 1},
                {"name": "highmem", "node_count": 2}
            ]
        })
        .into()
    }

    #[test]
    fn scalar_getters() {
        let (state, address) = (state(), address());
        let root = OutputReference::root(&state, &address, schema::google_container_cluster());

        assert_eq!(root.string("name").unwrap(), "primary");
        assert_eq!(root.number("initialNodeCount").unwrap(), 3.0);
        assert_eq!(
            root.string_list("node_locations").unwrap(),
            vec!["europe-west1-b", "europe-west1-c"]
        );
        assert_eq!(root.string_map("resource_labels").unwrap()["env"], "prod");
    }

    #[test]
    fn schema_checked_before_resolving() {
        let (state, address) = (state(), address());
        let root = OutputReference::root(&state, &address, schema::google_container_cluster());

        assert!(matches!(
            root.string("no_such_field"),
            Err(ReferenceError::Schema(SchemaError::UnknownField { .. }))
        ));
        assert!(matches!(
            root.boolean("name"),
            Err(ReferenceError::Schema(SchemaError::TypeMismatch { .. }))
        ));
        assert!(matches!(
            root.string("node_pool"),
            Err(ReferenceError::Schema(SchemaError::TypeMismatch { .. }))
        ));
        assert!(root.list("name").is_err());
    }

    #[test]
    fn failures_come_from_the_resolver() {
        let (state, address) = (state(), address());
        let root = OutputReference::root(&state, &address, schema::google_container_cluster());

        assert!(matches!(
            root.string("description"),
            Err(ReferenceError::Resolve(ResolveError::Null { .. }))
        ));
        assert!(matches!(
            root.string("endpoint"),
            Err(ReferenceError::Resolve(ResolveError::MissingAttribute { .. }))
        ));
        assert_eq!(root.value("description").unwrap(), Value::Null);
    }

    #[test]
    fn list_get_binds_index() {
        let (state, address) = (state(), address());
        let root = OutputReference::root(&state, &address, schema::google_container_cluster());
        let pools = root.list("node_pool").unwrap();

        assert_eq!(pools.len().unwrap(), 2);
        let second = pools.get(1).unwrap();
        assert_eq!(second.path().to_string(), "node_pool[1]");
        assert_eq!(second.string("name").unwrap(), "highmem");
        assert_eq!(pools.get(0).unwrap().string("name").unwrap(), "default-pool");

        assert!(matches!(
            pools.get(2),
            Err(ResolveError::IndexOutOfRange { index: 2, len: 2, .. })
        ));

        let names: Vec<_> = pools
            .iter()
            .unwrap()
            .map(|pool| pool.string("name").unwrap())
            .collect();
        assert_eq!(names, vec!["default-pool", "highmem"]);
    }

    #[test]
    fn set_interpolation_uses_tolist() {
        let (state, address) = (state(), address());
        let root = OutputReference::root(&state, &address, schema::google_container_cluster());
        let cidr_blocks = root
            .list("master_authorized_networks_config")
            .unwrap()
            .get(0)
            .unwrap()
            .list("cidr_blocks")
            .unwrap();

        assert!(cidr_blocks.wraps_set());
        let office = cidr_blocks.get(1).unwrap();
        assert_eq!(office.string("display_name").unwrap(), "office");
        assert_eq!(
            office.interpolation_for_attribute("cidrBlock").unwrap(),
            "${tolist(data.google_container_cluster.primary.master_authorized_networks_config[0].cidr_blocks)[1].cidr_block}"
        );
    }
}
