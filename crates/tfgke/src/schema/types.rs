//! terraform (cty) type expressions
//!
//! JSON encoding as used by `terraform providers schema -json`:
//! - primitives are strings: `"string"`, `"number"`, `"bool"`, `"dynamic"`
//! - collections are pairs: `["list", T]`, `["set", T]`, `["map", T]`
//! - structural types: `["object", {"key": T, ...}]`, `["tuple", [T, ...]]`
use super::NestingMode;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

static DYNAMIC: AttributeType = AttributeType::Dynamic;

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number,
    Bool,
    Dynamic,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(IndexMap<String, AttributeType>),
    Tuple(Vec<AttributeType>),
}

impl AttributeType {
    /// Element type of list, set and map types
    pub fn element(&self) -> Option<&AttributeType> {
        match self {
            AttributeType::List(element)
            | AttributeType::Set(element)
            | AttributeType::Map(element) => Some(element),
            AttributeType::Dynamic => Some(&DYNAMIC),
            _ => None,
        }
    }

    /// Type of an object attribute or map value
    pub fn attribute(&self, name: &str) -> Option<&AttributeType> {
        match self {
            AttributeType::Object(fields) => fields.get(name),
            AttributeType::Map(element) => Some(element),
            AttributeType::Dynamic => Some(&DYNAMIC),
            _ => None,
        }
    }

    /// `list(object)`, `set(object)` and `object` types can be represented as nested blocks
    pub(super) fn as_object_collection(&self) -> Option<(NestingMode, &IndexMap<String, AttributeType>)> {
        match self {
            AttributeType::Object(fields) => Some((NestingMode::Single, fields)),
            AttributeType::List(element) => match element.as_ref() {
                AttributeType::Object(fields) => Some((NestingMode::List, fields)),
                _ => None,
            },
            AttributeType::Set(element) => match element.as_ref() {
                AttributeType::Object(fields) => Some((NestingMode::Set, fields)),
                _ => None,
            },
            _ => None,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            AttributeType::String => Json::from("string"),
            AttributeType::Number => Json::from("number"),
            AttributeType::Bool => Json::from("bool"),
            AttributeType::Dynamic => Json::from("dynamic"),
            AttributeType::List(element) => Json::from(vec![Json::from("list"), element.to_json()]),
            AttributeType::Set(element) => Json::from(vec![Json::from("set"), element.to_json()]),
            AttributeType::Map(element) => Json::from(vec![Json::from("map"), element.to_json()]),
            AttributeType::Object(fields) => Json::from(vec![
                Json::from("object"),
                Json::Object(
                    fields
                        .iter()
                        .map(|(k, v)| (k.clone(), v.to_json()))
                        .collect(),
                ),
            ]),
            AttributeType::Tuple(elements) => Json::from(vec![
                Json::from("tuple"),
                Json::Array(elements.iter().map(AttributeType::to_json).collect()),
            ]),
        }
    }
}

impl TryFrom<&serde_json::Value> for AttributeType {
    type Error = String;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value as Json;

        match value {
            Json::String(primitive) => match primitive.as_str() {
                "string" => Ok(AttributeType::String),
                "number" => Ok(AttributeType::Number),
                "bool" => Ok(AttributeType::Bool),
                "dynamic" => Ok(AttributeType::Dynamic),
                other => Err(format!("unknown primitive type {other:?}")),
            },
            Json::Array(pair) if pair.len() == 2 => {
                let Some(kind) = pair[0].as_str() else {
                    return Err(format!("type kind must be a string, found {}", pair[0]));
                };
                let inner = &pair[1];

                match kind {
                    "list" => Ok(AttributeType::List(Box::new(inner.try_into()?))),
                    "set" => Ok(AttributeType::Set(Box::new(inner.try_into()?))),
                    "map" => Ok(AttributeType::Map(Box::new(inner.try_into()?))),
                    "object" => {
                        let Json::Object(fields) = inner else {
                            return Err(format!("object type expects a map of fields, found {inner}"));
                        };
                        fields
                            .iter()
                            .map(|(k, v)| Ok((k.clone(), AttributeType::try_from(v)?)))
                            .collect::<Result<_, String>>()
                            .map(AttributeType::Object)
                    }
                    "tuple" => {
                        let Json::Array(elements) = inner else {
                            return Err(format!("tuple type expects a list of types, found {inner}"));
                        };
                        elements
                            .iter()
                            .map(AttributeType::try_from)
                            .collect::<Result<_, String>>()
                            .map(AttributeType::Tuple)
                    }
                    other => Err(format!("unknown type kind {other:?}")),
                }
            }
            other => Err(format!("invalid type expression {other}")),
        }
    }
}

impl<'de> Deserialize<'de> for AttributeType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        AttributeType::try_from(&raw).map_err(serde::de::Error::custom)
    }
}

impl Serialize for AttributeType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

/// Terraform type constraint syntax, e.g. `list(object({cidr_block=string}))`
impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeType::String => f.write_str("string"),
            AttributeType::Number => f.write_str("number"),
            AttributeType::Bool => f.write_str("bool"),
            AttributeType::Dynamic => f.write_str("any"),
            AttributeType::List(element) => write!(f, "list({element})"),
            AttributeType::Set(element) => write!(f, "set({element})"),
            AttributeType::Map(element) => write!(f, "map({element})"),
            AttributeType::Object(fields) => {
                f.write_str("object({")?;
                for (index, (key, ty)) in fields.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{key}={ty}")?;
                }
                f.write_str("})")
            }
            AttributeType::Tuple(elements) => {
                f.write_str("tuple([")?;
                for (index, ty) in elements.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{ty}")?;
                }
                f.write_str("])")
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(json: &str) -> AttributeType {
        serde_json::from_str(json).expect("type must parse")
    }

    #[test]
    fn primitives_and_collections() {
        assert_eq!(parse(r#""bool""#), AttributeType::Bool);
        assert_eq!(
            parse(r#"["set", "string"]"#),
            AttributeType::Set(Box::new(AttributeType::String))
        );
        assert_eq!(
            parse(r#"["map", ["list", "number"]]"#).to_string(),
            "map(list(number))"
        );
    }

    #[test]
    fn object() {
        let ty = parse(r#"["list", ["object", {"cidr_block": "string", "display_name": "string"}]]"#);
        assert_eq!(
            ty.to_string(),
            "list(object({cidr_block=string,display_name=string}))"
        );
        assert_eq!(
            serde_json::to_value(&ty).unwrap(),
            serde_json::json!(["list", ["object", {"cidr_block": "string", "display_name": "string"}]])
        );
    }

    #[test]
    fn invalid() {
        assert!(serde_json::from_str::<AttributeType>(r#""text""#).is_err());
        assert!(serde_json::from_str::<AttributeType>(r#"["list"]"#).is_err());
        assert!(serde_json::from_str::<AttributeType>(r#"["object", "string"]"#).is_err());
    }
}
