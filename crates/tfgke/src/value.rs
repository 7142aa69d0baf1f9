//! value representation
//!
//! Resolved terraform state contains the following data types
//! - null (unset optional or unknown computed attribute)
//! - boolean (true/false)
//! - integer (signed, i64)
//! - decimal (f64)
//! - string (utf-8)
//! - array (lists, sets and tuples)
//! - object (order-preserving "map"/"dictionary", where the key is of type string)
//!
//! The only valid **implicit** conversion: every `integer` is also a `decimal`.
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serializer,
};

/// All possible value types
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    String(String),
    Array(Vec<Value>),
    Object(indexmap::IndexMap<String, Value>),
}

impl Value {
    /// Name of the variant, used in type mismatch errors
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "bool",
            Value::Integer(_) | Value::Decimal(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "list",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&indexmap::IndexMap<String, Value>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<K: ToString, V: Into<Value>> From<indexmap::IndexMap<K, V>> for Value {
    fn from(value: indexmap::IndexMap<K, V>) -> Self {
        Value::Object(
            value
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }
}

impl From<serde_json::Number> for Value {
    fn from(value: serde_json::Number) -> Self {
        if let Some(int) = value.as_i64() {
            return Value::Integer(int);
        }

        // u64 beyond i64::MAX and real decimals both land here
        value.as_f64().map(Value::Decimal).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Null => Value::Null,
            Json::Bool(b) => b.into(),
            Json::Number(n) => n.into(),
            Json::String(s) => s.into(),
            Json::Array(a) => a.into(),
            Json::Object(o) => Value::Object(o.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

impl From<hcl::Number> for Value {
    fn from(value: hcl::Number) -> Self {
        if let Some(int) = value.as_i64() {
            return Value::Integer(int);
        }

        value.as_f64().map(Value::Decimal).unwrap_or(Value::Null)
    }
}

impl From<hcl::Value> for Value {
    fn from(value: hcl::Value) -> Value {
        match value {
            hcl::Value::Null => Value::Null,
            hcl::Value::Bool(b) => b.into(),
            hcl::Value::Number(n) => n.into(),
            hcl::Value::String(s) => s.into(),
            hcl::Value::Array(a) => a.into(),
            hcl::Value::Object(o) => o.into(),
        }
    }
}

impl From<Value> for hcl::Value {
    fn from(value: Value) -> hcl::Value {
        match value {
            Value::Null => hcl::Value::Null,
            Value::Boolean(b) => hcl::Value::Bool(b),
            Value::Integer(i) => hcl::Value::Number(i.into()),
            Value::Decimal(d) => hcl::Number::from_f64(d)
                .map(hcl::Value::Number)
                .unwrap_or(hcl::Value::Null),
            Value::String(s) => hcl::Value::String(s),
            Value::Array(a) => hcl::Value::Array(a.into_iter().map(Into::into).collect()),
            Value::Object(o) => {
                hcl::Value::Object(o.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl serde::ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(value) => serializer.serialize_bool(*value),
            Value::Integer(value) => serializer.serialize_i64(*value),
            Value::Decimal(value) => serializer.serialize_f64(*value),
            Value::String(value) => serializer.serialize_str(value),
            Value::Array(value) => {
                let mut ser = serializer.serialize_seq(Some(value.len()))?;
                for element in value {
                    ser.serialize_element(element)?;
                }
                ser.end()
            }
            Value::Object(value) => {
                let mut ser = serializer.serialize_map(Some(value.len()))?;
                for (element_key, element_value) in value {
                    ser.serialize_entry(element_key, element_value)?;
                }
                ser.end()
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_numbers() {
        let value: Value = serde_json::json!([1, 1.5, u64::MAX]).into();
        let Value::Array(items) = value else {
            panic!("expected array");
        };

        assert_eq!(items[0], Value::Integer(1));
        assert_eq!(items[1], Value::Decimal(1.5));
        assert_eq!(items[2].kind(), "number");
    }

    #[test]
    fn json_object_keeps_order() {
        let value: Value = serde_json::json!({"zone": "a", "alpha": null}).into();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zone".to_string(), "alpha".to_string()]);
    }

    #[test]
    fn hcl_round_trip() {
        let value: Value = serde_json::json!({"enabled": true, "count": 3, "tags": ["a"]}).into();
        let hcl_value: hcl::Value = value.clone().into();
        assert_eq!(Value::from(hcl_value), value);
    }
}
