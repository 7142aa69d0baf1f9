//! attribute resolution
//!
//! [Resolve] is the seam between the typed references and wherever resolved values live. The
//! references never look at values themselves, they build an [AttributePath] and ask.
use crate::naming;
use crate::path::{AttributePath, Segment};
use crate::value::Value;

/// Turns a path into a concrete value
pub trait Resolve {
    fn resolve(&self, path: &AttributePath) -> Result<Value, ResolveError>;
}

impl<R: Resolve + ?Sized> Resolve for &R {
    fn resolve(&self, path: &AttributePath) -> Result<Value, ResolveError> {
        (**self).resolve(path)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ResolveError {
    #[error("no attribute {name:?} at {path:?}")]
    MissingAttribute { path: String, name: String },
    #[error("index {index} out of range at {path:?} (length {len})")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
    #[error("{path:?} is a {found}, not an object")]
    NotAnObject { path: String, found: &'static str },
    #[error("{path:?} is a {found}, not a list")]
    NotAList { path: String, found: &'static str },
    #[error("{path:?} is a {found}, expected {expected}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("{path:?} is null")]
    Null { path: String },
    #[error("no data source instance named {0:?}")]
    UnknownInstance(String),
    #[error("{0} data source instances loaded, one must be selected by name")]
    AmbiguousInstance(usize),
}

/// Resolves paths over the attribute object of a single data source instance
///
/// Object keys are matched by schema name (`addons_config`) first and by accessor name
/// (`addonsConfig`) second, so both terraform state and CDK shaped values can be used.
#[derive(Debug, Clone, derive_new::new)]
pub struct StateResolver {
    attributes: Value,
}

impl StateResolver {
    pub fn attributes(&self) -> &Value {
        &self.attributes
    }
}

impl From<serde_json::Value> for StateResolver {
    fn from(value: serde_json::Value) -> Self {
        Self::new(value.into())
    }
}

impl Resolve for StateResolver {
    #[tracing::instrument(level = "trace", skip_all, fields(path = %path))]
    fn resolve(&self, path: &AttributePath) -> Result<Value, ResolveError> {
        let mut current = &self.attributes;
        let mut walked = AttributePath::root();

        for segment in path.segments() {
            current = match segment {
                Segment::Attr(name) => {
                    let Value::Object(object) = current else {
                        return Err(ResolveError::NotAnObject {
                            path: walked.to_string(),
                            found: current.kind(),
                        });
                    };

                    object
                        .get(name)
                        .or_else(|| object.get(&naming::camel_case(name)))
                        .ok_or_else(|| ResolveError::MissingAttribute {
                            path: walked.to_string(),
                            name: name.clone(),
                        })?
                }
                Segment::Index { index, .. } => {
                    let Value::Array(array) = current else {
                        return Err(ResolveError::NotAList {
                            path: walked.to_string(),
                            found: current.kind(),
                        });
                    };

                    array
                        .get(*index)
                        .ok_or_else(|| ResolveError::IndexOutOfRange {
                            path: walked.to_string(),
                            index: *index,
                            len: array.len(),
                        })?
                }
            };
            walked.push(segment.clone());
        }

        tracing::trace!(kind = current.kind(), "resolved");
        Ok(current.clone())
    }
}
