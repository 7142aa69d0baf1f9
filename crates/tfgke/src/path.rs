//! attribute paths into a data source instance
//!
//! A path is relative to one data source instance (`data.google_container_cluster.<name>`).
//! It is the only thing handed to the resolution runtime, and it can be rendered as the terraform
//! expression referencing the same value.
//!
//! | **path**                                      | **expression**                                                           |
//! |-----------------------------------------------|--------------------------------------------------------------------------|
//! | `endpoint`                                    | `data.google_container_cluster.primary.endpoint`                         |
//! | `addons_config[0].http_load_balancing[0]`     | `data.google_container_cluster.primary.addons_config[0].http_load_balancing[0]` |
//! | `master_authorized_networks_config[0].cidr_blocks[1]` (set) | `tolist(data.google_container_cluster.primary.master_authorized_networks_config[0].cidr_blocks)[1]` |
use hcl::{Expression, Traversal, TraversalOperator};
use std::fmt::Formatter;

/// `data.<resource_type>.<name>`, the root every [AttributePath] is relative to
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_new::new)]
pub struct DataSourceAddress {
    resource_type: String,
    name: String,
}

impl DataSourceAddress {
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expression(&self) -> Expression {
        Traversal::builder(hcl::Variable::unchecked("data"))
            .attr(hcl::Identifier::sanitized(&self.resource_type))
            .attr(hcl::Identifier::sanitized(&self.name))
            .build()
            .into()
    }

    /// Terraform expression of `path` below this data source
    pub fn expression_for(&self, path: &AttributePath) -> Expression {
        path.to_expression(self.expression())
    }

    /// Interpolation token, e.g. `${data.google_container_cluster.primary.endpoint}`
    pub fn interpolation(&self, path: &AttributePath) -> String {
        format!("${{{}}}", self.expression_for(path))
    }
}

impl std::fmt::Display for DataSourceAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "data.{}.{}", self.resource_type, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Attr(String),
    Index {
        index: usize,
        /// The collection is a set and has to be converted with `tolist()` before indexing
        from_set: bool,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AttributePath {
    segments: Vec<Segment>,
}

impl AttributePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: impl Into<String>) -> Self {
        self.segments.push(Segment::Attr(name.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index {
            index,
            from_set: false,
        });
        self
    }

    pub fn set_index(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index {
            index,
            from_set: true,
        });
        self
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path without its last segment
    pub fn parent(&self) -> Option<AttributePath> {
        let (_, rest) = self.segments.split_last()?;
        Some(AttributePath {
            segments: rest.to_vec(),
        })
    }

    /// Terraform expression for this path below `root`
    ///
    /// `root` is usually the traversal `data.google_container_cluster.<name>`.
    pub fn to_expression(&self, root: Expression) -> Expression {
        let mut expr = root;
        let mut operators: Vec<TraversalOperator> = vec![];

        for segment in &self.segments {
            match segment {
                Segment::Attr(name) => {
                    operators.push(TraversalOperator::GetAttr(hcl::Identifier::sanitized(name)))
                }
                Segment::Index { index, from_set } => {
                    if *from_set {
                        // tolist(<expr so far>)[index]
                        let collection = flatten(expr, std::mem::take(&mut operators));
                        expr = hcl::expr::FuncCall::builder("tolist")
                            .arg(collection)
                            .build()
                            .into();
                    }
                    operators.push(TraversalOperator::Index(Expression::from(*index as u64)));
                }
            }
        }

        flatten(expr, operators)
    }
}

/// Merge operators into `expr`, producing a single traversal
fn flatten(expr: Expression, mut operators: Vec<TraversalOperator>) -> Expression {
    if operators.is_empty() {
        return expr;
    }

    match expr {
        Expression::Traversal(mut traversal) => {
            traversal.operators.append(&mut operators);
            Expression::Traversal(traversal)
        }
        expr => Traversal::new(expr, operators).into(),
    }
}

impl std::fmt::Display for AttributePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Attr(name) if position == 0 => f.write_str(name)?,
                Segment::Attr(name) => write!(f, ".{name}")?,
                Segment::Index { index, .. } => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum PathParseError {
    #[error("empty path segment in {0:?}")]
    EmptySegment(String),
    #[error("unterminated index in {0:?}")]
    UnterminatedIndex(String),
    #[error("invalid index {index:?} in {path:?}")]
    InvalidIndex { path: String, index: String },
}

/// Parses `a[0].b`, `a.0.b` (flatmap notation) and mixtures of both
impl std::str::FromStr for AttributePath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut path = AttributePath::root();
        if s.is_empty() {
            return Ok(path);
        }

        for part in s.split('.') {
            let (name, mut rest) = match part.find('[') {
                Some(open) => part.split_at(open),
                None => (part, ""),
            };

            if name.is_empty() && path.is_root() {
                return Err(PathParseError::EmptySegment(s.to_string()));
            }

            if !name.is_empty() {
                match name.parse::<usize>() {
                    Ok(index) => path = path.index(index),
                    Err(_) => path = path.attr(name),
                }
            } else if rest.is_empty() {
                return Err(PathParseError::EmptySegment(s.to_string()));
            }

            while let Some(stripped) = rest.strip_prefix('[') {
                let Some(close) = stripped.find(']') else {
                    return Err(PathParseError::UnterminatedIndex(s.to_string()));
                };

                let index = &stripped[..close];
                let index = index
                    .parse::<usize>()
                    .map_err(|_| PathParseError::InvalidIndex {
                        path: s.to_string(),
                        index: index.to_string(),
                    })?;
                path = path.index(index);
                rest = &stripped[close + 1..];
            }

            if !rest.is_empty() {
                return Err(PathParseError::UnterminatedIndex(s.to_string()));
            }
        }

        Ok(path)
    }
}
