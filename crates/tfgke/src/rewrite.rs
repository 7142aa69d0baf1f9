use crate::schema::{Block, Field, SchemaError};
use crate::visit;
use hcl::{Expression, Identifier, Traversal, TraversalOperator};

/// Rewrites references to `data.<resource_type>.<name>.*` onto schema names
///
/// `data.google_container_cluster.primary.addonsConfig[0]` becomes
/// `data.google_container_cluster.primary.addons_config[0]`. Names the schema does not know are
/// collected instead of rewritten; other traversals are left alone.
#[derive(derive_new::new)]
pub(crate) struct ReferenceNormalizer<'s> {
    resource_type: &'s str,
    schema: &'s Block,
    #[new(default)]
    issues: Vec<SchemaError>,
}

impl<'s> ReferenceNormalizer<'s> {
    pub fn into_issues(self) -> Vec<SchemaError> {
        self.issues
    }
}

/// Where a traversal currently points into the schema
#[derive(Clone, Copy)]
enum Position<'s> {
    Block(&'s Block),
    Repeated(&'s Block),
    Value,
}

impl<'s> ReferenceNormalizer<'s> {
    /// Instance name and the number of operators up to and including the instance selector
    ///
    /// `None` unless `traversal` starts with `data.<resource_type>.<name>`.
    fn reference_root(&self, traversal: &Traversal) -> Option<(String, usize)> {
        let Expression::Variable(var) = &traversal.expr else {
            return None;
        };
        if var.as_str() != "data" {
            return None;
        }

        let mut operators = traversal.operators.iter();
        match operators.next() {
            Some(TraversalOperator::GetAttr(ty)) if ty.as_str() == self.resource_type => {}
            _ => return None,
        }
        let Some(TraversalOperator::GetAttr(instance)) = operators.next() else {
            return None;
        };

        // count/for_each instance selector
        let skip = match operators.next() {
            Some(TraversalOperator::Index(_) | TraversalOperator::LegacyIndex(_)) => 3,
            _ => 2,
        };
        Some((instance.to_string(), skip))
    }

    /// Schema position of the set or list a `tolist(<reference>)` call converts
    fn tolist_argument(&self, expr: &Expression) -> Option<(Position<'s>, String)> {
        let Expression::FuncCall(call) = expr else {
            return None;
        };
        if call.name.as_str() != "tolist" || call.args.len() != 1 {
            return None;
        }
        let Expression::Traversal(argument) = &call.args[0] else {
            return None;
        };

        // the argument is a traversal of its own and gets rewritten and reported on its own visit
        let mut argument = (**argument).clone();
        let (walked, skip) = self.reference_root(&argument)?;
        walk(
            Position::Block(self.schema),
            walked,
            argument.operators.iter_mut().skip(skip),
            &mut Vec::new(),
        )
    }
}

impl<'s> visit::VisitMut<Traversal> for ReferenceNormalizer<'s> {
    #[tracing::instrument(level = "trace", skip_all)]
    fn visit_mut(&mut self, traversal: &mut Traversal) {
        if let Some((walked, skip)) = self.reference_root(traversal) {
            let schema: &'s Block = self.schema;
            walk(
                Position::Block(schema),
                walked,
                traversal.operators.iter_mut().skip(skip),
                &mut self.issues,
            );
            return;
        }

        // tolist(data.google_container_cluster.x.cidr_blocks)[0].display_name
        if let Some((Position::Repeated(block), walked)) = self.tolist_argument(&traversal.expr) {
            walk(
                Position::Repeated(block),
                walked,
                traversal.operators.iter_mut(),
                &mut self.issues,
            );
        }
    }
}

/// Follow `operators` through the schema starting at `position`, renaming to schema names
///
/// Returns where the operators end up, or `None` when an issue was recorded or the walk left the
/// checked part of the schema.
fn walk<'s, 'o>(
    mut position: Position<'s>,
    mut walked: String,
    operators: impl Iterator<Item = &'o mut TraversalOperator>,
    issues: &mut Vec<SchemaError>,
) -> Option<(Position<'s>, String)> {
    for operator in operators {
        position = match (position, operator) {
            (Position::Block(block), TraversalOperator::GetAttr(name)) => {
                let Some((schema_name, field)) = block.field(name.as_str()) else {
                    issues.push(SchemaError::UnknownField {
                        path: walked,
                        name: name.to_string(),
                    });
                    return None;
                };

                if schema_name != name.as_str() {
                    tracing::trace!(from = %name, to = schema_name, "renamed");
                    *name = Identifier::sanitized(schema_name);
                }
                walked = format!("{walked}.{schema_name}");

                match field {
                    Field::Attribute(_) => Position::Value,
                    Field::Block(nested) if nested.is_indexed() => {
                        Position::Repeated(&nested.block)
                    }
                    Field::Block(nested) => Position::Block(&nested.block),
                }
            }
            (
                Position::Repeated(block),
                TraversalOperator::Index(_) | TraversalOperator::LegacyIndex(_),
            ) => {
                walked = format!("{walked}[*]");
                Position::Block(block)
            }
            (Position::Repeated(_), TraversalOperator::GetAttr(name)) => {
                issues.push(SchemaError::IndexRequired {
                    path: walked,
                    name: name.to_string(),
                });
                return None;
            }
            // splats, map keys and values inside attributes are not checked
            _ => return None,
        };
    }

    Some((position, walked))
}
