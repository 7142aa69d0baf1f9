use super::VisitMut;
use hcl::{
    template::{Directive, Element},
    Expression, Operation, Template, TemplateExpr, Traversal, TraversalOperator,
};

/// Hands every [Traversal] reachable from `self` to a visitor
///
/// Function call arguments are visited, so `tolist(data.x.y.z)[0]` reaches the inner traversal.
pub(crate) trait VisitTraversalsMut {
    fn visit_traversals_mut(&mut self, visitor: &mut dyn VisitMut<Traversal>);
}

impl VisitTraversalsMut for Expression {
    fn visit_traversals_mut(&mut self, visitor: &mut dyn VisitMut<Traversal>) {
        match self {
            Expression::Variable(variable) => {
                // a bare variable is visited as a traversal without operators
                let mut traversal = Traversal::new(
                    Expression::Variable(variable.clone()),
                    Vec::<TraversalOperator>::new(),
                );
                visitor.visit_mut(&mut traversal);
                *self = if traversal.operators.is_empty() {
                    traversal.expr
                } else {
                    Expression::Traversal(Box::new(traversal))
                };
            }
            Expression::Traversal(traversal) => {
                visitor.visit_mut(traversal);
                traversal.expr.visit_traversals_mut(visitor);
                for operator in traversal.operators.iter_mut() {
                    if let TraversalOperator::Index(index) = operator {
                        index.visit_traversals_mut(visitor);
                    }
                }
            }
            Expression::Array(array) => {
                for expr in array {
                    expr.visit_traversals_mut(visitor);
                }
            }
            Expression::Object(object) => {
                for value in object.values_mut() {
                    value.visit_traversals_mut(visitor);
                }
            }
            Expression::TemplateExpr(template_expr) => {
                let Ok(mut template) = Template::from_expr(template_expr) else {
                    return;
                };
                template.visit_traversals_mut(visitor);
                *template_expr = Box::new(TemplateExpr::QuotedString(template.to_string()));
            }
            Expression::FuncCall(call) => {
                for arg in call.args.iter_mut() {
                    arg.visit_traversals_mut(visitor);
                }
            }
            Expression::Parenthesis(expr) => expr.visit_traversals_mut(visitor),
            Expression::Conditional(cond) => {
                cond.cond_expr.visit_traversals_mut(visitor);
                cond.true_expr.visit_traversals_mut(visitor);
                cond.false_expr.visit_traversals_mut(visitor);
            }
            Expression::Operation(operation) => match operation.as_mut() {
                Operation::Binary(binary) => {
                    binary.lhs_expr.visit_traversals_mut(visitor);
                    binary.rhs_expr.visit_traversals_mut(visitor);
                }
                Operation::Unary(unary) => unary.expr.visit_traversals_mut(visitor),
            },
            Expression::ForExpr(for_expr) => {
                for_expr.collection_expr.visit_traversals_mut(visitor);
                for_expr
                    .key_expr
                    .iter_mut()
                    .for_each(|expr| expr.visit_traversals_mut(visitor));
                for_expr.value_expr.visit_traversals_mut(visitor);
                for_expr
                    .cond_expr
                    .iter_mut()
                    .for_each(|expr| expr.visit_traversals_mut(visitor));
            }
            _ => {}
        }
    }
}

impl VisitTraversalsMut for Template {
    fn visit_traversals_mut(&mut self, visitor: &mut dyn VisitMut<Traversal>) {
        for element in self.elements_mut() {
            match element {
                Element::Interpolation(interpolation) => {
                    interpolation.expr.visit_traversals_mut(visitor)
                }
                Element::Directive(Directive::If(if_directive)) => {
                    if_directive.cond_expr.visit_traversals_mut(visitor);
                    if_directive.true_template.visit_traversals_mut(visitor);
                    if let Some(template) = if_directive.false_template.as_mut() {
                        template.visit_traversals_mut(visitor);
                    }
                }
                Element::Directive(Directive::For(for_directive)) => {
                    for_directive.collection_expr.visit_traversals_mut(visitor);
                    for_directive.template.visit_traversals_mut(visitor);
                }
                Element::Literal(_) => {}
            }
        }
    }
}
