//! mutable visitors over hcl expressions
mod traversals;

pub(crate) use traversals::VisitTraversalsMut;

/// Visits (and may rewrite) values of type `T`
pub(crate) trait VisitMut<T> {
    fn visit_mut(&mut self, value: &mut T);
}

impl<T, F> VisitMut<T> for F
where
    F: FnMut(&mut T),
{
    fn visit_mut(&mut self, value: &mut T) {
        self(value)
    }
}
