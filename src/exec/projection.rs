use crate::exec::operator::Operator;
use crate::value::{Schema, Tuple};
use std::collections::HashSet;

/// Keeps only the values whose 1-indexed ordinal positions appear in
/// `keep_positions`, preserving input order, and tags the output with
/// the planner-built output schema.
pub struct ProjectionOp {
    child: Box<dyn Operator>,
    keep_positions: HashSet<u16>,
    out_schema: Schema,
}

impl ProjectionOp {
    pub fn new(child: Box<dyn Operator>, keep_positions: HashSet<u16>, out_schema: Schema) -> Self {
        Self {
            child,
            keep_positions,
            out_schema,
        }
    }
}

impl Operator for ProjectionOp {
    fn open(&mut self) {
        self.child.open();
    }

    fn next(&mut self) -> Option<Tuple> {
        let tuple = self.child.next()?;
        let projected = tuple
            .values()
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.keep_positions.contains(&((idx + 1) as u16)))
            .map(|(_, value)| value.clone())
            .collect();
        Some(Tuple::new(projected, self.out_schema.clone()))
    }

    fn close(&mut self) {
        self.child.close();
    }
}
