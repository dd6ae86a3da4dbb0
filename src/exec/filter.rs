use crate::exec::operator::Operator;
use crate::value::Tuple;

/// Pure tuple predicate supplied by the planner (or any caller).
pub type Predicate = Box<dyn Fn(&Tuple) -> bool>;

/// Emits exactly the child tuples the predicate accepts.
pub struct FilterOp {
    child: Box<dyn Operator>,
    predicate: Predicate,
}

impl FilterOp {
    pub fn new(child: Box<dyn Operator>, predicate: Predicate) -> Self {
        Self { child, predicate }
    }
}

impl Operator for FilterOp {
    fn open(&mut self) {
        self.child.open();
    }

    fn next(&mut self) -> Option<Tuple> {
        loop {
            let tuple = self.child.next()?;
            if (self.predicate)(&tuple) {
                return Some(tuple);
            }
        }
    }

    fn close(&mut self) {
        self.child.close();
    }
}
