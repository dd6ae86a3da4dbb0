use crate::exec::operator::Operator;
use crate::value::Tuple;

/// Drives an operator tree to exhaustion: open once, pull until empty,
/// close.
pub struct Executor {
    plan: Box<dyn Operator>,
}

impl Executor {
    pub fn new(plan: Box<dyn Operator>) -> Self {
        Self { plan }
    }

    /// Runs the tree and discards every tuple.
    pub fn execute(&mut self) {
        self.plan.open();
        while self.plan.next().is_some() {}
        self.plan.close();
    }

    /// Runs the tree and materialises every tuple.
    pub fn execute_and_collect(&mut self) -> Vec<Tuple> {
        let mut result = Vec::new();
        self.plan.open();
        while let Some(tuple) = self.plan.next() {
            result.push(tuple);
        }
        self.plan.close();
        result
    }
}
