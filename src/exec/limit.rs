use crate::exec::operator::Operator;
use crate::value::Tuple;

/// Emits at most `limit` tuples from its child.
pub struct LimitOp {
    child: Box<dyn Operator>,
    limit: usize,
    produced: usize,
}

impl LimitOp {
    pub fn new(child: Box<dyn Operator>, limit: usize) -> Self {
        Self {
            child,
            limit,
            produced: 0,
        }
    }
}

impl Operator for LimitOp {
    fn open(&mut self) {
        self.produced = 0;
        self.child.open();
    }

    fn next(&mut self) -> Option<Tuple> {
        if self.produced >= self.limit {
            return None;
        }
        let tuple = self.child.next()?;
        self.produced += 1;
        Some(tuple)
    }

    fn close(&mut self) {
        self.child.close();
    }
}
