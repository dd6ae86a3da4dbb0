pub mod executor;
pub mod filter;
pub mod limit;
pub mod operator;
pub mod projection;
pub mod seq_scan;

pub use executor::Executor;
pub use filter::{FilterOp, Predicate};
pub use limit::LimitOp;
pub use operator::Operator;
pub use projection::ProjectionOp;
pub use seq_scan::SeqScanOp;
