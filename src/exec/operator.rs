use crate::value::Tuple;

/// Volcano-style iterator node. Operators form a tree; a parent's
/// `open`/`next`/`close` recursively drives its children.
///
/// Contract: `open` before any `next`; once `next` returns `None` it
/// keeps returning `None`; `close` is mandatory when done.
pub trait Operator {
    fn open(&mut self);
    fn next(&mut self) -> Option<Tuple>;
    fn close(&mut self);
}
