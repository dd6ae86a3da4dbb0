use crate::storage::{PageId, SlotId};

/// Record identifier: page plus slot. Stable across in-place updates and
/// same-page relocations (those only change the slot's offset).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rid {
    pub page_id: PageId,
    pub slot_id: SlotId,
}

/// A record materialised out of a heap page. The bytes are owned: scans
/// release their page pin between steps, so borrowed views would dangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub rid: Rid,
    pub data: Vec<u8>,
}
