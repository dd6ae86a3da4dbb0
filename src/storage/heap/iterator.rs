use crate::constants::storage::INVALID_PAGE_ID;
use crate::storage::buffer_manager::BufferManager;
use crate::storage::heap::heap_file::{HEAP_PAGE_HEADER_SIZE, next_page_id};
use crate::storage::heap::record::{Record, Rid};
use crate::storage::slotted_page::SlottedPage;
use crate::storage::{PageId, SlotId};
use std::cell::RefCell;
use std::rc::Rc;

/// Forward scan over a heap-page chain in (page, slot) order, skipping
/// tombstones. No page stays pinned between steps: each advancement
/// re-pins the current page, looks for the next live slot (following
/// `next_page_id` across page boundaries), and releases it again, so the
/// records it yields own their bytes.
pub struct HeapIterator {
    bm: Rc<RefCell<BufferManager>>,
    page_id: PageId,
    slot_id: SlotId,
    has_next: bool,
}

impl HeapIterator {
    pub(crate) fn new(bm: Rc<RefCell<BufferManager>>, first_page_id: PageId) -> Self {
        let mut iter = Self {
            bm,
            page_id: first_page_id,
            slot_id: 0,
            has_next: false,
        };
        if first_page_id != INVALID_PAGE_ID {
            iter.advance();
        }
        iter
    }

    /// True iff the next `next()` call will yield a record.
    pub fn has_next(&self) -> bool {
        self.has_next
    }

    /// Moves `(page_id, slot_id)` forward to the next live slot at or
    /// after the current position, or marks the scan exhausted.
    fn advance(&mut self) {
        self.has_next = false;

        while self.page_id != INVALID_PAGE_ID {
            let mut bm = self.bm.borrow_mut();
            let fid = bm.request(self.page_id);

            let (live_slot, next) = {
                let frame = bm.frame_mut(fid);
                let page = SlottedPage::from_buffer(frame.data_mut(), HEAP_PAGE_HEADER_SIZE);
                let mut slot = self.slot_id;
                let mut live = None;
                while slot < page.num_slots() {
                    if page.get(slot).is_some() {
                        live = Some(slot);
                        break;
                    }
                    slot += 1;
                }
                (live, next_page_id(frame.data()))
            };
            bm.release(self.page_id);

            match live_slot {
                Some(slot) => {
                    self.slot_id = slot;
                    self.has_next = true;
                    return;
                }
                None => {
                    self.page_id = next;
                    self.slot_id = 0;
                }
            }
        }
    }

    fn read_current(&self) -> Record {
        let mut bm = self.bm.borrow_mut();
        let fid = bm.request(self.page_id);
        let data = {
            let frame = bm.frame_mut(fid);
            SlottedPage::from_buffer(frame.data_mut(), HEAP_PAGE_HEADER_SIZE)
                .get(self.slot_id)
                .expect("heap iterator positioned on a dead slot")
                .to_vec()
        };
        bm.release(self.page_id);
        Record {
            rid: Rid {
                page_id: self.page_id,
                slot_id: self.slot_id,
            },
            data,
        }
    }
}

impl Iterator for HeapIterator {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        if !self.has_next {
            return None;
        }
        let record = self.read_current();
        self.slot_id += 1;
        self.advance();
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::clock::ClockPolicy;
    use crate::storage::disk_manager::DiskManager;
    use crate::storage::heap::heap_file::HeapFile;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn heap() -> (TempDir, HeapFile) {
        let dir = TempDir::new().unwrap();
        let dm = Rc::new(RefCell::new(
            DiskManager::open(dir.path().join("iter.db")).unwrap(),
        ));
        let bm = Rc::new(RefCell::new(BufferManager::new(
            dm.clone(),
            16,
            Box::new(ClockPolicy::new(16)),
        )));
        let hf = HeapFile::create(bm, dm, Uuid::new_v4()).unwrap();
        (dir, hf)
    }

    #[test]
    fn empty_heap_yields_nothing() {
        let (_dir, hf) = heap();
        let mut iter = hf.scan();
        assert!(!iter.has_next());
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn unmaterialised_heap_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let dm = Rc::new(RefCell::new(
            DiskManager::open(dir.path().join("lazy.db")).unwrap(),
        ));
        let bm = Rc::new(RefCell::new(BufferManager::new(
            dm.clone(),
            16,
            Box::new(ClockPolicy::new(16)),
        )));
        let lazy = HeapFile::open(bm, dm, Uuid::new_v4(), INVALID_PAGE_ID);
        assert_eq!(lazy.scan().count(), 0);
    }

    #[test]
    fn yields_in_insertion_order_with_rids() {
        let (_dir, mut hf) = heap();
        let rids: Vec<_> = (0..5)
            .map(|i| hf.insert(format!("row{i}").as_bytes()).unwrap())
            .collect();

        let records: Vec<_> = hf.scan().collect();
        assert_eq!(records.len(), 5);
        for (i, rec) in records.iter().enumerate() {
            assert_eq!(rec.rid, rids[i]);
            assert_eq!(rec.data, format!("row{i}").as_bytes());
        }
    }

    #[test]
    fn deleted_records_are_skipped() {
        let (_dir, mut hf) = heap();
        let rids: Vec<_> = (0..6)
            .map(|i| hf.insert(format!("v{i}").as_bytes()).unwrap())
            .collect();
        hf.delete(rids[0]);
        hf.delete(rids[3]);
        hf.delete(rids[5]);

        let seen: Vec<_> = hf.scan().map(|r| r.rid).collect();
        assert_eq!(seen, vec![rids[1], rids[2], rids[4]]);
    }

    #[test]
    fn has_next_agrees_with_next() {
        let (_dir, mut hf) = heap();
        hf.insert(b"only").unwrap();

        let mut iter = hf.scan();
        assert!(iter.has_next());
        assert!(iter.next().is_some());
        assert!(!iter.has_next());
        assert!(iter.next().is_none());
    }

    #[test]
    fn crosses_page_boundaries() {
        let (_dir, mut hf) = heap();
        // ~1 KiB records force a new page every eighth insert
        let big = vec![b'x'; 1024];
        for _ in 0..20 {
            hf.insert(&big).unwrap();
        }
        assert_eq!(hf.scan().count(), 20);

        let pages: std::collections::HashSet<_> = hf.scan().map(|r| r.rid.page_id).collect();
        assert!(pages.len() > 1);
    }
}
