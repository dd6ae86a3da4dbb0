use crate::constants::storage::INVALID_PAGE_ID;
use crate::storage::PageId;
use crate::storage::buffer_manager::BufferManager;
use crate::storage::disk_manager::{DiskError, DiskManager};
use crate::storage::heap::iterator::HeapIterator;
use crate::storage::heap::record::{Record, Rid};
use crate::storage::slotted_page::SlottedPage;
use log::debug;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use uuid::Uuid;

/// Bytes reserved at the start of every heap page for
/// `HeapPageHeader { next_page_id: i32 }`, padded to 8-byte alignment.
/// The slotted page occupies the remainder of the block.
pub const HEAP_PAGE_HEADER_SIZE: usize = 8;

#[derive(Debug, Error)]
pub enum HeapError {
    #[error("record of {0} bytes does not fit in an empty heap page")]
    RecordTooLarge(usize),
    #[error(transparent)]
    Disk(#[from] DiskError),
}

pub(crate) fn next_page_id(page: &[u8]) -> PageId {
    i32::from_le_bytes(page[0..4].try_into().unwrap())
}

pub(crate) fn set_next_page_id(page: &mut [u8], next: PageId) {
    page[0..4].copy_from_slice(&next.to_le_bytes());
}

fn init_heap_page(page: &mut [u8]) {
    set_next_page_id(page, INVALID_PAGE_ID);
    SlottedPage::init(page, HEAP_PAGE_HEADER_SIZE);
}

/// A multi-page record heap: a singly-linked chain of heap pages starting
/// at `first_page_id`, terminated by `INVALID_PAGE_ID`. The heap file is
/// not persisted as an object of its own; its identity is reconstructed
/// from the `(file_id, first_page_id)` pair recorded in the catalog.
///
/// All operations pin pages only for the duration of a single call.
#[derive(Clone)]
pub struct HeapFile {
    bm: Rc<RefCell<BufferManager>>,
    dm: Rc<RefCell<DiskManager>>,
    file_id: Uuid,
    first_page_id: PageId,
}

impl HeapFile {
    /// Allocates and initialises the root page for a brand-new heap.
    pub fn create(
        bm: Rc<RefCell<BufferManager>>,
        dm: Rc<RefCell<DiskManager>>,
        file_id: Uuid,
    ) -> Result<Self, HeapError> {
        let first_page_id = dm.borrow_mut().allocate_page()?;
        {
            let mut bm = bm.borrow_mut();
            let fid = bm.request(first_page_id);
            init_heap_page(bm.frame_mut(fid).data_mut());
            bm.mark_dirty(fid);
            bm.release(first_page_id);
        }
        debug!("created heap file {file_id} rooted at page {first_page_id}");
        Ok(Self {
            bm,
            dm,
            file_id,
            first_page_id,
        })
    }

    /// Reconstructs a handle over an existing heap without any I/O.
    pub fn open(
        bm: Rc<RefCell<BufferManager>>,
        dm: Rc<RefCell<DiskManager>>,
        file_id: Uuid,
        first_page_id: PageId,
    ) -> Self {
        Self {
            bm,
            dm,
            file_id,
            first_page_id,
        }
    }

    pub fn file_id(&self) -> Uuid {
        self.file_id
    }

    pub fn first_page_id(&self) -> PageId {
        self.first_page_id
    }

    /// Inserts `record` into the first page of the chain with room,
    /// growing the chain by one freshly initialised page when every
    /// existing page is full.
    pub fn insert(&mut self, record: &[u8]) -> Result<Rid, HeapError> {
        // a heap opened at INVALID_PAGE_ID materialises on first insert
        if self.first_page_id == INVALID_PAGE_ID {
            let page_id = self.dm.borrow_mut().allocate_page()?;
            let mut bm = self.bm.borrow_mut();
            let fid = bm.request(page_id);
            init_heap_page(bm.frame_mut(fid).data_mut());
            bm.mark_dirty(fid);
            bm.release(page_id);
            self.first_page_id = page_id;
        }

        let mut page_id = self.first_page_id;
        let last_page_id;
        loop {
            let mut bm = self.bm.borrow_mut();
            let fid = bm.request(page_id);
            let slot = {
                let frame = bm.frame_mut(fid);
                SlottedPage::from_buffer(frame.data_mut(), HEAP_PAGE_HEADER_SIZE).insert(record)
            };
            if let Some(slot_id) = slot {
                bm.mark_dirty(fid);
                bm.release(page_id);
                return Ok(Rid { page_id, slot_id });
            }

            let next = next_page_id(bm.frame(fid).data());
            bm.release(page_id);
            if next == INVALID_PAGE_ID {
                last_page_id = page_id;
                break;
            }
            page_id = next;
        }

        // every page is full: link a new one onto the tail
        let new_page_id = self.dm.borrow_mut().allocate_page()?;
        let mut bm = self.bm.borrow_mut();

        let fid = bm.request(last_page_id);
        set_next_page_id(bm.frame_mut(fid).data_mut(), new_page_id);
        bm.mark_dirty(fid);
        bm.release(last_page_id);
        debug!("heap file {}: linked page {new_page_id}", self.file_id);

        let fid = bm.request(new_page_id);
        let slot = {
            let frame = bm.frame_mut(fid);
            init_heap_page(frame.data_mut());
            SlottedPage::from_buffer(frame.data_mut(), HEAP_PAGE_HEADER_SIZE).insert(record)
        };
        bm.mark_dirty(fid);
        bm.release(new_page_id);

        match slot {
            Some(slot_id) => Ok(Rid {
                page_id: new_page_id,
                slot_id,
            }),
            // does not even fit an empty page; overflow pages are future work
            None => Err(HeapError::RecordTooLarge(record.len())),
        }
    }

    /// Copies out the record at `rid`, or `None` for tombstoned and
    /// out-of-range slots.
    pub fn get(&self, rid: Rid) -> Option<Record> {
        let mut bm = self.bm.borrow_mut();
        let fid = bm.request(rid.page_id);
        let data = {
            let frame = bm.frame_mut(fid);
            SlottedPage::from_buffer(frame.data_mut(), HEAP_PAGE_HEADER_SIZE)
                .get(rid.slot_id)
                .map(|bytes| bytes.to_vec())
        };
        bm.release(rid.page_id);
        data.map(|data| Record { rid, data })
    }

    /// Rewrites the record at `rid` in place (slot id is preserved).
    /// The frame is marked dirty only when the page-level update succeeds.
    pub fn update(&mut self, rid: Rid, record: &[u8]) -> bool {
        let mut bm = self.bm.borrow_mut();
        let fid = bm.request(rid.page_id);
        let ok = {
            let frame = bm.frame_mut(fid);
            SlottedPage::from_buffer(frame.data_mut(), HEAP_PAGE_HEADER_SIZE)
                .update(rid.slot_id, record)
        };
        if ok {
            bm.mark_dirty(fid);
        }
        bm.release(rid.page_id);
        ok
    }

    /// Tombstones the record at `rid`.
    pub fn delete(&mut self, rid: Rid) -> bool {
        let mut bm = self.bm.borrow_mut();
        let fid = bm.request(rid.page_id);
        let ok = {
            let frame = bm.frame_mut(fid);
            SlottedPage::from_buffer(frame.data_mut(), HEAP_PAGE_HEADER_SIZE).delete(rid.slot_id)
        };
        if ok {
            bm.mark_dirty(fid);
        }
        bm.release(rid.page_id);
        ok
    }

    /// Forward scan over every live record in (page, slot) order.
    pub fn scan(&self) -> HeapIterator {
        HeapIterator::new(self.bm.clone(), self.first_page_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::storage::PAGE_SIZE;
    use crate::storage::clock::ClockPolicy;
    use tempfile::TempDir;

    fn setup() -> (
        TempDir,
        Rc<RefCell<BufferManager>>,
        Rc<RefCell<DiskManager>>,
    ) {
        let dir = TempDir::new().unwrap();
        let dm = Rc::new(RefCell::new(
            DiskManager::open(dir.path().join("heap.db")).unwrap(),
        ));
        let bm = Rc::new(RefCell::new(BufferManager::new(
            dm.clone(),
            16,
            Box::new(ClockPolicy::new(16)),
        )));
        (dir, bm, dm)
    }

    #[test]
    fn create_initialises_the_root_page() {
        let (_dir, bm, dm) = setup();
        let heap = HeapFile::create(bm, dm.clone(), Uuid::new_v4()).unwrap();
        assert_eq!(heap.first_page_id(), 0);
        assert_eq!(dm.borrow().num_pages(), 1);
    }

    #[test]
    fn insert_then_get_round_trips() {
        let (_dir, bm, dm) = setup();
        let mut heap = HeapFile::create(bm, dm, Uuid::new_v4()).unwrap();

        let rid = heap.insert(b"first record").unwrap();
        assert_eq!(
            rid,
            Rid {
                page_id: 0,
                slot_id: 0
            }
        );

        let rec = heap.get(rid).unwrap();
        assert_eq!(rec.data, b"first record");
        assert_eq!(rec.rid, rid);

        assert!(
            heap.get(Rid {
                page_id: 0,
                slot_id: 99
            })
            .is_none()
        );
    }

    #[test]
    fn lazy_heap_materialises_on_first_insert() {
        let (_dir, bm, dm) = setup();
        let mut heap = HeapFile::open(bm, dm, Uuid::new_v4(), INVALID_PAGE_ID);

        let rid = heap.insert(b"made it").unwrap();
        assert_ne!(heap.first_page_id(), INVALID_PAGE_ID);
        assert_eq!(heap.get(rid).unwrap().data, b"made it");
    }

    #[test]
    fn thousand_records_span_pages_and_all_scan_back() {
        let (_dir, bm, dm) = setup();
        let mut heap = HeapFile::create(bm, dm.clone(), Uuid::new_v4()).unwrap();

        for i in 0..1000 {
            heap.insert(format!("rec-{i}").as_bytes()).unwrap();
        }

        let records: Vec<_> = heap.scan().collect();
        assert_eq!(records.len(), 1000);
        for (i, rec) in records.iter().enumerate() {
            assert_eq!(rec.data, format!("rec-{i}").as_bytes());
        }
        // ~10 bytes per record plus slot overhead cannot fit one page
        assert!(dm.borrow().num_pages() > 1);
    }

    #[test]
    fn update_shrinks_in_place_and_relocates_when_growing() {
        let (_dir, bm, dm) = setup();
        let mut heap = HeapFile::create(bm, dm, Uuid::new_v4()).unwrap();

        let rid = heap.insert(b"0123456789").unwrap();
        assert!(heap.update(rid, b"small"));
        assert_eq!(heap.get(rid).unwrap().data, b"small");

        let grown = vec![b'g'; 500];
        assert!(heap.update(rid, &grown));
        assert_eq!(heap.get(rid).unwrap().data, grown);

        assert!(!heap.update(
            Rid {
                page_id: 0,
                slot_id: 50
            },
            b"nope"
        ));
    }

    #[test]
    fn delete_tombstones_and_get_sees_nothing() {
        let (_dir, bm, dm) = setup();
        let mut heap = HeapFile::create(bm, dm, Uuid::new_v4()).unwrap();

        let keep = heap.insert(b"keep").unwrap();
        let gone = heap.insert(b"gone").unwrap();
        assert!(heap.delete(gone));
        assert!(heap.get(gone).is_none());
        assert!(heap.get(keep).is_some());
        assert!(!heap.delete(Rid {
            page_id: 0,
            slot_id: 50
        }));
    }

    #[test]
    fn oversized_record_is_rejected() {
        let (_dir, bm, dm) = setup();
        let mut heap = HeapFile::create(bm, dm, Uuid::new_v4()).unwrap();

        let oversized = vec![0u8; PAGE_SIZE];
        match heap.insert(&oversized) {
            Err(HeapError::RecordTooLarge(n)) => assert_eq!(n, PAGE_SIZE),
            other => panic!("expected RecordTooLarge, got {other:?}"),
        }

        // the heap is still usable afterwards
        assert!(heap.insert(b"normal").is_ok());
    }

    #[test]
    fn chain_pages_stay_linked_after_flush_and_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chain.db");
        let first_page;
        let count = 600usize;

        {
            let dm = Rc::new(RefCell::new(DiskManager::open(&path).unwrap()));
            let bm = Rc::new(RefCell::new(BufferManager::new(
                dm.clone(),
                16,
                Box::new(ClockPolicy::new(16)),
            )));
            let mut heap = HeapFile::create(bm.clone(), dm, Uuid::new_v4()).unwrap();
            for i in 0..count {
                heap.insert(format!("persist-{i}").as_bytes()).unwrap();
            }
            first_page = heap.first_page_id();
            bm.borrow_mut().flush_all();
        }

        let dm = Rc::new(RefCell::new(DiskManager::open(&path).unwrap()));
        let bm = Rc::new(RefCell::new(BufferManager::new(
            dm.clone(),
            16,
            Box::new(ClockPolicy::new(16)),
        )));
        let heap = HeapFile::open(bm, dm, Uuid::new_v4(), first_page);
        assert_eq!(heap.scan().count(), count);
    }
}
