use crate::constants::storage::{INVALID_PAGE_ID, PAGE_SIZE};
use crate::storage::PageId;
use crate::storage::disk_manager::DiskManager;
use crate::storage::free_list::FreeList;
use crate::storage::replacement::ReplacementPolicy;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Index of a frame inside the buffer pool.
pub type FrameId = usize;

/// One buffer pool slot: a page-sized byte buffer plus the metadata the
/// pool needs to manage it. The buffer is reused across pages for the
/// lifetime of the pool.
pub struct Frame {
    page_id: PageId,
    pin_count: u32,
    dirty: bool,
    data: Box<[u8; PAGE_SIZE]>,
}

impl Frame {
    fn new() -> Self {
        Self {
            page_id: INVALID_PAGE_ID,
            pin_count: 0,
            dirty: false,
            data: Box::new([0u8; PAGE_SIZE]),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_pin_count(pin_count: u32) -> Self {
        let mut frame = Self::new();
        frame.pin_count = pin_count;
        frame
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Page bytes. Only touch these while the frame is pinned.
    pub fn data(&self) -> &[u8; PAGE_SIZE] {
        &self.data
    }

    /// Mutable page bytes. Callers must `mark_dirty` before releasing.
    pub fn data_mut(&mut self) -> &mut [u8; PAGE_SIZE] {
        &mut self.data
    }
}

/// Fixed-size pool of page frames shared by every heap file and catalog
/// table of one database.
///
/// Caller protocol: every `request` is matched by exactly one `release`
/// on all exit paths; modifications are followed by `mark_dirty` before
/// the matching `release`. Violations of the protocol (releasing an
/// unknown or unpinned page, requesting a page when every frame is
/// pinned) are bugs in the caller and panic.
pub struct BufferManager {
    pool: Vec<Frame>,
    page_table: HashMap<PageId, FrameId>,
    free_list: FreeList,
    policy: Box<dyn ReplacementPolicy>,
    disk: Rc<RefCell<DiskManager>>,
}

impl BufferManager {
    pub fn new(
        disk: Rc<RefCell<DiskManager>>,
        pool_size: usize,
        policy: Box<dyn ReplacementPolicy>,
    ) -> Self {
        let mut pool = Vec::with_capacity(pool_size);
        let mut free_list = FreeList::new();
        for frame_id in 0..pool_size {
            pool.push(Frame::new());
            free_list.add(frame_id);
        }
        Self {
            pool,
            page_table: HashMap::new(),
            free_list,
            policy,
            disk,
        }
    }

    /// Pins `page_id` into a frame and returns the frame id, loading the
    /// page from disk on a miss.
    pub fn request(&mut self, page_id: PageId) -> FrameId {
        if let Some(&frame_id) = self.page_table.get(&page_id) {
            self.pool[frame_id].pin_count += 1;
            self.policy.record_access(frame_id);
            return frame_id;
        }

        let frame_id = match self.free_list.get() {
            Some(frame_id) => frame_id,
            None => self.evict(),
        };

        let frame = &mut self.pool[frame_id];
        frame.pin_count += 1;
        self.disk
            .borrow_mut()
            .read_page(page_id, &mut frame.data[..])
            .expect("buffer manager: page read failed");
        frame.page_id = page_id;
        frame.dirty = false;
        self.page_table.insert(page_id, frame_id);
        self.policy.record_load(frame_id);
        frame_id
    }

    /// Drops one pin on `page_id`. When the pin count reaches zero the
    /// frame becomes an eviction candidate.
    pub fn release(&mut self, page_id: PageId) {
        let frame_id = *self
            .page_table
            .get(&page_id)
            .unwrap_or_else(|| panic!("release of page {page_id} that is not resident"));

        let frame = &mut self.pool[frame_id];
        assert!(
            frame.pin_count > 0,
            "release of page {page_id} whose pin count is already 0"
        );
        frame.pin_count -= 1;
        if frame.pin_count == 0 {
            self.policy.record_unpin(frame_id);
        }
    }

    pub fn mark_dirty(&mut self, frame_id: FrameId) {
        self.pool[frame_id].dirty = true;
    }

    /// Writes back every dirty frame. Used at shutdown and to synchronise
    /// the file with buffered state.
    pub fn flush_all(&mut self) {
        let mut disk = self.disk.borrow_mut();
        for frame in &mut self.pool {
            if frame.dirty {
                disk.write_page(frame.page_id, &frame.data[..])
                    .expect("buffer manager: page write failed");
                frame.dirty = false;
            }
        }
    }

    pub fn frame(&self, frame_id: FrameId) -> &Frame {
        &self.pool[frame_id]
    }

    pub fn frame_mut(&mut self, frame_id: FrameId) -> &mut Frame {
        &mut self.pool[frame_id]
    }

    /// Frees one frame by evicting its page, writing it back first if
    /// dirty. Panics when the policy finds no unpinned frame.
    fn evict(&mut self) -> FrameId {
        let frame_id = self
            .policy
            .choose_victim(&self.pool)
            .expect("buffer manager: no eviction candidates (all frames pinned)");

        let frame = &mut self.pool[frame_id];
        assert_eq!(
            frame.pin_count, 0,
            "replacement policy chose a pinned frame"
        );

        if frame.dirty {
            self.disk
                .borrow_mut()
                .write_page(frame.page_id, &frame.data[..])
                .expect("buffer manager: page write failed");
            frame.dirty = false;
        }

        debug!("evicting page {} from frame {}", frame.page_id, frame_id);
        if frame.page_id != INVALID_PAGE_ID {
            self.page_table.remove(&frame.page_id);
        }
        frame.page_id = INVALID_PAGE_ID;
        frame_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::clock::ClockPolicy;
    use tempfile::TempDir;

    fn pool(pool_size: usize) -> (TempDir, Rc<RefCell<DiskManager>>, BufferManager) {
        let dir = TempDir::new().unwrap();
        let dm = Rc::new(RefCell::new(
            DiskManager::open(dir.path().join("bm.db")).unwrap(),
        ));
        let bm = BufferManager::new(
            dm.clone(),
            pool_size,
            Box::new(ClockPolicy::new(pool_size)),
        );
        (dir, dm, bm)
    }

    fn allocate_pages(dm: &Rc<RefCell<DiskManager>>, n: usize) {
        let mut dm = dm.borrow_mut();
        for _ in 0..n {
            dm.allocate_page().unwrap();
        }
    }

    #[test]
    fn request_pins_and_maps_the_page() {
        let (_dir, dm, mut bm) = pool(4);
        allocate_pages(&dm, 1);

        let fid = bm.request(0);
        assert_eq!(bm.frame(fid).page_id(), 0);
        assert_eq!(bm.frame(fid).pin_count(), 1);

        // a second request for the same page hits the same frame
        assert_eq!(bm.request(0), fid);
        assert_eq!(bm.frame(fid).pin_count(), 2);

        bm.release(0);
        bm.release(0);
        assert_eq!(bm.frame(fid).pin_count(), 0);
    }

    #[test]
    fn eviction_prefers_unpinned_and_replaces_mapping() {
        let pool_size = 4;
        let (_dir, dm, mut bm) = pool(pool_size);
        allocate_pages(&dm, pool_size + 1);

        // fill the pool; keep page 0 pinned
        for pid in 0..pool_size as PageId {
            bm.request(pid);
        }
        for pid in 1..pool_size as PageId {
            bm.release(pid);
        }

        let fid = bm.request(pool_size as PageId);
        assert_eq!(bm.frame(fid).page_id(), pool_size as PageId);
        // page 0 was pinned and must still be resident
        let f0 = bm.request(0);
        assert_eq!(bm.frame(f0).page_id(), 0);
        bm.release(0);
        bm.release(0);
        bm.release(pool_size as PageId);
    }

    #[test]
    fn dirty_pages_are_written_back_on_eviction() {
        let (_dir, dm, mut bm) = pool(1);
        allocate_pages(&dm, 2);

        let fid = bm.request(0);
        bm.frame_mut(fid).data_mut()[0] = 0x5A;
        bm.mark_dirty(fid);
        bm.release(0);

        // loading page 1 into the single frame forces the write-back
        bm.request(1);
        bm.release(1);

        let fid = bm.request(0);
        assert_eq!(bm.frame(fid).data()[0], 0x5A);
        bm.release(0);
    }

    #[test]
    fn flush_all_persists_without_eviction() {
        let (_dir, dm, mut bm) = pool(4);
        allocate_pages(&dm, 1);

        let fid = bm.request(0);
        bm.frame_mut(fid).data_mut()[10] = 7;
        bm.mark_dirty(fid);
        bm.release(0);
        bm.flush_all();
        assert!(!bm.frame(fid).is_dirty());

        let mut buf = vec![0u8; PAGE_SIZE];
        dm.borrow_mut().read_page(0, &mut buf).unwrap();
        assert_eq!(buf[10], 7);
    }

    #[test]
    #[should_panic(expected = "not resident")]
    fn releasing_an_unknown_page_panics() {
        let (_dir, _dm, mut bm) = pool(2);
        bm.release(42);
    }

    #[test]
    #[should_panic(expected = "pin count is already 0")]
    fn releasing_an_unpinned_page_panics() {
        let (_dir, dm, mut bm) = pool(2);
        allocate_pages(&dm, 1);
        bm.request(0);
        bm.release(0);
        bm.release(0);
    }

    #[test]
    #[should_panic(expected = "all frames pinned")]
    fn requesting_past_a_fully_pinned_pool_panics() {
        let (_dir, dm, mut bm) = pool(2);
        allocate_pages(&dm, 3);
        bm.request(0);
        bm.request(1);
        bm.request(2);
    }
}
