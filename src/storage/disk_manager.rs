use crate::constants::storage::PAGE_SIZE;
use crate::storage::PageId;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiskError {
    #[error("i/o failure on database file: {0}")]
    Io(#[from] std::io::Error),
}

/// Pager for one database file. Reads and writes whole pages at
/// `page_id * PAGE_SIZE` and hands out page ids, preferring previously
/// deallocated ones.
///
/// The free list is in-memory only: it is empty after a restart, so pages
/// deallocated in an earlier process leak until explicitly reused.
pub struct DiskManager {
    file: File,
    path: PathBuf,
    free_list: Vec<PageId>,
    next_page_id: PageId,
}

impl DiskManager {
    /// Opens the database file at `path`, creating it if absent.
    /// `next_page_id` picks up from the current file length, so reopening
    /// an existing file continues allocation where it left off.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DiskError> {
        let path = path.as_ref().to_path_buf();
        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let num_pages = (file.metadata()?.len() / PAGE_SIZE as u64) as PageId;
        Ok(Self {
            file,
            path,
            free_list: Vec::new(),
            next_page_id: num_pages,
        })
    }

    /// Reads exactly one page into `buf`. The page must have been
    /// allocated; a short read means the file is corrupt.
    pub fn read_page(&mut self, page_id: PageId, buf: &mut [u8]) -> Result<(), DiskError> {
        assert!(page_id >= 0, "read_page: invalid page id {page_id}");
        assert_eq!(buf.len(), PAGE_SIZE);

        self.file
            .seek(SeekFrom::Start(page_id as u64 * PAGE_SIZE as u64))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    /// Writes exactly one page and flushes it through to the device.
    pub fn write_page(&mut self, page_id: PageId, buf: &[u8]) -> Result<(), DiskError> {
        assert!(page_id >= 0, "write_page: invalid page id {page_id}");
        assert_eq!(buf.len(), PAGE_SIZE);

        self.file
            .seek(SeekFrom::Start(page_id as u64 * PAGE_SIZE as u64))?;
        self.file.write_all(buf)?;
        self.file.sync_data()?;
        Ok(())
    }

    /// Returns a usable page id: a previously deallocated one if any,
    /// otherwise a fresh page appended to the file. The file is extended
    /// immediately so the new page is readable (as zeroes) right away.
    pub fn allocate_page(&mut self) -> Result<PageId, DiskError> {
        if let Some(id) = self.free_list.pop() {
            return Ok(id);
        }

        let id = self.next_page_id;
        self.next_page_id += 1;
        self.file
            .set_len(self.next_page_id as u64 * PAGE_SIZE as u64)?;
        Ok(id)
    }

    /// Returns `page_id` to the free list for reuse by a later
    /// `allocate_page`. The bytes on disk are left untouched.
    pub fn deallocate_page(&mut self, page_id: PageId) {
        self.free_list.push(page_id);
    }

    /// Number of pages ever allocated in this file.
    pub fn num_pages(&self) -> usize {
        self.next_page_id as usize
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
