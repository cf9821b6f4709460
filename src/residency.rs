//! Page-cache residency probe.
//!
//! A file is mapped read-only and the kernel is asked, in one bulk
//! mincore call spanning the whole mapping, which of its pages are
//! currently resident in the page cache. Residency is independent of
//! whether any process has the file open.
//!
//! Resource safety is strict here: the probe runs once per process per
//! round under an indefinite polling loop, so the mapping is held by an
//! RAII guard and the residency bitmap is an owned Vec. Both are
//! released on every exit path.

use std::fs::File;
use std::io;
use std::os::fd::AsRawFd;
use std::path::Path;
use std::ptr;

use crate::probe::PAGE_SIZE;

/// Read-only shared mapping of a file, unmapped on drop.
struct Mapping {
    addr: *mut libc::c_void,
    len: usize,
}

impl Mapping {
    fn new(file: &File, len: usize) -> io::Result<Self> {
        let addr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                0,
            )
        };
        if addr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { addr, len })
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        // munmap can only fail on an invalid range, which this guard
        // never holds.
        unsafe {
            libc::munmap(self.addr, self.len);
        }
    }
}

/// Number of pages covering `size` bytes.
pub fn page_count(size: u64, page_size: u64) -> u64 {
    (size + page_size - 1) / page_size
}

/// Percentage of the file's pages currently resident in the page cache.
///
/// A zero-length file has no pages and reports 0.0 without mapping
/// anything. Any open/stat/map/query failure is returned as an error;
/// the caller treats it as a soft per-field failure.
pub fn cache_residency_percent(path: &Path) -> io::Result<f64> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    if size == 0 {
        return Ok(0.0);
    }

    let pages = page_count(size, *PAGE_SIZE);
    // A file longer than the address space cannot be mapped in one go.
    let len = usize::try_from(size).map_err(|_| io::Error::other("file too large to map"))?;
    let mapping = Mapping::new(&file, len)?;

    let mut residency = vec![0u8; pages as usize];
    let rc = unsafe { libc::mincore(mapping.addr, mapping.len, residency.as_mut_ptr().cast()) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }

    // Low bit set = page resident, in mapping order.
    let resident = residency.iter().filter(|&&b| b & 1 == 1).count() as u64;
    Ok(resident as f64 * 100.0 / pages as f64)
}
