//! Per-process metric probes backed by the /proc filesystem.
//!
//! Every probe tolerates partial failure: a process can exit between
//! enumeration and any individual read, and some processes deny access.
//! Failures surface as `Err`/fallback values at the probe boundary and
//! never abort a sampling round.

use once_cell::sync::Lazy;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fallback label when a process name cannot be resolved.
pub const UNKNOWN_NAME: &str = "unknown";

/// Platform memory page size in bytes.
pub static PAGE_SIZE: Lazy<u64> = Lazy::new(|| {
    let v = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if v > 0 {
        v as u64
    } else {
        4096
    }
});

/// Clock ticks per second for /proc stat accounting.
pub static CLK_TCK: Lazy<u64> = Lazy::new(|| {
    let v = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    if v > 0 {
        v as u64
    } else {
        100
    }
});

/// Process entry representing a directory in the /proc filesystem
#[derive(Debug, Clone)]
pub struct ProcEntry {
    pub pid: u32,
    pub proc_path: PathBuf,
}

/// Scans the proc root for numeric process entries, capped at `max`.
/// Processes beyond the cap are silently dropped. An unreadable proc
/// root yields an empty set; the round continues with zero processes.
pub fn collect_proc_entries(root: &Path, max: usize) -> Vec<ProcEntry> {
    let mut out = Vec::new();
    if let Ok(entries) = fs::read_dir(root) {
        for entry in entries.flatten() {
            let p = entry.path();
            let name = match p.file_name().and_then(|s| s.to_str()) {
                Some(v) => v,
                None => continue,
            };
            if !name.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            let pid: u32 = match name.parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            out.push(ProcEntry { pid, proc_path: p });
            if out.len() >= max {
                debug!("process cap {} reached, dropping remaining entries", max);
                break;
            }
        }
    }
    out
}

/// Reads the short process name from comm, falling back to the cmdline
/// basename and finally to the fixed "unknown" label.
pub fn read_process_name(proc_path: &Path) -> String {
    let comm = proc_path.join("comm");
    if let Ok(s) = fs::read_to_string(&comm) {
        let t = s.trim();
        if !t.is_empty() {
            return t.into();
        }
    }

    let cmd = proc_path.join("cmdline");
    if let Ok(content) = fs::read(&cmd) {
        if !content.is_empty() {
            let parts: Vec<&str> = content
                .split(|&b| b == 0u8)
                .filter_map(|s| std::str::from_utf8(s).ok())
                .collect();
            if !parts.is_empty() {
                if let Some(name) = Path::new(parts[0]).file_name().and_then(|n| n.to_str()) {
                    return name.to_string();
                }
            }
        }
    }

    UNKNOWN_NAME.to_string()
}

/// Reads the resident set size in kilobytes from /proc/<pid>/statm.
pub fn read_resident_kb(proc_path: &Path) -> io::Result<u64> {
    let content = fs::read_to_string(proc_path.join("statm"))?;
    parse_statm_resident_pages(&content)
        .map(|pages| pages * (*PAGE_SIZE / 1024))
        .ok_or_else(|| io::Error::other("malformed statm"))
}

/// Reads cumulative CPU ticks (utime + stime) from /proc/<pid>/stat.
/// Returns 0 on any failure; an unreadable process is indistinguishable
/// from a genuinely idle one, which is an accepted simplification.
pub fn read_cpu_ticks(proc_path: &Path) -> u64 {
    match fs::read_to_string(proc_path.join("stat")) {
        Ok(content) => parse_stat_ticks(&content).unwrap_or(0),
        Err(e) => {
            debug!("failed to read stat under {}: {}", proc_path.display(), e);
            0
        }
    }
}

/// Resolves the path of the process's backing executable image.
pub fn resolve_exe_path(proc_path: &Path) -> Option<PathBuf> {
    fs::read_link(proc_path.join("exe")).ok()
}

/// Parses utime + stime from stat content. The comm field may contain
/// spaces and parentheses, so fields are counted from the last ')'.
fn parse_stat_ticks(content: &str) -> Option<u64> {
    let rest = content.rfind(')').map(|i| &content[i + 1..])?;
    let fields: Vec<&str> = rest.split_whitespace().collect();
    // After the comm field, state is field 3; utime and stime are
    // fields 14 and 15 of the full line.
    let utime: u64 = fields.get(11)?.parse().ok()?;
    let stime: u64 = fields.get(12)?.parse().ok()?;
    Some(utime + stime)
}

/// Second statm field: resident set size in pages.
fn parse_statm_resident_pages(content: &str) -> Option<u64> {
    let mut it = content.split_whitespace();
    let _total = it.next()?;
    it.next()?.parse().ok()
}
