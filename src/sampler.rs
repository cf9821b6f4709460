//! Per-round sample collection and CPU-delta state.
//!
//! The sampler owns the baseline table of last-observed cumulative CPU
//! ticks per pid and turns one pass over the proc table into a vector
//! of `ProcessSample` values. Probing is parallel per pid; each pid's
//! baseline read-then-update runs entirely inside the one task probing
//! that pid, so deltas cannot interleave within a pid.

use ahash::AHashMap as HashMap;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::debug;

use crate::probe::{self, ProcEntry, CLK_TCK};
use crate::residency;
use crate::score;

/// One process's metrics for one sampling round.
#[derive(Debug, Clone)]
pub struct ProcessSample {
    pub pid: u32,
    pub name: String,
    /// Fraction of one CPU-second consumed over the last interval.
    /// Always 0.0 on a pid's first observed round.
    pub cpu_percent: f64,
    /// Resident set size in KB; None when the probe failed.
    pub resident_kb: Option<u64>,
    /// Executable-image page-cache residency in [0, 100]; None when the
    /// exe path could not be resolved or probed.
    pub cache_percent: Option<f64>,
    pub score: f64,
}

/// Last-observed cumulative CPU ticks per pid.
///
/// Entries are never removed: a pid reused by a new process inherits
/// the stale baseline and may report a misleading first delta. That is
/// a long-standing hazard of this accounting scheme, kept as-is, with
/// one deliberate softening: a stale baseline larger than the new
/// process's ticks clamps the delta to zero instead of wrapping into
/// an absurd spike.
pub struct BaselineTable {
    ticks: RwLock<HashMap<u32, u64>>,
}

impl Default for BaselineTable {
    fn default() -> Self {
        Self::new()
    }
}

impl BaselineTable {
    pub fn new() -> Self {
        Self {
            ticks: RwLock::new(HashMap::new()),
        }
    }

    /// Swaps in the current cumulative tick count and returns the CPU
    /// percentage for the interval since the previous observation.
    /// A pid without a baseline, or with a stored baseline of zero,
    /// reports 0.0 for this round. A zero baseline is what a failed
    /// stat read leaves behind, so treating it like a missing entry
    /// keeps one bad read from turning a process's whole cumulative
    /// tick count into a single interval's delta.
    pub fn cpu_percent(&self, pid: u32, current_ticks: u64, clk_tck: u64) -> f64 {
        let previous = {
            let table = self.ticks.read().expect("baseline read lock poisoned");
            table.get(&pid).copied()
        };
        {
            let mut table = self.ticks.write().expect("baseline write lock poisoned");
            table.insert(pid, current_ticks);
        }
        match previous {
            Some(prev) if prev != 0 => {
                current_ticks.saturating_sub(prev) as f64 * 100.0 / clk_tck as f64
            }
            _ => 0.0,
        }
    }

    pub fn tracked_pids(&self) -> usize {
        self.ticks.read().expect("baseline read lock poisoned").len()
    }
}

/// Collects one full sampling round over every live pid.
pub struct Sampler {
    proc_root: PathBuf,
    max_processes: usize,
    baselines: BaselineTable,
}

impl Sampler {
    pub fn new(proc_root: PathBuf, max_processes: usize) -> Self {
        Self {
            proc_root,
            max_processes,
            baselines: BaselineTable::new(),
        }
    }

    /// Number of pids with a stored CPU baseline. Never shrinks, since
    /// baselines are not evicted on process exit.
    pub fn tracked_pids(&self) -> usize {
        self.baselines.tracked_pids()
    }

    /// Runs one sampling round. Pids are unique within the returned
    /// vector; per-field probe failures degrade that sample only.
    pub fn sample_round(&self) -> Vec<ProcessSample> {
        let entries = probe::collect_proc_entries(&self.proc_root, self.max_processes);
        debug!("collected {} process entries", entries.len());

        entries
            .par_iter()
            .map(|entry| self.sample_process(entry))
            .collect()
    }

    fn sample_process(&self, entry: &ProcEntry) -> ProcessSample {
        let name = probe::read_process_name(&entry.proc_path);

        let resident_kb = match probe::read_resident_kb(&entry.proc_path) {
            Ok(kb) => Some(kb),
            Err(e) => {
                debug!("pid {}: resident memory unreadable: {}", entry.pid, e);
                None
            }
        };

        let ticks = probe::read_cpu_ticks(&entry.proc_path);
        let cpu_percent = self.baselines.cpu_percent(entry.pid, ticks, *CLK_TCK);

        // One residency probe per process per round, against the
        // resolved executable image.
        let cache_percent = match probe::resolve_exe_path(&entry.proc_path) {
            Some(exe) => match residency::cache_residency_percent(&exe) {
                Ok(pct) => Some(pct),
                Err(e) => {
                    debug!(
                        "pid {}: residency probe failed for {}: {}",
                        entry.pid,
                        exe.display(),
                        e
                    );
                    None
                }
            },
            None => None,
        };

        let score = score::impact_score(cpu_percent, resident_kb, cache_percent);

        ProcessSample {
            pid: entry.pid,
            name,
            cpu_percent,
            resident_kb,
            cache_percent,
            score,
        }
    }
}
