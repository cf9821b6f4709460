//! Terminal rendering of the ranked table and summary block.

use crossterm::{cursor, execute, terminal};
use std::fmt::Write as FmtWrite;
use std::io;

use crate::sampler::ProcessSample;
use crate::score::Summary;

const NAME_WIDTH: usize = 22;

/// Clears the terminal and moves the cursor home so the next round
/// re-renders in place.
pub fn clear_screen() -> io::Result<()> {
    execute!(
        io::stdout(),
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(0, 0)
    )
}

/// Renders one round: header, system-wide summary, then the ranked
/// table truncated to `top_n` rows. Failed per-field probes render as
/// "-" rather than a number.
pub fn render_round(
    ranked: &[ProcessSample],
    summary: &Summary,
    top_n: usize,
    interval_secs: u64,
) -> String {
    let mut out = String::new();

    writeln!(out, "========== Filesystem Cache Inspector ==========").ok();
    writeln!(
        out,
        "Mode: combined resource impact (refresh {}s)",
        interval_secs
    )
    .ok();
    writeln!(out, "{}", "\u{2500}".repeat(72)).ok();

    writeln!(out).ok();
    writeln!(out, "System-Wide Summary").ok();
    writeln!(out, "{}", "\u{2500}".repeat(44)).ok();
    writeln!(out, "Total CPU usage:    {:8.2} %", summary.total_cpu_percent).ok();
    writeln!(
        out,
        "Total Memory usage: {:8.2} GB",
        summary.total_memory_kb as f64 / 1024.0 / 1024.0
    )
    .ok();
    writeln!(out, "Avg Cache usage:    {:8.2} %", summary.avg_cache_percent).ok();
    writeln!(out, "Processes counted:  {:8}", summary.process_count).ok();
    writeln!(out, "{}", "\u{2500}".repeat(44)).ok();
    writeln!(out).ok();

    writeln!(
        out,
        "{:<6} {:<22} {:>8} {:>12} {:>10} {:>10}",
        "PID", "Process", "CPU%", "Mem(KB)", "Cache%", "Score"
    )
    .ok();
    writeln!(out, "{}", "\u{2500}".repeat(72)).ok();

    for s in ranked.iter().take(top_n) {
        writeln!(
            out,
            "{:<6} {:<22} {:>8.2} {:>12} {:>10} {:>10.2}",
            s.pid,
            truncate_name(&s.name),
            s.cpu_percent,
            cell_u64(s.resident_kb),
            cell_pct(s.cache_percent),
            s.score
        )
        .ok();
    }

    out
}

fn cell_u64(value: Option<u64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

fn cell_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

fn truncate_name(name: &str) -> String {
    name.chars().take(NAME_WIDTH).collect()
}
