//! Weighted impact scoring, ranking, and system-wide aggregates.

use crate::sampler::ProcessSample;

/// Fixed score weights: 60% CPU, 30% memory-in-MB, 10% cache residency.
pub const CPU_WEIGHT: f64 = 0.6;
pub const MEMORY_WEIGHT: f64 = 0.3;
pub const CACHE_WEIGHT: f64 = 0.1;

/// Combined resource-impact score.
///
/// A failed metric contributes zero to the weighted sum. The historical
/// behavior fed a negative probe sentinel straight into the arithmetic,
/// which could depress a process's score below its real impact; that is
/// deliberately not reproduced here.
pub fn impact_score(cpu_percent: f64, resident_kb: Option<u64>, cache_percent: Option<f64>) -> f64 {
    let mem_mb = resident_kb.unwrap_or(0) as f64 / 1024.0;
    let cache = cache_percent.unwrap_or(0.0);
    cpu_percent * CPU_WEIGHT + mem_mb * MEMORY_WEIGHT + cache * CACHE_WEIGHT
}

/// Sorts samples descending by score. Tie order is unspecified.
pub fn rank(mut samples: Vec<ProcessSample>) -> Vec<ProcessSample> {
    samples.sort_by(|a, b| b.score.total_cmp(&a.score));
    samples
}

/// System-wide aggregates over one full sampling round.
#[derive(Debug, Clone, Copy, Default)]
pub struct Summary {
    pub total_cpu_percent: f64,
    pub total_memory_kb: u64,
    pub avg_cache_percent: f64,
    pub process_count: usize,
}

/// Aggregates over the full sampled set, never the truncated display
/// subset. Failed per-field probes contribute zero.
pub fn summarize(samples: &[ProcessSample]) -> Summary {
    let mut summary = Summary {
        process_count: samples.len(),
        ..Summary::default()
    };

    let mut cache_sum = 0.0;
    for s in samples {
        summary.total_cpu_percent += s.cpu_percent;
        summary.total_memory_kb += s.resident_kb.unwrap_or(0);
        cache_sum += s.cache_percent.unwrap_or(0.0);
    }
    if !samples.is_empty() {
        summary.avg_cache_percent = cache_sum / samples.len() as f64;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(pid: u32, score: f64) -> ProcessSample {
        ProcessSample {
            pid,
            name: format!("proc-{}", pid),
            cpu_percent: 0.0,
            resident_kb: None,
            cache_percent: None,
            score,
        }
    }

    #[test]
    fn score_is_deterministic_weighted_sum() {
        // 50*0.6 + 1*0.3 + 100*0.1 = 40.3
        let score = impact_score(50.0, Some(1024), Some(100.0));
        assert!((score - 40.3).abs() < 1e-9);
    }

    #[test]
    fn failed_fields_contribute_zero() {
        assert!((impact_score(50.0, None, None) - 30.0).abs() < 1e-9);
        assert!((impact_score(0.0, Some(2048), None) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn ranking_is_descending_by_score() {
        let ranked = rank(vec![sample(1, 10.0), sample(2, 30.0), sample(3, 20.0)]);
        let scores: Vec<f64> = ranked.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![30.0, 20.0, 10.0]);
    }

    #[test]
    fn summary_covers_full_set_beyond_display_cutoff() {
        let mut samples = Vec::new();
        for pid in 0..35u32 {
            samples.push(ProcessSample {
                pid,
                name: format!("proc-{}", pid),
                cpu_percent: 1.0,
                resident_kb: Some(1024),
                cache_percent: Some(50.0),
                score: pid as f64,
            });
        }

        let summary = summarize(&samples);
        assert_eq!(summary.process_count, 35);
        assert!((summary.total_cpu_percent - 35.0).abs() < 1e-9);
        assert_eq!(summary.total_memory_kb, 35 * 1024);
        assert!((summary.avg_cache_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn empty_round_summarizes_to_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.process_count, 0);
        assert_eq!(summary.avg_cache_percent, 0.0);
    }

    #[test]
    fn failed_probe_does_not_disturb_other_samples() {
        let healthy = impact_score(10.0, Some(10 * 1024), Some(80.0));
        let samples = vec![
            ProcessSample {
                pid: 1,
                name: "healthy".into(),
                cpu_percent: 10.0,
                resident_kb: Some(10 * 1024),
                cache_percent: Some(80.0),
                score: healthy,
            },
            ProcessSample {
                pid: 2,
                name: "broken".into(),
                cpu_percent: 0.0,
                resident_kb: None,
                cache_percent: None,
                score: impact_score(0.0, None, None),
            },
        ];

        let ranked = rank(samples);
        assert_eq!(ranked[0].pid, 1);
        assert!((ranked[0].score - (10.0 * 0.6 + 10.0 * 0.3 + 80.0 * 0.1)).abs() < 1e-9);
        assert_eq!(ranked[1].score, 0.0);
    }
}
