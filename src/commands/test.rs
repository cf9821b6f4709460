//! One-shot sampling subcommand.
//!
//! Runs a fixed number of sampling rounds without clearing the screen,
//! separated by the configured interval so CPU deltas are meaningful
//! from the second round on. Useful for verifying the probes under a
//! synthetic load without attaching the live loop.

use anyhow::Result;
use std::thread;
use std::time::Instant;

use crate::config::Config;
use crate::render;
use crate::sampler::Sampler;
use crate::score;

pub fn command_test(rounds: usize, verbose: bool, config: &Config) -> Result<()> {
    println!("🧪 proc-cache-inspector - Test Mode");
    println!("===================================");

    let sampler = Sampler::new(config.proc_root(), config.max_processes());

    for round in 1..=rounds {
        let start = Instant::now();
        let samples = sampler.sample_round();
        let ranked = score::rank(samples);
        let summary = score::summarize(&ranked);
        let duration = start.elapsed();

        println!(
            "\n🔄 Round {}/{}: {} processes sampled in {:.2}ms",
            round,
            rounds,
            summary.process_count,
            duration.as_secs_f64() * 1000.0
        );

        if verbose {
            for s in ranked.iter().take(10) {
                println!("   ├─ {} (PID: {})", s.name, s.pid);
                println!("   │  ├─ CPU:   {:.2}%", s.cpu_percent);
                match s.resident_kb {
                    Some(kb) => println!("   │  ├─ RSS:   {} KB", kb),
                    None => println!("   │  ├─ RSS:   unreadable"),
                }
                match s.cache_percent {
                    Some(pct) => println!("   │  ├─ Cache: {:.2}%", pct),
                    None => println!("   │  ├─ Cache: unprobeable"),
                }
                println!("   │  └─ Score: {:.2}", s.score);
            }
        } else {
            print!(
                "{}",
                render::render_round(&ranked, &summary, config.top_n(), config.interval().as_secs())
            );
        }

        if round < rounds {
            thread::sleep(config.interval());
        }
    }

    println!("\n✅ Test completed successfully");
    Ok(())
}
