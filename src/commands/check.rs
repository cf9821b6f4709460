//! System validation subcommand.

use anyhow::Result;

use crate::config::{validate_effective_config, Config};
use crate::probe;
use crate::residency;

/// Validates proc readability, the residency probe, and the effective
/// configuration. Exits with status 1 when any check fails.
pub fn command_check(proc: bool, check_residency: bool, all: bool, config: &Config) -> Result<()> {
    println!("🔍 proc-cache-inspector - System Check");
    println!("======================================");

    let mut all_ok = true;

    if proc || all {
        let root = config.proc_root();
        println!("\n📁 Checking {} ...", root.display());
        if root.exists() {
            let entries = probe::collect_proc_entries(&root, 5);
            if entries.is_empty() {
                println!("   ❌ Cannot read any process entries from {}", root.display());
                all_ok = false;
            } else {
                println!("   ✅ Can read {} process entries", entries.len());
            }
        } else {
            println!("   ❌ {} not found", root.display());
            all_ok = false;
        }
    }

    if check_residency || all {
        println!("\n💾 Checking page-cache residency probe...");
        match std::env::current_exe() {
            Ok(exe) => match residency::cache_residency_percent(&exe) {
                Ok(pct) => {
                    println!("   ✅ Own executable is {:.2}% resident in the page cache", pct)
                }
                Err(e) => {
                    println!("   ❌ Residency probe failed for {}: {}", exe.display(), e);
                    all_ok = false;
                }
            },
            Err(e) => {
                println!("   ❌ Cannot resolve own executable: {}", e);
                all_ok = false;
            }
        }
    }

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - system is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}
