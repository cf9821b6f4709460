//! Configuration loading and resolution for proc-cache-inspector.
//!
//! Configuration values come from three layers with fixed precedence:
//! CLI arguments > config file > built-in defaults. Config files are
//! discovered at default locations unless a path is given explicitly,
//! and the format is chosen by file extension (YAML default, JSON, TOML).

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::cli::{Args, ConfigFormat};

pub const DEFAULT_INTERVAL_SECS: u64 = 1;
pub const DEFAULT_TOP_N: usize = 30;
pub const DEFAULT_MAX_PROCESSES: usize = 4096;
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Effective inspector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Seconds between sampling rounds
    pub interval_secs: Option<u64>,
    /// Number of ranked processes to display
    pub top_n: Option<usize>,
    /// Maximum processes scanned per round (excess is silently dropped)
    pub max_processes: Option<usize>,
    /// Proc filesystem root
    pub proc_root: Option<PathBuf>,
    /// Parallel probing threads (absent = auto)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<usize>,
    /// Log level: off, error, warn, info, debug, trace
    pub log_level: Option<String>,
    /// Clear the screen between rounds
    pub clear_screen: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_secs: Some(DEFAULT_INTERVAL_SECS),
            top_n: Some(DEFAULT_TOP_N),
            max_processes: Some(DEFAULT_MAX_PROCESSES),
            proc_root: Some(PathBuf::from(DEFAULT_PROC_ROOT)),
            parallelism: None,
            log_level: Some("warn".into()),
            clear_screen: Some(true),
        }
    }
}

impl Config {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.unwrap_or(DEFAULT_INTERVAL_SECS))
    }

    pub fn top_n(&self) -> usize {
        self.top_n.unwrap_or(DEFAULT_TOP_N)
    }

    pub fn max_processes(&self) -> usize {
        self.max_processes.unwrap_or(DEFAULT_MAX_PROCESSES)
    }

    pub fn proc_root(&self) -> PathBuf {
        self.proc_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT))
    }

    pub fn clear_screen(&self) -> bool {
        self.clear_screen.unwrap_or(true)
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<()> {
    if cfg.interval_secs == Some(0) {
        bail!("interval_secs must be at least 1");
    }
    if cfg.top_n == Some(0) {
        bail!("top_n must be at least 1");
    }
    if cfg.max_processes == Some(0) {
        bail!("max_processes must be at least 1");
    }
    if let Some(level) = cfg.log_level.as_deref() {
        match level {
            "off" | "error" | "warn" | "info" | "debug" | "trace" => {}
            other => bail!(
                "Invalid log_level '{}', expected off/error/warn/info/debug/trace",
                other
            ),
        }
    }
    Ok(())
}

/// Enhanced configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = if let Some(p) = path {
        p.to_path_buf()
    } else {
        // Try default locations
        let defaults = [
            "/etc/proc-cache-inspector/config.yaml",
            "/etc/proc-cache-inspector/config.yml",
            "/etc/proc-cache-inspector/config.json",
            "./proc-cache-inspector.yaml",
            "./proc-cache-inspector.yml",
            "./proc-cache-inspector.json",
        ];

        defaults
            .iter()
            .find(|p| Path::new(p).exists())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(""))
    };

    if !path.exists() || path.to_string_lossy().is_empty() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Resolves configuration from CLI args, config file, and defaults.
/// Precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(secs) = args.interval_secs {
        config.interval_secs = Some(secs);
    }
    if let Some(n) = args.top_n {
        config.top_n = Some(n);
    }
    if let Some(n) = args.max_processes {
        config.max_processes = Some(n);
    }
    if let Some(root) = &args.proc_root {
        config.proc_root = Some(root.clone());
    }
    if args.parallelism.is_some() {
        config.parallelism = args.parallelism;
    }
    if args.no_clear {
        config.clear_screen = Some(false);
    }

    Ok(config)
}

/// Renders the config in the requested format (used by --show-config
/// and the `config` subcommand).
pub fn render_config(config: &Config, format: &ConfigFormat) -> Result<String> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(validate_effective_config(&config).is_ok());
        assert_eq!(config.interval(), Duration::from_secs(1));
        assert_eq!(config.top_n(), 30);
        assert_eq!(config.max_processes(), 4096);
        assert_eq!(config.proc_root(), PathBuf::from("/proc"));
        assert!(config.clear_screen());
    }

    #[test]
    fn cli_overrides_win() {
        let args = Args::parse_from([
            "proc-cache-inspector",
            "--no-config",
            "-i",
            "3",
            "--top-n",
            "5",
            "--no-clear",
        ]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.interval_secs, Some(3));
        assert_eq!(config.top_n, Some(5));
        assert_eq!(config.clear_screen, Some(false));
        // untouched fields keep their defaults
        assert_eq!(config.max_processes, Some(DEFAULT_MAX_PROCESSES));
    }

    #[test]
    fn rejects_zero_interval() {
        let config = Config {
            interval_secs: Some(0),
            ..Config::default()
        };
        assert!(validate_effective_config(&config).is_err());
    }

    #[test]
    fn rejects_unknown_log_level() {
        let config = Config {
            log_level: Some("verbose".into()),
            ..Config::default()
        };
        assert!(validate_effective_config(&config).is_err());
    }

    #[test]
    fn loads_yaml_config_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        writeln!(file, "interval_secs: 7\ntop_n: 12").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.interval_secs, Some(7));
        assert_eq!(config.top_n, Some(12));
        assert_eq!(config.max_processes, None);
    }

    #[test]
    fn loads_toml_config_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "interval_secs = 2\nclear_screen = false").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.interval_secs, Some(2));
        assert_eq!(config.clear_screen, Some(false));
    }

    #[test]
    fn renders_all_formats() {
        // TOML cannot represent a bare None, so render a fully populated config.
        let config = Config {
            parallelism: Some(4),
            ..Config::default()
        };
        for format in [ConfigFormat::Yaml, ConfigFormat::Json, ConfigFormat::Toml] {
            let rendered = render_config(&config, &format).unwrap();
            assert!(rendered.contains("interval_secs"));
        }
    }
}
