//! Configuration file generation subcommand.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Writes a default configuration file in the requested format, or
/// prints it to stdout when the output path is "-".
pub fn command_config(output: Option<PathBuf>, format: ConfigFormat) -> Result<()> {
    let config = Config::default();
    let output = output.unwrap_or_else(|| PathBuf::from("proc-cache-inspector.yaml"));

    let content = render_config(&config, &format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generated.yaml");
        command_config(Some(path.clone()), ConfigFormat::Yaml).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: Config = serde_yaml::from_str(&content).unwrap();
        assert_eq!(parsed.interval_secs, Some(1));
        assert_eq!(parsed.top_n, Some(30));
    }
}
