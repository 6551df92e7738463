//! Config command implementations

use colored::Colorize;

use crate::cli::context::load_config;
use crate::cli::{GlobalOptions, OutputFormat};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{json, table};

/// Print the effective configuration (file plus overrides)
pub fn show(opts: &GlobalOptions) -> Result<()> {
    let path = Config::resolve_path(opts.config_ref())?;
    let config = load_config(opts)?;

    match opts.format {
        OutputFormat::Json => println!("{}", json::format_json(&config)?),
        OutputFormat::Table => {
            let pairs = vec![
                ("path", path.display().to_string()),
                ("base_url", config.base_url.clone()),
                ("fetch.max_attempts", config.fetch.max_attempts.to_string()),
                ("fetch.timeout_ms", config.fetch.timeout_ms.to_string()),
                ("fetch.retry_delay_ms", config.fetch.retry_delay_ms.to_string()),
                ("cache.ttl_secs", config.cache.ttl_secs.to_string()),
                ("refresh.interval_secs", config.refresh.interval_secs.to_string()),
                ("probe.base_urls", config.probe.base_urls.join(", ")),
            ];
            println!("{}", table::format_pairs(pairs));
        }
        OutputFormat::Pretty => {
            let origin = if path.exists() {
                path.display().to_string().cyan()
            } else {
                format!("{} (not found, using defaults)", path.display()).dimmed()
            };
            println!("Config file: {}\n", origin);

            let yaml = serde_yaml::to_string(&config)
                .map_err(|e| Error::Other(format!("Failed to render configuration: {}", e)))?;
            print!("{}", yaml);
        }
    }

    Ok(())
}

/// Write a default configuration file
pub fn init(opts: &GlobalOptions, force: bool) -> Result<()> {
    let path = Config::resolve_path(opts.config_ref())?;

    if path.exists() && !force {
        return Err(Error::Other(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let mut config = Config::default();
    config.apply_overrides(opts.base_url_ref(), opts.timeout_ms, opts.retries);
    config.validate()?;
    config.save_to(&path)?;

    println!(
        "{} Wrote configuration to {}",
        "✓".green(),
        path.display().to_string().cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn opts_for(path: &std::path::Path) -> GlobalOptions {
        GlobalOptions {
            config: Some(path.to_string_lossy().to_string()),
            ..GlobalOptions::default()
        }
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trafdash").join("config.yaml");
        let mut opts = opts_for(&path);
        opts.base_url = Some("http://10.1.1.1:8080/api".to_string());

        init(&opts, false).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.base_url, "http://10.1.1.1:8080/api");
        assert_eq!(loaded.fetch.max_attempts, 3);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "base_url: http://keep/api\n").unwrap();
        let opts = opts_for(&path);

        assert!(init(&opts, false).is_err());
        assert!(std::fs::read_to_string(&path).unwrap().contains("keep"));

        init(&opts, true).unwrap();
        assert!(!std::fs::read_to_string(&path).unwrap().contains("keep"));
    }

    #[test]
    fn test_show_missing_explicit_config_fails() {
        let dir = TempDir::new().unwrap();
        let opts = opts_for(&dir.path().join("absent.yaml"));

        assert!(show(&opts).is_err());
    }
}
