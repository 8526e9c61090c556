use std::path::{Path, PathBuf};

use super::types::{AppConfig, ReportConfig, RuntimeConfig, WebhookReportConfig};
use crate::config::ReplayRuntimeConfig;

/// Get the default aic data directory: ~/.aic
pub fn get_aic_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".aic"))
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("read config {}: {e}", path.display()))?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("parse config {}: {e}", path.display()))?;
    Ok(cfg)
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: $AIC_CONFIG (explicit path)
    let explicit = std::env::var("AIC_CONFIG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);

    // Priority 2: ~/.aic/config.toml
    let home_config = get_aic_data_dir().ok().map(|d| d.join("config.toml"));

    // Priority 3: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let mut cfg = if let Some(path) = explicit {
        load_from_path(&path)?
    } else if let Some(path) = home_config.filter(|p| p.exists()) {
        load_from_path(&path)?
    } else if local_config.exists() {
        load_from_path(local_config)?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

/// Environment variable overrides (highest priority).
fn apply_env_overrides(cfg: &mut AppConfig) {
    if let Some(v) = non_empty_env("AIC_LOG_LEVEL") {
        cfg.logging.level = v;
    }

    if let Some(v) = non_empty_env("AIC_RUNTIME_EVENTS_FILE") {
        match cfg.runtime {
            RuntimeConfig::Replay(ref mut r) => r.events_file = v,
            RuntimeConfig::Playbook(_) => {
                cfg.runtime = RuntimeConfig::Replay(ReplayRuntimeConfig { events_file: v });
            }
        }
    }

    if let Some(v) = non_empty_env("AIC_REPORT_WEBHOOK_URL") {
        match cfg.report {
            ReportConfig::Webhook(ref mut w) => w.url = v,
            _ => cfg.report = ReportConfig::Webhook(WebhookReportConfig::new(v)),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
