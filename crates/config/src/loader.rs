use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::schema::TeamlineConfig;

/// Standard config file name, checked in the working directory.
const CONFIG_FILENAME: &str = "teamline.toml";

/// Load config from the given path.
pub fn load_config(path: &Path) -> anyhow::Result<TeamlineConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))
}

/// Discover and load config from the working directory.
///
/// Returns `TeamlineConfig::default()` if no config file is found or the
/// file fails to parse; startup validation rejects unusable defaults later.
pub fn discover_and_load() -> TeamlineConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    TeamlineConfig::default()
}

fn find_config_file() -> Option<PathBuf> {
    let p = PathBuf::from(CONFIG_FILENAME);
    p.exists().then_some(p)
}

/// Replace `${ENV_VAR}` placeholders in the raw config text.
///
/// This is how credentials reach the config without living in the file.
/// Unresolvable or malformed placeholders are left as-is.
fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    },
                }
                rest = &after[end + 1..];
            },
            // No closing brace (or empty name): emit literally and move on.
            _ => {
                out.push_str("${");
                rest = after;
            },
        }
    }

    out.push_str(rest);
    out
}
