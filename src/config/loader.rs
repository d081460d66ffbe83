//! Configuration loading

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{LiftoffError, LiftoffResult};

use super::types::{Config, ProviderKind};

pub use crate::domain::value_objects::ConfigWarning;

/// File name looked up at the project root
pub const CONFIG_FILE: &str = "liftoff.toml";

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> LiftoffResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| LiftoffError::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|key| {
            let leaf = key.split('.').next_back().unwrap_or(key.as_str()).to_string();
            ConfigWarning {
                line: find_line_number(&content, &leaf),
                suggestion: suggest_key(&leaf),
                file: path.to_path_buf(),
                key,
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load `liftoff.toml` from `project_root` if present, then apply env overrides
pub fn load_or_default(project_root: &Path) -> LiftoffResult<(Config, Vec<ConfigWarning>)> {
    let path = project_root.join(CONFIG_FILE);
    let (config, warnings) = if path.exists() {
        debug!(path = %path.display(), "loading configuration");
        load_with_warnings(&path)?
    } else {
        (Config::default(), Vec::new())
    };
    Ok((with_env_overrides(config, |key| std::env::var(key).ok()), warnings))
}

/// Apply environment variable overrides (LIFTOFF_* prefix).
///
/// Unparseable numeric values are ignored.
pub fn with_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(stage) = lookup("LIFTOFF_STAGE") {
        config.deploy.stage = stage;
    }
    if let Some(region) = lookup("LIFTOFF_REGION") {
        config.deploy.region = Some(region);
    }
    if let Some(dir) = lookup("LIFTOFF_BUILD_DIR") {
        config.deploy.build_dir = dir.into();
    }
    if let Some(dir) = lookup("LIFTOFF_DESCRIPTOR_DIR") {
        config.deploy.descriptor_dir = dir.into();
    }
    if let Some(dir) = lookup("LIFTOFF_STATE_DIR") {
        config.deploy.state_dir = dir.into();
    }
    if let Some(n) = lookup("LIFTOFF_UPLOAD_CONCURRENCY").and_then(|v| v.parse().ok()) {
        config.deploy.upload_concurrency = n;
    }
    if let Some(n) = lookup("LIFTOFF_POLL_INTERVAL_SECS").and_then(|v| v.parse().ok()) {
        config.polling.interval_secs = n;
    }
    if let Some(n) = lookup("LIFTOFF_POLL_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        config.polling.timeout_secs = n;
    }
    if let Some(n) = lookup("LIFTOFF_EXPORT_ATTEMPTS").and_then(|v| v.parse().ok()) {
        config.exports.attempts = n;
    }
    if let Some(n) = lookup("LIFTOFF_EXPORT_INTERVAL_SECS").and_then(|v| v.parse().ok()) {
        config.exports.interval_secs = n;
    }
    if let Some(kind) = lookup("LIFTOFF_PROVIDER").and_then(|v| v.parse::<ProviderKind>().ok()) {
        config.provider.kind = kind;
    }
    if let Some(root) = lookup("LIFTOFF_LOCAL_ROOT") {
        config.provider.root = root.into();
    }
    if let Some(endpoint) = lookup("LIFTOFF_ENDPOINT") {
        config.provider.endpoint = Some(endpoint);
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

pub(super) fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "deploy",
        "region",
        "stage",
        "build_dir",
        "descriptor_dir",
        "state_dir",
        "upload_concurrency",
        "polling",
        "interval_secs",
        "timeout_secs",
        "exports",
        "attempts",
        "provider",
        "kind",
        "root",
        "endpoint",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
