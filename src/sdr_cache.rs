//! Daily rebuild of the FreeIPMI sensor data repository cache.
//!
//! FreeIPMI keeps one SDR cache file per host. Descriptors rarely change,
//! so the cache is flushed at most once per calendar day: whenever a
//! matching file was last written before today.

use crate::config::ScrapeSettings;
use crate::metrics::collector::{CollectorName, Target};
use crate::metrics::collectors::sensors;
use crate::metrics::traits::Executor;
use chrono::{DateTime, Local, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use sysinfo::System;
use tracing::{debug, error, info};

const FLUSH_ARGS: &[&str] = &["--flush-cache"];

/// Whether a cache written at `modified` must be rebuilt on `today`.
pub fn is_stale(modified: SystemTime, today: NaiveDate) -> bool {
    DateTime::<Local>::from(modified).date_naive() < today
}

/// Substring that identifies the cache files of `target`.
///
/// The local BMC has no host name in the scrape, so its cache is matched on
/// the machine's own hostname.
pub fn cache_key(target: &Target) -> String {
    if !target.is_local() {
        return target.host.clone();
    }
    System::host_name()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Cache files under `dir` belonging to `key` that are stale on `today`.
///
/// A missing directory means no cache exists yet. Files that cannot be
/// inspected are logged and skipped.
pub fn stale_cache_files(dir: &Path, key: &str, today: NaiveDate) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "SDR cache directory not readable");
            return Vec::new();
        }
    };

    let mut stale = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                error!(dir = %dir.display(), error = %e, "Failed to list SDR cache directory");
                continue;
            }
        };
        if !entry.file_name().to_string_lossy().contains(key) {
            continue;
        }
        let path = entry.path();
        let modified = match entry.metadata().and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to stat SDR cache file");
                continue;
            }
        };
        debug!(
            path = %path.display(),
            modified = %DateTime::<Local>::from(modified),
            "SDR cache age"
        );
        if is_stale(modified, today) {
            stale.push(path);
        }
    }
    stale
}

/// Rebuild the SDR cache of `target` if any of its files is stale.
///
/// Returns whether a rebuild was started. Failures are logged and never
/// abort the scrape.
pub async fn flush_if_stale<E: Executor>(
    executor: &E,
    settings: &ScrapeSettings,
    target: &Target,
    config: &str,
) -> bool {
    let key = cache_key(target);
    let today = Local::now().date_naive();
    let dir = settings.sdr_cache_dir.clone();
    let scan = tokio::task::spawn_blocking(move || stale_cache_files(&dir, &key, today));
    let stale = match scan.await {
        Ok(stale) => stale,
        Err(e) => {
            error!(host = target.name(), error = %e, "SDR cache scan failed");
            return false;
        }
    };
    if stale.is_empty() {
        return false;
    }

    info!(host = target.name(), files = stale.len(), "Flushing stale SDR cache");
    let command = match target.config.command_override(CollectorName::Ipmi) {
        Some(command) => command.to_string(),
        None => settings.command_path(sensors::COMMAND),
    };
    let args: Vec<String> = FLUSH_ARGS.iter().map(|arg| arg.to_string()).collect();
    let result = executor.execute(&command, &args, config, &target.host).await;
    if let Some(e) = result.error() {
        error!(host = target.name(), error = %e, "Failed to flush SDR cache");
    }
    true
}
