use anyhow::{Context, Result};
use nodefinder_protocol::{MalformedPolicy, Registry};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::fs;

use crate::config::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Missing,
    Fresh,
    Stale,
}

/// Whether the cached document at `path` can be used as is.
pub fn cache_state(path: &Path, ttl: Option<Duration>) -> CacheState {
    let Ok(meta) = std::fs::metadata(path) else {
        return CacheState::Missing;
    };
    let Some(ttl) = ttl else {
        return CacheState::Fresh;
    };
    let age = meta
        .modified()
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .unwrap_or_default();
    if age > ttl {
        log::debug!("Cached registry is {}s old", age.as_secs());
        CacheState::Stale
    } else {
        CacheState::Fresh
    }
}

/// Load the registry from the local cache, downloading it first when it
/// is missing, stale or `force_update` is set.
pub async fn load_registry(
    settings: &Settings,
    force_update: bool,
    policy: MalformedPolicy,
) -> Result<Registry> {
    let state = cache_state(&settings.cache_file, settings.cache_ttl);
    if force_update || state != CacheState::Fresh {
        download(&settings.upstream, &settings.cache_file).await?;
    } else {
        log::debug!("Using cached registry {}", settings.cache_file.display());
    }

    let bytes = fs::read(&settings.cache_file)
        .await
        .with_context(|| format!("Failed to read {}", settings.cache_file.display()))?;
    let registry = Registry::from_slice(&bytes, policy)
        .with_context(|| format!("Invalid registry {}", settings.cache_file.display()))?;
    log::debug!(
        "Loaded {} nodes from {}",
        registry.nodes.len(),
        settings.cache_file.display()
    );
    Ok(registry)
}

async fn download(url: &str, dest: &Path) -> Result<()> {
    log::info!("Downloading data from {url}...");

    let client = Client::builder()
        .user_agent(concat!("nodefinder/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;
    let body = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Download failed: GET {url}"))?
        .error_for_status()
        .with_context(|| format!("Download failed: GET {url}"))?
        .bytes()
        .await
        .with_context(|| format!("Failed while reading HTTP body from {url}"))?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let tmp_path = temp_path_for(dest);
    fs::write(&tmp_path, &body)
        .await
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    fs::rename(&tmp_path, dest).await.with_context(|| {
        format!(
            "Failed to move {} to {}",
            tmp_path.display(),
            dest.display()
        )
    })?;

    log::debug!("Stored {} bytes in {}", body.len(), dest.display());
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    PathBuf::from(format!("{}.{}.download", path.display(), ts))
}
