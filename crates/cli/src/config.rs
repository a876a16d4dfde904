use anyhow::{Context, Result};
use nodefinder_search::LinkTemplates;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_UPSTREAM: &str = "https://harvester.ffh.zone/nodes.json";

pub const ENV_CONFIG: &str = "NODEFINDER_CONFIG";
pub const ENV_UPSTREAM: &str = "NODEFINDER_UPSTREAM";
pub const ENV_CACHE_FILE: &str = "NODEFINDER_CACHE_FILE";

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub upstream: Option<String>,
    pub cache_file: Option<PathBuf>,
    pub cache_ttl_seconds: Option<u64>,
    #[serde(default)]
    pub links: LinkTemplates,
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub upstream: Option<String>,
    pub cache_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub upstream: String,
    pub cache_file: PathBuf,
    /// `None`: a cached document never expires.
    pub cache_ttl: Option<Duration>,
    pub links: LinkTemplates,
}

pub fn load_file(path: &Path) -> Result<FileConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Invalid config {}", path.display()))
}

pub fn resolve(overrides: &Overrides) -> Result<Settings> {
    resolve_with(overrides, |key| std::env::var(key).ok())
}

/// Merge flags, environment, config file and defaults, in that order.
pub fn resolve_with(
    overrides: &Overrides,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings> {
    let explicit = overrides
        .config
        .clone()
        .or_else(|| env(ENV_CONFIG).map(PathBuf::from));

    let file = match explicit {
        Some(path) => load_file(&path)?,
        None => match default_config_path().filter(|path| path.is_file()) {
            Some(path) => {
                log::debug!("Using config {}", path.display());
                load_file(&path)?
            }
            None => FileConfig::default(),
        },
    };

    let upstream = overrides
        .upstream
        .clone()
        .or_else(|| env(ENV_UPSTREAM))
        .or(file.upstream)
        .unwrap_or_else(|| DEFAULT_UPSTREAM.to_string());

    let cache_file = overrides
        .cache_file
        .clone()
        .or_else(|| env(ENV_CACHE_FILE).map(PathBuf::from))
        .or(file.cache_file)
        .unwrap_or_else(default_cache_file);

    Ok(Settings {
        upstream,
        cache_file,
        cache_ttl: file.cache_ttl_seconds.map(Duration::from_secs),
        links: file.links,
    })
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("nodefinder").join("config.toml"))
}

fn default_cache_file() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("nodefinder"))
        .unwrap_or_else(std::env::temp_dir)
        .join("nodes.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(body.as_bytes()).expect("write config");
        file
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn file_values_apply_when_nothing_overrides_them() {
        let file = write_config(
            r#"
            upstream = "https://mirror.example/nodes.json"
            cache_file = "/var/cache/nodes.json"
            cache_ttl_seconds = 600

            [links]
            map = "https://map.example/{node_id}"
            "#,
        );
        let overrides = Overrides {
            config: Some(file.path().to_path_buf()),
            ..Overrides::default()
        };
        let settings = resolve_with(&overrides, env_of(&[])).unwrap();
        assert_eq!(settings.upstream, "https://mirror.example/nodes.json");
        assert_eq!(settings.cache_file, PathBuf::from("/var/cache/nodes.json"));
        assert_eq!(settings.cache_ttl, Some(Duration::from_secs(600)));
        assert_eq!(settings.links.map_link("ab"), "https://map.example/ab");
        assert_eq!(settings.links.stats, LinkTemplates::default().stats);
    }

    #[test]
    fn flags_beat_env_beat_file() {
        let file = write_config(r#"upstream = "https://file.example/nodes.json""#);
        let env = env_of(&[
            (ENV_CONFIG, file.path().to_str().unwrap()),
            (ENV_UPSTREAM, "https://env.example/nodes.json"),
            (ENV_CACHE_FILE, "/tmp/env-nodes.json"),
        ]);

        let settings = resolve_with(&Overrides::default(), &env).unwrap();
        assert_eq!(settings.upstream, "https://env.example/nodes.json");
        assert_eq!(settings.cache_file, PathBuf::from("/tmp/env-nodes.json"));

        let overrides = Overrides {
            upstream: Some("https://flag.example/nodes.json".to_string()),
            cache_file: Some(PathBuf::from("/tmp/flag-nodes.json")),
            ..Overrides::default()
        };
        let settings = resolve_with(&overrides, &env).unwrap();
        assert_eq!(settings.upstream, "https://flag.example/nodes.json");
        assert_eq!(settings.cache_file, PathBuf::from("/tmp/flag-nodes.json"));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let overrides = Overrides {
            config: Some(PathBuf::from("/nonexistent/nodefinder.toml")),
            ..Overrides::default()
        };
        let err = resolve_with(&overrides, env_of(&[])).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read config"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let file = write_config(r#"upstrem = "typo""#);
        let overrides = Overrides {
            config: Some(file.path().to_path_buf()),
            ..Overrides::default()
        };
        assert!(resolve_with(&overrides, env_of(&[])).is_err());
    }

    #[test]
    fn defaults_without_config() {
        let empty = write_config("");
        let overrides = Overrides {
            config: Some(empty.path().to_path_buf()),
            ..Overrides::default()
        };
        let settings = resolve_with(&overrides, env_of(&[])).unwrap();
        assert_eq!(settings.upstream, DEFAULT_UPSTREAM);
        assert!(settings.cache_file.ends_with("nodes.json"));
        assert_eq!(settings.cache_ttl, None);
        assert_eq!(settings.links, LinkTemplates::default());
    }
}
