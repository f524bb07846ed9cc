use std::{fs, io, path::Path, time::Duration};

use anyhow::Context;
use menu_state::DEFAULT_COMPACT_BREAKPOINT;
use nav_client::DEFAULT_CACHE_TTL;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub cms_url: Option<String>,
    pub cms_api_token: Option<String>,
    pub nav_cache_ttl: Duration,
    pub compact_breakpoint: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cms_url: None,
            cms_api_token: None,
            nav_cache_ttl: DEFAULT_CACHE_TTL,
            compact_breakpoint: DEFAULT_COMPACT_BREAKPOINT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    cms_url: Option<String>,
    cms_api_token: Option<String>,
    nav_cache_ttl_seconds: Option<u64>,
    compact_breakpoint: Option<u32>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid cms url '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("unsupported cms url scheme '{scheme}'")]
    UnsupportedScheme { scheme: String },
}

pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

/// Defaults, then the optional config file, then environment overrides. The
/// `APP__` variants win over the bare names.
pub fn load_settings_with(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
            if let Some(v) = file_cfg.cms_url {
                settings.cms_url = Some(v);
            }
            if let Some(v) = file_cfg.cms_api_token {
                settings.cms_api_token = Some(v);
            }
            if let Some(v) = file_cfg.nav_cache_ttl_seconds {
                settings.nav_cache_ttl = Duration::from_secs(v);
            }
            if let Some(v) = file_cfg.compact_breakpoint {
                settings.compact_breakpoint = v;
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
    }

    if let Some(v) = env("CMS_URL") {
        settings.cms_url = Some(v);
    }
    if let Some(v) = env("APP__CMS_URL") {
        settings.cms_url = Some(v);
    }

    if let Some(v) = env("CMS_API_TOKEN") {
        settings.cms_api_token = Some(v);
    }
    if let Some(v) = env("APP__CMS_API_TOKEN") {
        settings.cms_api_token = Some(v);
    }

    if let Some(v) = env("APP__NAV_CACHE_TTL_SECONDS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.nav_cache_ttl = Duration::from_secs(parsed),
            Err(_) => warn!(value = %v, "config: ignoring invalid APP__NAV_CACHE_TTL_SECONDS"),
        }
    }
    if let Some(v) = env("APP__COMPACT_BREAKPOINT") {
        match v.parse::<u32>() {
            Ok(parsed) => settings.compact_breakpoint = parsed,
            Err(_) => warn!(value = %v, "config: ignoring invalid APP__COMPACT_BREAKPOINT"),
        }
    }

    settings.cms_url = settings
        .cms_url
        .and_then(|raw| match normalize_cms_url(&raw) {
            Ok(url) => url,
            Err(err) => {
                warn!(error = %err, "config: cms url unusable, navigation will use fallback items");
                None
            }
        });
    settings.cms_api_token = settings
        .cms_api_token
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    Ok(settings)
}

/// Blank means unset. Anything else must be an http(s) URL; the trailing
/// slash is dropped so paths can be appended.
fn normalize_cms_url(raw: &str) -> Result<Option<String>, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let parsed = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme {
            scheme: parsed.scheme().to_string(),
        });
    }

    Ok(Some(raw.trim_end_matches('/').to_string()))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
