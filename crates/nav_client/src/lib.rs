use std::{
    collections::HashSet,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{
    domain::{fallback_navigation_items, NavigationItem, SubNavigationItem},
    error::{ErrorCode, FallbackReason},
    protocol::{CmsNavigationItem, NavigationItemsResponse},
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub const NAVIGATION_ITEMS_PATH: &str = "navigation-items";
/// How long a navigation read may be reused before the source is asked again.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

const NAVIGATION_QUERY: [(&str, &str); 3] = [
    ("populate", "subItems"),
    ("sort", "order:asc"),
    ("status", "published"),
];

#[derive(Debug, Error)]
pub enum NavigationFetchError {
    #[error("navigation source {missing} is not configured")]
    NotConfigured { missing: &'static str },
    #[error("navigation source responded with {status}")]
    Status { status: StatusCode },
    #[error("navigation request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("navigation response is malformed: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("navigation source returned no usable items")]
    Empty,
}

impl NavigationFetchError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotConfigured { .. } => ErrorCode::NotConfigured,
            Self::Status { .. } => ErrorCode::Status,
            Self::Transport(_) => ErrorCode::Transport,
            Self::Decode(_) => ErrorCode::Decode,
            Self::Empty => ErrorCode::Empty,
        }
    }
}

impl From<NavigationFetchError> for FallbackReason {
    fn from(value: NavigationFetchError) -> Self {
        Self::new(value.code(), value.to_string())
    }
}

/// Items produced by a [`NavigationSource`], with the reason when they are the
/// static fallback rather than fetched content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    pub items: Vec<NavigationItem>,
    pub fallback: Option<FallbackReason>,
}

impl NavigationOutcome {
    pub fn fetched(items: Vec<NavigationItem>) -> Self {
        Self {
            items,
            fallback: None,
        }
    }

    pub fn fallback(reason: FallbackReason) -> Self {
        Self {
            items: fallback_navigation_items(),
            fallback: Some(reason),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

#[async_trait]
pub trait NavigationSource: Send + Sync {
    /// Never fails: any problem resolves to the fallback list.
    async fn load(&self) -> NavigationOutcome;

    async fn fetch_navigation_items(&self) -> Vec<NavigationItem> {
        self.load().await.items
    }
}

/// Always serves the fallback list. Used when a shell runs without a CMS.
pub struct StaticNavigation;

#[async_trait]
impl NavigationSource for StaticNavigation {
    async fn load(&self) -> NavigationOutcome {
        NavigationOutcome::fallback(FallbackReason::new(
            ErrorCode::NotConfigured,
            "static navigation source",
        ))
    }
}

pub struct CmsNavigationProvider {
    http: Client,
    endpoint: Option<String>,
    token: Option<String>,
}

impl CmsNavigationProvider {
    pub fn new(endpoint: Option<String>, token: Option<String>) -> Self {
        Self::with_client(Client::new(), endpoint, token)
    }

    pub fn with_client(http: Client, endpoint: Option<String>, token: Option<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.filter(|value| !value.trim().is_empty()),
            token: token.filter(|value| !value.trim().is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some() && self.token.is_some()
    }

    /// Single read against the CMS. No retries.
    pub async fn try_fetch(&self) -> Result<Vec<NavigationItem>, NavigationFetchError> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return Err(NavigationFetchError::NotConfigured {
                missing: "endpoint",
            });
        };
        let Some(token) = self.token.as_deref() else {
            return Err(NavigationFetchError::NotConfigured { missing: "token" });
        };

        let endpoint = endpoint.trim_end_matches('/');
        let response = self
            .http
            .get(format!("{endpoint}/{NAVIGATION_ITEMS_PATH}"))
            .query(&NAVIGATION_QUERY[..])
            .bearer_auth(token)
            .send()
            .await
            .map_err(NavigationFetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(NavigationFetchError::Status { status });
        }

        let body = response
            .bytes()
            .await
            .map_err(NavigationFetchError::Transport)?;
        let payload: NavigationItemsResponse =
            serde_json::from_slice(&body).map_err(NavigationFetchError::Decode)?;

        let items = map_navigation_items(payload.data.unwrap_or_default());
        if items.is_empty() {
            return Err(NavigationFetchError::Empty);
        }
        Ok(items)
    }
}

#[async_trait]
impl NavigationSource for CmsNavigationProvider {
    async fn load(&self) -> NavigationOutcome {
        match self.try_fetch().await {
            Ok(items) => {
                info!(count = items.len(), "navigation: loaded items from cms");
                NavigationOutcome::fetched(items)
            }
            Err(err) => {
                match &err {
                    NavigationFetchError::Status { .. } | NavigationFetchError::Transport(_) => {
                        error!(error = %err, "navigation: cms read failed, using fallback items")
                    }
                    _ => warn!(error = %err, "navigation: using fallback items"),
                }
                NavigationOutcome::fallback(err.into())
            }
        }
    }
}

/// Maps CMS entries field-by-field. Entries with a blank or null name or url
/// are dropped, and a url may appear only once among its siblings (first one
/// wins).
pub fn map_navigation_items(entries: Vec<CmsNavigationItem>) -> Vec<NavigationItem> {
    let mut seen_urls = HashSet::new();
    let mut items = Vec::with_capacity(entries.len());

    for entry in entries {
        let name = entry.name.unwrap_or_default();
        let url = entry.url.unwrap_or_default();
        if name.trim().is_empty() || url.trim().is_empty() {
            warn!(name = %name, url = %url, "navigation: dropping incomplete item");
            continue;
        }
        if !seen_urls.insert(url.clone()) {
            warn!(url = %url, "navigation: dropping item with duplicate url");
            continue;
        }

        let mut seen_sub_urls = HashSet::new();
        let sub_items: Vec<SubNavigationItem> = entry
            .sub_items
            .unwrap_or_default()
            .into_iter()
            .map(SubNavigationItem::from)
            .filter(|sub| {
                if sub.name.trim().is_empty() || sub.url.trim().is_empty() {
                    warn!(parent = %url, "navigation: dropping incomplete sub-item");
                    return false;
                }
                if !seen_sub_urls.insert(sub.url.clone()) {
                    warn!(parent = %url, url = %sub.url, "navigation: dropping sub-item with duplicate url");
                    return false;
                }
                true
            })
            .collect();

        items.push(NavigationItem::new(name, url).with_sub_items(sub_items));
    }

    items
}

struct CachedOutcome {
    outcome: NavigationOutcome,
    /// `None` when the ttl reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl CachedOutcome {
    fn is_fresh(&self) -> bool {
        self.expires_at
            .map_or(true, |expires_at| Instant::now() < expires_at)
    }
}

/// Reuses the last read of `inner` until `ttl` elapses.
pub struct CachedNavigation<S> {
    inner: S,
    ttl: Duration,
    entry: Mutex<Option<CachedOutcome>>,
}

impl<S: NavigationSource> CachedNavigation<S> {
    pub fn new(inner: S) -> Self {
        Self::with_ttl(inner, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entry: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub async fn invalidate(&self) {
        self.entry.lock().await.take();
    }
}

#[async_trait]
impl<S: NavigationSource> NavigationSource for CachedNavigation<S> {
    async fn load(&self) -> NavigationOutcome {
        // Held across the read so concurrent callers share one request.
        let mut guard = self.entry.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.is_fresh() {
                debug!("navigation: serving cached items");
                return cached.outcome.clone();
            }
        }

        let outcome = self.inner.load().await;
        *guard = Some(CachedOutcome {
            outcome: outcome.clone(),
            expires_at: Instant::now().checked_add(self.ttl),
        });
        outcome
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
