use super::*;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode as AxumStatus},
    routing::get,
    Router,
};
use tokio::net::TcpListener;

#[derive(Clone)]
struct CmsState {
    status: AxumStatus,
    body: &'static str,
    hits: Arc<Mutex<u32>>,
    last_query: Arc<Mutex<Option<HashMap<String, String>>>>,
    last_authorization: Arc<Mutex<Option<String>>>,
}

async fn handle_navigation_items(
    State(state): State<CmsState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (AxumStatus, &'static str) {
    *state.hits.lock().await += 1;
    *state.last_query.lock().await = Some(query);
    *state.last_authorization.lock().await = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    (state.status, state.body)
}

async fn spawn_cms(status: AxumStatus, body: &'static str) -> anyhow::Result<(String, CmsState)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = CmsState {
        status,
        body,
        hits: Arc::new(Mutex::new(0)),
        last_query: Arc::new(Mutex::new(None)),
        last_authorization: Arc::new(Mutex::new(None)),
    };
    let app = Router::new()
        .route("/navigation-items", get(handle_navigation_items))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

const TWO_ITEMS: &str = r#"{
    "data": [
        { "id": 1, "order": 1, "name": "Home", "url": "/" },
        {
            "id": 2,
            "order": 2,
            "name": "Work",
            "url": "/work",
            "subItems": [
                { "name": "Case study", "url": "/work/case-study" },
                { "name": "Talks", "url": "https://talks.example.com" }
            ]
        }
    ]
}"#;

fn provider(endpoint: &str) -> CmsNavigationProvider {
    CmsNavigationProvider::new(Some(endpoint.to_string()), Some("secret-token".to_string()))
}

#[tokio::test]
async fn missing_token_returns_fallback_without_request() {
    let (server_url, state) = spawn_cms(AxumStatus::OK, TWO_ITEMS).await.expect("spawn cms");
    let provider = CmsNavigationProvider::new(Some(server_url), None);

    let outcome = provider.load().await;

    assert_eq!(outcome.items, fallback_navigation_items());
    assert_eq!(
        outcome.fallback.as_ref().map(|reason| reason.code),
        Some(ErrorCode::NotConfigured)
    );
    assert_eq!(*state.hits.lock().await, 0);
}

#[tokio::test]
async fn missing_endpoint_returns_fallback() {
    let provider = CmsNavigationProvider::new(None, Some("secret-token".to_string()));
    assert!(!provider.is_configured());
    assert_eq!(
        provider.fetch_navigation_items().await,
        fallback_navigation_items()
    );
}

#[tokio::test]
async fn blank_configuration_counts_as_absent() {
    let provider = CmsNavigationProvider::new(Some("  ".to_string()), Some(String::new()));
    assert!(!provider.is_configured());
    assert!(matches!(
        provider.try_fetch().await,
        Err(NavigationFetchError::NotConfigured {
            missing: "endpoint"
        })
    ));
}

#[tokio::test]
async fn successful_read_maps_items_and_sends_query_and_bearer() {
    let (server_url, state) = spawn_cms(AxumStatus::OK, TWO_ITEMS).await.expect("spawn cms");

    let outcome = provider(&server_url).load().await;

    assert!(!outcome.is_fallback());
    assert_eq!(
        outcome.items,
        vec![
            NavigationItem::new("Home", "/"),
            NavigationItem::new("Work", "/work").with_sub_items(vec![
                SubNavigationItem::new("Case study", "/work/case-study"),
                SubNavigationItem::new("Talks", "https://talks.example.com"),
            ]),
        ]
    );
    assert_eq!(outcome.items[0].sub_items, None);

    let query = state.last_query.lock().await.clone().expect("query recorded");
    assert_eq!(query.get("populate").map(String::as_str), Some("subItems"));
    assert_eq!(query.get("sort").map(String::as_str), Some("order:asc"));
    assert_eq!(query.get("status").map(String::as_str), Some("published"));
    assert_eq!(
        state.last_authorization.lock().await.as_deref(),
        Some("Bearer secret-token")
    );
    assert_eq!(*state.hits.lock().await, 1);
}

#[tokio::test]
async fn trailing_slash_on_endpoint_is_ignored() {
    let (server_url, state) = spawn_cms(AxumStatus::OK, TWO_ITEMS).await.expect("spawn cms");

    let items = provider(&format!("{server_url}/")).fetch_navigation_items().await;

    assert_eq!(items.len(), 2);
    assert_eq!(*state.hits.lock().await, 1);
}

#[tokio::test]
async fn empty_sub_item_list_is_normalized_to_absent() {
    let (server_url, _state) = spawn_cms(
        AxumStatus::OK,
        r#"{ "data": [ { "name": "Home", "url": "/", "subItems": [] } ] }"#,
    )
    .await
    .expect("spawn cms");

    let items = provider(&server_url).fetch_navigation_items().await;

    assert_eq!(items, vec![NavigationItem::new("Home", "/")]);
    assert!(items[0].sub_items.is_none());
}

#[tokio::test]
async fn non_success_status_returns_fallback_every_time() {
    let (server_url, state) = spawn_cms(AxumStatus::INTERNAL_SERVER_ERROR, "boom")
        .await
        .expect("spawn cms");
    let provider = provider(&server_url);

    let first = provider.load().await;
    let second = provider.load().await;

    assert_eq!(first.items, fallback_navigation_items());
    assert_eq!(first, second);
    assert_eq!(
        first.fallback.as_ref().map(|reason| reason.code),
        Some(ErrorCode::Status)
    );
    assert_eq!(*state.hits.lock().await, 2);
}

#[tokio::test]
async fn unauthorized_status_is_reported_as_status_error() {
    let (server_url, _state) = spawn_cms(AxumStatus::UNAUTHORIZED, "{}")
        .await
        .expect("spawn cms");

    let err = provider(&server_url).try_fetch().await.expect_err("401");

    assert!(matches!(
        err,
        NavigationFetchError::Status { status } if status == StatusCode::UNAUTHORIZED
    ));
}

#[tokio::test]
async fn malformed_body_returns_fallback() {
    let (server_url, _state) = spawn_cms(AxumStatus::OK, "<html>not json</html>")
        .await
        .expect("spawn cms");

    let outcome = provider(&server_url).load().await;

    assert_eq!(outcome.items, fallback_navigation_items());
    assert_eq!(
        outcome.fallback.map(|reason| reason.code),
        Some(ErrorCode::Decode)
    );
}

#[tokio::test]
async fn empty_or_missing_data_returns_fallback() {
    for body in [r#"{ "data": [] }"#, "{}", r#"{ "data": null }"#] {
        let (server_url, _state) = spawn_cms(AxumStatus::OK, body).await.expect("spawn cms");

        let outcome = provider(&server_url).load().await;

        assert_eq!(outcome.items, fallback_navigation_items(), "body: {body}");
        assert_eq!(
            outcome.fallback.map(|reason| reason.code),
            Some(ErrorCode::Empty),
            "body: {body}"
        );
    }
}

#[tokio::test]
async fn transport_failure_returns_fallback() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let provider = provider(&format!("http://{addr}"));
    let first = provider.load().await;
    let second = provider.load().await;

    assert_eq!(first.items, fallback_navigation_items());
    assert_eq!(first, second);
    assert_eq!(
        first.fallback.map(|reason| reason.code),
        Some(ErrorCode::Transport)
    );
}

#[test]
fn mapping_drops_incomplete_and_duplicate_entries() {
    let entries: Vec<CmsNavigationItem> = serde_json::from_str(
        r#"[
            { "name": "Home", "url": "/" },
            { "name": "", "url": "/blank" },
            { "name": "No url" },
            { "name": "Home again", "url": "/" },
            { "name": "About", "url": "/about", "subItems": [ { "name": "", "url": "/x" } ] }
        ]"#,
    )
    .expect("entries");

    let items = map_navigation_items(entries);

    assert_eq!(
        items,
        vec![
            NavigationItem::new("Home", "/"),
            NavigationItem::new("About", "/about"),
        ]
    );
}

#[test]
fn mapping_drops_duplicate_sub_item_urls_within_each_parent() {
    let entries: Vec<CmsNavigationItem> = serde_json::from_str(
        r#"[
            {
                "name": "Projects",
                "url": "/projects",
                "subItems": [
                    { "name": "Project A", "url": "/projects/project-a" },
                    { "name": "Project A (copy)", "url": "/projects/project-a" },
                    { "name": "Project B", "url": "/projects/project-b" }
                ]
            },
            {
                "name": "Archive",
                "url": "/archive",
                "subItems": [ { "name": "Project A", "url": "/projects/project-a" } ]
            }
        ]"#,
    )
    .expect("entries");

    let items = map_navigation_items(entries);

    assert_eq!(
        items,
        vec![
            NavigationItem::new("Projects", "/projects").with_sub_items(vec![
                SubNavigationItem::new("Project A", "/projects/project-a"),
                SubNavigationItem::new("Project B", "/projects/project-b"),
            ]),
            NavigationItem::new("Archive", "/archive").with_sub_items(vec![
                SubNavigationItem::new("Project A", "/projects/project-a"),
            ]),
        ]
    );
}

#[tokio::test]
async fn null_fields_drop_only_the_affected_entries() {
    let (server_url, _state) = spawn_cms(
        AxumStatus::OK,
        r#"{
            "data": [
                {
                    "name": "Home",
                    "url": "/",
                    "subItems": [
                        { "name": null, "url": "/hidden" },
                        { "name": "Intro", "url": "/intro" }
                    ]
                },
                { "name": null, "url": "/draft" },
                { "name": "Untitled", "url": null }
            ]
        }"#,
    )
    .await
    .expect("spawn cms");

    let outcome = provider(&server_url).load().await;

    assert!(!outcome.is_fallback());
    assert_eq!(
        outcome.items,
        vec![NavigationItem::new("Home", "/")
            .with_sub_items(vec![SubNavigationItem::new("Intro", "/intro")])]
    );
}

struct CountingSource {
    loads: AtomicUsize,
}

#[async_trait]
impl NavigationSource for CountingSource {
    async fn load(&self) -> NavigationOutcome {
        let n = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
        NavigationOutcome::fetched(vec![NavigationItem::new(format!("Load {n}"), "/")])
    }
}

#[tokio::test]
async fn cache_reuses_result_within_ttl() {
    let cached = CachedNavigation::new(CountingSource {
        loads: AtomicUsize::new(0),
    });

    let first = cached.fetch_navigation_items().await;
    let second = cached.fetch_navigation_items().await;

    assert_eq!(first, second);
    assert_eq!(cached.inner().loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stale_cache_entry_triggers_fresh_fetch() {
    let cached = CachedNavigation::with_ttl(
        CountingSource {
            loads: AtomicUsize::new(0),
        },
        Duration::ZERO,
    );

    let first = cached.fetch_navigation_items().await;
    let second = cached.fetch_navigation_items().await;

    assert_eq!(first[0].name, "Load 1");
    assert_eq!(second[0].name, "Load 2");
}

#[tokio::test]
async fn ttl_beyond_instant_range_never_expires() {
    let cached = CachedNavigation::with_ttl(
        CountingSource {
            loads: AtomicUsize::new(0),
        },
        Duration::from_secs(u64::MAX),
    );

    let first = cached.fetch_navigation_items().await;
    let second = cached.fetch_navigation_items().await;

    assert_eq!(first, second);
    assert_eq!(cached.inner().loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn huge_ttl_still_serves_static_fallback() {
    let cached = CachedNavigation::with_ttl(StaticNavigation, Duration::from_secs(u64::MAX));
    assert_eq!(
        cached.fetch_navigation_items().await,
        fallback_navigation_items()
    );
}

#[tokio::test]
async fn invalidate_forces_fresh_fetch() {
    let cached = CachedNavigation::new(CountingSource {
        loads: AtomicUsize::new(0),
    });

    cached.fetch_navigation_items().await;
    cached.invalidate().await;
    cached.fetch_navigation_items().await;

    assert_eq!(cached.inner().loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn static_navigation_always_serves_fallback() {
    let outcome = StaticNavigation.load().await;
    assert_eq!(outcome.items, fallback_navigation_items());
    assert!(outcome.is_fallback());
}
