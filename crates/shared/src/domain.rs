use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubNavigationItem {
    pub name: String,
    pub url: String,
}

/// One entry of the site navigation, optionally carrying nested entries.
///
/// `sub_items` is never `Some(vec![])`: an empty list is normalized to `None`
/// by [`NavigationItem::with_sub_items`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationItem {
    pub name: String,
    pub url: String,
    #[serde(
        rename = "subItems",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sub_items: Option<Vec<SubNavigationItem>>,
}

impl NavigationItem {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            sub_items: None,
        }
    }

    pub fn with_sub_items(mut self, sub_items: Vec<SubNavigationItem>) -> Self {
        self.sub_items = if sub_items.is_empty() {
            None
        } else {
            Some(sub_items)
        };
        self
    }

    pub fn sub_items(&self) -> &[SubNavigationItem] {
        self.sub_items.as_deref().unwrap_or_default()
    }

    pub fn is_external(&self) -> bool {
        is_external_url(&self.url)
    }
}

impl SubNavigationItem {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn is_external(&self) -> bool {
        is_external_url(&self.url)
    }
}

/// Links leaving the site open in a new tab; everything else is a route.
pub fn is_external_url(url: &str) -> bool {
    url.starts_with("http")
}

/// Static navigation served whenever the content source is unconfigured or
/// unreachable.
pub fn fallback_navigation_items() -> Vec<NavigationItem> {
    vec![
        NavigationItem::new("Home", "/"),
        NavigationItem::new("About", "/about"),
        NavigationItem::new("Projects", "/projects").with_sub_items(vec![
            SubNavigationItem::new("Project A", "/projects/project-a"),
            SubNavigationItem::new("Project B", "/projects/project-b"),
        ]),
    ]
}
