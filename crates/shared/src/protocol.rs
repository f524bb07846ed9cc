use serde::{Deserialize, Serialize};

use crate::domain::SubNavigationItem;

/// Collection envelope returned by the headless CMS for `navigation-items`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavigationItemsResponse {
    #[serde(default)]
    pub data: Option<Vec<CmsNavigationItem>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CmsNavigationItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "subItems", default, skip_serializing_if = "Option::is_none")]
    pub sub_items: Option<Vec<CmsSubNavigationItem>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CmsSubNavigationItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// The CMS sends `null` for unset fields; both missing and `null` map to an
/// empty string here and are filtered out by the caller.
impl From<CmsSubNavigationItem> for SubNavigationItem {
    fn from(value: CmsSubNavigationItem) -> Self {
        Self {
            name: value.name.unwrap_or_default(),
            url: value.url.unwrap_or_default(),
        }
    }
}
