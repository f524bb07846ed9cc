use std::time::Duration;

use serde::Serialize;
use shared::domain::{is_external_url, NavigationItem};

use crate::{controller::MenuVisibilityState, layout::LayoutMode};

/// Share of the viewport the overlay covers in the expanded layout. Page
/// content slides right by the same amount while the menu is shown.
pub const EXPANDED_OVERLAY_PERCENT: u8 = 35;
pub const SHIFTED_CONTENT_OPACITY: f32 = 0.3;
pub const ITEM_REVEAL_STAGGER: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BurgerGlyph {
    Bars,
    Cross,
}

impl BurgerGlyph {
    pub fn aria_label(self) -> &'static str {
        match self {
            Self::Bars => "Open menu",
            Self::Cross => "Close menu",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayWidth {
    FullViewport,
    Percent(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentShift {
    Rest,
    Faded { opacity: f32 },
    Slid { offset_vw: u8, opacity: f32 },
}

/// Render values for every component that reacts to the menu state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayPresentation {
    pub overlay_opacity: f32,
    pub interactive: bool,
    pub width: OverlayWidth,
    pub divider_visible: bool,
    pub content: ContentShift,
    pub burger: BurgerGlyph,
    pub close_button_visible: bool,
}

impl OverlayPresentation {
    pub fn derive(state: &MenuVisibilityState) -> Self {
        let compact = state.layout() == LayoutMode::Compact;
        let shown = state.animation_settled;

        let content = match (shown, compact) {
            (false, _) => ContentShift::Rest,
            (true, true) => ContentShift::Faded { opacity: 0.0 },
            (true, false) => ContentShift::Slid {
                offset_vw: EXPANDED_OVERLAY_PERCENT,
                opacity: SHIFTED_CONTENT_OPACITY,
            },
        };

        Self {
            overlay_opacity: if state.requested_open { 1.0 } else { 0.0 },
            interactive: shown,
            width: if compact {
                OverlayWidth::FullViewport
            } else {
                OverlayWidth::Percent(EXPANDED_OVERLAY_PERCENT)
            },
            divider_visible: !compact,
            content,
            burger: if state.requested_open {
                BurgerGlyph::Cross
            } else {
                BurgerGlyph::Bars
            },
            close_button_visible: compact && shown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuLink {
    pub label: String,
    pub href: String,
    /// Opens in a new tab instead of routing within the site.
    pub external: bool,
    pub reveal_delay: Duration,
    pub children: Vec<MenuLink>,
}

impl MenuLink {
    pub fn from_item(item: &NavigationItem, index: usize) -> Self {
        let children = item
            .sub_items()
            .iter()
            .enumerate()
            .map(|(child_index, sub)| Self {
                label: sub.name.clone(),
                href: sub.url.clone(),
                external: is_external_url(&sub.url),
                reveal_delay: stagger(index + child_index + 1),
                children: Vec::new(),
            })
            .collect();

        Self {
            label: item.name.clone(),
            href: item.url.clone(),
            external: item.is_external(),
            reveal_delay: stagger(index),
            children,
        }
    }
}

fn stagger(position: usize) -> Duration {
    ITEM_REVEAL_STAGGER * u32::try_from(position).unwrap_or(u32::MAX)
}

pub fn menu_links(items: &[NavigationItem]) -> Vec<MenuLink> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| MenuLink::from_item(item, index))
        .collect()
}

#[cfg(test)]
#[path = "tests/presentation_tests.rs"]
mod tests;
