use super::*;
use shared::domain::fallback_navigation_items;

fn state(requested_open: bool, animation_settled: bool, compact: bool) -> MenuVisibilityState {
    MenuVisibilityState {
        requested_open,
        animation_settled,
        is_compact_layout: compact,
    }
}

#[test]
fn closed_overlay_is_hidden_and_inert() {
    let view = OverlayPresentation::derive(&state(false, false, false));
    assert_eq!(view.overlay_opacity, 0.0);
    assert!(!view.interactive);
    assert_eq!(view.content, ContentShift::Rest);
    assert_eq!(view.burger, BurgerGlyph::Bars);
    assert_eq!(view.burger.aria_label(), "Open menu");
}

#[test]
fn opening_overlay_is_visible_but_not_interactive() {
    let view = OverlayPresentation::derive(&state(true, false, false));
    assert_eq!(view.overlay_opacity, 1.0);
    assert!(!view.interactive);
    assert_eq!(view.content, ContentShift::Rest);
    assert_eq!(view.burger.aria_label(), "Close menu");
}

#[test]
fn settled_expanded_menu_slides_content_aside() {
    let view = OverlayPresentation::derive(&state(true, true, false));
    assert!(view.interactive);
    assert_eq!(view.width, OverlayWidth::Percent(35));
    assert!(view.divider_visible);
    assert!(!view.close_button_visible);
    assert_eq!(
        view.content,
        ContentShift::Slid {
            offset_vw: 35,
            opacity: 0.3
        }
    );
}

#[test]
fn settled_compact_menu_covers_viewport_and_fades_content() {
    let view = OverlayPresentation::derive(&state(true, true, true));
    assert_eq!(view.width, OverlayWidth::FullViewport);
    assert!(!view.divider_visible);
    assert!(view.close_button_visible);
    assert_eq!(view.content, ContentShift::Faded { opacity: 0.0 });
}

#[test]
fn closing_menu_keeps_content_shifted_until_settled() {
    let view = OverlayPresentation::derive(&state(false, true, false));
    assert_eq!(view.overlay_opacity, 0.0);
    assert!(view.interactive);
    assert_eq!(view.burger, BurgerGlyph::Bars);
    assert!(matches!(view.content, ContentShift::Slid { .. }));
}

#[test]
fn links_follow_item_order_with_staggered_reveal() {
    let links = menu_links(&fallback_navigation_items());

    let labels: Vec<&str> = links.iter().map(|link| link.label.as_str()).collect();
    assert_eq!(labels, ["Home", "About", "Projects"]);
    assert_eq!(links[0].reveal_delay, Duration::ZERO);
    assert_eq!(links[2].reveal_delay, Duration::from_millis(200));

    let projects = &links[2];
    assert_eq!(projects.children.len(), 2);
    assert_eq!(projects.children[0].href, "/projects/project-a");
    assert!(links.iter().all(|link| !link.external));
}

#[test]
fn absolute_urls_become_external_links() {
    let items = vec![NavigationItem::new("Blog", "https://blog.example.com")];
    let links = menu_links(&items);
    assert!(links[0].external);
    assert!(links[0].children.is_empty());
}

#[test]
fn compact_close_button_appears_only_once_menu_is_shown() {
    assert!(!OverlayPresentation::derive(&state(false, false, true)).close_button_visible);
    assert!(!OverlayPresentation::derive(&state(true, false, true)).close_button_visible);
    assert!(OverlayPresentation::derive(&state(true, true, true)).close_button_visible);
    assert!(!OverlayPresentation::derive(&state(true, true, false)).close_button_visible);
}
