//! Menu overlay state: the visibility controller shared by the burger toggle,
//! the overlay and page content, plus the wiring that turns its state into
//! animation requests and render-ready presentation values.

pub mod controller;
pub mod layout;
pub mod presentation;
pub mod transition;

pub use controller::{
    DismissSignal, MenuController, MenuPhase, MenuVisibilityState, PointerTarget,
    SubscriptionId, TransitionTicket,
};
pub use layout::{Breakpoint, LayoutMode, DEFAULT_COMPACT_BREAKPOINT};
pub use presentation::{menu_links, BurgerGlyph, ContentShift, MenuLink, OverlayPresentation};
pub use transition::{Animator, OverlayDriver, TimelineAnimator, TransitionPlan};
