use serde::Serialize;
use tracing::debug;

use crate::layout::{Breakpoint, LayoutMode};

/// Snapshot handed to observers. `animation_settled` trails `requested_open`
/// until the presentation layer reports that the transition finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MenuVisibilityState {
    pub requested_open: bool,
    pub animation_settled: bool,
    pub is_compact_layout: bool,
}

impl MenuVisibilityState {
    pub fn phase(&self) -> MenuPhase {
        match (self.requested_open, self.animation_settled) {
            (false, false) => MenuPhase::Closed,
            (true, false) => MenuPhase::Opening,
            (true, true) => MenuPhase::Open,
            (false, true) => MenuPhase::Closing,
        }
    }

    pub fn in_transition(&self) -> bool {
        self.requested_open != self.animation_settled
    }

    pub fn layout(&self) -> LayoutMode {
        LayoutMode::from_compact(self.is_compact_layout)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuPhase {
    Closed,
    Opening,
    Open,
    Closing,
}

/// Identifies one requested openness target. Completions carrying an older
/// generation belong to a superseded transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionTicket {
    pub generation: u64,
    pub target: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissSignal {
    Escape,
    PointerOutside,
    CloseButton,
}

/// Where a pointer-down landed relative to the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Overlay,
    Toggle,
    Outside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&MenuVisibilityState)>;

pub struct MenuController {
    state: MenuVisibilityState,
    breakpoint: Breakpoint,
    generation: u64,
    next_subscription: u64,
    observers: Vec<(SubscriptionId, Observer)>,
}

impl Default for MenuController {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuController {
    pub fn new() -> Self {
        Self::with_breakpoint(Breakpoint::default())
    }

    pub fn with_breakpoint(breakpoint: Breakpoint) -> Self {
        Self {
            state: MenuVisibilityState::default(),
            breakpoint,
            generation: 0,
            next_subscription: 0,
            observers: Vec::new(),
        }
    }

    pub fn state(&self) -> MenuVisibilityState {
        self.state
    }

    pub fn phase(&self) -> MenuPhase {
        self.state.phase()
    }

    pub fn breakpoint(&self) -> Breakpoint {
        self.breakpoint
    }

    pub fn current_ticket(&self) -> TransitionTicket {
        TransitionTicket {
            generation: self.generation,
            target: self.state.requested_open,
        }
    }

    /// Observers run synchronously, in subscription order, after every
    /// mutation that changes the state.
    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&MenuVisibilityState) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn toggle(&mut self) {
        self.state.requested_open = !self.state.requested_open;
        self.generation += 1;
        debug!(
            requested_open = self.state.requested_open,
            generation = self.generation,
            "menu: toggled"
        );
        self.notify();
    }

    /// Closes the menu if it is requested open. Every dismissal path funnels
    /// through here and is equivalent to one `toggle()`.
    pub fn dismiss(&mut self, signal: DismissSignal) -> bool {
        if !self.state.requested_open {
            return false;
        }
        debug!(?signal, "menu: dismissed");
        self.toggle();
        true
    }

    pub fn handle_key(&mut self, key: &str) -> bool {
        key == "Escape" && self.dismiss(DismissSignal::Escape)
    }

    /// Presses on the burger toggle are handled by the toggle itself, so only
    /// presses outside both the overlay and the toggle dismiss.
    pub fn handle_pointer_down(&mut self, target: PointerTarget) -> bool {
        target == PointerTarget::Outside && self.dismiss(DismissSignal::PointerOutside)
    }

    pub fn set_compact_layout(&mut self, value: bool) {
        if self.state.is_compact_layout == value {
            return;
        }
        self.state.is_compact_layout = value;
        debug!(compact = value, "menu: layout changed");
        self.notify();
    }

    /// Recomputes the layout axis for a viewport width. Returns whether the
    /// breakpoint was crossed.
    pub fn observe_viewport_width(&mut self, width: u32) -> bool {
        let compact = self.breakpoint.is_compact(width);
        let crossed = compact != self.state.is_compact_layout;
        self.set_compact_layout(compact);
        crossed
    }

    pub fn set_animation_settled(&mut self, value: bool) {
        if self.state.animation_settled == value {
            return;
        }
        self.state.animation_settled = value;
        debug!(settled = value, "menu: animation settled");
        self.notify();
    }

    /// Applies a transition completion if it still matches the current
    /// target. Returns false for stale completions, which are dropped
    /// without notifying observers.
    pub fn settle(&mut self, ticket: TransitionTicket) -> bool {
        if ticket != self.current_ticket() {
            debug!(
                stale_generation = ticket.generation,
                generation = self.generation,
                "menu: ignoring superseded transition completion"
            );
            return false;
        }
        self.set_animation_settled(ticket.target);
        true
    }

    fn notify(&mut self) {
        let state = self.state;
        for (_, observer) in self.observers.iter_mut() {
            observer(&state);
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
