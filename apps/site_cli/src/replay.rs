//! Replays scripted UI events (clicks, key presses, resizes, elapsed time)
//! against the menu controller with a deterministic animator.

use std::{str::FromStr, time::Duration};

use menu_state::{
    Breakpoint, BurgerGlyph, DismissSignal, MenuController, MenuPhase, MenuVisibilityState,
    OverlayDriver, PointerTarget, TimelineAnimator,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayEvent {
    /// Click on the burger toggle.
    Burger,
    Toggle,
    Escape,
    /// Pointer-down inside the overlay panel.
    Overlay,
    Outside,
    Close,
    Resize(u32),
    Tick(Duration),
    /// Completes any running transition immediately.
    Settle,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplayParseError {
    #[error("unknown replay event '{0}'")]
    UnknownEvent(String),
    #[error("replay event '{event}' needs a numeric argument, got '{value}'")]
    InvalidArgument { event: String, value: String },
}

impl FromStr for ReplayEvent {
    type Err = ReplayParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let (name, arg) = match raw.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (raw, None),
        };

        let number = |event: &str| -> Result<u64, ReplayParseError> {
            let value = arg.unwrap_or_default();
            value
                .trim()
                .parse::<u64>()
                .map_err(|_| ReplayParseError::InvalidArgument {
                    event: event.to_string(),
                    value: value.to_string(),
                })
        };

        match name.to_ascii_lowercase().as_str() {
            "burger" => Ok(Self::Burger),
            "toggle" => Ok(Self::Toggle),
            "escape" | "esc" => Ok(Self::Escape),
            "overlay" => Ok(Self::Overlay),
            "outside" => Ok(Self::Outside),
            "close" => Ok(Self::Close),
            "settle" => Ok(Self::Settle),
            "resize" => {
                let width = number("resize")?;
                u32::try_from(width)
                    .map(Self::Resize)
                    .map_err(|_| ReplayParseError::InvalidArgument {
                        event: "resize".to_string(),
                        value: width.to_string(),
                    })
            }
            "tick" => Ok(Self::Tick(Duration::from_millis(number("tick")?))),
            _ => Err(ReplayParseError::UnknownEvent(raw.to_string())),
        }
    }
}

pub fn parse_script(script: &str) -> Result<Vec<ReplayEvent>, ReplayParseError> {
    script
        .split(',')
        .filter(|token| !token.trim().is_empty())
        .map(str::parse)
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayStep {
    pub event: String,
    pub phase: MenuPhase,
    pub state: MenuVisibilityState,
    pub burger: BurgerGlyph,
    pub transition_started: bool,
    pub settled: bool,
}

/// The pieces a page shell wires together: one controller, the overlay
/// driver watching it and the animation engine it drives.
pub struct Replay {
    controller: MenuController,
    driver: OverlayDriver,
    animator: TimelineAnimator,
}

impl Replay {
    pub fn new(breakpoint: Breakpoint, initial_width: Option<u32>) -> Self {
        let mut controller = MenuController::with_breakpoint(breakpoint);
        if let Some(width) = initial_width {
            controller.observe_viewport_width(width);
        }
        let mut driver = OverlayDriver::new();
        let mut animator = TimelineAnimator::new();
        driver.sync(&controller, &mut animator);

        Self {
            controller,
            driver,
            animator,
        }
    }

    pub fn state(&self) -> MenuVisibilityState {
        self.controller.state()
    }

    pub fn apply(&mut self, event: ReplayEvent) -> ReplayStep {
        let mut settled = false;
        match event {
            ReplayEvent::Burger => {
                self.controller.handle_pointer_down(PointerTarget::Toggle);
                self.controller.toggle();
            }
            ReplayEvent::Toggle => self.controller.toggle(),
            ReplayEvent::Escape => {
                self.controller.handle_key("Escape");
            }
            ReplayEvent::Overlay => {
                self.controller.handle_pointer_down(PointerTarget::Overlay);
            }
            ReplayEvent::Outside => {
                self.controller.handle_pointer_down(PointerTarget::Outside);
            }
            ReplayEvent::Close => {
                self.controller.dismiss(DismissSignal::CloseButton);
            }
            ReplayEvent::Resize(width) => {
                self.controller.observe_viewport_width(width);
            }
            ReplayEvent::Tick(elapsed) => {
                if let Some(ticket) = self.animator.advance(elapsed) {
                    settled = self.controller.settle(ticket);
                }
            }
            ReplayEvent::Settle => {
                if let Some(ticket) = self.animator.finish() {
                    settled = self.controller.settle(ticket);
                }
            }
        }

        let transition_started = self.driver.sync(&self.controller, &mut self.animator);
        let state = self.controller.state();
        ReplayStep {
            event: format!("{event:?}"),
            phase: state.phase(),
            state,
            burger: menu_state::OverlayPresentation::derive(&state).burger,
            transition_started,
            settled,
        }
    }
}

#[cfg(test)]
#[path = "tests/replay_tests.rs"]
mod tests;
