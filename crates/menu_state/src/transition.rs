use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::controller::{MenuController, TransitionTicket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TweenTarget {
    Divider,
    MenuContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TweenEffect {
    FadeIn,
    FadeOut,
    /// Divider grows from the top edge to full viewport height.
    Extend,
    /// Divider shrinks back to the top edge while fading.
    Retract,
    /// Content fades while drifting upwards.
    LiftOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TweenStep {
    pub target: TweenTarget,
    pub effect: TweenEffect,
    pub duration: Duration,
}

impl TweenStep {
    const fn new(target: TweenTarget, effect: TweenEffect, millis: u64) -> Self {
        Self {
            target,
            effect,
            duration: Duration::from_millis(millis),
        }
    }
}

/// Sequential tweens that carry the overlay to one openness target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionPlan {
    pub opening: bool,
    pub compact: bool,
    pub steps: Vec<TweenStep>,
}

impl TransitionPlan {
    pub fn for_change(opening: bool, compact: bool) -> Self {
        use TweenEffect::*;
        use TweenTarget::*;

        let steps = match (opening, compact) {
            (true, true) => vec![TweenStep::new(Divider, FadeIn, 200)],
            (true, false) => vec![TweenStep::new(Divider, Extend, 600)],
            (false, true) => vec![
                TweenStep::new(MenuContent, FadeOut, 200),
                TweenStep::new(Divider, FadeOut, 300),
            ],
            (false, false) => vec![
                TweenStep::new(MenuContent, LiftOut, 300),
                TweenStep::new(Divider, Retract, 600),
            ],
        };

        Self {
            opening,
            compact,
            steps,
        }
    }

    /// Time from start until the overlay may be treated as settled.
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|step| step.duration).sum()
    }
}

/// External animation engine. A new `run` retargets: whatever was in flight
/// is abandoned, and only the latest ticket should be reported back.
pub trait Animator {
    fn run(&mut self, ticket: TransitionTicket, plan: TransitionPlan);
}

/// Watches controller state and asks the animator for a transition whenever
/// the requested target changes, or the layout changes mid-transition.
#[derive(Debug, Default)]
pub struct OverlayDriver {
    driven_generation: Option<u64>,
    driven_compact: Option<bool>,
}

impl OverlayDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync(&mut self, controller: &MenuController, animator: &mut dyn Animator) -> bool {
        let state = controller.state();
        let ticket = controller.current_ticket();

        let mounting = self.driven_generation.is_none();
        let generation_changed = self.driven_generation != Some(ticket.generation);
        let layout_changed = self.driven_compact != Some(state.is_compact_layout);
        self.driven_generation = Some(ticket.generation);
        self.driven_compact = Some(state.is_compact_layout);

        if mounting && !state.in_transition() {
            return false;
        }
        if !generation_changed && !(layout_changed && state.in_transition()) {
            return false;
        }

        let plan = TransitionPlan::for_change(ticket.target, state.is_compact_layout);
        debug!(
            generation = ticket.generation,
            opening = plan.opening,
            compact = plan.compact,
            duration_ms = plan.total_duration().as_millis() as u64,
            "overlay: starting transition"
        );
        animator.run(ticket, plan);
        true
    }
}

#[derive(Debug)]
struct RunningTransition {
    ticket: TransitionTicket,
    plan: TransitionPlan,
    elapsed: Duration,
}

/// Deterministic animator driven by explicit time steps. Holds at most one
/// transition; starting another replaces it.
#[derive(Debug, Default)]
pub struct TimelineAnimator {
    running: Option<RunningTransition>,
    started: usize,
}

impl TimelineAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn started(&self) -> usize {
        self.started
    }

    pub fn current_plan(&self) -> Option<&TransitionPlan> {
        self.running.as_ref().map(|running| &running.plan)
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.running.as_ref().map(|running| {
            running
                .plan
                .total_duration()
                .saturating_sub(running.elapsed)
        })
    }

    /// Moves time forward and returns the ticket of a transition that
    /// completed during the step.
    pub fn advance(&mut self, elapsed: Duration) -> Option<TransitionTicket> {
        let running = self.running.as_mut()?;
        running.elapsed += elapsed;
        if running.elapsed < running.plan.total_duration() {
            return None;
        }
        self.running.take().map(|running| running.ticket)
    }

    pub fn finish(&mut self) -> Option<TransitionTicket> {
        self.running.take().map(|running| running.ticket)
    }
}

impl Animator for TimelineAnimator {
    fn run(&mut self, ticket: TransitionTicket, plan: TransitionPlan) {
        self.started += 1;
        self.running = Some(RunningTransition {
            ticket,
            plan,
            elapsed: Duration::ZERO,
        });
    }
}

#[cfg(test)]
#[path = "tests/transition_tests.rs"]
mod tests;
