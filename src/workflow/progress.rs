//! Three-stage indicator shown while a GitHub flow runs.
//!
//! Stage advances are driven by two cosmetic timers that run independently of
//! the real request. Timers live in `pending` until they fire or are
//! cancelled; a firing for a timer that is no longer pending is ignored, so a
//! stage can never move after the flow has finished.

use tokio::time::Instant;

use crate::config::ProgressTiming;

pub const STAGE_LABELS: [&str; 3] = [
    "Generating code",
    "Pushing branch",
    "Opening pull request",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    Active,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressTimer {
    /// Stage 1 done, stage 2 active.
    SecondStage,
    /// Stage 2 done, stage 3 active.
    ThirdStage,
}

#[derive(Debug, Clone)]
pub struct GithubFlowProgress {
    stages: [StageStatus; 3],
    pending: Vec<(ProgressTimer, Instant)>,
    hide_at: Option<Instant>,
    visible: bool,
}

impl GithubFlowProgress {
    pub fn start(now: Instant, timing: &ProgressTiming) -> Self {
        Self {
            stages: [StageStatus::Active, StageStatus::Pending, StageStatus::Pending],
            pending: vec![
                (ProgressTimer::SecondStage, now + timing.first_stage),
                (ProgressTimer::ThirdStage, now + timing.second_stage),
            ],
            hide_at: None,
            visible: true,
        }
    }

    pub fn stages(&self) -> [StageStatus; 3] {
        self.stages
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[cfg(test)]
    pub fn has_pending_timers(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Earliest timer still scheduled.
    pub fn next_timer(&self) -> Option<(ProgressTimer, Instant)> {
        self.pending
            .iter()
            .min_by_key(|(_, deadline)| *deadline)
            .copied()
    }

    /// Applies a timer firing. Returns `false` for timers that were cancelled
    /// or already fired.
    pub fn fire(&mut self, timer: ProgressTimer) -> bool {
        let Some(index) = self.pending.iter().position(|(pending, _)| *pending == timer) else {
            return false;
        };
        self.pending.remove(index);

        let (finished, started) = match timer {
            ProgressTimer::SecondStage => (0, 1),
            ProgressTimer::ThirdStage => (1, 2),
        };
        self.stages[finished] = StageStatus::Done;
        self.stages[started] = StageStatus::Active;
        true
    }

    pub fn cancel_timers(&mut self) {
        self.pending.clear();
    }

    /// Marks every stage done regardless of how far the timers got.
    pub fn complete(&mut self, now: Instant, timing: &ProgressTiming) {
        self.cancel_timers();
        self.stages = [StageStatus::Done; 3];
        self.hide_at = Some(now + timing.hide_grace);
    }

    /// Leaves stages where they are and stops them from moving.
    pub fn abandon(&mut self, now: Instant, timing: &ProgressTiming) {
        self.cancel_timers();
        self.hide_at = Some(now + timing.hide_grace);
    }

    /// Hides the indicator once its grace delay has elapsed. Returns `true`
    /// when the indicator became hidden on this call.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.hide_at {
            Some(deadline) if self.visible && now >= deadline => {
                self.visible = false;
                true
            }
            _ => false,
        }
    }
}
