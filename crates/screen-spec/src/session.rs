//! Event handling for a mounted screen.
//!
//! The session never owns answers. Changes are forwarded to the host through
//! [`ScreenHost::update_answer`], and every later call receives the host's
//! current snapshot. Time is passed in by the caller so the session never
//! sleeps or spawns anything.

use std::time::Instant;

use serde_json::Value;

use crate::answers::AnswerMap;
use crate::error_map::ErrorMap;
use crate::spec::screen::ScreenSpec;
use crate::validate::{ScreenValidationResult, validate_all};

/// The flow controller hosting a screen.
pub trait ScreenHost {
    /// Requested write into the externally owned answer map.
    fn update_answer(&mut self, field_id: &str, value: Value);

    /// Called only when the screen validated cleanly.
    fn submit(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    Blocked { errors: usize },
}

/// Single pending deadline; scheduling again supersedes the previous one.
#[derive(Debug, Clone, Default)]
pub struct AutoAdvanceTimer {
    deadline: Option<Instant>,
}

impl AutoAdvanceTimer {
    pub fn schedule(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Clears and reports the deadline once `now` has reached it.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Screen-local state: the error map and any pending auto-advance.
#[derive(Debug)]
pub struct ScreenSession<'s> {
    screen: &'s ScreenSpec,
    errors: ErrorMap,
    timer: AutoAdvanceTimer,
}

impl<'s> ScreenSession<'s> {
    /// Mounts a screen with an empty error map.
    pub fn new(screen: &'s ScreenSpec) -> Self {
        Self {
            screen,
            errors: ErrorMap::new(),
            timer: AutoAdvanceTimer::default(),
        }
    }

    pub fn screen(&self) -> &'s ScreenSpec {
        self.screen
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn pending_advance(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    pub fn on_change<H: ScreenHost>(
        &mut self,
        host: &mut H,
        field_id: &str,
        value: Value,
        now: Instant,
    ) {
        self.errors.remove(field_id);
        let schedule = self
            .screen
            .auto_advance
            .as_ref()
            .filter(|_| field_id == self.screen.answer_key())
            .filter(|advance| advance.triggers(&value))
            .map(|advance| now + advance.delay());
        host.update_answer(field_id, value);
        match schedule {
            Some(deadline) => {
                tracing::debug!(screen = %self.screen.id, field = field_id, "auto-advance scheduled");
                self.timer.schedule(deadline);
            }
            None => {
                if self.timer.cancel() {
                    tracing::debug!(screen = %self.screen.id, field = field_id, "auto-advance cancelled");
                }
            }
        }
    }

    /// Validates one field and records or clears its error.
    pub fn on_blur(&mut self, field_id: &str, answers: &AnswerMap) -> Option<&str> {
        let error = self.screen.validate_field(field_id, answers);
        self.errors.set(field_id, error);
        self.errors.get(field_id)
    }

    pub fn on_submit<H: ScreenHost>(&mut self, host: &mut H, answers: &AnswerMap) -> SubmitOutcome {
        self.timer.cancel();
        let ScreenValidationResult { errors, all_valid } = validate_all(self.screen, answers);
        self.errors = errors;
        if all_valid {
            host.submit();
            SubmitOutcome::Submitted
        } else {
            SubmitOutcome::Blocked {
                errors: self.errors.len(),
            }
        }
    }

    /// Whether the continue control is enabled.
    pub fn can_continue(&self, answers: &AnswerMap) -> bool {
        self.screen.is_complete(answers)
    }

    /// Fires a due auto-advance through the regular submit path.
    pub fn poll<H: ScreenHost>(
        &mut self,
        host: &mut H,
        answers: &AnswerMap,
        now: Instant,
    ) -> Option<SubmitOutcome> {
        if !self.timer.take_due(now) {
            return None;
        }
        Some(self.on_submit(host, answers))
    }
}
