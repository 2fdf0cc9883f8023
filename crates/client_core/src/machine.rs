//! Fetch/retry/cancel state machine.
//!
//! The machine never performs I/O. Callers start a fetch with [`FetchMachine::begin`],
//! hand the outcome back through [`FetchMachine::complete`], and carry out the
//! [`TimerAction`] each transition returns. Every `begin` issues a new
//! generation; outcomes from any older generation are reported as
//! [`Completion::Stale`] and leave the machine untouched.

use crate::{
    error::{FETCH_GAVE_UP_MESSAGE, FETCH_RETRYING_MESSAGE},
    retry::RetryPolicy,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    #[default]
    Idle,
    Loading,
    Retrying,
    /// Only reachable with an attempt cap.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTrigger {
    Mount,
    Manual,
    AfterMutation,
    RetryTick,
}

impl FetchTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            FetchTrigger::Mount => "mount",
            FetchTrigger::Manual => "manual",
            FetchTrigger::AfterMutation => "after_mutation",
            FetchTrigger::RetryTick => "retry_tick",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    None,
    Arm,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    trigger: FetchTrigger,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn trigger(&self) -> FetchTrigger {
        self.trigger
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied(TimerAction),
    Stale,
}

#[derive(Debug, Clone)]
pub struct FetchMachine {
    policy: RetryPolicy,
    phase: FetchPhase,
    issued: u64,
    retry_armed: bool,
    failed_attempts: u32,
    error: Option<String>,
}

impl FetchMachine {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            phase: FetchPhase::Idle,
            issued: 0,
            retry_armed: false,
            failed_attempts: 0,
            error: None,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == FetchPhase::Loading
    }

    pub fn is_retrying(&self) -> bool {
        self.retry_armed
    }

    /// A retry tick only starts a fetch when none is in flight; the pending
    /// response is the one that settles the retry.
    pub fn accepts_retry_tick(&self) -> bool {
        self.retry_armed && self.phase != FetchPhase::Loading
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn latest_generation(&self) -> u64 {
        self.issued
    }

    /// Mutation failures share the single message slot with fetch failures.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn begin(&mut self, trigger: FetchTrigger) -> (FetchTicket, TimerAction) {
        self.issued += 1;
        self.phase = FetchPhase::Loading;

        let action = if trigger == FetchTrigger::RetryTick {
            TimerAction::None
        } else {
            self.error = None;
            self.failed_attempts = 0;
            if self.retry_armed {
                self.retry_armed = false;
                TimerAction::Cancel
            } else {
                TimerAction::None
            }
        };

        (
            FetchTicket {
                generation: self.issued,
                trigger,
            },
            action,
        )
    }

    pub fn complete<T, E>(&mut self, ticket: FetchTicket, outcome: &Result<T, E>) -> Completion {
        if ticket.generation != self.issued {
            return Completion::Stale;
        }

        match outcome {
            Ok(_) => {
                self.phase = FetchPhase::Idle;
                self.error = None;
                self.failed_attempts = 0;
                Completion::Applied(self.disarm())
            }
            Err(_) => {
                self.failed_attempts = self.failed_attempts.saturating_add(1);
                let exhausted = self
                    .policy
                    .max_attempts
                    .is_some_and(|cap| self.failed_attempts >= cap);

                if exhausted {
                    self.phase = FetchPhase::Failed;
                    self.error = Some(FETCH_GAVE_UP_MESSAGE.to_string());
                    return Completion::Applied(self.disarm());
                }

                self.phase = FetchPhase::Retrying;
                self.error = Some(FETCH_RETRYING_MESSAGE.to_string());
                if self.retry_armed {
                    Completion::Applied(TimerAction::None)
                } else {
                    self.retry_armed = true;
                    Completion::Applied(TimerAction::Arm)
                }
            }
        }
    }

    /// Stops automatic retries. Any fetch still in flight is superseded so a
    /// late failure cannot re-arm the timer. No-op unless retrying.
    pub fn cancel_retry(&mut self) -> TimerAction {
        if !self.retry_armed {
            return TimerAction::None;
        }
        self.issued += 1;
        self.phase = FetchPhase::Idle;
        self.error = None;
        self.failed_attempts = 0;
        self.disarm()
    }

    pub fn teardown(&mut self) -> TimerAction {
        self.issued += 1;
        self.phase = FetchPhase::Idle;
        self.disarm()
    }

    fn disarm(&mut self) -> TimerAction {
        if self.retry_armed {
            self.retry_armed = false;
            TimerAction::Cancel
        } else {
            TimerAction::None
        }
    }
}

#[cfg(test)]
#[path = "tests/machine_tests.rs"]
mod tests;
