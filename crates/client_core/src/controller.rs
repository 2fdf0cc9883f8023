use std::{sync::Arc, time::Duration};

use shared::{
    domain::{Draft, DraftField, Record, RecordId},
    error::UnknownDraftField,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::{StoreError, ADD_FAILED_MESSAGE, DELETE_FAILED_MESSAGE},
    machine::{Completion, FetchMachine, FetchPhase, FetchTicket, FetchTrigger, TimerAction},
    retry::{RetryPolicy, RetryTimer},
    store::MovieStore,
};

const EVENT_CAPACITY: usize = 64;

/// Everything the presentation layer may read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerView {
    /// `None` until the first successful fetch.
    pub records: Option<Vec<Record>>,
    pub error: Option<String>,
    pub phase: FetchPhase,
    pub is_loading: bool,
    pub is_retrying: bool,
    pub is_mutating: bool,
    pub draft: Draft,
    pub retry_attempts: u32,
}

impl ControllerView {
    pub fn record_count(&self) -> usize {
        self.records.as_ref().map_or(0, Vec::len)
    }

    /// "No movies found": a list was loaded, it is empty, and nothing is loading.
    pub fn shows_empty_notice(&self) -> bool {
        !self.is_loading && self.records.as_ref().is_some_and(Vec::is_empty)
    }
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    StateChanged(ControllerView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded { count: usize },
    Failed(StoreError),
    /// Superseded by a newer request, cancelled, or issued after shutdown.
    Discarded,
}

struct ControllerState {
    machine: FetchMachine,
    retry_timer: Option<RetryTimer>,
    timer_epoch: u64,
    records: Option<Vec<Record>>,
    draft: Draft,
    mutations_in_flight: usize,
    torn_down: bool,
}

impl ControllerState {
    fn view(&self) -> ControllerView {
        ControllerView {
            records: self.records.clone(),
            error: self.machine.error().map(str::to_string),
            phase: self.machine.phase(),
            is_loading: self.machine.is_loading(),
            is_retrying: self.machine.is_retrying(),
            is_mutating: self.mutations_in_flight > 0,
            draft: self.draft.clone(),
            retry_attempts: self.machine.failed_attempts(),
        }
    }
}

/// Owns the record list, the draft and the retry timer, and turns
/// presentation intents into store calls.
pub struct MovieController {
    store: Arc<dyn MovieStore>,
    inner: Mutex<ControllerState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl MovieController {
    pub fn new(store: Arc<dyn MovieStore>, policy: RetryPolicy) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            store,
            inner: Mutex::new(ControllerState {
                machine: FetchMachine::new(policy),
                retry_timer: None,
                timer_epoch: 0,
                records: None,
                draft: Draft::default(),
                mutations_in_flight: 0,
                torn_down: false,
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn view(&self) -> ControllerView {
        self.inner.lock().await.view()
    }

    pub async fn mount(self: &Arc<Self>) -> FetchOutcome {
        self.fetch(FetchTrigger::Mount).await
    }

    pub async fn refresh(self: &Arc<Self>) -> FetchOutcome {
        self.fetch(FetchTrigger::Manual).await
    }

    pub async fn cancel_retry(&self) {
        let mut guard = self.inner.lock().await;
        let action = guard.machine.cancel_retry();
        if action == TimerAction::None {
            debug!("fetch: cancel requested while not retrying");
            return;
        }
        self.apply_timer_action_without_arm(&mut guard, action);
        info!("fetch: retry cancelled");
        self.publish(&guard);
    }

    pub async fn update_draft_field(
        &self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), UnknownDraftField> {
        let field: DraftField = name.parse()?;
        let mut guard = self.inner.lock().await;
        guard.draft.set(field, value);
        self.publish(&guard);
        Ok(())
    }

    pub async fn submit_draft(self: &Arc<Self>) -> Result<(), StoreError> {
        let draft = self.inner.lock().await.draft.clone();
        self.add(draft).await
    }

    /// Creates the record remotely, then clears the draft and reloads the
    /// whole list. Failures are reported once and never retried.
    pub async fn add(self: &Arc<Self>, draft: Draft) -> Result<(), StoreError> {
        self.begin_mutation().await;
        let result = self.store.create(&draft).await;

        {
            let mut guard = self.inner.lock().await;
            guard.mutations_in_flight = guard.mutations_in_flight.saturating_sub(1);
            match &result {
                Ok(()) => guard.draft = Draft::default(),
                Err(err) => {
                    warn!(title = %draft.title, "mutation: add failed: {err}");
                    guard.machine.set_error(ADD_FAILED_MESSAGE);
                }
            }
            self.publish(&guard);
        }

        if result.is_ok() {
            self.fetch(FetchTrigger::AfterMutation).await;
        }
        result
    }

    /// Removes the record remotely and, once confirmed, from the local list.
    /// No refetch follows.
    pub async fn delete_by_id(&self, id: &RecordId) -> Result<(), StoreError> {
        self.begin_mutation().await;
        let result = self.store.delete(id).await;

        let mut guard = self.inner.lock().await;
        guard.mutations_in_flight = guard.mutations_in_flight.saturating_sub(1);
        match &result {
            Ok(()) => {
                if let Some(records) = guard.records.as_mut() {
                    records.retain(|record| &record.id != id);
                }
            }
            Err(err) => {
                warn!(id = %id, "mutation: delete failed: {err}");
                guard.machine.set_error(DELETE_FAILED_MESSAGE);
            }
        }
        self.publish(&guard);
        result
    }

    /// Releases the retry timer. Fetches issued afterwards are ignored and
    /// responses still in flight are discarded.
    pub async fn shutdown(&self) {
        let mut guard = self.inner.lock().await;
        if guard.torn_down {
            return;
        }
        guard.torn_down = true;
        guard.machine.teardown();
        guard.retry_timer = None;
        info!("controller: shut down");
        self.publish(&guard);
    }

    async fn begin_mutation(&self) {
        let mut guard = self.inner.lock().await;
        guard.machine.clear_error();
        guard.mutations_in_flight += 1;
        self.publish(&guard);
    }

    async fn fetch(self: &Arc<Self>, trigger: FetchTrigger) -> FetchOutcome {
        match self.begin_fetch(trigger, None).await {
            Some(ticket) => self.finish_fetch(ticket).await,
            None => FetchOutcome::Discarded,
        }
    }

    async fn retry_tick(self: &Arc<Self>, epoch: u64) {
        if let Some(ticket) = self.begin_fetch(FetchTrigger::RetryTick, Some(epoch)).await {
            self.finish_fetch(ticket).await;
        }
    }

    async fn begin_fetch(
        self: &Arc<Self>,
        trigger: FetchTrigger,
        timer_epoch: Option<u64>,
    ) -> Option<FetchTicket> {
        let mut guard = self.inner.lock().await;
        if guard.torn_down {
            debug!(trigger = trigger.as_str(), "fetch: ignored after shutdown");
            return None;
        }
        if let Some(epoch) = timer_epoch {
            // ticks from a timer that was replaced or cancelled meanwhile
            if !guard.machine.is_retrying() || guard.timer_epoch != epoch {
                debug!(epoch, "fetch: dropping tick from a released timer");
                return None;
            }
            if !guard.machine.accepts_retry_tick() {
                debug!(
                    epoch,
                    generation = guard.machine.latest_generation(),
                    "fetch: skipping tick while a fetch is in flight"
                );
                return None;
            }
        }

        let (ticket, action) = guard.machine.begin(trigger);
        self.apply_timer_action(&mut guard, action);
        info!(
            trigger = trigger.as_str(),
            generation = ticket.generation(),
            "fetch: started"
        );
        self.publish(&guard);
        Some(ticket)
    }

    async fn finish_fetch(self: &Arc<Self>, ticket: FetchTicket) -> FetchOutcome {
        let result = self.store.list().await;

        let mut guard = self.inner.lock().await;
        match guard.machine.complete(ticket, &result) {
            Completion::Stale => {
                debug!(
                    generation = ticket.generation(),
                    latest = guard.machine.latest_generation(),
                    "fetch: discarding stale response"
                );
                FetchOutcome::Discarded
            }
            Completion::Applied(action) => {
                self.apply_timer_action(&mut guard, action);
                let outcome = match result {
                    Ok(records) => {
                        let count = records.len();
                        info!(
                            trigger = ticket.trigger().as_str(),
                            generation = ticket.generation(),
                            count,
                            "fetch: loaded records"
                        );
                        guard.records = Some(records);
                        FetchOutcome::Loaded { count }
                    }
                    Err(err) => {
                        warn!(
                            trigger = ticket.trigger().as_str(),
                            generation = ticket.generation(),
                            attempts = guard.machine.failed_attempts(),
                            phase = ?guard.machine.phase(),
                            transport = err.is_transport_like(),
                            "fetch: failed: {err}"
                        );
                        FetchOutcome::Failed(err)
                    }
                };
                self.publish(&guard);
                outcome
            }
        }
    }

    fn apply_timer_action(self: &Arc<Self>, state: &mut ControllerState, action: TimerAction) {
        if action == TimerAction::Arm {
            state.timer_epoch += 1;
            let period = state.machine.policy().period;
            // the previous handle, if any, is dropped and thereby aborted
            state.retry_timer = Some(self.arm_retry_timer(period, state.timer_epoch));
            info!(
                period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
                epoch = state.timer_epoch,
                "fetch: retry timer armed"
            );
        } else {
            self.apply_timer_action_without_arm(state, action);
        }
    }

    fn apply_timer_action_without_arm(&self, state: &mut ControllerState, action: TimerAction) {
        if action == TimerAction::Cancel && state.retry_timer.take().is_some() {
            debug!(epoch = state.timer_epoch, "fetch: retry timer released");
        }
    }

    fn arm_retry_timer(self: &Arc<Self>, period: Duration, epoch: u64) -> RetryTimer {
        let controller = Arc::downgrade(self);
        RetryTimer::spawn(period, move || {
            let Some(controller) = controller.upgrade() else {
                return false;
            };
            tokio::spawn(async move {
                controller.retry_tick(epoch).await;
            });
            true
        })
    }

    fn publish(&self, state: &ControllerState) {
        let _ = self
            .events
            .send(ControllerEvent::StateChanged(state.view()));
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
