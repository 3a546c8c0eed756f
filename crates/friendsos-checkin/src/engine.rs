// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The check-in scheduling and escalation engine.
//!
//! Records, armed timers, and escalation reports live behind one
//! `tokio::sync::Mutex`. Every mutation (user operation or timer callback)
//! takes the lock, mutates, persists, and releases it. Reminder prompts and
//! contact dispatch run after the lock is released.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use friendsos_core::{
    CheckIn, CheckInId, CheckInResponse, CheckInStatus, CheckInStore, Clock, ContactDirectory,
    DispatchAdapter, FriendsosError, NewCheckIn, ReminderPrompt, ReminderSurface, SystemClock,
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::notifier::{EscalationNotifier, EscalationReport, EscalationTrigger};
use crate::schedule::{self, AfterSafe, Arming, PromptDecision};
use crate::settings::EngineSettings;
use crate::timers::{TimerFuture, TimerKind, TimerTable, TimerToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Running,
    Stopped,
}

struct EngineState {
    records: BTreeMap<CheckInId, CheckIn>,
    timers: TimerTable,
    reports: HashMap<CheckInId, EscalationReport>,
    lifecycle: Lifecycle,
}

impl EngineState {
    fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            timers: TimerTable::default(),
            reports: HashMap::new(),
            lifecycle: Lifecycle::Created,
        }
    }

    fn ensure_running(&self) -> Result<(), FriendsosError> {
        match self.lifecycle {
            Lifecycle::Running => Ok(()),
            Lifecycle::Created => Err(FriendsosError::Internal(
                "check-in engine not initialized".into(),
            )),
            Lifecycle::Stopped => Err(FriendsosError::Internal(
                "check-in engine has been shut down".into(),
            )),
        }
    }

    fn snapshot(&self) -> Vec<CheckIn> {
        self.records.values().cloned().collect()
    }
}

/// The active record with `id`. Borrows only the record map so timers can
/// be touched while the record is held.
fn active_mut<'a>(
    records: &'a mut BTreeMap<CheckInId, CheckIn>,
    id: &CheckInId,
) -> Result<&'a mut CheckIn, FriendsosError> {
    records
        .get_mut(id)
        .filter(|record| record.is_active())
        .ok_or_else(|| FriendsosError::not_found(id))
}

/// Which timers a record currently has armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArmedTimers {
    pub schedule: bool,
    pub escalation: bool,
}

struct Inner {
    store: Arc<dyn CheckInStore>,
    reminder: Arc<dyn ReminderSurface>,
    notifier: EscalationNotifier,
    clock: Arc<dyn Clock>,
    settings: EngineSettings,
    state: Mutex<EngineState>,
}

/// Handle to the engine. Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct CheckInEngine {
    inner: Arc<Inner>,
}

/// Assembles a [`CheckInEngine`] from its collaborators.
#[derive(Default)]
pub struct CheckInEngineBuilder {
    store: Option<Arc<dyn CheckInStore>>,
    dispatch: Option<Arc<dyn DispatchAdapter>>,
    directory: Option<Arc<dyn ContactDirectory>>,
    reminder: Option<Arc<dyn ReminderSurface>>,
    clock: Option<Arc<dyn Clock>>,
    settings: EngineSettings,
}

impl CheckInEngineBuilder {
    pub fn store(mut self, store: Arc<dyn CheckInStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn dispatch(mut self, dispatch: Arc<dyn DispatchAdapter>) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    pub fn contacts(mut self, directory: Arc<dyn ContactDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn reminder(mut self, reminder: Arc<dyn ReminderSurface>) -> Self {
        self.reminder = Some(reminder);
        self
    }

    /// Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Result<CheckInEngine, FriendsosError> {
        fn required<T>(value: Option<T>, what: &str) -> Result<T, FriendsosError> {
            value.ok_or_else(|| {
                FriendsosError::Internal(format!("check-in engine requires a {what}"))
            })
        }

        let notifier = EscalationNotifier::new(
            required(self.dispatch, "dispatch adapter")?,
            required(self.directory, "contact directory")?,
            self.settings.send_spacing,
        );
        Ok(CheckInEngine {
            inner: Arc::new(Inner {
                store: required(self.store, "store")?,
                reminder: required(self.reminder, "reminder surface")?,
                notifier,
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
                settings: self.settings,
                state: Mutex::new(EngineState::new()),
            }),
        })
    }
}

impl CheckInEngine {
    pub fn builder() -> CheckInEngineBuilder {
        CheckInEngineBuilder::default()
    }

    /// Load persisted records and re-arm timers for the active ones.
    ///
    /// Past-due timers fire immediately. Calling this twice is a no-op.
    pub async fn initialize(&self) -> Result<(), FriendsosError> {
        self.inner.initialize().await
    }

    /// Disarm every timer and write the collection one last time.
    pub async fn shutdown(&self) -> Result<(), FriendsosError> {
        self.inner.shutdown().await
    }

    /// Create, persist, and schedule a new check-in.
    pub async fn create_check_in(&self, params: NewCheckIn) -> Result<CheckIn, FriendsosError> {
        self.inner.create(params).await
    }

    /// Record a user response. `safe` continues the cycle; `help` and
    /// `emergency` escalate at once and end monitoring.
    pub async fn respond_to_check_in(
        &self,
        id: &CheckInId,
        response: CheckInResponse,
    ) -> Result<CheckIn, FriendsosError> {
        self.inner.respond(id, response).await
    }

    /// Stop monitoring. Unknown or already-terminal ids are `NotFound`.
    pub async fn cancel_check_in(&self, id: &CheckInId) -> Result<CheckIn, FriendsosError> {
        self.inner.cancel(id).await
    }

    /// Active check-ins, soonest next check first.
    pub async fn active_check_ins(&self) -> Vec<CheckIn> {
        let state = self.inner.state.lock().await;
        let mut active: Vec<CheckIn> = state
            .records
            .values()
            .filter(|c| c.is_active())
            .cloned()
            .collect();
        active.sort_by(|a, b| {
            a.next_check_at()
                .cmp(&b.next_check_at())
                .then_with(|| a.id.cmp(&b.id))
        });
        active
    }

    /// Terminal check-ins, most recent activity first.
    pub async fn check_in_history(&self) -> Vec<CheckIn> {
        let state = self.inner.state.lock().await;
        let mut history: Vec<CheckIn> = state
            .records
            .values()
            .filter(|c| !c.is_active())
            .cloned()
            .collect();
        history.sort_by(|a, b| {
            b.last_activity_at()
                .cmp(&a.last_activity_at())
                .then_with(|| a.id.cmp(&b.id))
        });
        history
    }

    /// Time until the record's next check, clamped at zero. `None` when the
    /// id is unknown or the record is no longer active.
    pub async fn time_until_next_check(&self, id: &CheckInId) -> Option<Duration> {
        let state = self.inner.state.lock().await;
        let record = state.records.get(id).filter(|c| c.is_active())?;
        Some(schedule::delay_until(
            record.next_check_at(),
            self.inner.clock.now(),
        ))
    }

    pub async fn get_check_in(&self, id: &CheckInId) -> Option<CheckIn> {
        self.inner.state.lock().await.records.get(id).cloned()
    }

    /// Per-contact outcome of the record's escalation, once it has run.
    pub async fn escalation_report(&self, id: &CheckInId) -> Option<EscalationReport> {
        self.inner.state.lock().await.reports.get(id).cloned()
    }

    pub async fn armed_timers(&self, id: &CheckInId) -> ArmedTimers {
        let state = self.inner.state.lock().await;
        ArmedTimers {
            schedule: state.timers.is_armed(id, TimerKind::Schedule),
            escalation: state.timers.is_armed(id, TimerKind::Escalation),
        }
    }

    /// Total number of armed timers across all records.
    pub async fn armed_timer_count(&self) -> usize {
        self.inner.state.lock().await.timers.len()
    }
}

impl Inner {
    async fn initialize(self: &Arc<Self>) -> Result<(), FriendsosError> {
        let mut guard = self.state.lock().await;
        if guard.lifecycle != Lifecycle::Created {
            warn!("check-in engine already initialized");
            return Ok(());
        }

        let loaded = self.store.load_check_ins().await?;
        let state = &mut *guard;
        let now = self.clock.now();
        let mut completed = 0usize;

        for mut record in loaded {
            if record.is_active() {
                match schedule::on_resume(&record) {
                    Arming::Schedule(due) => {
                        self.arm(&mut state.timers, &record.id, TimerKind::Schedule, due, now)
                    }
                    Arming::Escalation(due) => {
                        self.arm(&mut state.timers, &record.id, TimerKind::Escalation, due, now)
                    }
                    Arming::Complete => {
                        record.status = CheckInStatus::Completed;
                        completed += 1;
                    }
                }
            }
            state.records.insert(record.id.clone(), record);
        }
        state.lifecycle = Lifecycle::Running;

        let active = state.records.values().filter(|c| c.is_active()).count();
        info!(
            total = state.records.len(),
            active,
            completed_on_resume = completed,
            "check-in engine initialized"
        );
        if completed > 0 {
            self.persist(state).await?;
        }
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), FriendsosError> {
        let mut guard = self.state.lock().await;
        if guard.lifecycle != Lifecycle::Running {
            return Ok(());
        }
        guard.timers.clear();
        guard.lifecycle = Lifecycle::Stopped;
        let result = self.persist(&guard).await;
        info!(records = guard.records.len(), "check-in engine stopped");
        result
    }

    async fn create(self: &Arc<Self>, params: NewCheckIn) -> Result<CheckIn, FriendsosError> {
        params.validate()?;

        let mut contacts: Vec<String> = Vec::with_capacity(params.contacts.len());
        for contact in params.contacts {
            let contact = contact.trim().to_string();
            if !contact.is_empty() && !contacts.contains(&contact) {
                contacts.push(contact);
            }
        }

        let mut record = CheckIn {
            id: CheckInId::generate(),
            user_id: params.user_id,
            scheduled_time: params.scheduled_time,
            end_time: params.end_time,
            interval_mins: params.interval_mins,
            message: params.message,
            contacts,
            response_required: params.response_required,
            escalation_delay_mins: params
                .escalation_delay_mins
                .unwrap_or(self.settings.default_escalation_delay_mins),
            max_notifications: params
                .max_notifications
                .unwrap_or(self.settings.default_max_notifications),
            notifications_sent: 0,
            custom_escalation_message: params.custom_escalation_message,
            last_response_time: params.last_response_time,
            last_prompt_time: None,
            status: CheckInStatus::Active,
        };

        let mut guard = self.state.lock().await;
        guard.ensure_running()?;
        let state = &mut *guard;
        let now = self.clock.now();
        let id = record.id.clone();

        match schedule::on_create(&record) {
            Arming::Schedule(due) => {
                self.arm(&mut state.timers, &id, TimerKind::Schedule, due, now);
                debug!(check_in_id = %id, due = %due, "schedule timer armed");
            }
            Arming::Complete => record.status = CheckInStatus::Completed,
            Arming::Escalation(_) => {}
        }
        state.records.insert(id.clone(), record.clone());

        if let Err(e) = self.persist(state).await {
            state.timers.disarm_all(&id);
            state.records.remove(&id);
            return Err(e);
        }

        info!(
            check_in_id = %id,
            interval_mins = record.interval_mins,
            contacts = record.contacts.len(),
            status = %record.status,
            "check-in created"
        );
        Ok(record)
    }

    async fn respond(
        self: &Arc<Self>,
        id: &CheckInId,
        response: CheckInResponse,
    ) -> Result<CheckIn, FriendsosError> {
        let (snapshot, persisted, escalation) = {
            let mut guard = self.state.lock().await;
            guard.ensure_running()?;
            let state = &mut *guard;
            let now = self.clock.now();
            let record = active_mut(&mut state.records, id)?;
            record.last_response_time = Some(now);

            info!(
                check_in_id = %id,
                response = %response.status,
                has_location = response.location.is_some(),
                "check-in response received"
            );

            let escalation = if response.status.is_distress() {
                record.status = CheckInStatus::Failed;
                state.timers.disarm_all(id);
                Some(EscalationTrigger::Distress(response.status))
            } else {
                state.timers.disarm(id, TimerKind::Escalation);
                match schedule::on_safe_response(record) {
                    AfterSafe::Schedule(due) => {
                        self.arm(&mut state.timers, id, TimerKind::Schedule, due, now);
                    }
                    AfterSafe::Complete => {
                        record.status = CheckInStatus::Completed;
                        state.timers.disarm_all(id);
                        info!(check_in_id = %id, "check-in completed");
                    }
                    AfterSafe::Exhausted => {
                        record.status = CheckInStatus::Failed;
                        state.timers.disarm_all(id);
                        warn!(check_in_id = %id, "notification cap reached; check-in failed");
                    }
                }
                None
            };

            let snapshot = record.clone();
            let persisted = self.persist(state).await;
            (snapshot, persisted, escalation)
        };

        // Contacts are alerted even if the write failed.
        if let Some(trigger) = escalation {
            self.escalate(snapshot.clone(), trigger).await;
        }
        persisted.map(|()| snapshot)
    }

    async fn cancel(&self, id: &CheckInId) -> Result<CheckIn, FriendsosError> {
        let mut guard = self.state.lock().await;
        guard.ensure_running()?;
        let state = &mut *guard;
        let record = active_mut(&mut state.records, id)?;
        record.status = CheckInStatus::Cancelled;
        let snapshot = record.clone();
        state.timers.disarm_all(id);
        info!(check_in_id = %id, "check-in cancelled");
        self.persist(state).await?;
        Ok(snapshot)
    }

    /// Schedule timer callback: issue the next prompt, or end the record.
    async fn on_schedule_fire(self: Arc<Self>, id: CheckInId, token: TimerToken) {
        let prompt = {
            let mut guard = self.state.lock().await;
            if guard.lifecycle != Lifecycle::Running
                || !guard.timers.claim(&id, TimerKind::Schedule, token)
            {
                return;
            }
            let state = &mut *guard;
            let now = self.clock.now();
            let Ok(record) = active_mut(&mut state.records, &id) else {
                return;
            };

            let prompt = match schedule::on_schedule_due(record, now) {
                PromptDecision::Complete => {
                    record.status = CheckInStatus::Completed;
                    info!(check_in_id = %id, "end time reached; check-in completed");
                    None
                }
                PromptDecision::Exhausted => {
                    record.status = CheckInStatus::Failed;
                    warn!(check_in_id = %id, "notification cap reached; check-in failed");
                    None
                }
                PromptDecision::Prompt => {
                    record.notifications_sent += 1;
                    record.last_prompt_time = Some(now);
                    info!(
                        check_in_id = %id,
                        prompt = record.notifications_sent,
                        of = record.max_notifications,
                        "check-in prompt due"
                    );
                    let prompt = ReminderPrompt::check_in_required(id.clone(), &record.message);
                    // Without a required response the prompt is informational
                    // and the cycle simply continues.
                    let (kind, due) = if record.response_required {
                        (TimerKind::Escalation, now + record.escalation_delay())
                    } else {
                        (TimerKind::Schedule, record.one_interval_after(now))
                    };
                    self.arm(&mut state.timers, &id, kind, due, now);
                    Some(prompt)
                }
            };
            if prompt.is_none() {
                state.timers.disarm_all(&id);
            }
            self.persist_logged(state).await;
            prompt
        };

        if let Some(prompt) = prompt {
            self.show_prompt(&prompt).await;
        }
    }

    /// Escalation timer callback: escalate if the prompt went unanswered.
    async fn on_escalation_fire(self: Arc<Self>, id: CheckInId, token: TimerToken) {
        let snapshot = {
            let mut guard = self.state.lock().await;
            if guard.lifecycle != Lifecycle::Running
                || !guard.timers.claim(&id, TimerKind::Escalation, token)
            {
                return;
            }
            let state = &mut *guard;
            let Ok(record) = active_mut(&mut state.records, &id) else {
                return;
            };
            if !record.escalation_pending() {
                debug!(check_in_id = %id, "prompt answered before escalation deadline");
                return;
            }
            record.status = CheckInStatus::Failed;
            let snapshot = record.clone();
            state.timers.disarm_all(&id);
            warn!(check_in_id = %id, "check-in missed; escalating to contacts");
            self.persist_logged(state).await;
            snapshot
        };

        self.escalate(snapshot, EscalationTrigger::MissedCheckIn)
            .await;
    }

    async fn escalate(&self, check_in: CheckIn, trigger: EscalationTrigger) {
        let report = self
            .notifier
            .notify(&check_in, trigger, self.clock.now())
            .await;
        self.state
            .lock()
            .await
            .reports
            .insert(check_in.id.clone(), report);
    }

    async fn show_prompt(&self, prompt: &ReminderPrompt) {
        if let Err(e) = self.reminder.show_prompt(prompt).await {
            warn!(check_in_id = %prompt.check_in_id, error = %e, "reminder prompt failed");
        }
        if let Err(e) = self.reminder.play_cue().await {
            debug!(check_in_id = %prompt.check_in_id, error = %e, "reminder cue failed");
        }
    }

    /// Spawn a timer task that calls back into the engine at `due`.
    fn arm(
        self: &Arc<Self>,
        timers: &mut TimerTable,
        id: &CheckInId,
        kind: TimerKind,
        due: DateTime<Utc>,
        now: DateTime<Utc>,
    ) {
        let engine = Arc::downgrade(self);
        let record_id = id.clone();
        timers.arm(id, kind, schedule::delay_until(due, now), move |token| {
            Inner::fire(engine, record_id, kind, token)
        });
    }

    fn fire(engine: Weak<Self>, id: CheckInId, kind: TimerKind, token: TimerToken) -> TimerFuture {
        Box::pin(async move {
            let Some(engine) = engine.upgrade() else {
                return;
            };
            match kind {
                TimerKind::Schedule => engine.on_schedule_fire(id, token).await,
                TimerKind::Escalation => engine.on_escalation_fire(id, token).await,
            }
        })
    }

    /// Write the full collection, retrying up to `persist_retries` times.
    async fn persist(&self, state: &EngineState) -> Result<(), FriendsosError> {
        let records = state.snapshot();
        let mut attempt = 0;
        loop {
            match self.store.save_check_ins(&records).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.settings.persist_retries => {
                    attempt += 1;
                    warn!(attempt, error = %e, "persisting check-ins failed; retrying");
                }
                Err(e) => {
                    error!(error = %e, "persisting check-ins failed");
                    return Err(e);
                }
            }
        }
    }

    /// Timer callbacks have no caller to report to; the failure is logged
    /// by [`Inner::persist`] and in-memory state stays authoritative.
    async fn persist_logged(&self, state: &EngineState) {
        if let Err(e) = self.persist(state).await {
            debug!(error = %e, "timer transition kept in memory only");
        }
    }
}
