//! Status panel for the latest created function.
//!
//! The panel shows the record's identity fields and drives a liveness probe
//! against the backend. [`HealthMachine`] holds the transitions;
//! [`StatusPanel`] runs them on a single task that reacts to store updates,
//! refresh requests and probe completions.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use data_model::{FunctionId, FunctionRecord, HealthIndicator};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    api_client::FunctionsApi,
    errors::HealthCheckError,
    store::{LatestFunction, LatestFunctionStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    /// No record to show.
    Idle,
    /// A record just arrived and is optimistically shown as healthy until
    /// the first probe is issued.
    Initial,
    /// A probe is in flight. The indicator keeps what was shown before it:
    /// optimistic healthy for the first probe, the last result on refresh.
    Checking,
    Healthy,
    Unhealthy,
}

impl HealthState {
    pub fn in_flight(&self) -> bool {
        matches!(self, HealthState::Checking)
    }

    /// A probe result is shown. Only settled states accept a refresh.
    pub fn is_settled(&self) -> bool {
        matches!(self, HealthState::Healthy | HealthState::Unhealthy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Healthy,
    Unhealthy,
}

impl From<&Result<(), HealthCheckError>> for ProbeOutcome {
    fn from(result: &Result<(), HealthCheckError>) -> Self {
        match result {
            Ok(()) => ProbeOutcome::Healthy,
            Err(_) => ProbeOutcome::Unhealthy,
        }
    }
}

/// Identifies the record a probe was started for. The epoch changes on
/// every record replacement, so a result is only applied to the exact
/// record instance that issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTicket {
    pub function_id: FunctionId,
    epoch: u64,
}

/// What the panel renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSnapshot {
    pub record: Option<Arc<FunctionRecord>>,
    pub state: HealthState,
    /// Tri-state shown next to the record, independent of whether a probe
    /// is in flight.
    pub indicator: HealthIndicator,
    pub checked_at: Option<DateTime<Utc>>,
}

impl PanelSnapshot {
    pub fn indicator(&self) -> HealthIndicator {
        self.indicator
    }
}

/// Health-check transitions for the displayed record.
#[derive(Debug)]
pub struct HealthMachine {
    record: Option<Arc<FunctionRecord>>,
    state: HealthState,
    shown: HealthIndicator,
    epoch: u64,
    checked_at: Option<DateTime<Utc>>,
}

impl Default for HealthMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthMachine {
    pub fn new() -> Self {
        Self {
            record: None,
            state: HealthState::Idle,
            shown: HealthIndicator::Unknown,
            epoch: 0,
            checked_at: None,
        }
    }

    pub fn state(&self) -> HealthState {
        self.state
    }

    pub fn record(&self) -> Option<&Arc<FunctionRecord>> {
        self.record.as_ref()
    }

    fn ticket(&self) -> Option<ProbeTicket> {
        self.record.as_ref().map(|r| ProbeTicket {
            function_id: r.id.clone(),
            epoch: self.epoch,
        })
    }

    fn is_current(&self, ticket: &ProbeTicket) -> bool {
        ticket.epoch == self.epoch
            && self
                .record
                .as_ref()
                .is_some_and(|r| r.id == ticket.function_id)
    }

    /// Replaces the displayed record. Any outstanding ticket is invalidated.
    /// Returns the ticket for the initial probe when there is a record.
    pub fn record_changed(&mut self, record: LatestFunction) -> Option<ProbeTicket> {
        self.epoch += 1;
        self.checked_at = None;
        (self.state, self.shown) = if record.is_some() {
            (HealthState::Initial, HealthIndicator::Healthy)
        } else {
            (HealthState::Idle, HealthIndicator::Unknown)
        };
        self.record = record;
        self.ticket()
    }

    /// Moves `Initial` to `Checking` for the initial probe.
    pub fn begin_probe(&mut self, ticket: &ProbeTicket) -> bool {
        if self.state != HealthState::Initial || !self.is_current(ticket) {
            return false;
        }
        self.state = HealthState::Checking;
        true
    }

    /// User-triggered re-probe. Ignored while a probe is in flight or when
    /// there is nothing to probe.
    pub fn refresh(&mut self) -> Option<ProbeTicket> {
        if !self.state.is_settled() {
            return None;
        }
        self.state = HealthState::Checking;
        self.ticket()
    }

    /// Applies a probe result. Results for a record that is no longer
    /// displayed are dropped; returns whether the result was applied.
    pub fn complete(&mut self, ticket: &ProbeTicket, outcome: ProbeOutcome) -> bool {
        if self.state != HealthState::Checking || !self.is_current(ticket) {
            return false;
        }
        (self.state, self.shown) = match outcome {
            ProbeOutcome::Healthy => (HealthState::Healthy, HealthIndicator::Healthy),
            ProbeOutcome::Unhealthy => (HealthState::Unhealthy, HealthIndicator::Unhealthy),
        };
        self.checked_at = Some(Utc::now());
        true
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            record: self.record.clone(),
            state: self.state,
            indicator: self.shown,
            checked_at: self.checked_at,
        }
    }
}

#[derive(Debug)]
enum PanelCommand {
    Refresh(oneshot::Sender<bool>),
}

type ProbeResult = (ProbeTicket, ProbeOutcome);

/// Handle to a running status panel.
pub struct StatusPanelHandle {
    commands: mpsc::UnboundedSender<PanelCommand>,
    snapshots: watch::Receiver<PanelSnapshot>,
    task: JoinHandle<()>,
}

impl StatusPanelHandle {
    /// Requests a re-probe. Returns false when the request was ignored,
    /// e.g. because a probe is already in flight.
    pub async fn refresh(&self) -> bool {
        let (tx, rx) = oneshot::channel();
        if self.commands.send(PanelCommand::Refresh(tx)).is_err() {
            debug!("status panel stopped, ignoring refresh");
            return false;
        }
        rx.await.unwrap_or(false)
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PanelSnapshot> {
        self.snapshots.clone()
    }

    /// Waits until a probe result is shown for the displayed record.
    pub async fn settled(&self) -> Option<PanelSnapshot> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(|s| s.record.is_some() && s.state.is_settled())
            .await
            .ok()?;
        Some(snapshot.clone())
    }

    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!(error = %e, "status panel task failed");
        }
    }
}

pub struct StatusPanel {
    api: Arc<dyn FunctionsApi>,
    probe_timeout: Duration,
    machine: HealthMachine,
    snapshots: watch::Sender<PanelSnapshot>,
    probe: Option<JoinHandle<()>>,
    results_tx: mpsc::UnboundedSender<ProbeResult>,
}

impl StatusPanel {
    /// Starts the panel task. It follows `store` until `cancel` fires.
    pub fn spawn(
        api: Arc<dyn FunctionsApi>,
        store: &LatestFunctionStore,
        probe_timeout: Duration,
        cancel: CancellationToken,
    ) -> StatusPanelHandle {
        let machine = HealthMachine::new();
        let (snapshots, snapshots_rx) = watch::channel(machine.snapshot());
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let panel = StatusPanel {
            api,
            probe_timeout,
            machine,
            snapshots,
            probe: None,
            results_tx,
        };
        let task = tokio::spawn(panel.run(store.subscribe(), commands_rx, results_rx, cancel));
        StatusPanelHandle {
            commands: commands_tx,
            snapshots: snapshots_rx,
            task,
        }
    }

    async fn run(
        mut self,
        mut records: watch::Receiver<LatestFunction>,
        mut commands: mpsc::UnboundedReceiver<PanelCommand>,
        mut results: mpsc::UnboundedReceiver<ProbeResult>,
        cancel: CancellationToken,
    ) {
        let current = records.borrow_and_update().clone();
        if current.is_some() {
            self.on_record_changed(current);
        }

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("status panel cancelled");
                    break;
                }
                changed = records.changed() => {
                    if changed.is_err() {
                        debug!("function store closed, stopping status panel");
                        break;
                    }
                    let record = records.borrow_and_update().clone();
                    self.on_record_changed(record);
                }
                Some(command) = commands.recv() => match command {
                    PanelCommand::Refresh(ack) => {
                        let _ = ack.send(self.on_refresh());
                    }
                },
                Some((ticket, outcome)) = results.recv() => {
                    self.on_probe_result(ticket, outcome);
                }
            }
        }

        self.abort_probe();
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.machine.snapshot());
    }

    fn abort_probe(&mut self) {
        if let Some(probe) = self.probe.take() {
            probe.abort();
        }
    }

    fn on_record_changed(&mut self, record: LatestFunction) {
        self.abort_probe();
        let ticket = self.machine.record_changed(record);
        // Show the optimistic state before the probe goes out.
        self.publish();
        let Some(ticket) = ticket else {
            debug!("status panel cleared");
            return;
        };
        info!(function_id = %ticket.function_id, "showing function, probing health");
        if self.machine.begin_probe(&ticket) {
            self.start_probe(ticket);
            self.publish();
        }
    }

    fn on_refresh(&mut self) -> bool {
        match self.machine.refresh() {
            Some(ticket) => {
                debug!(function_id = %ticket.function_id, "refreshing health");
                self.start_probe(ticket);
                self.publish();
                true
            }
            None => {
                debug!(state = ?self.machine.state(), "refresh ignored");
                false
            }
        }
    }

    fn on_probe_result(&mut self, ticket: ProbeTicket, outcome: ProbeOutcome) {
        if self.machine.complete(&ticket, outcome) {
            self.probe = None;
            info!(function_id = %ticket.function_id, outcome = ?outcome, "health probe finished");
            self.publish();
        } else {
            debug!(function_id = %ticket.function_id, "discarding stale health probe result");
        }
    }

    fn start_probe(&mut self, ticket: ProbeTicket) {
        let api = self.api.clone();
        let results = self.results_tx.clone();
        let timeout = self.probe_timeout;
        self.probe = Some(tokio::spawn(async move {
            let outcome = probe(api.as_ref(), &ticket.function_id, timeout).await;
            let _ = results.send((ticket, outcome));
        }));
    }
}

/// One health probe. Every failure, including a timeout, is unhealthy.
pub async fn probe(api: &dyn FunctionsApi, id: &FunctionId, timeout: Duration) -> ProbeOutcome {
    match tokio::time::timeout(timeout, api.check_health(id)).await {
        Ok(result) => {
            if let Err(e) = &result {
                debug!(function_id = %id, error = %e, "function reported unhealthy");
            }
            ProbeOutcome::from(&result)
        }
        Err(_) => {
            warn!(function_id = %id, timeout = ?timeout, "health probe timed out");
            ProbeOutcome::Unhealthy
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
    };

    use async_trait::async_trait;
    use data_model::Language;
    use reqwest::StatusCode;
    use tokio::sync::Notify;

    use super::*;
    use crate::{errors::ApiError, http_objects::CreateFunctionRequest};

    fn record(id: &str) -> Arc<FunctionRecord> {
        Arc::new(FunctionRecord {
            id: FunctionId::from(id),
            language: Language::Go,
            created_at: Utc::now(),
            url: format!("https://fns.example/{}", id),
        })
    }

    #[derive(Clone, Copy)]
    enum Answer {
        True,
        False,
        Status(StatusCode),
        Hang,
    }

    #[derive(Default)]
    struct ScriptedHealth {
        answers: Mutex<HashMap<String, Answer>>,
        gates: Mutex<HashMap<String, Arc<Notify>>>,
        probes: AtomicUsize,
    }

    impl ScriptedHealth {
        fn answer(&self, id: &str, answer: Answer) {
            self.answers.lock().unwrap().insert(id.to_string(), answer);
        }

        fn gate(&self, id: &str) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            self.gates
                .lock()
                .unwrap()
                .insert(id.to_string(), gate.clone());
            gate
        }

        fn probes(&self) -> usize {
            self.probes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FunctionsApi for ScriptedHealth {
        async fn create_function(
            &self,
            _request: CreateFunctionRequest,
        ) -> Result<FunctionRecord, ApiError> {
            Err(ApiError::InvalidResponse("not scripted".to_string()))
        }

        async fn check_health(&self, id: &FunctionId) -> Result<(), HealthCheckError> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            let gate = self.gates.lock().unwrap().get(id.get()).cloned();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            let answer = self
                .answers
                .lock()
                .unwrap()
                .get(id.get())
                .copied()
                .unwrap_or(Answer::True);
            match answer {
                Answer::True => Ok(()),
                Answer::False => Err(HealthCheckError::NotHealthy("false".to_string())),
                Answer::Status(status) => Err(HealthCheckError::Status(status)),
                Answer::Hang => std::future::pending().await,
            }
        }

        async fn delete_function(&self, _id: &FunctionId) -> Result<(), ApiError> {
            Ok(())
        }
    }

    async fn wait_for_state(
        rx: &mut watch::Receiver<PanelSnapshot>,
        id: &str,
        state: HealthState,
    ) -> PanelSnapshot {
        rx.wait_for(|s| {
            s.state == state && s.record.as_ref().is_some_and(|r| r.id.get() == id)
        })
        .await
        .unwrap()
        .clone()
    }

    #[test]
    fn test_indicator_survives_checking() {
        let mut machine = HealthMachine::new();
        assert_eq!(machine.snapshot().indicator(), HealthIndicator::Unknown);

        let ticket = machine.record_changed(Some(record("fn_1"))).unwrap();
        assert_eq!(machine.snapshot().indicator(), HealthIndicator::Healthy);
        assert!(machine.begin_probe(&ticket));
        assert!(machine.state().in_flight());
        assert_eq!(machine.snapshot().indicator(), HealthIndicator::Healthy);

        assert!(machine.complete(&ticket, ProbeOutcome::Unhealthy));
        assert_eq!(machine.snapshot().indicator().color(), "red");
        let ticket = machine.refresh().unwrap();
        assert_eq!(machine.snapshot().indicator(), HealthIndicator::Unhealthy);
        assert!(machine.complete(&ticket, ProbeOutcome::Healthy));
        assert_eq!(machine.snapshot().indicator().color(), "green");

        machine.record_changed(None);
        assert_eq!(machine.snapshot().indicator(), HealthIndicator::Unknown);
    }

    #[test]
    fn test_machine_initial_probe_flow() {
        let mut machine = HealthMachine::new();
        assert!(machine.refresh().is_none());

        let ticket = machine.record_changed(Some(record("fn_1"))).unwrap();
        assert_eq!(machine.state(), HealthState::Initial);
        assert!(machine.refresh().is_none());

        assert!(machine.begin_probe(&ticket));
        assert_eq!(machine.state(), HealthState::Checking);
        assert!(machine.refresh().is_none());
        assert!(!machine.begin_probe(&ticket));

        assert!(machine.complete(&ticket, ProbeOutcome::Unhealthy));
        assert_eq!(machine.state(), HealthState::Unhealthy);
        assert!(machine.snapshot().checked_at.is_some());

        // A duplicate completion is ignored once settled.
        assert!(!machine.complete(&ticket, ProbeOutcome::Healthy));
        assert_eq!(machine.state(), HealthState::Unhealthy);

        let ticket = machine.refresh().unwrap();
        assert_eq!(machine.state(), HealthState::Checking);
        assert!(machine.complete(&ticket, ProbeOutcome::Healthy));
        assert_eq!(machine.state(), HealthState::Healthy);
    }

    #[test]
    fn test_machine_drops_stale_results() {
        let mut machine = HealthMachine::new();
        let ticket_a = machine.record_changed(Some(record("fn_a"))).unwrap();
        assert!(machine.begin_probe(&ticket_a));

        let ticket_b = machine.record_changed(Some(record("fn_b"))).unwrap();
        assert!(!machine.complete(&ticket_a, ProbeOutcome::Unhealthy));
        assert_eq!(machine.state(), HealthState::Initial);
        assert_eq!(machine.record().unwrap().id.get(), "fn_b");

        assert!(machine.begin_probe(&ticket_b));
        assert!(machine.complete(&ticket_b, ProbeOutcome::Healthy));
        assert_eq!(machine.state(), HealthState::Healthy);
    }

    #[test]
    fn test_machine_same_id_republished_is_new_identity() {
        let mut machine = HealthMachine::new();
        let first = machine.record_changed(Some(record("fn_a"))).unwrap();
        assert!(machine.begin_probe(&first));
        let second = machine.record_changed(Some(record("fn_a"))).unwrap();
        assert_ne!(first, second);
        assert!(machine.begin_probe(&second));
        assert!(!machine.complete(&first, ProbeOutcome::Unhealthy));
        assert!(machine.complete(&second, ProbeOutcome::Healthy));
    }

    #[test]
    fn test_machine_cleared_record_is_idle() {
        let mut machine = HealthMachine::new();
        let ticket = machine.record_changed(Some(record("fn_a"))).unwrap();
        assert!(machine.begin_probe(&ticket));
        assert!(machine.record_changed(None).is_none());
        assert_eq!(machine.state(), HealthState::Idle);
        assert!(!machine.complete(&ticket, ProbeOutcome::Healthy));
        assert!(machine.snapshot().record.is_none());
    }

    #[tokio::test]
    async fn test_new_record_probes_once() {
        let api = Arc::new(ScriptedHealth::default());
        let store = LatestFunctionStore::new();
        let panel = StatusPanel::spawn(
            api.clone(),
            &store,
            Duration::from_secs(5),
            CancellationToken::new(),
        );
        let mut rx = panel.subscribe();
        assert_eq!(panel.snapshot().state, HealthState::Idle);

        store.publish((*record("fn_123")).clone());
        let snapshot = wait_for_state(&mut rx, "fn_123", HealthState::Healthy).await;
        assert_eq!(snapshot.indicator(), HealthIndicator::Healthy);
        assert_eq!(api.probes(), 1);
    }

    #[tokio::test]
    async fn test_new_record_shows_optimistic_healthy_while_checking() {
        let api = Arc::new(ScriptedHealth::default());
        api.answer("fn_123", Answer::Hang);
        let store = LatestFunctionStore::new();
        let panel = StatusPanel::spawn(
            api.clone(),
            &store,
            Duration::from_secs(60),
            CancellationToken::new(),
        );
        let mut rx = panel.subscribe();

        store.publish((*record("fn_123")).clone());
        let snapshot = wait_for_state(&mut rx, "fn_123", HealthState::Checking).await;
        assert_eq!(snapshot.indicator(), HealthIndicator::Healthy);
        assert_eq!(snapshot.indicator().color(), "green");
        while api.probes() == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(panel.snapshot().indicator(), HealthIndicator::Healthy);
    }

    #[tokio::test]
    async fn test_non_success_status_is_unhealthy() {
        let api = Arc::new(ScriptedHealth::default());
        api.answer("fn_500", Answer::Status(StatusCode::INTERNAL_SERVER_ERROR));
        api.answer("fn_false", Answer::False);
        let store = LatestFunctionStore::new();
        let panel = StatusPanel::spawn(
            api.clone(),
            &store,
            Duration::from_secs(5),
            CancellationToken::new(),
        );
        let mut rx = panel.subscribe();

        store.publish((*record("fn_500")).clone());
        let snapshot = wait_for_state(&mut rx, "fn_500", HealthState::Unhealthy).await;
        assert_eq!(snapshot.indicator().color(), "red");

        store.publish((*record("fn_false")).clone());
        wait_for_state(&mut rx, "fn_false", HealthState::Unhealthy).await;
    }

    #[tokio::test]
    async fn test_refresh_while_checking_is_ignored() {
        let api = Arc::new(ScriptedHealth::default());
        let gate = api.gate("fn_1");
        let store = LatestFunctionStore::new();
        let panel = StatusPanel::spawn(
            api.clone(),
            &store,
            Duration::from_secs(5),
            CancellationToken::new(),
        );
        let mut rx = panel.subscribe();

        store.publish((*record("fn_1")).clone());
        wait_for_state(&mut rx, "fn_1", HealthState::Checking).await;
        while api.probes() == 0 {
            tokio::task::yield_now().await;
        }

        assert!(!panel.refresh().await);
        assert!(!panel.refresh().await);
        gate.notify_one();
        wait_for_state(&mut rx, "fn_1", HealthState::Healthy).await;
        assert_eq!(api.probes(), 1);

        // Once settled, a refresh issues exactly one more probe.
        api.gates.lock().unwrap().clear();
        api.answer("fn_1", Answer::False);
        assert!(panel.refresh().await);
        wait_for_state(&mut rx, "fn_1", HealthState::Unhealthy).await;
        assert_eq!(api.probes(), 2);
    }

    #[tokio::test]
    async fn test_late_result_does_not_touch_new_record() {
        let api = Arc::new(ScriptedHealth::default());
        let gate_a = api.gate("fn_a");
        api.answer("fn_a", Answer::True);
        api.answer("fn_b", Answer::Status(StatusCode::SERVICE_UNAVAILABLE));
        let store = LatestFunctionStore::new();
        let panel = StatusPanel::spawn(
            api.clone(),
            &store,
            Duration::from_secs(5),
            CancellationToken::new(),
        );
        let mut rx = panel.subscribe();

        store.publish((*record("fn_a")).clone());
        wait_for_state(&mut rx, "fn_a", HealthState::Checking).await;

        store.publish((*record("fn_b")).clone());
        wait_for_state(&mut rx, "fn_b", HealthState::Unhealthy).await;

        gate_a.notify_one();
        tokio::task::yield_now().await;
        let snapshot = panel.snapshot();
        assert_eq!(snapshot.record.unwrap().id.get(), "fn_b");
        assert_eq!(snapshot.state, HealthState::Unhealthy);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_timeout_is_unhealthy() {
        let api = Arc::new(ScriptedHealth::default());
        api.answer("fn_slow", Answer::Hang);
        let store = LatestFunctionStore::new();
        let panel = StatusPanel::spawn(
            api.clone(),
            &store,
            Duration::from_secs(10),
            CancellationToken::new(),
        );

        store.publish((*record("fn_slow")).clone());
        let snapshot = panel.settled().await.unwrap();
        assert_eq!(snapshot.state, HealthState::Unhealthy);
    }

    #[tokio::test]
    async fn test_cleared_store_returns_to_idle() {
        let api = Arc::new(ScriptedHealth::default());
        let store = LatestFunctionStore::new();
        let cancel = CancellationToken::new();
        let panel = StatusPanel::spawn(api.clone(), &store, Duration::from_secs(5), cancel.clone());
        let mut rx = panel.subscribe();

        store.publish((*record("fn_1")).clone());
        wait_for_state(&mut rx, "fn_1", HealthState::Healthy).await;
        store.clear();
        rx.wait_for(|s| s.state == HealthState::Idle && s.record.is_none())
            .await
            .unwrap();

        cancel.cancel();
        panel.join().await;
    }

    #[tokio::test]
    async fn test_record_present_at_start_is_probed() {
        let api = Arc::new(ScriptedHealth::default());
        let store = LatestFunctionStore::new();
        store.publish((*record("fn_early")).clone());

        let panel = StatusPanel::spawn(
            api.clone(),
            &store,
            Duration::from_secs(5),
            CancellationToken::new(),
        );
        let snapshot = panel.settled().await.unwrap();
        assert_eq!(snapshot.record.unwrap().id.get(), "fn_early");
        assert_eq!(snapshot.state, HealthState::Healthy);
        assert_eq!(api.probes(), 1);
    }
}
