//! Session worker: owns the controller on its own thread and runs the single
//! event-processing loop that commands and engine events share.

use std::{sync::Arc, thread, time::Duration};

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use rtc_engine::{simulated::SimulatedEngineFactory, PermissionProvider};
use session_core::{SessionConfig, SessionController, SessionError, SessionUpdate};
use shared::domain::PeerId;
use tokio::sync::broadcast::{self, error::TryRecvError as UpdateRecvError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

const POLL_INTERVAL: Duration = Duration::from_millis(16);
const FIRST_SIMULATED_PEER: u32 = 1;

pub fn launch(
    config: SessionConfig,
    permissions: Arc<dyn PermissionProvider>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Session worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::WorkerStartup,
                    format!("session worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build session worker runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let mut worker = SessionWorker::start(config, permissions.as_ref(), ui_tx).await;
            loop {
                loop {
                    match cmd_rx.try_recv() {
                        Ok(cmd) => {
                            if !worker.handle_command(cmd).await {
                                return;
                            }
                        }
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            tracing::info!("ui command queue closed; shutting down session");
                            worker.handle_command(BackendCommand::Shutdown).await;
                            return;
                        }
                    }
                }
                worker.tick().await;
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        });
    })
}

pub struct SessionWorker {
    controller: SessionController,
    factory: Arc<SimulatedEngineFactory>,
    updates: broadcast::Receiver<SessionUpdate>,
    ui_tx: Sender<UiEvent>,
    next_simulated_peer: u32,
}

impl SessionWorker {
    pub async fn start(
        config: SessionConfig,
        permissions: &dyn PermissionProvider,
        ui_tx: Sender<UiEvent>,
    ) -> Self {
        let factory = SimulatedEngineFactory::new();
        let controller = SessionController::new();
        let updates = controller.subscribe_updates();
        let mut worker = Self {
            controller,
            factory,
            updates,
            ui_tx,
            next_simulated_peer: FIRST_SIMULATED_PEER,
        };

        let initialized = worker
            .controller
            .initialize(config, worker.factory.as_ref(), permissions)
            .await;
        match initialized {
            Ok(()) => worker.send(UiEvent::Info("Engine ready".to_string())),
            Err(err) => {
                tracing::error!("session initialization failed: {err}");
                worker.report(UiErrorContext::Initialize, &err);
            }
        }
        worker.forward_updates();
        worker
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Returns `false` once the worker should stop.
    pub async fn handle_command(&mut self, cmd: BackendCommand) -> bool {
        tracing::debug!(command = cmd.name(), "session worker: command");
        let result = match cmd {
            BackendCommand::ToggleRole => (
                UiErrorContext::ToggleRole,
                self.controller.toggle_role().await,
            ),
            BackendCommand::StartCall => (
                UiErrorContext::StartCall,
                self.controller.join_channel().await,
            ),
            BackendCommand::EndCall => (
                UiErrorContext::EndCall,
                self.controller.leave_channel().await,
            ),
            BackendCommand::SimulatePeerJoin => {
                if let Some(engine) = self.factory.latest() {
                    engine.peer_joined(self.next_simulated_peer);
                    self.next_simulated_peer += 1;
                }
                return true;
            }
            BackendCommand::SimulatePeerLeave => {
                let last = self.controller.peers().iter().last();
                if let (Some(engine), Some(PeerId(uid))) = (self.factory.latest(), last) {
                    engine.peer_left(uid);
                }
                return true;
            }
            BackendCommand::Shutdown => {
                self.controller.shutdown();
                self.forward_updates();
                return false;
            }
        };

        if let (context, Err(err)) = result {
            self.report(context, &err);
        }
        self.forward_updates();
        true
    }

    pub async fn tick(&mut self) {
        if self.controller.pump_events().await > 0 {
            self.forward_updates();
        }
    }

    fn forward_updates(&mut self) {
        let mut latest = None;
        loop {
            match self.updates.try_recv() {
                Ok(SessionUpdate::Changed(snapshot)) => latest = Some(snapshot),
                Ok(SessionUpdate::EngineWarning(code)) => self.send(UiEvent::Info(format!(
                    "Engine warning {}: {}",
                    code.code,
                    code.describe()
                ))),
                Ok(SessionUpdate::EngineError(code)) => {
                    self.send(UiEvent::Error(UiError::from_engine_code(code)))
                }
                Ok(SessionUpdate::EventsLost { skipped }) => {
                    self.send(UiEvent::Error(UiError::events_lost(skipped)))
                }
                Err(UpdateRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "session worker: update queue lagged");
                    latest = Some(self.controller.snapshot());
                }
                Err(UpdateRecvError::Empty) | Err(UpdateRecvError::Closed) => break,
            }
        }
        if let Some(snapshot) = latest {
            self.send(UiEvent::SessionChanged(snapshot));
        }
    }

    fn report(&self, context: UiErrorContext, err: &SessionError) {
        if err.is_sequencing() {
            tracing::debug!("ignored {} command: {err}", context.label());
            self.send(UiEvent::Info(format!("{} ignored: {err}", context.label())));
            return;
        }
        self.send(UiEvent::Error(UiError::from_session(context, err)));
    }

    fn send(&self, event: UiEvent) {
        let _ = self.ui_tx.try_send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use rtc_engine::StaticPermissions;
    use shared::domain::ClientRole;

    fn config() -> SessionConfig {
        SessionConfig {
            app_id: "demo-app".into(),
            ..SessionConfig::default()
        }
    }

    fn latest_snapshot(rx: &Receiver<UiEvent>) -> Option<session_core::SessionSnapshot> {
        let mut latest = None;
        while let Ok(event) = rx.try_recv() {
            if let UiEvent::SessionChanged(snapshot) = event {
                latest = Some(snapshot);
            }
        }
        latest
    }

    #[tokio::test]
    async fn start_call_reports_joined_after_acknowledgment() {
        let (ui_tx, ui_rx) = bounded(64);
        let mut worker =
            SessionWorker::start(config(), &StaticPermissions::granted(), ui_tx).await;
        assert!(worker.controller().is_initialized());

        assert!(worker.handle_command(BackendCommand::StartCall).await);
        worker.tick().await;

        let snapshot = latest_snapshot(&ui_rx).expect("snapshot");
        assert!(snapshot.session.joined);
    }

    #[tokio::test]
    async fn simulated_peers_flow_into_snapshots() {
        let (ui_tx, ui_rx) = bounded(64);
        let mut worker =
            SessionWorker::start(config(), &StaticPermissions::granted(), ui_tx).await;
        worker.handle_command(BackendCommand::StartCall).await;
        worker.tick().await;

        worker.handle_command(BackendCommand::SimulatePeerJoin).await;
        worker.handle_command(BackendCommand::SimulatePeerJoin).await;
        worker.tick().await;
        worker.handle_command(BackendCommand::SimulatePeerLeave).await;
        worker.tick().await;

        let snapshot = latest_snapshot(&ui_rx).expect("snapshot");
        assert_eq!(snapshot.peers, vec![PeerId(1)]);
    }

    #[tokio::test]
    async fn toggle_and_end_call_update_the_ui() {
        let (ui_tx, ui_rx) = bounded(64);
        let mut worker =
            SessionWorker::start(config(), &StaticPermissions::granted(), ui_tx).await;
        worker.handle_command(BackendCommand::StartCall).await;
        worker.tick().await;

        worker.handle_command(BackendCommand::ToggleRole).await;
        worker.handle_command(BackendCommand::EndCall).await;

        let snapshot = latest_snapshot(&ui_rx).expect("snapshot");
        assert_eq!(snapshot.session.role, ClientRole::Audience);
        assert!(!snapshot.session.joined);
    }

    #[tokio::test]
    async fn initialization_failure_is_reported_and_commands_are_ignored() {
        let (ui_tx, ui_rx) = bounded(64);
        let mut bad = config();
        bad.app_id = "<App ID>".into();
        let mut worker = SessionWorker::start(bad, &StaticPermissions::granted(), ui_tx).await;

        assert!(worker.handle_command(BackendCommand::StartCall).await);

        let mut errors = Vec::new();
        let mut infos = Vec::new();
        for event in ui_rx.try_iter() {
            match event {
                UiEvent::Error(err) => errors.push(err),
                UiEvent::Info(message) => infos.push(message),
                UiEvent::SessionChanged(_) => {}
            }
        }
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].context(), UiErrorContext::Initialize);
        assert!(errors[0].requires_reconfigure());
        assert_eq!(
            infos.last().map(String::as_str),
            Some("Start Call ignored: session is not initialized")
        );
    }

    #[tokio::test]
    async fn lost_engine_events_reach_the_ui() {
        let (ui_tx, ui_rx) = bounded(1024);
        let mut worker =
            SessionWorker::start(config(), &StaticPermissions::granted(), ui_tx).await;
        worker.handle_command(BackendCommand::StartCall).await;
        worker.tick().await;

        let engine = worker.factory.latest().expect("engine");
        for uid in 1..=(rtc_engine::ENGINE_EVENT_CAPACITY as u32 + 10) {
            engine.peer_joined(uid);
        }
        worker.tick().await;

        let lost: Vec<UiError> = ui_rx
            .try_iter()
            .filter_map(|event| match event {
                UiEvent::Error(err) => Some(err),
                _ => None,
            })
            .collect();
        assert_eq!(lost.len(), 1);
        assert_eq!(lost[0].context(), UiErrorContext::Engine);
        assert!(lost[0].message().contains("10 engine events"));
    }

    #[tokio::test]
    async fn shutdown_stops_the_worker() {
        let (ui_tx, _ui_rx) = bounded(64);
        let mut worker =
            SessionWorker::start(config(), &StaticPermissions::granted(), ui_tx).await;

        assert!(!worker.handle_command(BackendCommand::Shutdown).await);
        assert!(!worker.controller().is_initialized());
    }
}
