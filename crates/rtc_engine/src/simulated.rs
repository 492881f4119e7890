//! In-process engine that records every call and acknowledges joins and
//! leaves the way a real engine would. Remote activity is injected by the
//! caller, and any operation can be scripted to fail.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use shared::domain::{ChannelProfile, ClientRole, PeerId};
use tokio::sync::broadcast;
use tracing::debug;

use crate::{
    EngineEvent, JoinOptions, RtcEngine, RtcEngineFactory, UserOfflineReason,
    ENGINE_EVENT_CAPACITY,
};

const FIRST_ASSIGNED_UID: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineOperation {
    Create,
    EnableVideo,
    SetChannelProfile,
    SetClientRole,
    JoinChannel,
    LeaveChannel,
    StartPreview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    EnableVideo,
    SetChannelProfile(ChannelProfile),
    SetClientRole(ClientRole),
    JoinChannel(JoinOptions),
    LeaveChannel,
    StartPreview,
}

struct SimulatedState {
    calls: Vec<EngineCall>,
    failures: HashSet<EngineOperation>,
    role: Option<ClientRole>,
    channel: Option<String>,
    next_uid: u32,
    release_count: usize,
}

pub struct SimulatedEngine {
    app_id: String,
    events: broadcast::Sender<EngineEvent>,
    state: Mutex<SimulatedState>,
}

impl SimulatedEngine {
    pub fn new(app_id: impl Into<String>) -> Arc<Self> {
        let (events, _) = broadcast::channel(ENGINE_EVENT_CAPACITY);
        Arc::new(Self {
            app_id: app_id.into(),
            events,
            state: Mutex::new(SimulatedState {
                calls: Vec::new(),
                failures: HashSet::new(),
                role: None,
                channel: None,
                next_uid: FIRST_ASSIGNED_UID,
                release_count: 0,
            }),
        })
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    fn state(&self) -> MutexGuard<'_, SimulatedState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn fail(&self, operation: EngineOperation) {
        self.state().failures.insert(operation);
    }

    pub fn recover(&self, operation: EngineOperation) {
        self.state().failures.remove(&operation);
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.state().calls.clone()
    }

    pub fn release_count(&self) -> usize {
        self.state().release_count
    }

    pub fn is_released(&self) -> bool {
        self.release_count() > 0
    }

    pub fn current_channel(&self) -> Option<String> {
        self.state().channel.clone()
    }

    /// Delivers an event as if it came from the network.
    pub fn inject(&self, event: EngineEvent) {
        debug!(event = event.name(), "simulated engine: injecting event");
        let _ = self.events.send(event);
    }

    pub fn peer_joined(&self, uid: u32) {
        self.inject(EngineEvent::UserJoined {
            uid: PeerId(uid),
            elapsed_ms: 0,
        });
    }

    pub fn peer_left(&self, uid: u32) {
        self.inject(EngineEvent::UserOffline {
            uid: PeerId(uid),
            reason: UserOfflineReason::Quit,
        });
    }

    fn begin(&self, operation: EngineOperation, call: EngineCall) -> Result<()> {
        let mut state = self.state();
        if state.release_count > 0 {
            bail!("engine has been released");
        }
        if state.failures.contains(&operation) {
            return Err(anyhow!("simulated failure: {operation:?}"));
        }
        state.calls.push(call);
        Ok(())
    }
}

#[async_trait]
impl RtcEngine for SimulatedEngine {
    async fn enable_video(&self) -> Result<()> {
        self.begin(EngineOperation::EnableVideo, EngineCall::EnableVideo)
    }

    async fn set_channel_profile(&self, profile: ChannelProfile) -> Result<()> {
        self.begin(
            EngineOperation::SetChannelProfile,
            EngineCall::SetChannelProfile(profile),
        )
    }

    async fn set_client_role(&self, role: ClientRole) -> Result<()> {
        self.begin(EngineOperation::SetClientRole, EngineCall::SetClientRole(role))?;
        let (previous, in_channel) = {
            let mut state = self.state();
            (state.role.replace(role), state.channel.is_some())
        };
        if let Some(old) = previous.filter(|old| *old != role && in_channel) {
            let _ = self
                .events
                .send(EngineEvent::ClientRoleChanged { old, new: role });
        }
        Ok(())
    }

    async fn join_channel(&self, options: JoinOptions) -> Result<()> {
        self.begin(
            EngineOperation::JoinChannel,
            EngineCall::JoinChannel(options.clone()),
        )?;
        let uid = {
            let mut state = self.state();
            state.channel = Some(options.channel_name.clone());
            if options.uid.is_unassigned() {
                let uid = PeerId(state.next_uid);
                state.next_uid += 1;
                uid
            } else {
                options.uid
            }
        };
        let _ = self.events.send(EngineEvent::JoinChannelSuccess {
            channel: options.channel_name,
            uid,
            elapsed_ms: 0,
        });
        Ok(())
    }

    async fn leave_channel(&self) -> Result<()> {
        self.begin(EngineOperation::LeaveChannel, EngineCall::LeaveChannel)?;
        self.state().channel = None;
        let _ = self.events.send(EngineEvent::LeaveChannel);
        Ok(())
    }

    async fn start_preview(&self) -> Result<()> {
        self.begin(EngineOperation::StartPreview, EngineCall::StartPreview)
    }

    fn subscribe_events(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    fn release(&self) {
        let mut state = self.state();
        state.release_count += 1;
        state.channel = None;
        debug!(
            app_id = %self.app_id,
            release_count = state.release_count,
            "simulated engine: released"
        );
    }
}

/// Hands out [`SimulatedEngine`]s and keeps them so callers can inspect them.
#[derive(Default)]
pub struct SimulatedEngineFactory {
    engines: Mutex<Vec<Arc<SimulatedEngine>>>,
    next_failures: Mutex<HashSet<EngineOperation>>,
}

impl SimulatedEngineFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Applies to every engine created from now on. `Create` makes
    /// [`RtcEngineFactory::create`] itself fail.
    pub fn fail_next(&self, operation: EngineOperation) {
        self.next_failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(operation);
    }

    pub fn clear_failures(&self) {
        self.next_failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    pub fn engines(&self) -> Vec<Arc<SimulatedEngine>> {
        self.engines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn latest(&self) -> Option<Arc<SimulatedEngine>> {
        self.engines().last().cloned()
    }
}

/// Rejects empty ids and unfilled template placeholders such as `<App ID>`.
pub fn validate_app_id(app_id: &str) -> Result<()> {
    let trimmed = app_id.trim();
    if trimmed.is_empty() {
        bail!("application id is empty");
    }
    if trimmed.starts_with('<') || trimmed.contains(char::is_whitespace) {
        bail!("application id '{trimmed}' is not a valid identifier");
    }
    Ok(())
}

#[async_trait]
impl RtcEngineFactory for SimulatedEngineFactory {
    async fn create(&self, app_id: &str) -> Result<Arc<dyn RtcEngine>> {
        validate_app_id(app_id)?;
        let failures = self
            .next_failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        if failures.contains(&EngineOperation::Create) {
            bail!("simulated failure: {:?}", EngineOperation::Create);
        }

        let engine = SimulatedEngine::new(app_id);
        for operation in failures {
            engine.fail(operation);
        }
        self.engines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Arc::clone(&engine));
        Ok(engine as Arc<dyn RtcEngine>)
    }
}

#[cfg(test)]
#[path = "tests/simulated_tests.rs"]
mod tests;
