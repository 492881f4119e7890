//! Session lifecycle: owns the engine handle, issues commands, and folds the
//! engine's event stream into [`Session`] and [`PeerSet`] state.
//!
//! The controller is driven from a single event-processing loop. Commands take
//! `&mut self` and events are drained with [`SessionController::pump_events`],
//! so handlers and commands interleave but never run concurrently.

use std::sync::Arc;

use rtc_engine::{EngineEvent, PermissionProvider, RtcEngine, RtcEngineFactory};
use serde::Serialize;
use shared::{
    domain::{ChannelProfile, ClientRole, PeerId},
    error::EngineCode,
};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, error, info, warn};

use crate::{config::SessionConfig, error::SessionError, peer_set::PeerSet};

/// One pump can publish a snapshot for every engine event it drains.
const UPDATE_CAPACITY: usize = 2 * rtc_engine::ENGINE_EVENT_CAPACITY;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub joined: bool,
    /// Join requested, acknowledgment not received yet.
    pub join_pending: bool,
    pub role: ClientRole,
    pub channel_name: String,
    pub local_uid: Option<PeerId>,
    /// False after camera/microphone access was denied.
    pub preview_available: bool,
}

impl Session {
    fn new(role: ClientRole, channel_name: String) -> Self {
        Self {
            joined: false,
            join_pending: false,
            role,
            channel_name,
            local_uid: None,
            preview_available: true,
        }
    }

    fn in_channel(&self) -> bool {
        self.joined || self.join_pending
    }

    fn wants_preview(&self) -> bool {
        self.joined && self.role.can_publish() && self.preview_available
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub initialized: bool,
    pub session: Session,
    pub peers: Vec<PeerId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Changed(SessionSnapshot),
    EngineWarning(EngineCode),
    EngineError(EngineCode),
    /// The engine queue overflowed; `skipped` events were never handled, so
    /// the peer list may be missing entries.
    EventsLost { skipped: u64 },
}

/// Exclusive ownership of one engine. Releases it exactly once, either
/// explicitly or when dropped.
struct EngineLease {
    engine: Arc<dyn RtcEngine>,
    released: bool,
}

impl EngineLease {
    fn new(engine: Arc<dyn RtcEngine>) -> Self {
        Self {
            engine,
            released: false,
        }
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.engine.release();
            info!("session: engine released");
        }
    }
}

impl Drop for EngineLease {
    fn drop(&mut self) {
        self.release();
    }
}

struct ActiveEngine {
    lease: EngineLease,
    events: broadcast::Receiver<EngineEvent>,
    config: SessionConfig,
}

enum Lifecycle {
    Uninitialized,
    Ready(ActiveEngine),
    Released,
}

pub struct SessionController {
    lifecycle: Lifecycle,
    session: Session,
    peers: PeerSet,
    updates: broadcast::Sender<SessionUpdate>,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionController {
    pub fn new() -> Self {
        let defaults = SessionConfig::default();
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        Self {
            lifecycle: Lifecycle::Uninitialized,
            session: Session::new(defaults.initial_role, defaults.channel_name),
            peers: PeerSet::new(),
            updates,
        }
    }

    pub fn subscribe_updates(&self) -> broadcast::Receiver<SessionUpdate> {
        self.updates.subscribe()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn peers(&self) -> &PeerSet {
        &self.peers
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Ready(_))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            initialized: self.is_initialized(),
            session: self.session.clone(),
            peers: self.peers.as_slice().to_vec(),
        }
    }

    /// Acquires a fresh engine and applies the static configuration. Any
    /// previously held engine is released once the new one is in place, or
    /// when initialization fails.
    pub async fn initialize(
        &mut self,
        config: SessionConfig,
        factory: &dyn RtcEngineFactory,
        permissions: &dyn PermissionProvider,
    ) -> Result<(), SessionError> {
        if matches!(self.lifecycle, Lifecycle::Released) {
            return Err(SessionError::Released);
        }

        let grant = permissions.request_camera_and_microphone().await;
        if !grant.can_publish() {
            warn!(
                camera = %grant.camera,
                microphone = %grant.microphone,
                "session: media permissions denied; local preview disabled"
            );
        }

        let active = match Self::acquire(&config, factory).await {
            Ok(active) => active,
            Err(err) => {
                let previous = std::mem::replace(&mut self.lifecycle, Lifecycle::Uninitialized);
                if let Lifecycle::Ready(mut previous) = previous {
                    previous.lease.release();
                }
                self.reset_state(&config);
                error!("session: initialization failed: {err}");
                self.publish_changed();
                return Err(err);
            }
        };
        let previous = std::mem::replace(&mut self.lifecycle, Lifecycle::Ready(active));
        if let Lifecycle::Ready(mut previous) = previous {
            debug!("session: replacing previously initialized engine");
            previous.lease.release();
        }

        self.reset_state(&config);
        self.session.preview_available = grant.can_publish();
        info!(
            channel = %config.channel_name,
            role = %config.initial_role,
            open_mode = config.effective_token().is_none(),
            "session: engine initialized"
        );
        self.publish_changed();
        Ok(())
    }

    async fn acquire(
        config: &SessionConfig,
        factory: &dyn RtcEngineFactory,
    ) -> Result<ActiveEngine, SessionError> {
        config.validate().map_err(|err| SessionError::Initialization {
            stage: "validate",
            source: err.into(),
        })?;

        let engine = factory
            .create(&config.app_id)
            .await
            .map_err(SessionError::initialization("create"))?;
        // From here on a failure drops the lease, which releases the engine.
        let lease = EngineLease::new(engine);
        let events = lease.engine.subscribe_events();

        lease
            .engine
            .enable_video()
            .await
            .map_err(SessionError::initialization("enable_video"))?;
        lease
            .engine
            .set_channel_profile(ChannelProfile::LiveBroadcasting)
            .await
            .map_err(SessionError::initialization("set_channel_profile"))?;
        lease
            .engine
            .set_client_role(config.initial_role)
            .await
            .map_err(SessionError::initialization("set_client_role"))?;

        Ok(ActiveEngine {
            lease,
            events,
            config: config.clone(),
        })
    }

    fn reset_state(&mut self, config: &SessionConfig) {
        self.session = Session::new(config.initial_role, config.channel_name.clone());
        self.peers.clear();
    }

    fn active(&self) -> Result<&ActiveEngine, SessionError> {
        match &self.lifecycle {
            Lifecycle::Ready(active) => Ok(active),
            Lifecycle::Uninitialized => Err(SessionError::NotInitialized),
            Lifecycle::Released => Err(SessionError::Released),
        }
    }

    fn engine(&self) -> Result<Arc<dyn RtcEngine>, SessionError> {
        self.active().map(|active| Arc::clone(&active.lease.engine))
    }

    /// "Start Call". Success is observed later as a join acknowledgment.
    pub async fn join_channel(&mut self) -> Result<(), SessionError> {
        let (engine, options) = {
            let active = self.active()?;
            (
                Arc::clone(&active.lease.engine),
                active.config.join_options(),
            )
        };
        if self.session.in_channel() {
            debug!(
                joined = self.session.joined,
                pending = self.session.join_pending,
                "session: join ignored, already in channel"
            );
            return Ok(());
        }

        engine
            .join_channel(options)
            .await
            .map_err(SessionError::engine("join_channel"))?;
        self.session.join_pending = true;
        info!(channel = %self.session.channel_name, "session: join requested");
        self.publish_changed();
        Ok(())
    }

    /// "End Call". State is cleared immediately; the engine's acknowledgment
    /// is not awaited.
    pub async fn leave_channel(&mut self) -> Result<(), SessionError> {
        let engine = self.engine()?;
        if self.session.in_channel() {
            if let Err(err) = engine.leave_channel().await {
                warn!("session: engine leave failed: {err:#}");
            }
        } else {
            debug!("session: leave requested while not in a channel");
        }

        self.session.joined = false;
        self.session.join_pending = false;
        self.session.local_uid = None;
        self.peers.clear();
        info!(channel = %self.session.channel_name, "session: left channel");
        self.publish_changed();
        Ok(())
    }

    /// Commits the new role only after the engine accepts it.
    pub async fn set_role(&mut self, role: ClientRole) -> Result<(), SessionError> {
        let engine = self.engine()?;
        if self.session.role == role {
            return Ok(());
        }

        engine
            .set_client_role(role)
            .await
            .map_err(SessionError::engine("set_client_role"))?;
        let previous = std::mem::replace(&mut self.session.role, role);
        info!(from = %previous, to = %role, "session: role changed");

        if self.session.wants_preview() {
            Self::start_preview(engine.as_ref()).await;
        }
        self.publish_changed();
        Ok(())
    }

    /// "Toggle Role".
    pub async fn toggle_role(&mut self) -> Result<(), SessionError> {
        self.set_role(self.session.role.toggled()).await
    }

    /// Screen teardown. Releases the engine; every later command reports
    /// [`SessionError::Released`].
    pub fn shutdown(&mut self) {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::Released) {
            Lifecycle::Ready(mut active) => active.lease.release(),
            Lifecycle::Uninitialized | Lifecycle::Released => {}
        }
        self.session.joined = false;
        self.session.join_pending = false;
        self.session.local_uid = None;
        self.peers.clear();
        self.publish_changed();
    }

    /// Handles every event queued so far, in arrival order. Returns how many
    /// were handled.
    pub async fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let next = match &mut self.lifecycle {
                Lifecycle::Ready(active) => active.events.try_recv(),
                Lifecycle::Uninitialized | Lifecycle::Released => break,
            };
            match next {
                Ok(event) => {
                    self.handle_event(event).await;
                    handled += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "session: event loop lagged behind the engine");
                    let _ = self.updates.send(SessionUpdate::EventsLost { skipped });
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        handled
    }

    pub async fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Warning { code } => {
                let code = EngineCode::classify(code);
                warn!(
                    code = code.code,
                    category = ?code.category,
                    "engine warning: {}",
                    code.describe()
                );
                let _ = self.updates.send(SessionUpdate::EngineWarning(code));
            }
            EngineEvent::Error { code } => {
                let code = EngineCode::classify(code);
                error!(
                    code = code.code,
                    category = ?code.category,
                    fatal = code.is_fatal(),
                    "engine error: {}",
                    code.describe()
                );
                let _ = self.updates.send(SessionUpdate::EngineError(code));
            }
            EngineEvent::UserJoined { uid, elapsed_ms } => {
                if !self.session.in_channel() {
                    debug!(peer = uid.0, "session: dropping stale user-joined event");
                    return;
                }
                if self.peers.add(uid) {
                    info!(peer = uid.0, elapsed_ms, "session: peer joined");
                    self.publish_changed();
                }
            }
            EngineEvent::UserOffline { uid, reason } => {
                if self.peers.remove(uid) {
                    info!(peer = uid.0, ?reason, "session: peer offline");
                    self.publish_changed();
                }
            }
            EngineEvent::JoinChannelSuccess {
                channel,
                uid,
                elapsed_ms,
            } => {
                if !self.session.in_channel() {
                    debug!(%channel, "session: dropping join acknowledgment after leave");
                    return;
                }
                // The join stays pending: the acknowledgment for the configured
                // channel may still be queued behind this one.
                if channel != self.session.channel_name {
                    warn!(
                        %channel,
                        expected = %self.session.channel_name,
                        "session: join acknowledgment for another channel"
                    );
                    return;
                }
                self.session.joined = true;
                self.session.join_pending = false;
                self.session.local_uid = Some(uid);
                info!(%channel, local_uid = uid.0, elapsed_ms, "session: joined channel");

                if self.session.wants_preview() {
                    if let Ok(engine) = self.engine() {
                        Self::start_preview(engine.as_ref()).await;
                    }
                }
                self.publish_changed();
            }
            EngineEvent::LeaveChannel => {
                debug!("session: engine acknowledged leave");
            }
            EngineEvent::ClientRoleChanged { old, new } => {
                debug!(from = %old, to = %new, "session: engine reported role change");
            }
        }
    }

    async fn start_preview(engine: &dyn RtcEngine) {
        if let Err(err) = engine.start_preview().await {
            warn!("session: failed to start local preview: {err:#}");
        }
    }

    fn publish_changed(&self) {
        let _ = self.updates.send(SessionUpdate::Changed(self.snapshot()));
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
