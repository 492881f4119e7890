use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::domain::{ChannelProfile, ClientRole, PeerId};
use tokio::sync::broadcast;

pub mod permissions;
pub mod simulated;

pub use permissions::{PermissionGrant, PermissionProvider, PermissionStatus, StaticPermissions};

/// Capacity of the event queue each engine exposes to subscribers.
pub const ENGINE_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOptions {
    /// `None` joins in open/testing mode.
    pub token: Option<String>,
    pub channel_name: String,
    pub optional_info: Option<String>,
    /// [`PeerId::UNASSIGNED`] lets the server pick the local id.
    pub uid: PeerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserOfflineReason {
    Quit,
    Dropped,
    BecameAudience,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Warning {
        code: i32,
    },
    Error {
        code: i32,
    },
    UserJoined {
        uid: PeerId,
        elapsed_ms: u32,
    },
    UserOffline {
        uid: PeerId,
        reason: UserOfflineReason,
    },
    JoinChannelSuccess {
        channel: String,
        uid: PeerId,
        elapsed_ms: u32,
    },
    LeaveChannel,
    ClientRoleChanged {
        old: ClientRole,
        new: ClientRole,
    },
}

impl EngineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::Warning { .. } => "warning",
            EngineEvent::Error { .. } => "error",
            EngineEvent::UserJoined { .. } => "user_joined",
            EngineEvent::UserOffline { .. } => "user_offline",
            EngineEvent::JoinChannelSuccess { .. } => "join_channel_success",
            EngineEvent::LeaveChannel => "leave_channel",
            EngineEvent::ClientRoleChanged { .. } => "client_role_changed",
        }
    }
}

/// Handle to a live communication engine. Media capture, transport and mixing
/// all happen behind this trait.
#[async_trait]
pub trait RtcEngine: Send + Sync {
    async fn enable_video(&self) -> anyhow::Result<()>;
    async fn set_channel_profile(&self, profile: ChannelProfile) -> anyhow::Result<()>;
    async fn set_client_role(&self, role: ClientRole) -> anyhow::Result<()>;
    /// Completion only means the request was accepted; success is reported as
    /// [`EngineEvent::JoinChannelSuccess`].
    async fn join_channel(&self, options: JoinOptions) -> anyhow::Result<()>;
    async fn leave_channel(&self) -> anyhow::Result<()>;
    async fn start_preview(&self) -> anyhow::Result<()>;
    fn subscribe_events(&self) -> broadcast::Receiver<EngineEvent>;
    /// Frees media and network resources. Safe to call more than once.
    fn release(&self);
}

#[async_trait]
pub trait RtcEngineFactory: Send + Sync {
    async fn create(&self, app_id: &str) -> anyhow::Result<Arc<dyn RtcEngine>>;
}
