//! Camera and microphone access, resolved before the engine is created.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// The user has not been asked yet.
    NotDetermined,
    /// Blocked by policy (parental controls, MDM).
    Restricted,
}

impl fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionStatus::Granted => write!(f, "granted"),
            PermissionStatus::Denied => write!(f, "denied"),
            PermissionStatus::NotDetermined => write!(f, "not_determined"),
            PermissionStatus::Restricted => write!(f, "restricted"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub camera: PermissionStatus,
    pub microphone: PermissionStatus,
}

impl PermissionGrant {
    pub const GRANTED: PermissionGrant = PermissionGrant {
        camera: PermissionStatus::Granted,
        microphone: PermissionStatus::Granted,
    };

    pub const DENIED: PermissionGrant = PermissionGrant {
        camera: PermissionStatus::Denied,
        microphone: PermissionStatus::Denied,
    };

    /// Publishing needs both devices.
    pub fn can_publish(&self) -> bool {
        self.camera == PermissionStatus::Granted && self.microphone == PermissionStatus::Granted
    }
}

#[async_trait]
pub trait PermissionProvider: Send + Sync {
    async fn request_camera_and_microphone(&self) -> PermissionGrant;
}

/// Answers every request with a fixed grant. Desktop targets have no runtime
/// prompt, so the front ends use this.
#[derive(Debug, Clone, Copy)]
pub struct StaticPermissions(pub PermissionGrant);

impl StaticPermissions {
    pub fn granted() -> Self {
        Self(PermissionGrant::GRANTED)
    }

    pub fn denied() -> Self {
        Self(PermissionGrant::DENIED)
    }
}

#[async_trait]
impl PermissionProvider for StaticPermissions {
    async fn request_camera_and_microphone(&self) -> PermissionGrant {
        self.0
    }
}

#[cfg(test)]
#[path = "tests/permissions_tests.rs"]
mod tests;
