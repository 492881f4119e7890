use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(PeerId);

impl PeerId {
    /// Passed as the local id hint when the server should assign one.
    pub const UNASSIGNED: PeerId = PeerId(0);

    pub fn is_unassigned(self) -> bool {
        self == Self::UNASSIGNED
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientRole {
    Broadcaster,
    Audience,
}

impl ClientRole {
    pub fn toggled(self) -> Self {
        match self {
            ClientRole::Broadcaster => ClientRole::Audience,
            ClientRole::Audience => ClientRole::Broadcaster,
        }
    }

    pub fn can_publish(self) -> bool {
        self == ClientRole::Broadcaster
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "broadcaster" | "host" | "1" => Some(ClientRole::Broadcaster),
            "audience" | "2" => Some(ClientRole::Audience),
            _ => None,
        }
    }
}

impl fmt::Display for ClientRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientRole::Broadcaster => write!(f, "broadcaster"),
            ClientRole::Audience => write!(f, "audience"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelProfile {
    /// Every participant publishes and receives.
    Communication,
    /// One publisher-capable role, many viewer-capable roles.
    LiveBroadcasting,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
