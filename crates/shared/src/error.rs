//! Classification of the numeric warning and error codes reported by the engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineCodeCategory {
    InvalidAppId,
    InvalidToken,
    TokenExpired,
    JoinRejected,
    LeaveRejected,
    InvalidArgument,
    Network,
    Device,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("engine code {code} ({category:?})")]
pub struct EngineCode {
    pub code: i32,
    pub category: EngineCodeCategory,
}

impl EngineCode {
    pub fn classify(code: i32) -> Self {
        let category = match code {
            101 => EngineCodeCategory::InvalidAppId,
            110 => EngineCodeCategory::InvalidToken,
            109 => EngineCodeCategory::TokenExpired,
            17 => EngineCodeCategory::JoinRejected,
            18 => EngineCodeCategory::LeaveRejected,
            2 | 3 | 7 => EngineCodeCategory::InvalidArgument,
            104 | 106 | 107 | 1027 => EngineCodeCategory::Network,
            1001..=1026 | 1500..=1599 => EngineCodeCategory::Device,
            _ => EngineCodeCategory::Unknown,
        };
        Self { code, category }
    }

    /// Codes after which the session cannot make progress without user action.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.category,
            EngineCodeCategory::InvalidAppId
                | EngineCodeCategory::InvalidToken
                | EngineCodeCategory::TokenExpired
        )
    }

    pub fn describe(&self) -> &'static str {
        match self.category {
            EngineCodeCategory::InvalidAppId => "application id rejected by the engine",
            EngineCodeCategory::InvalidToken => "channel access token is invalid",
            EngineCodeCategory::TokenExpired => "channel access token has expired",
            EngineCodeCategory::JoinRejected => "join request rejected",
            EngineCodeCategory::LeaveRejected => "leave request rejected",
            EngineCodeCategory::InvalidArgument => "invalid argument passed to the engine",
            EngineCodeCategory::Network => "network interruption",
            EngineCodeCategory::Device => "capture or playback device problem",
            EngineCodeCategory::Unknown => "unrecognized engine code",
        }
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
