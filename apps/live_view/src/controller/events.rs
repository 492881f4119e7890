//! Worker-to-UI events and error modeling for the broadcast screen.

use session_core::{SessionError, SessionSnapshot};
use shared::error::{EngineCode, EngineCodeCategory};

pub enum UiEvent {
    Info(String),
    SessionChanged(SessionSnapshot),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Credentials,
    Permission,
    Transport,
    Sequencing,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    WorkerStartup,
    Initialize,
    StartCall,
    EndCall,
    ToggleRole,
    Engine,
}

impl UiErrorContext {
    pub fn label(self) -> &'static str {
        match self {
            UiErrorContext::WorkerStartup => "Startup",
            UiErrorContext::Initialize => "Initialize",
            UiErrorContext::StartCall => "Start Call",
            UiErrorContext::EndCall => "End Call",
            UiErrorContext::ToggleRole => "Toggle Role",
            UiErrorContext::Engine => "Engine",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("app id")
            || lower.contains("application id")
            || lower.contains("token")
            || lower.contains("app_id")
        {
            UiErrorCategory::Credentials
        } else if lower.contains("permission")
            || lower.contains("camera")
            || lower.contains("microphone")
        {
            UiErrorCategory::Permission
        } else if lower.contains("not initialized") || lower.contains("released") {
            UiErrorCategory::Sequencing
        } else if lower.contains("network")
            || lower.contains("timeout")
            || lower.contains("connection")
            || lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_session(context: UiErrorContext, err: &SessionError) -> Self {
        Self::from_message(context, err.to_string())
    }

    pub fn from_engine_code(code: EngineCode) -> Self {
        let category = match code.category {
            EngineCodeCategory::InvalidAppId
            | EngineCodeCategory::InvalidToken
            | EngineCodeCategory::TokenExpired => UiErrorCategory::Credentials,
            EngineCodeCategory::Network => UiErrorCategory::Transport,
            EngineCodeCategory::Device => UiErrorCategory::Permission,
            _ => UiErrorCategory::Unknown,
        };
        Self {
            category,
            context: UiErrorContext::Engine,
            message: format!("{} (code {})", code.describe(), code.code),
        }
    }

    pub fn events_lost(skipped: u64) -> Self {
        Self {
            category: UiErrorCategory::Transport,
            context: UiErrorContext::Engine,
            message: format!(
                "missed {skipped} engine events; the peer list may be incomplete until the call is restarted"
            ),
        }
    }

    /// Credential problems need a config change before anything can work.
    pub fn requires_reconfigure(&self) -> bool {
        self.category == UiErrorCategory::Credentials
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
