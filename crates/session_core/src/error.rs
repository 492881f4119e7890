use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session configuration: {0}")]
    Config(String),
    #[error("engine initialization failed during {stage}: {source}")]
    Initialization {
        stage: &'static str,
        source: anyhow::Error,
    },
    #[error("session is not initialized")]
    NotInitialized,
    #[error("engine has been released")]
    Released,
    #[error("engine rejected {operation}: {source}")]
    Engine {
        operation: &'static str,
        source: anyhow::Error,
    },
}

impl SessionError {
    pub(crate) fn initialization(stage: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| SessionError::Initialization { stage, source }
    }

    pub(crate) fn engine(operation: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| SessionError::Engine { operation, source }
    }

    /// Sequencing errors are expected around startup and teardown; callers
    /// report them as information rather than failures.
    pub fn is_sequencing(&self) -> bool {
        matches!(self, SessionError::NotInitialized | SessionError::Released)
    }
}
