//! Commands queued from the UI to the session worker.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCommand {
    ToggleRole,
    StartCall,
    EndCall,
    /// Injects a remote participant into the simulated engine.
    SimulatePeerJoin,
    /// Removes the most recently joined remote participant.
    SimulatePeerLeave,
    Shutdown,
}

impl BackendCommand {
    pub fn name(self) -> &'static str {
        match self {
            BackendCommand::ToggleRole => "toggle_role",
            BackendCommand::StartCall => "start_call",
            BackendCommand::EndCall => "end_call",
            BackendCommand::SimulatePeerJoin => "simulate_peer_join",
            BackendCommand::SimulatePeerLeave => "simulate_peer_leave",
            BackendCommand::Shutdown => "shutdown",
        }
    }
}
