//! Bridge between the UI thread and the session worker.

pub mod commands;
pub mod runtime;
