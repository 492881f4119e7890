use std::{fs, path::Path};

use anyhow::Context;
use rtc_engine::JoinOptions;
use serde::{Deserialize, Serialize};
use shared::domain::{ClientRole, PeerId};
use tracing::warn;

use crate::error::SessionError;

pub const DEFAULT_SETTINGS_FILE: &str = "broadcast.toml";
const MAX_CHANNEL_NAME_BYTES: usize = 64;
const CHANNEL_NAME_SYMBOLS: &str = " !#$%&()+-:;<=.>?@[]^_{}|~,";

/// Static configuration for one screen lifetime. Not mutable once the session
/// has been initialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub app_id: String,
    /// `None` joins in open/testing mode.
    pub token: Option<String>,
    pub channel_name: String,
    pub initial_role: ClientRole,
    /// Local id hint. `None` or 0 lets the server assign one.
    pub local_uid: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            token: None,
            channel_name: "channel-x".into(),
            initial_role: ClientRole::Broadcaster,
            local_uid: None,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.app_id.trim().is_empty() {
            return Err(SessionError::Config("app_id must not be empty".into()));
        }
        validate_channel_name(&self.channel_name)
    }

    /// Empty tokens are treated like a missing token.
    pub fn effective_token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn uid_hint(&self) -> PeerId {
        PeerId(self.local_uid.unwrap_or(0))
    }

    pub fn join_options(&self) -> JoinOptions {
        JoinOptions {
            token: self.effective_token().map(str::to_string),
            channel_name: self.channel_name.clone(),
            optional_info: None,
            uid: self.uid_hint(),
        }
    }
}

fn validate_channel_name(name: &str) -> Result<(), SessionError> {
    if name.is_empty() {
        return Err(SessionError::Config("channel_name must not be empty".into()));
    }
    if name.len() >= MAX_CHANNEL_NAME_BYTES {
        return Err(SessionError::Config(format!(
            "channel_name must be shorter than {MAX_CHANNEL_NAME_BYTES} bytes"
        )));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !CHANNEL_NAME_SYMBOLS.contains(*c))
    {
        return Err(SessionError::Config(format!(
            "channel_name contains unsupported character '{bad}'"
        )));
    }
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    app_id: Option<String>,
    token: Option<String>,
    channel_name: Option<String>,
    role: Option<String>,
    local_uid: Option<u32>,
}

/// Reads `broadcast.toml` from the working directory (if present) and then
/// applies `APP__*` environment overrides.
pub fn load_settings() -> SessionConfig {
    let mut settings = SessionConfig::default();
    if Path::new(DEFAULT_SETTINGS_FILE).exists() {
        match load_settings_file(Path::new(DEFAULT_SETTINGS_FILE)) {
            Ok(file_cfg) => settings = file_cfg,
            Err(err) => warn!("ignoring {DEFAULT_SETTINGS_FILE}: {err:#}"),
        }
    }
    apply_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub fn load_settings_file(path: &Path) -> anyhow::Result<SessionConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    parse_settings(&raw).with_context(|| format!("invalid settings file '{}'", path.display()))
}

pub fn parse_settings(raw: &str) -> anyhow::Result<SessionConfig> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    let mut settings = SessionConfig::default();
    if let Some(v) = file_cfg.app_id {
        settings.app_id = v;
    }
    if let Some(v) = file_cfg.token {
        settings.token = Some(v);
    }
    if let Some(v) = file_cfg.channel_name {
        settings.channel_name = v;
    }
    if let Some(v) = file_cfg.role {
        settings.initial_role = ClientRole::parse(&v)
            .with_context(|| format!("unknown role '{v}' (expected broadcaster or audience)"))?;
    }
    if file_cfg.local_uid.is_some() {
        settings.local_uid = file_cfg.local_uid;
    }
    Ok(settings)
}

/// `lookup` is `std::env::var` in production; tests pass a map.
pub fn apply_overrides(settings: &mut SessionConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("APP_ID") {
        settings.app_id = v;
    }
    if let Some(v) = lookup("APP__APP_ID") {
        settings.app_id = v;
    }

    if let Some(v) = lookup("APP__TOKEN") {
        settings.token = Some(v);
    }

    if let Some(v) = lookup("APP__CHANNEL_NAME") {
        settings.channel_name = v;
    }

    if let Some(v) = lookup("APP__ROLE") {
        match ClientRole::parse(&v) {
            Some(role) => settings.initial_role = role,
            None => warn!("ignoring APP__ROLE='{v}': expected broadcaster or audience"),
        }
    }

    if let Some(v) = lookup("APP__LOCAL_UID") {
        match v.parse::<u32>() {
            Ok(parsed) => settings.local_uid = Some(parsed),
            Err(err) => warn!("ignoring APP__LOCAL_UID='{v}': {err}"),
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
