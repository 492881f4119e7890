pub mod config;
pub mod controller;
pub mod error;
pub mod peer_set;

pub use config::{load_settings, SessionConfig};
pub use controller::{Session, SessionController, SessionSnapshot, SessionUpdate};
pub use error::SessionError;
pub use peer_set::PeerSet;
