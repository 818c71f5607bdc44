use std::fmt;

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch, as reported by the server.
pub type Timestamp = i64;

/// A document fetched from remote storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub body: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl Document {
    pub fn new(body: impl Into<String>, content_type: Option<&str>) -> Self {
        Self {
            body: body.into(),
            content_type: content_type.map(str::to_string),
        }
    }

    /// Try to deserialize the body as JSON.
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// How much of the connection configuration is present.
///
/// Always derived from the persisted fields, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No storage information.
    Anonymous,
    /// Storage type and address known, bearer token missing.
    Authing,
    /// Everything needed to talk to the server is present.
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionState::Anonymous => "anonymous",
            ConnectionState::Authing => "authing",
            ConnectionState::Connected => "connected",
        })
    }
}

/// Events emitted by the wire client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireEvent {
    /// The configuration just became complete.
    Connected,
    /// Reserved.
    Error,
}

impl WireEvent {
    pub const ALL: [WireEvent; 2] = [WireEvent::Connected, WireEvent::Error];
}

/// Wire client configuration.
#[derive(Debug, Clone)]
pub struct WireConfig {
    /// Prefix for the keys the connection fields are persisted under.
    pub key_prefix: String,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            key_prefix: "remote_storage_wire_".to_string(),
        }
    }
}
