use serde::{Deserialize, Serialize};

/// Knobs for a [`GameSession`](crate::GameSession)
///
/// Missing fields take their default, so an embedding app can deserialize this out of its own
/// config file:
///
/// ```
/// use client::SessionConfig;
/// let config = SessionConfig::from_json(r#"{"maxBufferedEvents": 8}"#).unwrap();
/// assert_eq!(config.max_buffered_events, 8);
/// assert!(config.request_resync_on_divergence);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// How many moves to hold while waiting for the first snapshot of a game
    ///
    /// Moves beyond this are dropped; the snapshot will cover them anyway.
    pub max_buffered_events: usize,
    /// Whether to ask the server for a snapshot when the mirrored board may have drifted
    pub request_resync_on_divergence: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_buffered_events: 64,
            request_resync_on_divergence: true,
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
