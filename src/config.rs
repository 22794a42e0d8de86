//! System configuration parameters
//!
//! All deployment-time knobs for both halves of PinchLink. Values are fixed
//! for the life of the process; host binaries read them from a JSON file,
//! the firmware uses the compiled-in defaults.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::gesture::classifier::ClassifierConfig;
use crate::gesture::debounce::{DebounceConfig, MAX_WINDOW};
use crate::gesture::landmarks::HAND_LANDMARKS;

/// Largest request prefix the server will ever buffer.
pub const MAX_REQUEST_BYTES: usize = 2048;

/// Longest single blink edge; the server accepts nothing while blinking.
pub const MAX_BLINK_DELAY_MS: u32 = 5_000;

/// Core system configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

// ───────────────────────────────────────────────────────────────
// Server
// ───────────────────────────────────────────────────────────────

/// How a recognised command is acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckStyle {
    /// `text/plain` body such as `LED ON`.
    PlainText,
    /// The full status page, reflecting the new LED state.
    StatusPage,
}

/// What an unrecognised request gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackStyle {
    /// The HTML status / control page.
    StatusPage,
    /// `404 Not Found` with an empty body.
    NotFound,
}

/// Fixed blink sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// Whether `blink` is part of this deployment's vocabulary.
    pub enabled: bool,
    /// Number of on/off cycles.
    pub toggles: u8,
    /// Delay after each on and each off edge (milliseconds).
    pub delay_ms: u32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            toggles: 3,
            delay_ms: 300,
        }
    }
}

impl BlinkConfig {
    /// Wall time the server is unavailable while blinking.
    pub fn duration_ms(&self) -> u64 {
        u64::from(self.toggles) * 2 * u64::from(self.delay_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port to listen on.
    pub port: u16,
    /// Request bytes read per connection (at most [`MAX_REQUEST_BYTES`]).
    pub max_request_bytes: usize,
    /// Per-connection read/write timeout (milliseconds).
    pub io_timeout_ms: u32,
    pub blink: BlinkConfig,
    pub ack: AckStyle,
    pub fallback: FallbackStyle,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 80,
            max_request_bytes: 1024,
            io_timeout_ms: 5000,
            blink: BlinkConfig::default(),
            ack: AckStyle::PlainText,
            fallback: FallbackStyle::StatusPage,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Client
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Sampling tick (milliseconds).
    pub sample_interval_ms: u32,
    pub classifier: ClassifierConfig,
    pub debounce: DebounceConfig,
    /// Actuator endpoint, `host:port`.
    pub endpoint: heapless::String<64>,
    /// Connect / write timeout for one command request (milliseconds).
    pub send_timeout_ms: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let mut endpoint = heapless::String::new();
        // Fits: the literal is shorter than the capacity.
        let _ = endpoint.push_str("192.168.4.1:80");
        Self {
            sample_interval_ms: 300,
            classifier: ClassifierConfig::default(),
            debounce: DebounceConfig::default(),
            endpoint,
            send_timeout_ms: 2000,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Loading + validation
// ───────────────────────────────────────────────────────────────

impl SystemConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;
        Self::from_json(&text)
    }

    /// [`load`](Self::load) when a path is given, otherwise validated defaults.
    pub fn load_or_default(path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Reject out-of-range values instead of clamping them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.client.validate()
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_request_bytes < 16 || self.max_request_bytes > MAX_REQUEST_BYTES {
            return Err(ConfigError::ValidationFailed(
                "server.max_request_bytes must be within 16..=2048",
            ));
        }
        if self.io_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("server.io_timeout_ms must be > 0"));
        }
        if self.blink.enabled && (self.blink.toggles == 0 || self.blink.delay_ms == 0) {
            return Err(ConfigError::ValidationFailed(
                "server.blink needs toggles > 0 and delay_ms > 0 when enabled",
            ));
        }
        if self.blink.delay_ms > MAX_BLINK_DELAY_MS {
            return Err(ConfigError::ValidationFailed(
                "server.blink.delay_ms must be <= 5000",
            ));
        }
        Ok(())
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "client.sample_interval_ms must be > 0",
            ));
        }
        let c = &self.classifier;
        if usize::from(c.landmark_a) >= HAND_LANDMARKS || usize::from(c.landmark_b) >= HAND_LANDMARKS {
            return Err(ConfigError::ValidationFailed(
                "client.classifier landmark ids must be < 21",
            ));
        }
        if c.landmark_a == c.landmark_b {
            return Err(ConfigError::ValidationFailed(
                "client.classifier landmarks must differ",
            ));
        }
        if !(c.close_below_px > 0.0 && c.close_below_px < c.far_from_px) {
            return Err(ConfigError::ValidationFailed(
                "client.classifier needs 0 < close_below_px < far_from_px",
            ));
        }
        match self.debounce {
            DebounceConfig::Majority { window, .. } if window == 0 || window > MAX_WINDOW => {
                return Err(ConfigError::ValidationFailed(
                    "client.debounce.window must be within 1..=16",
                ));
            }
            DebounceConfig::DoublePulse { cooldown_ms: 0 } => {
                return Err(ConfigError::ValidationFailed(
                    "client.debounce.cooldown_ms must be > 0",
                ));
            }
            _ => {}
        }
        if self.send_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("client.send_timeout_ms must be > 0"));
        }
        Ok(())
    }
}
