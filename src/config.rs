//! # Configuration Management
//!
//! Explicit configuration for buffers, decoding, packet tracing and logging.
//!
//! Nothing in the codec reads process state: debug toggles that used to live
//! in environment variables are fields here and are passed to the decode and
//! transport boundary by the caller.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()` / `from_toml()`
//! - Direct instantiation with defaults
//! - Environment overrides via `from_env()`, read once at the outer boundary

use crate::core::codec::Utf8Mode;
use crate::error::{constants, Result, WireError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::Level;

/// Default initial buffer capacity
pub const DEFAULT_BUFFER_CAPACITY: usize = 8192;

/// Largest initial capacity accepted by validation (the protocol's maximum SDU)
pub const MAX_BUFFER_CAPACITY: usize = 2 * 1024 * 1024;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct WireConfig {
    #[serde(default)]
    pub buffer: BufferConfig,

    #[serde(default)]
    pub decode: DecodeConfig,

    #[serde(default)]
    pub trace: TraceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WireConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| WireError::ConfigError(format!("{}: {e}", constants::ERR_CONFIG_OPEN)))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| WireError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| WireError::ConfigError(format!("{}: {e}", constants::ERR_CONFIG_PARSE)))
    }

    /// Defaults overridden by `TNS_WIRE_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(capacity) = std::env::var("TNS_WIRE_BUFFER_CAPACITY") {
            config.buffer.initial_capacity = capacity.parse::<usize>().map_err(|e| {
                WireError::ConfigError(format!("Invalid TNS_WIRE_BUFFER_CAPACITY: {e}"))
            })?;
        }

        if let Ok(flag) = std::env::var("TNS_WIRE_TRACE_PACKETS") {
            config.trace.trace_packets = matches!(flag.as_str(), "1" | "true" | "yes");
        }

        if let Ok(level) = std::env::var("TNS_WIRE_LOG_LEVEL") {
            config.logging.log_level = level
                .parse::<Level>()
                .map_err(|_| WireError::ConfigError(format!("Invalid log level: {level}")))?;
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| WireError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| WireError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.buffer.validate());
        errors.extend(self.trace.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(WireError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Buffer allocation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BufferConfig {
    /// Capacity allocated for each new buffer
    pub initial_capacity: usize,

    /// Whether encoders may grow past `initial_capacity`
    pub growable: bool,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_BUFFER_CAPACITY,
            growable: true,
        }
    }
}

impl BufferConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.initial_capacity == 0 {
            errors.push("Buffer capacity must be greater than 0".to_string());
        } else if self.initial_capacity > MAX_BUFFER_CAPACITY {
            errors.push(format!(
                "Buffer capacity too large: {} bytes (maximum: {} bytes)",
                self.initial_capacity, MAX_BUFFER_CAPACITY
            ));
        }

        errors
    }
}

/// String decoding strictness for message fields
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct DecodeConfig {
    /// Applied to user names and pair keys; pair values are always lossy
    #[serde(default)]
    pub key_utf8: Utf8Mode,
}

impl DecodeConfig {
    #[inline]
    pub fn key_mode(&self) -> Utf8Mode {
        self.key_utf8
    }
}

/// Packet tracing at the transport boundary
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TraceConfig {
    /// Emit a hex dump of every packet sent and received
    pub trace_packets: bool,

    /// Bytes per hex dump line
    pub hex_dump_width: usize,

    /// Keep sent packets in a capture set for later comparison
    pub record_captures: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            trace_packets: false,
            hex_dump_width: 8,
            record_captures: false,
        }
    }
}

impl TraceConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.hex_dump_width == 0 {
            errors.push("Hex dump width must be greater than 0".to_string());
        } else if self.hex_dump_width > 64 {
            errors.push(format!(
                "Hex dump width too large: {} (maximum: 64)",
                self.hex_dump_width
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("tns-wire"),
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        level.as_str().to_ascii_lowercase().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
