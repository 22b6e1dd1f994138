use crate::error::CoreError;
use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::{path::Path, time::Duration};

/// VideoRoom room the subscriber joins unless configured otherwise.
pub const DEFAULT_ROOM_ID: u64 = 1234;
/// Publisher feed the subscriber attaches to unless configured otherwise.
pub const DEFAULT_FEED_ID: u64 = 42;
pub const DEFAULT_GATEWAY_PORT: u16 = 8989;
/// WebSocket subprotocol spoken by the Janus gateway.
pub const JANUS_SUBPROTOCOL: &str = "janus-protocol";
pub const DEFAULT_STUN_SERVER: &str = "stun:stun.l.google.com:19302";

// Helper for deserializing Duration from milliseconds
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

// Main configuration structure
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)] // Ensure fields default if missing in config source
pub struct Config {
    pub global: GlobalConfig,
    pub gateway: GatewayConfig,
    pub transport: TransportConfig,
    pub session: SessionConfig,
    pub videoroom: VideoRoomConfig,
    pub ice: IceConfig,
}

// Global settings
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GlobalConfig {
    pub log_level: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Where the Janus gateway listens.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// `wss://` when true, `ws://` otherwise.
    pub secure: bool,
    /// Full URL, bypasses host/port/secure entirely.
    pub url_override: Option<String>,
    pub subprotocol: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_GATEWAY_PORT,
            secure: true,
            url_override: None,
            subprotocol: JANUS_SUBPROTOCOL.to_string(),
        }
    }
}

impl GatewayConfig {
    /// The WebSocket URL derived from the host, e.g. `wss://localhost:8989`.
    pub fn url(&self) -> String {
        if let Some(url) = &self.url_override {
            return url.clone();
        }
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

// Transport layer configuration
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TransportConfig {
    #[serde(rename = "connect_timeout_ms", with = "duration_ms_serde")]
    pub connect_timeout: Duration,
    /// Capacity of the channel feeding the socket write loop.
    pub outgoing_buffer: usize,
    pub websocket: WebSocketConfig,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(20),
            outgoing_buffer: 100,
            websocket: Default::default(),
        }
    }
}

// WebSocket specific configuration
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct WebSocketConfig {
    pub max_message_size: Option<usize>,
    pub max_frame_size: Option<usize>,
    pub accept_unmasked_frames: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// Period of the `keepalive` request once a session exists.
    #[serde(rename = "keepalive_interval_ms", with = "duration_ms_serde")]
    pub keepalive_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            keepalive_interval: Duration::from_secs(30),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct VideoRoomConfig {
    pub room: u64,
    pub feed: u64,
}

impl Default for VideoRoomConfig {
    fn default() -> Self {
        Self {
            room: DEFAULT_ROOM_ID,
            feed: DEFAULT_FEED_ID,
        }
    }
}

/// ICE configuration handed to the peer connection. STUN only.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct IceConfig {
    pub stun_servers: Vec<String>,
}

impl Default for IceConfig {
    fn default() -> Self {
        Self {
            stun_servers: vec![DEFAULT_STUN_SERVER.to_string()],
        }
    }
}

/// Loads configuration from default locations and environment variables.
///
/// Looks for `janus.toml` (or `.json`, `.yaml`, etc.) in the current directory.
/// Overrides with environment variables prefixed with `JANUS__`
/// (e.g., `JANUS__GATEWAY__HOST=demo.example`, `JANUS__SESSION__KEEPALIVE_INTERVAL_MS=10000`).
/// Note the double underscore `__` for nested fields.
pub fn load_config() -> Result<Config, CoreError> {
    load_config_from(None)
}

/// Same as [`load_config`], but reads the given file (which must exist) instead
/// of looking for `janus.toml`.
pub fn load_config_from(path: Option<&Path>) -> Result<Config, CoreError> {
    load_config_with(path, janus_environment())
}

fn janus_environment() -> Environment {
    Environment::with_prefix("JANUS")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("ice.stun_servers")
}

fn load_config_with(path: Option<&Path>, environment: Environment) -> Result<Config, CoreError> {
    let mut builder = ConfigLoader::builder()
        .set_default("global.log_level", "info")?
        .set_default("session.keepalive_interval_ms", 30_000u64)?;

    builder = match path {
        Some(path) => {
            log::debug!("Loading configuration from: {:?}", path);
            builder.add_source(File::from(path).required(true))
        }
        None => builder.add_source(File::with_name("janus").required(false)),
    };

    let cfg = builder
        .add_source(environment)
        .build()?
        .try_deserialize::<Config>()?;

    log::debug!("Loaded configuration: {:?}", cfg);
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_match_the_demo_constants() {
        let cfg = Config::default();
        assert_eq!(cfg.videoroom.room, 1234);
        assert_eq!(cfg.videoroom.feed, 42);
        assert_eq!(cfg.session.keepalive_interval, Duration::from_secs(30));
        assert_eq!(cfg.gateway.subprotocol, "janus-protocol");
        assert_eq!(cfg.ice.stun_servers, vec!["stun:stun.l.google.com:19302"]);
        assert_eq!(cfg.gateway.url(), "wss://localhost:8989");
    }

    #[test]
    fn gateway_url_respects_scheme_and_override() {
        let mut gateway = GatewayConfig {
            host: "janus.example".into(),
            secure: false,
            ..Default::default()
        };
        assert_eq!(gateway.url(), "ws://janus.example:8989");

        gateway.url_override = Some("wss://other.example/janus".into());
        assert_eq!(gateway.url(), "wss://other.example/janus");
    }

    #[test]
    fn loads_values_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[gateway]
host = "gw.example"
port = 443

[session]
keepalive_interval_ms = 5000

[videoroom]
room = 7
"#
        )
        .unwrap();

        let cfg = load_config_with(Some(file.path()), Environment::default().source(Some(HashMap::new()))).unwrap();
        assert_eq!(cfg.gateway.url(), "wss://gw.example:443");
        assert_eq!(cfg.session.keepalive_interval, Duration::from_millis(5000));
        assert_eq!(cfg.videoroom.room, 7);
        // Untouched sections keep their defaults
        assert_eq!(cfg.videoroom.feed, DEFAULT_FEED_ID);
        assert_eq!(cfg.transport.connect_timeout, Duration::from_secs(20));
    }

    #[test]
    fn environment_overrides_nested_keys() {
        let mut vars = HashMap::new();
        vars.insert("JANUS__GATEWAY__HOST".to_string(), "env.example".to_string());
        vars.insert("JANUS__VIDEOROOM__FEED".to_string(), "99".to_string());
        vars.insert(
            "JANUS__ICE__STUN_SERVERS".to_string(),
            "stun:a.example:3478,stun:b.example:3478".to_string(),
        );

        let cfg = load_config_with(None, janus_environment().source(Some(vars))).unwrap();
        assert_eq!(cfg.gateway.host, "env.example");
        assert_eq!(cfg.videoroom.feed, 99);
        assert_eq!(
            cfg.ice.stun_servers,
            vec!["stun:a.example:3478", "stun:b.example:3478"]
        );
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let missing = Path::new("/definitely/not/here/janus.toml");
        assert!(load_config_with(Some(missing), Environment::default().source(Some(HashMap::new()))).is_err());
    }
}
