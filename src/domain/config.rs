use serde::{Deserialize, Serialize};

/// SerBridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Bridge-wide settings
    #[serde(default)]
    pub bridge: BridgeSettings,
    /// Serial link settings applied to every connection
    #[serde(default)]
    pub serial: SerialSettings,
}

/// Bridge-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeSettings {
    /// Device poll interval in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// WebSocket listen port for browser clients
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Auto-select the first device whose vendor tag contains this
    /// substring (case-insensitive), e.g. "arduino"
    #[serde(default)]
    pub auto_select_vendor: Option<String>,
}

/// Serial link settings (fixed per deployment)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialSettings {
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,
    #[serde(default = "default_parity")]
    pub parity: ParityConfig,
    #[serde(default = "default_flow_control")]
    pub flow_control: FlowControlConfig,
    /// Record delimiter on the byte stream
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Upper bound on an unterminated frame before the connection is torn down
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

/// Parity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParityConfig {
    None,
    Odd,
    Even,
}

/// Flow control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControlConfig {
    None,
    Hardware,
    Software,
}

// Default value functions
fn default_poll_interval() -> u64 {
    5000
}

fn default_listen_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_data_bits() -> u8 {
    8
}

fn default_stop_bits() -> u8 {
    1
}

fn default_parity() -> ParityConfig {
    ParityConfig::None
}

fn default_flow_control() -> FlowControlConfig {
    FlowControlConfig::None
}

fn default_delimiter() -> String {
    "\r\n".to_string()
}

fn default_max_frame_bytes() -> usize {
    64 * 1024
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            listen_port: default_listen_port(),
            log_level: default_log_level(),
            auto_select_vendor: None,
        }
    }
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: default_baud_rate(),
            data_bits: default_data_bits(),
            stop_bits: default_stop_bits(),
            parity: default_parity(),
            flow_control: default_flow_control(),
            delimiter: default_delimiter(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bridge: BridgeSettings::default(),
            serial: SerialSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.bridge.poll_interval_ms, 5000);
        assert_eq!(config.bridge.listen_port, 3000);
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.serial.data_bits, 8);
        assert_eq!(config.serial.stop_bits, 1);
        assert_eq!(config.serial.delimiter, "\r\n");
        assert!(config.bridge.auto_select_vendor.is_none());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = BridgeConfig::default();
        let toml_str = toml::to_string(&config).expect("Failed to serialize config");
        let parsed: BridgeConfig = toml::from_str(&toml_str).expect("Failed to parse config");
        assert_eq!(parsed.bridge.poll_interval_ms, config.bridge.poll_interval_ms);
        assert_eq!(parsed.serial.delimiter, config.serial.delimiter);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml_str = "[bridge]\nlisten_port = 8080\n";
        let parsed: BridgeConfig = toml::from_str(toml_str).expect("Failed to parse config");
        assert_eq!(parsed.bridge.listen_port, 8080);
        assert_eq!(parsed.bridge.poll_interval_ms, 5000);
        assert_eq!(parsed.serial.baud_rate, 9600);
    }
}
