//! Configuration module

use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub plugin: PluginConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Unset means requests may hang indefinitely
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

/// Plugin behaviour and the action UUIDs declared in the plugin manifest
#[derive(Debug, Clone, Deserialize)]
pub struct PluginConfig {
    #[serde(default = "default_long_press_ms")]
    pub long_press_ms: u64,
    #[serde(default = "default_toggle_action")]
    pub toggle_action: String,
    #[serde(default = "default_device_list_action")]
    pub device_list_action: String,
    #[serde(default = "default_counter_action")]
    pub counter_action: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            long_press_ms: default_long_press_ms(),
            toggle_action: default_toggle_action(),
            device_list_action: default_device_list_action(),
            counter_action: default_counter_action(),
        }
    }
}

fn default_base_url() -> String {
    "https://wap.tplinkcloud.com".to_string()
}

fn default_long_press_ms() -> u64 {
    1500
}

fn default_toggle_action() -> String {
    "com.kasadeck.toggle".to_string()
}

fn default_device_list_action() -> String {
    "com.kasadeck.devicelist".to_string()
}

fn default_counter_action() -> String {
    "com.kasadeck.counter".to_string()
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("KASADECK").separator("__"));

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
        let settings = builder.build()?;

        let config: Config = settings.try_deserialize().unwrap_or_else(|e| {
            tracing::warn!("Invalid configuration, using defaults: {}", e);
            Config::default()
        });

        Ok(config)
    }
}
