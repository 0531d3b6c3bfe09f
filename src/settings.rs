//! Persisted per-action settings
//!
//! The host stores settings as a flat JSON object of strings. `deviceList`
//! is itself a JSON-encoded array, so it is decoded twice. Incoming values
//! are decoded into a typed shape first and then fully parsed into a
//! [`SettingsUpdate`]; nothing is applied unless both steps succeed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::actions::ActionKind;
use crate::error::SettingsError;
use crate::kasa::Device;
use crate::state::{ContextState, Counter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSettings {
    pub bearer_token: String,
    pub device_list: String,
    pub selected_device_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceListSettings {
    pub bearer_token: String,
    pub device_list: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSettings {
    pub number: String,
    pub step: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistedSettings {
    Toggle(ToggleSettings),
    DeviceList(DeviceListSettings),
    Counter(CounterSettings),
}

/// Fully parsed settings, ready to replace cached state
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsUpdate {
    Toggle {
        bearer_token: String,
        devices: Vec<Device>,
        selected_device_id: String,
    },
    DeviceList {
        bearer_token: String,
        devices: Vec<Device>,
    },
    Counter(Counter),
}

impl PersistedSettings {
    /// Decode a raw settings object for `kind`
    pub fn decode(kind: ActionKind, value: &Value) -> Result<Self, SettingsError> {
        let value = value.clone();
        let settings = match kind {
            ActionKind::DeviceToggle => {
                Self::Toggle(serde_json::from_value(value).map_err(SettingsError::Shape)?)
            }
            ActionKind::DeviceList => {
                Self::DeviceList(serde_json::from_value(value).map_err(SettingsError::Shape)?)
            }
            ActionKind::Counter => {
                Self::Counter(serde_json::from_value(value).map_err(SettingsError::Shape)?)
            }
        };
        Ok(settings)
    }

    /// Empty settings used when nothing valid has been stored yet
    pub fn defaults(kind: ActionKind) -> Self {
        match kind {
            ActionKind::DeviceToggle => Self::Toggle(ToggleSettings {
                bearer_token: String::new(),
                device_list: "[]".to_string(),
                selected_device_id: String::new(),
            }),
            ActionKind::DeviceList => Self::DeviceList(DeviceListSettings {
                bearer_token: String::new(),
                device_list: "[]".to_string(),
            }),
            ActionKind::Counter => Self::Counter(CounterSettings {
                number: "0".to_string(),
                step: "1".to_string(),
            }),
        }
    }

    /// Settings describing the cached state of one context
    pub fn snapshot(kind: ActionKind, state: &ContextState) -> Self {
        match kind {
            ActionKind::DeviceToggle => Self::Toggle(ToggleSettings {
                bearer_token: state.bearer_token.clone(),
                device_list: encode_device_list(&state.devices),
                selected_device_id: state.selected_device_id.clone(),
            }),
            ActionKind::DeviceList => Self::DeviceList(DeviceListSettings {
                bearer_token: state.bearer_token.clone(),
                device_list: encode_device_list(&state.devices),
            }),
            ActionKind::Counter => Self::Counter(CounterSettings {
                number: state.counter.value().to_string(),
                step: state.counter.step().to_string(),
            }),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Toggle(_) => ActionKind::DeviceToggle,
            Self::DeviceList(_) => ActionKind::DeviceList,
            Self::Counter(_) => ActionKind::Counter,
        }
    }

    pub fn to_value(&self) -> Value {
        let value = match self {
            Self::Toggle(s) => serde_json::to_value(s),
            Self::DeviceList(s) => serde_json::to_value(s),
            Self::Counter(s) => serde_json::to_value(s),
        };
        value.unwrap_or(Value::Null)
    }

    /// Parse every embedded value
    pub fn into_update(self) -> Result<SettingsUpdate, SettingsError> {
        match self {
            Self::Toggle(s) => Ok(SettingsUpdate::Toggle {
                devices: parse_device_list(&s.device_list)?,
                bearer_token: s.bearer_token,
                selected_device_id: s.selected_device_id,
            }),
            Self::DeviceList(s) => Ok(SettingsUpdate::DeviceList {
                devices: parse_device_list(&s.device_list)?,
                bearer_token: s.bearer_token,
            }),
            Self::Counter(s) => {
                let value = parse_number("number", &s.number, 0)?;
                let step = parse_number("step", &s.step, 1)?;
                Ok(SettingsUpdate::Counter(Counter::new(value, step)))
            }
        }
    }
}

pub fn parse_device_list(raw: &str) -> Result<Vec<Device>, SettingsError> {
    serde_json::from_str(raw).map_err(SettingsError::DeviceList)
}

pub fn encode_device_list(devices: &[Device]) -> String {
    serde_json::to_string(devices).unwrap_or_else(|_| "[]".to_string())
}

fn parse_number(field: &'static str, raw: &str, empty: i64) -> Result<i64, SettingsError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(empty);
    }
    trimmed.parse().map_err(|_| SettingsError::Number {
        field,
        value: raw.to_string(),
    })
}
