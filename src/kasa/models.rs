//! Kasa cloud data models

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Device
// ============================================================================

/// A plug as reported by `getDeviceList`. Every field is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_type: String,
    pub role: i64,
    pub fw_ver: String,
    pub app_server_url: String,
    pub device_region: String,
    pub device_id: String,
    pub device_name: String,
    pub device_hw_ver: String,
    pub alias: String,
    pub device_mac: String,
    pub oem_id: String,
    pub device_model: String,
    pub hw_id: String,
    pub fw_id: String,
    pub is_same_region: bool,
    pub status: i64, // 1=on, anything else=off
}

impl Device {
    /// Relay state that flips the cached status
    pub fn next_relay_state(&self) -> RelayState {
        if self.status == 1 {
            RelayState::Off
        } else {
            RelayState::On
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Off,
    On,
}

impl RelayState {
    pub fn as_u8(&self) -> u8 {
        match self {
            RelayState::Off => 0,
            RelayState::On => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelayState::Off => "off",
            RelayState::On => "on",
        }
    }
}

/// Result of a successful relay toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub requested: RelayState,
    pub relay_err_code: i64,
}

// ============================================================================
// Wire envelopes
// ============================================================================

/// Outer shape shared by every Kasa cloud response
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub error_code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeviceListResult {
    #[serde(rename = "deviceList")]
    pub device_list: Vec<Device>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PassthroughResult {
    #[serde(rename = "responseData")]
    pub response_data: ResponseData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseData {
    pub system: SystemResponse,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SystemResponse {
    pub set_relay_state: SetRelayStateResponse,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SetRelayStateResponse {
    pub err_code: i64,
}

/// Body of a relay toggle request
pub(crate) fn passthrough_body(device: &Device, state: RelayState) -> Value {
    serde_json::json!({
        "method": "passthrough",
        "params": {
            "deviceId": device.device_id,
            "requestData": {
                "system": {
                    "set_relay_state": {
                        "state": state.as_u8()
                    }
                }
            }
        }
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::device;
    use super::*;

    #[test]
    fn test_next_relay_state_is_complement() {
        assert_eq!(device("d1", "Lamp", 1, "https://x").next_relay_state(), RelayState::Off);
        assert_eq!(device("d1", "Lamp", 0, "https://x").next_relay_state(), RelayState::On);
        assert_eq!(device("d1", "Lamp", 7, "https://x").next_relay_state(), RelayState::On);
        assert_eq!(device("d1", "Lamp", -1, "https://x").next_relay_state(), RelayState::On);
    }

    #[test]
    fn test_device_uses_cloud_field_names() {
        let json = serde_json::to_value(device("d1", "Lamp", 0, "https://x")).unwrap();
        assert_eq!(json["deviceId"], "d1");
        assert_eq!(json["appServerUrl"], "https://x");
        assert_eq!(json["isSameRegion"], true);
        assert_eq!(json["fwVer"], "1.5.6 Build 191125 Rel.083657");
        assert_eq!(json["deviceHwVer"], "1.0");
    }

    #[test]
    fn test_device_missing_field_is_rejected() {
        let mut json = serde_json::to_value(device("d1", "Lamp", 0, "https://x")).unwrap();
        json.as_object_mut().unwrap().remove("hwId");
        assert!(serde_json::from_value::<Device>(json).is_err());
    }

    #[test]
    fn test_device_wrong_type_is_rejected() {
        let mut json = serde_json::to_value(device("d1", "Lamp", 0, "https://x")).unwrap();
        json["status"] = serde_json::json!("on");
        assert!(serde_json::from_value::<Device>(json).is_err());
    }

    #[test]
    fn test_passthrough_body() {
        let body = passthrough_body(&device("d1", "Lamp", 0, "https://x"), RelayState::On);
        assert_eq!(body["method"], "passthrough");
        assert_eq!(body["params"]["deviceId"], "d1");
        assert_eq!(
            body["params"]["requestData"]["system"]["set_relay_state"]["state"],
            1
        );
    }
}
