//! Error handling module

use thiserror::Error;

/// Failures talking to the Kasa cloud
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response from Kasa API: {0}")]
    InvalidResponseShape(String),

    #[error("Kasa API returned error code {code}: {message}")]
    RemoteError { code: i64, message: String },

    #[error("Relay rejected state change (err_code {0})")]
    RelayRejected(i64),
}

/// Persisted settings that could not be decoded
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings do not match the expected shape: {0}")]
    Shape(#[source] serde_json::Error),

    #[error("Device list is not valid JSON: {0}")]
    DeviceList(#[source] serde_json::Error),

    #[error("Field {field} is not a number: {value:?}")]
    Number { field: &'static str, value: String },
}

/// Settings form edits that cannot be applied
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("No property inspector instance registered")]
    NotRegistered,

    #[error("Unknown form field: {0}")]
    UnknownField(String),
}

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("No bearer token set")]
    NoBearerToken,

    #[error("No device selected")]
    NoDeviceSelected,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Host connection error: {0}")]
    Host(#[from] tokio_tungstenite::tungstenite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PluginError {
    /// True for failures detected before any I/O was attempted
    pub fn is_precondition(&self) -> bool {
        matches!(self, PluginError::NoBearerToken | PluginError::NoDeviceSelected)
    }
}
