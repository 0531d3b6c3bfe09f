//! Kasa cloud HTTP client
//!
//! Two calls against the TP-Link cloud:
//! - `getDeviceList` on the gateway base URL
//! - `passthrough` relay commands on the device's own `appServerUrl`
//!
//! The bearer token travels as the `token` query parameter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::models::{
    passthrough_body, Device, DeviceListResult, Envelope, PassthroughResult, ToggleOutcome,
};
use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Remote side of the device actions
#[async_trait]
pub trait DeviceGateway: Send + Sync + 'static {
    /// Devices in the order the cloud returned them
    async fn list_devices(&self, bearer_token: &str) -> Result<Vec<Device>, GatewayError>;

    /// Flip the relay of `device` based on its cached status
    async fn toggle_device(
        &self,
        device: &Device,
        bearer_token: &str,
    ) -> Result<ToggleOutcome, GatewayError>;
}

pub struct KasaClient {
    http_client: Client,
    base_url: String,
}

impl KasaClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http_client: builder.build()?,
            base_url: config.base_url.clone(),
        })
    }

    /// Append the bearer token to `url`
    fn endpoint(url: &str, bearer_token: &str) -> Result<Url, GatewayError> {
        let mut endpoint = Url::parse(url).map_err(|source| GatewayError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        endpoint.query_pairs_mut().append_pair("token", bearer_token);
        Ok(endpoint)
    }

    /// POST a JSON body and unwrap the `{error_code, result}` envelope
    async fn call(&self, endpoint: Url, body: &Value) -> Result<Value, GatewayError> {
        let response = self.http_client.post(endpoint).json(body).send().await?;
        let bytes = response.bytes().await?;

        let envelope: Envelope = serde_json::from_slice(&bytes)
            .map_err(|e| GatewayError::InvalidResponseShape(e.to_string()))?;

        if envelope.error_code != 0 {
            return Err(GatewayError::RemoteError {
                code: envelope.error_code,
                message: envelope.msg.unwrap_or_default(),
            });
        }

        envelope
            .result
            .ok_or_else(|| GatewayError::InvalidResponseShape("missing result".to_string()))
    }
}

/// Endpoint with the token stripped, for logs
fn redacted(endpoint: &Url) -> String {
    let mut url = endpoint.clone();
    url.set_query(None);
    url.to_string()
}

#[async_trait]
impl DeviceGateway for KasaClient {
    async fn list_devices(&self, bearer_token: &str) -> Result<Vec<Device>, GatewayError> {
        let endpoint = Self::endpoint(&self.base_url, bearer_token)?;
        let target = redacted(&endpoint);
        tracing::debug!("Fetching device list from {}", target);

        let body = serde_json::json!({ "method": "getDeviceList" });
        let result = match self.call(endpoint, &body).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Device list request to {} failed: {}", target, e);
                return Err(e);
            }
        };

        let parsed: DeviceListResult = serde_json::from_value(result).map_err(|e| {
            tracing::error!("Device list from {} has unexpected shape: {}", target, e);
            GatewayError::InvalidResponseShape(e.to_string())
        })?;

        tracing::info!(
            "Fetched {} devices from {}",
            parsed.device_list.len(),
            target
        );
        Ok(parsed.device_list)
    }

    async fn toggle_device(
        &self,
        device: &Device,
        bearer_token: &str,
    ) -> Result<ToggleOutcome, GatewayError> {
        let endpoint = Self::endpoint(&device.app_server_url, bearer_token)?;
        let target = redacted(&endpoint);
        let requested = device.next_relay_state();
        tracing::info!(
            "Toggling device {} at {} to {}",
            device.alias,
            target,
            requested.as_str()
        );

        let body = passthrough_body(device, requested);
        let result = match self.call(endpoint, &body).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Toggle request for {} failed: {}", device.alias, e);
                return Err(e);
            }
        };

        let parsed: PassthroughResult = serde_json::from_value(result).map_err(|e| {
            tracing::error!("Toggle response for {} has unexpected shape: {}", device.alias, e);
            GatewayError::InvalidResponseShape(e.to_string())
        })?;

        let relay_err_code = parsed.response_data.system.set_relay_state.err_code;
        if relay_err_code != 0 {
            tracing::error!(
                "Relay of {} rejected state change: err_code {}",
                device.alias,
                relay_err_code
            );
            return Err(GatewayError::RelayRejected(relay_err_code));
        }

        tracing::debug!("Device {} switched {}", device.alias, requested.as_str());
        Ok(ToggleOutcome {
            requested,
            relay_err_code,
        })
    }
}
