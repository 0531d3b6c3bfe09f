//! Kasa cloud gateway

mod client;
mod models;

pub use self::client::{DeviceGateway, KasaClient};
pub use self::models::{Device, ToggleOutcome};

#[cfg(test)]
pub(crate) use self::models::fixtures;
#[cfg(test)]
pub use self::models::RelayState;
