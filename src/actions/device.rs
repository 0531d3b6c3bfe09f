//! Device toggle / device list behaviour

use super::router::alert;
use super::{Effect, FetchReason};
use crate::error::PluginError;
use crate::host::Outbound;
use crate::state::{ActionContext, ContextState};

/// Start a device list fetch, or alert when no token is set
pub(super) fn refresh(context: &ActionContext, state: &ContextState, reason: FetchReason) -> Vec<Effect> {
    if state.bearer_token.is_empty() {
        return vec![alert(context, PluginError::NoBearerToken)];
    }

    vec![Effect::FetchDevices {
        context: context.clone(),
        bearer_token: state.bearer_token.clone(),
        reason,
    }]
}

/// Toggle the selected device
pub(super) fn toggle_selected(context: &ActionContext, state: &ContextState) -> Vec<Effect> {
    if state.bearer_token.is_empty() {
        return vec![alert(context, PluginError::NoBearerToken)];
    }

    let Some(device) = state.selected_device() else {
        if !state.selected_device_id.is_empty() {
            tracing::warn!(
                "Selected device {} is not among the {} cached devices of {}",
                state.selected_device_id,
                state.devices.len(),
                context
            );
        }
        return vec![alert(context, PluginError::NoDeviceSelected)];
    };

    vec![Effect::ToggleDevice {
        context: context.clone(),
        bearer_token: state.bearer_token.clone(),
        device: device.clone(),
    }]
}

/// Title the key with the selected device's alias
pub(super) fn display(context: &ActionContext, state: &ContextState) -> Vec<Effect> {
    state
        .selected_device()
        .map(|device| vec![Effect::Host(Outbound::set_title(context, device.alias.clone()))])
        .unwrap_or_default()
}
