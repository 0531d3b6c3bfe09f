//! Action event routing
//!
//! Host events and internal completions are turned into [`Event`]s and fed
//! through [`ActionRouter::handle`], which updates the per-context state and
//! returns the [`Effect`]s the runtime must carry out.

mod counter;
mod device;
mod router;

pub use self::router::ActionRouter;

use serde_json::Value;

use crate::config::PluginConfig;
use crate::error::GatewayError;
use crate::host::Outbound;
use crate::kasa::{Device, ToggleOutcome};
use crate::state::ActionContext;

/// The three action variants declared in the plugin manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    DeviceToggle,
    DeviceList,
    Counter,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::DeviceToggle => "device-toggle",
            ActionKind::DeviceList => "device-list",
            ActionKind::Counter => "counter",
        }
    }
}

/// Maps manifest action UUIDs to variants
#[derive(Debug, Clone)]
pub struct ActionUuids {
    pub toggle: String,
    pub device_list: String,
    pub counter: String,
}

impl ActionUuids {
    pub fn kind_of(&self, action: &str) -> Option<ActionKind> {
        if action == self.toggle {
            Some(ActionKind::DeviceToggle)
        } else if action == self.device_list {
            Some(ActionKind::DeviceList)
        } else if action == self.counter {
            Some(ActionKind::Counter)
        } else {
            None
        }
    }

    pub fn uuid_of(&self, kind: ActionKind) -> &str {
        match kind {
            ActionKind::DeviceToggle => &self.toggle,
            ActionKind::DeviceList => &self.device_list,
            ActionKind::Counter => &self.counter,
        }
    }
}

impl From<&PluginConfig> for ActionUuids {
    fn from(config: &PluginConfig) -> Self {
        Self {
            toggle: config.toggle_action.clone(),
            device_list: config.device_list_action.clone(),
            counter: config.counter_action.clone(),
        }
    }
}

/// Why a device list fetch was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchReason {
    SettingsSync,
    LongPress,
}

#[derive(Debug)]
pub enum Event {
    WillAppear {
        context: ActionContext,
        kind: ActionKind,
    },
    WillDisappear {
        context: ActionContext,
    },
    SettingsReceived {
        context: ActionContext,
        kind: ActionKind,
        settings: Value,
    },
    KeyDown {
        context: ActionContext,
        kind: ActionKind,
    },
    KeyUp {
        context: ActionContext,
        kind: ActionKind,
    },
    TouchTap {
        context: ActionContext,
        kind: ActionKind,
    },
    DialPress {
        context: ActionContext,
        kind: ActionKind,
    },
    DialRotate {
        context: ActionContext,
        kind: ActionKind,
        ticks: i64,
    },
    InspectorAppeared {
        context: ActionContext,
        kind: ActionKind,
    },
    InspectorDisappeared {
        context: ActionContext,
    },
    InspectorEdit {
        key: String,
        value: String,
    },
    LongPressElapsed {
        context: ActionContext,
        generation: u64,
    },
    DevicesFetched {
        context: ActionContext,
        reason: FetchReason,
        result: Result<Vec<Device>, GatewayError>,
    },
    ToggleFinished {
        context: ActionContext,
        result: Result<ToggleOutcome, GatewayError>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Host(Outbound),
    FetchDevices {
        context: ActionContext,
        bearer_token: String,
        reason: FetchReason,
    },
    ToggleDevice {
        context: ActionContext,
        bearer_token: String,
        device: Device,
    },
}
