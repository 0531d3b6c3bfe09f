//! Stream Deck host wire protocol (JSON text frames)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::ActionContext;

// ============================================================================
// Host -> plugin
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum InboundMessage {
    WillAppear {
        action: String,
        context: ActionContext,
    },
    WillDisappear {
        context: ActionContext,
    },
    DidReceiveSettings {
        action: String,
        context: ActionContext,
        payload: SettingsPayload,
    },
    KeyDown {
        action: String,
        context: ActionContext,
    },
    KeyUp {
        action: String,
        context: ActionContext,
    },
    TouchTap {
        action: String,
        context: ActionContext,
    },
    #[serde(alias = "dialDown")]
    DialPress {
        action: String,
        context: ActionContext,
        #[serde(default)]
        payload: DialPressPayload,
    },
    DialRotate {
        action: String,
        context: ActionContext,
        payload: DialRotatePayload,
    },
    PropertyInspectorDidAppear {
        action: String,
        context: ActionContext,
    },
    PropertyInspectorDidDisappear {
        context: ActionContext,
    },
    SendToPlugin {
        context: ActionContext,
        #[serde(default)]
        payload: Value,
    },
    /// Device, application and other events this plugin does not use
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPayload {
    #[serde(default)]
    pub settings: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DialPressPayload {
    /// Absent for `dialDown`; `false` marks the release half of `dialPress`
    #[serde(default)]
    pub pressed: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DialRotatePayload {
    pub ticks: i64,
}

// ============================================================================
// Plugin -> host
// ============================================================================

/// First frame sent after connecting
#[derive(Debug, Serialize)]
pub struct Registration {
    pub event: String,
    pub uuid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitlePayload {
    pub title: String,
    /// 0 = hardware and software
    pub target: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Outbound {
    GetSettings {
        context: ActionContext,
    },
    SetSettings {
        context: ActionContext,
        payload: Value,
    },
    ShowOk {
        context: ActionContext,
    },
    ShowAlert {
        context: ActionContext,
    },
    SetTitle {
        context: ActionContext,
        payload: TitlePayload,
    },
    SetFeedback {
        context: ActionContext,
        payload: Value,
    },
    SendToPropertyInspector {
        action: String,
        context: ActionContext,
        payload: Value,
    },
}

impl Outbound {
    pub fn set_title(context: &ActionContext, title: impl Into<String>) -> Self {
        Outbound::SetTitle {
            context: context.clone(),
            payload: TitlePayload {
                title: title.into(),
                target: 0,
            },
        }
    }
}
