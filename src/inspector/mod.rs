//! Property inspector settings form
//!
//! The plugin describes the form as JSON and pushes it to the property
//! inspector with `sendToPropertyInspector`; the inspector page only renders
//! it and sends `{key, value}` edits back through `sendToPlugin`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::actions::ActionKind;
use crate::error::{FormError, SettingsError};
use crate::settings::{parse_device_list, PersistedSettings};
use crate::state::ActionContext;

const TOKEN_HELP_SUMMARY: &str = "How to get a bearer token";
const TOKEN_HELP_REQUEST: &str =
    "Send a post request to 'https://wap.tplinkcloud.com' with the following body:";
const TOKEN_HELP_BODY: &str = r#"{
  "method": "login",
  "params": {
    "appType": "Kasa_Android",
    "cloudUserName": "yourEmail@here",
    "cloudPassword": "yourpasswordhere",
    "terminalUUID": "generatedUUIDhere"
  }
}"#;

// ============================================================================
// Form model
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FormElement {
    Details {
        summary: String,
        paragraphs: Vec<String>,
    },
    Input {
        key: String,
        label: String,
        value: String,
    },
    Dropdown {
        key: String,
        label: String,
        value: String,
        options: Vec<DropdownOption>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

impl DropdownOption {
    fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// A single field edit sent by the inspector page
#[derive(Debug, Clone, Deserialize)]
pub struct FieldEdit {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingsForm {
    data: PersistedSettings,
}

impl SettingsForm {
    pub fn new(data: PersistedSettings) -> Self {
        Self { data }
    }

    pub fn kind(&self) -> ActionKind {
        self.data.kind()
    }

    /// The full settings object currently shown
    pub fn form_data(&self) -> Value {
        self.data.to_value()
    }

    /// Replace all values. Returns whether anything changed.
    pub fn set_form_data(&mut self, settings: &Value) -> Result<bool, SettingsError> {
        let data = PersistedSettings::decode(self.kind(), settings)?;
        if data == self.data {
            return Ok(false);
        }
        self.data = data;
        Ok(true)
    }

    pub fn set_field(&mut self, key: &str, value: String) -> Result<(), FormError> {
        match (&mut self.data, key) {
            (PersistedSettings::Toggle(s), "bearerToken") => s.bearer_token = value,
            (PersistedSettings::Toggle(s), "selectedDeviceId") => s.selected_device_id = value,
            (PersistedSettings::DeviceList(s), "bearerToken") => s.bearer_token = value,
            (PersistedSettings::Counter(s), "number") => s.number = value,
            (PersistedSettings::Counter(s), "step") => s.step = value,
            _ => return Err(FormError::UnknownField(key.to_string())),
        }
        Ok(())
    }

    pub fn elements(&self) -> Vec<FormElement> {
        match &self.data {
            PersistedSettings::Toggle(s) => {
                let mut options = vec![DropdownOption::new("Select a device", "")];
                options.extend(
                    parse_device_list(&s.device_list)
                        .unwrap_or_default()
                        .iter()
                        .map(|device| DropdownOption::new(&device.alias, &device.device_id)),
                );

                vec![
                    token_help(),
                    token_input(&s.bearer_token),
                    FormElement::Dropdown {
                        key: "selectedDeviceId".to_string(),
                        label: "deviceList".to_string(),
                        value: s.selected_device_id.clone(),
                        options,
                    },
                ]
            }
            PersistedSettings::DeviceList(s) => {
                let aliases: Vec<String> = parse_device_list(&s.device_list)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|device| device.alias)
                    .collect();

                vec![
                    token_help(),
                    token_input(&s.bearer_token),
                    FormElement::Details {
                        summary: format!("Devices ({})", aliases.len()),
                        paragraphs: aliases,
                    },
                ]
            }
            PersistedSettings::Counter(s) => vec![
                FormElement::Input {
                    key: "number".to_string(),
                    label: "Number".to_string(),
                    value: s.number.clone(),
                },
                FormElement::Input {
                    key: "step".to_string(),
                    label: "Step".to_string(),
                    value: s.step.clone(),
                },
            ],
        }
    }

    /// Payload for `sendToPropertyInspector`
    pub fn to_payload(&self) -> Value {
        serde_json::json!({
            "elements": self.elements(),
            "settings": self.form_data(),
        })
    }
}

fn token_help() -> FormElement {
    FormElement::Details {
        summary: TOKEN_HELP_SUMMARY.to_string(),
        paragraphs: vec![TOKEN_HELP_REQUEST.to_string(), TOKEN_HELP_BODY.to_string()],
    }
}

fn token_input(value: &str) -> FormElement {
    FormElement::Input {
        key: "bearerToken".to_string(),
        label: "Bearer Token".to_string(),
        value: value.to_string(),
    }
}

// ============================================================================
// Controller
// ============================================================================

#[derive(Debug)]
struct Registration {
    context: ActionContext,
    form: SettingsForm,
    pushed: bool,
}

/// Settings replacement produced by a form edit
#[derive(Debug, Clone, PartialEq)]
pub struct FormEdit {
    pub context: ActionContext,
    pub kind: ActionKind,
    pub settings: Value,
}

/// Tracks the one property inspector the host shows at a time
#[derive(Debug, Default)]
pub struct FormController {
    registration: Option<Registration>,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the open inspector with a form seeded from the last known settings
    pub fn register(&mut self, context: ActionContext, form: SettingsForm) {
        tracing::debug!("Property inspector registered for {}", context);
        self.registration = Some(Registration {
            context,
            form,
            pushed: false,
        });
    }

    pub fn unregister(&mut self, context: &ActionContext) -> bool {
        if self.is_registered(context) {
            self.registration = None;
            true
        } else {
            false
        }
    }

    pub fn is_registered(&self, context: &ActionContext) -> bool {
        self.registration
            .as_ref()
            .is_some_and(|r| &r.context == context)
    }

    #[cfg(test)]
    pub fn registered(&self) -> Option<&ActionContext> {
        self.registration.as_ref().map(|r| &r.context)
    }

    /// Feed settings seen for `context`. Returns the form to push when it
    /// changed or has not been shown yet.
    pub fn on_settings(&mut self, context: &ActionContext, settings: &Value) -> Option<&SettingsForm> {
        let registration = self.registration.as_mut()?;
        if &registration.context != context {
            return None;
        }

        let changed = match registration.form.set_form_data(settings) {
            Ok(changed) => changed,
            Err(e) => {
                tracing::warn!("Ignoring invalid settings for open form of {}: {}", context, e);
                false
            }
        };
        if !changed && registration.pushed {
            return None;
        }

        registration.pushed = true;
        Some(&registration.form)
    }

    /// Settings replacement for one field edit. The form itself only changes
    /// once the resulting settings come back through [`Self::on_settings`].
    pub fn edit(&self, key: &str, value: String) -> Result<FormEdit, FormError> {
        let registration = self.registration.as_ref().ok_or(FormError::NotRegistered)?;

        let mut candidate = registration.form.clone();
        candidate.set_field(key, value)?;

        Ok(FormEdit {
            context: registration.context.clone(),
            kind: candidate.kind(),
            settings: candidate.form_data(),
        })
    }
}
