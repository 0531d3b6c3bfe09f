//! Action event router
//!
//! Per context the router is either idle or awaiting a long press (a
//! [`PressTimer`] is armed). Key-up with an armed timer is a short press;
//! an expiry that still matches the armed timer is a long press. Expiries
//! for cancelled timers are recognised by their generation and ignored.

use std::time::Duration;

use super::counter::{self, CounterInput};
use super::device;
use super::{ActionKind, ActionUuids, Effect, Event, FetchReason};
use crate::error::{GatewayError, PluginError};
use crate::host::{InboundMessage, Outbound};
use crate::inspector::{FieldEdit, FormController, FormEdit, SettingsForm};
use crate::kasa::{Device, ToggleOutcome};
use crate::settings::{PersistedSettings, SettingsUpdate};
use crate::state::{ActionContext, ContextState, ContextStore, TimerScheduler};

pub struct ActionRouter<S> {
    uuids: ActionUuids,
    store: ContextStore,
    inspector: FormController,
    scheduler: S,
    long_press: Duration,
    next_generation: u64,
}

impl<S: TimerScheduler> ActionRouter<S> {
    pub fn new(uuids: ActionUuids, scheduler: S, long_press: Duration) -> Self {
        Self {
            uuids,
            store: ContextStore::new(),
            inspector: FormController::new(),
            scheduler,
            long_press,
            next_generation: 0,
        }
    }

    pub fn store(&self) -> &ContextStore {
        &self.store
    }

    #[cfg(test)]
    pub fn inspector(&self) -> &FormController {
        &self.inspector
    }

    /// Map a host message to a router event. Unknown actions and events yield `None`.
    pub fn translate(&self, message: InboundMessage) -> Option<Event> {
        let event = match message {
            InboundMessage::WillAppear { action, context } => Event::WillAppear {
                kind: self.kind_of(&action)?,
                context,
            },
            InboundMessage::WillDisappear { context } => Event::WillDisappear { context },
            InboundMessage::DidReceiveSettings {
                action,
                context,
                payload,
            } => Event::SettingsReceived {
                kind: self.kind_of(&action)?,
                context,
                settings: payload.settings,
            },
            InboundMessage::KeyDown { action, context } => Event::KeyDown {
                kind: self.kind_of(&action)?,
                context,
            },
            InboundMessage::KeyUp { action, context } => Event::KeyUp {
                kind: self.kind_of(&action)?,
                context,
            },
            InboundMessage::TouchTap { action, context } => Event::TouchTap {
                kind: self.kind_of(&action)?,
                context,
            },
            InboundMessage::DialPress {
                action,
                context,
                payload,
            } => {
                if payload.pressed == Some(false) {
                    return None;
                }
                Event::DialPress {
                    kind: self.kind_of(&action)?,
                    context,
                }
            }
            InboundMessage::DialRotate {
                action,
                context,
                payload,
            } => Event::DialRotate {
                kind: self.kind_of(&action)?,
                context,
                ticks: payload.ticks,
            },
            InboundMessage::PropertyInspectorDidAppear { action, context } => {
                Event::InspectorAppeared {
                    kind: self.kind_of(&action)?,
                    context,
                }
            }
            InboundMessage::PropertyInspectorDidDisappear { context } => {
                Event::InspectorDisappeared { context }
            }
            InboundMessage::SendToPlugin { context, payload } => match serde_json::from_value::<FieldEdit>(payload) {
                Ok(edit) => Event::InspectorEdit {
                    key: edit.key,
                    value: edit.value,
                },
                Err(e) => {
                    tracing::warn!("Ignoring malformed inspector message from {}: {}", context, e);
                    return None;
                }
            },
            InboundMessage::Other => return None,
        };

        Some(event)
    }

    fn kind_of(&self, action: &str) -> Option<ActionKind> {
        let kind = self.uuids.kind_of(action);
        if kind.is_none() {
            tracing::warn!("Ignoring event for unknown action {}", action);
        }
        kind
    }

    /// Apply one event and return the effects to carry out
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::WillAppear { context, kind } => self.will_appear(context, kind),
            Event::WillDisappear { context } => self.will_disappear(context),
            Event::SettingsReceived {
                context,
                kind,
                settings,
            } => self.settings_received(context, kind, settings),
            Event::KeyDown { context, kind } => self.key_down(context, kind),
            Event::KeyUp { context, kind } => self.key_up(context, kind),
            Event::TouchTap { context, kind } => {
                self.immediate(context, kind, CounterInput::TouchTap)
            }
            Event::DialPress { context, kind } => {
                self.immediate(context, kind, CounterInput::DialPress)
            }
            Event::DialRotate {
                context,
                kind,
                ticks,
            } => self.immediate(context, kind, CounterInput::DialRotate(ticks)),
            Event::InspectorAppeared { context, kind } => self.inspector_appeared(context, kind),
            Event::InspectorDisappeared { context } => {
                self.inspector.unregister(&context);
                Vec::new()
            }
            Event::InspectorEdit { key, value } => self.inspector_edit(key, value),
            Event::LongPressElapsed {
                context,
                generation,
            } => self.long_press_elapsed(context, generation),
            Event::DevicesFetched {
                context,
                reason,
                result,
            } => self.devices_fetched(context, reason, result),
            Event::ToggleFinished { context, result } => self.toggle_finished(context, result),
        }
    }

    fn will_appear(&mut self, context: ActionContext, kind: ActionKind) -> Vec<Effect> {
        let state = self.store.entry(&context, kind);

        let mut effects = vec![Effect::Host(Outbound::GetSettings {
            context: context.clone(),
        })];
        effects.extend(display(kind, &context, state));
        effects
    }

    fn will_disappear(&mut self, context: ActionContext) -> Vec<Effect> {
        if self.store.remove(&context) {
            tracing::debug!(
                "Purged state for {} ({} contexts remain)",
                context,
                self.store.len()
            );
        }
        self.inspector.unregister(&context);
        Vec::new()
    }

    fn settings_received(
        &mut self,
        context: ActionContext,
        kind: ActionKind,
        settings: serde_json::Value,
    ) -> Vec<Effect> {
        let mut effects = Vec::new();

        if let Some(form) = self.inspector.on_settings(&context, &settings) {
            effects.push(Effect::Host(Outbound::SendToPropertyInspector {
                action: self.uuids.uuid_of(kind).to_string(),
                context: context.clone(),
                payload: form.to_payload(),
            }));
        }

        let state = self.store.entry(&context, kind);
        match PersistedSettings::decode(kind, &settings).and_then(|s| s.into_update()) {
            Ok(update) => {
                apply_update(state, update);
                tracing::debug!("Settings applied for {} ({})", context, kind.as_str());
            }
            Err(e) => {
                tracing::error!("Error parsing settings for {}: {}", context, e);
            }
        }

        // Toggle keys re-sync the device list on every settings update
        if kind == ActionKind::DeviceToggle {
            effects.extend(device::refresh(&context, state, FetchReason::SettingsSync));
        }

        effects.extend(display(kind, &context, state));
        effects
    }

    fn key_down(&mut self, context: ActionContext, kind: ActionKind) -> Vec<Effect> {
        self.next_generation += 1;
        let generation = self.next_generation;
        let timer = self.scheduler.schedule(&context, generation, self.long_press);

        // Replacing an older timer drops, and so cancels, it
        self.store.entry(&context, kind).press_timer = Some(timer);
        Vec::new()
    }

    fn key_up(&mut self, context: ActionContext, kind: ActionKind) -> Vec<Effect> {
        if !self.store.has_pending_press(&context) {
            // Timer already consumed: the long press has been handled
            return Vec::new();
        }
        let Some(state) = self.store.get_mut(&context) else {
            return Vec::new();
        };
        state.press_timer = None;

        match kind {
            ActionKind::DeviceToggle => device::toggle_selected(&context, state),
            ActionKind::DeviceList => Vec::new(),
            ActionKind::Counter => {
                counter::apply(&mut state.counter, CounterInput::ShortPress);
                let mut effects = counter::display(&context, &state.counter);
                effects.push(persist(kind, &context, state));
                effects
            }
        }
    }

    fn long_press_elapsed(&mut self, context: ActionContext, generation: u64) -> Vec<Effect> {
        let Some(state) = self.store.get_mut(&context) else {
            return Vec::new();
        };
        match &state.press_timer {
            Some(timer) if timer.generation() == generation => {}
            _ => {
                tracing::debug!("Ignoring stale long-press timer {} for {}", generation, context);
                return Vec::new();
            }
        }
        state.press_timer = None;

        let Some(kind) = state.kind else {
            return Vec::new();
        };
        tracing::debug!("Long press on {} ({})", context, kind.as_str());

        let mut effects = match kind {
            ActionKind::DeviceToggle | ActionKind::DeviceList => {
                device::refresh(&context, state, FetchReason::LongPress)
            }
            ActionKind::Counter => {
                counter::apply(&mut state.counter, CounterInput::LongPress);
                counter::display(&context, &state.counter)
            }
        };
        effects.push(persist(kind, &context, state));
        effects
    }

    /// Touch tap and dial input: act immediately, then persist
    fn immediate(&mut self, context: ActionContext, kind: ActionKind, input: CounterInput) -> Vec<Effect> {
        let state = self.store.entry(&context, kind);

        let mut effects = Vec::new();
        if kind == ActionKind::Counter {
            counter::apply(&mut state.counter, input);
            effects.extend(counter::display(&context, &state.counter));
        }
        effects.push(persist(kind, &context, state));
        effects
    }

    fn inspector_appeared(&mut self, context: ActionContext, kind: ActionKind) -> Vec<Effect> {
        let seed = match self.store.get(&context) {
            Some(state) => PersistedSettings::snapshot(kind, state),
            None => PersistedSettings::defaults(kind),
        };
        self.inspector.register(context.clone(), SettingsForm::new(seed));

        vec![Effect::Host(Outbound::GetSettings { context })]
    }

    fn inspector_edit(&mut self, key: String, value: String) -> Vec<Effect> {
        let FormEdit {
            context,
            kind,
            settings,
        } = match self.inspector.edit(&key, value) {
            Ok(edit) => edit,
            Err(e) => {
                tracing::error!("Dropping settings edit of {}: {}", key, e);
                return Vec::new();
            }
        };

        let update = match PersistedSettings::decode(kind, &settings).and_then(|s| s.into_update()) {
            Ok(update) => update,
            Err(e) => {
                tracing::error!("Rejected settings edit of {} for {}: {}", key, context, e);
                return Vec::new();
            }
        };

        let state = self.store.entry(&context, kind);
        apply_update(state, update);

        // Store the normalised values; the host does not echo them back
        let snapshot = PersistedSettings::snapshot(kind, state).to_value();
        let mut effects = vec![Effect::Host(Outbound::SetSettings {
            context: context.clone(),
            payload: snapshot.clone(),
        })];
        effects.extend(self.settings_received(context, kind, snapshot));
        effects
    }

    fn devices_fetched(
        &mut self,
        context: ActionContext,
        reason: FetchReason,
        result: Result<Vec<Device>, GatewayError>,
    ) -> Vec<Effect> {
        let Some(state) = self.store.get_mut(&context) else {
            tracing::debug!("Dropping device list for removed context {}", context);
            return Vec::new();
        };
        let Some(kind) = state.kind else {
            return Vec::new();
        };

        let devices = match result {
            Ok(devices) => devices,
            Err(e) => return vec![alert(&context, PluginError::Gateway(e))],
        };

        state.devices = devices;
        let snapshot = PersistedSettings::snapshot(kind, state).to_value();

        let mut effects = vec![Effect::Host(Outbound::SetSettings {
            context: context.clone(),
            payload: snapshot.clone(),
        })];

        if let Some(form) = self.inspector.on_settings(&context, &snapshot) {
            effects.push(Effect::Host(Outbound::SendToPropertyInspector {
                action: self.uuids.uuid_of(kind).to_string(),
                context: context.clone(),
                payload: form.to_payload(),
            }));
        }

        effects.extend(display(kind, &context, state));

        if reason == FetchReason::LongPress {
            effects.push(Effect::Host(Outbound::ShowOk { context }));
        }
        effects
    }

    fn toggle_finished(
        &mut self,
        context: ActionContext,
        result: Result<ToggleOutcome, GatewayError>,
    ) -> Vec<Effect> {
        if !self.store.contains(&context) {
            tracing::debug!("Dropping toggle result for removed context {}", context);
            return Vec::new();
        }

        match result {
            Ok(outcome) => {
                tracing::debug!(
                    "Toggle for {} succeeded ({})",
                    context,
                    outcome.requested.as_str()
                );
                vec![Effect::Host(Outbound::ShowOk { context })]
            }
            Err(e) => vec![alert(&context, PluginError::Gateway(e))],
        }
    }
}

/// Log a failure and flag it on the key
pub(super) fn alert(context: &ActionContext, error: PluginError) -> Effect {
    if error.is_precondition() {
        tracing::error!("Cannot run action for {}: {}", context, error);
    } else {
        tracing::error!("Action failed for {}: {}", context, error);
    }
    Effect::Host(Outbound::ShowAlert {
        context: context.clone(),
    })
}

/// `setSettings` with the cached state of `context`
fn persist(kind: ActionKind, context: &ActionContext, state: &ContextState) -> Effect {
    Effect::Host(Outbound::SetSettings {
        context: context.clone(),
        payload: PersistedSettings::snapshot(kind, state).to_value(),
    })
}

fn display(kind: ActionKind, context: &ActionContext, state: &ContextState) -> Vec<Effect> {
    match kind {
        ActionKind::DeviceToggle => device::display(context, state),
        ActionKind::DeviceList => Vec::new(),
        ActionKind::Counter => counter::display(context, &state.counter),
    }
}

/// Replace cached values with a fully parsed update
fn apply_update(state: &mut ContextState, update: SettingsUpdate) {
    match update {
        SettingsUpdate::Toggle {
            bearer_token,
            devices,
            selected_device_id,
        } => {
            state.bearer_token = bearer_token;
            state.devices = devices;
            state.selected_device_id = selected_device_id;
        }
        SettingsUpdate::DeviceList {
            bearer_token,
            devices,
        } => {
            state.bearer_token = bearer_token;
            state.devices = devices;
        }
        SettingsUpdate::Counter(counter) => {
            state.counter = counter;
        }
    }
}
