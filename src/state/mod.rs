//! Per-context state store
//!
//! One entry per visible action instance, keyed by the host-assigned context.
//! Readers get zero values for contexts that were never seen or were removed.

mod timer;

pub use self::timer::{PressTimer, TimerScheduler};

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::actions::ActionKind;
use crate::kasa::Device;

/// Host-assigned identifier of one visible action instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionContext(String);

impl ActionContext {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ActionContext {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ============================================================================
// Counter
// ============================================================================

const MAX_STEP: i64 = 3;

/// Non-negative counter with a step in `1..=3`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    value: i64,
    step: i64,
}

impl Default for Counter {
    fn default() -> Self {
        Self { value: 0, step: 1 }
    }
}

impl Counter {
    pub fn new(value: i64, step: i64) -> Self {
        Self {
            value: value.max(0),
            step: wrap_step(step),
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    /// Add `times` steps; negative results clamp to zero
    pub fn advance(&mut self, times: i64) {
        let delta = times.saturating_mul(self.step);
        self.value = self.value.saturating_add(delta).max(0);
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }
}

/// `((step - 1) mod 3) + 1` with a non-negative modulo
pub fn wrap_step(step: i64) -> i64 {
    (step - 1).rem_euclid(MAX_STEP) + 1
}

// ============================================================================
// Store
// ============================================================================

#[derive(Debug, Default)]
pub struct ContextState {
    pub kind: Option<ActionKind>,
    pub bearer_token: String,
    pub devices: Vec<Device>,
    pub selected_device_id: String,
    pub counter: Counter,
    pub press_timer: Option<PressTimer>,
}

impl ContextState {
    /// The selected device, if one is selected and present in the cached list
    pub fn selected_device(&self) -> Option<&Device> {
        if self.selected_device_id.is_empty() {
            return None;
        }
        self.devices
            .iter()
            .find(|device| device.device_id == self.selected_device_id)
    }
}

#[derive(Debug, Default)]
pub struct ContextStore {
    contexts: HashMap<ActionContext, ContextState>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, context: &ActionContext) -> bool {
        self.contexts.contains_key(context)
    }

    pub fn get(&self, context: &ActionContext) -> Option<&ContextState> {
        self.contexts.get(context)
    }

    pub fn get_mut(&mut self, context: &ActionContext) -> Option<&mut ContextState> {
        self.contexts.get_mut(context)
    }

    /// Entry for `context`, created on first use and tagged with `kind`
    pub fn entry(&mut self, context: &ActionContext, kind: ActionKind) -> &mut ContextState {
        let state = self.contexts.entry(context.clone()).or_default();
        state.kind = Some(kind);
        state
    }

    /// Purge everything cached for `context`, cancelling any pending timer
    pub fn remove(&mut self, context: &ActionContext) -> bool {
        self.contexts.remove(context).is_some()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn bearer_token(&self, context: &ActionContext) -> &str {
        self.get(context).map_or("", |s| s.bearer_token.as_str())
    }

    pub fn devices(&self, context: &ActionContext) -> &[Device] {
        self.get(context)
            .map(|s| s.devices.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_device_id(&self, context: &ActionContext) -> &str {
        self.get(context).map_or("", |s| s.selected_device_id.as_str())
    }

    pub fn counter(&self, context: &ActionContext) -> Counter {
        self.get(context).map(|s| s.counter).unwrap_or_default()
    }

    pub fn has_pending_press(&self, context: &ActionContext) -> bool {
        self.get(context).is_some_and(|s| s.press_timer.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kasa::fixtures::device;

    #[test]
    fn test_unseen_context_reads_defaults() {
        let store = ContextStore::new();
        let ctx = ActionContext::from("never-seen");

        assert_eq!(store.bearer_token(&ctx), "");
        assert!(store.devices(&ctx).is_empty());
        assert_eq!(store.selected_device_id(&ctx), "");
        assert_eq!(store.counter(&ctx).value(), 0);
        assert_eq!(store.counter(&ctx).step(), 1);
        assert!(!store.has_pending_press(&ctx));
    }

    #[test]
    fn test_remove_purges_everything() {
        let mut store = ContextStore::new();
        let ctx = ActionContext::from("ctx-1");

        let state = store.entry(&ctx, ActionKind::DeviceToggle);
        state.bearer_token = "tok".to_string();
        state.devices = vec![device("d1", "Lamp", 0, "https://x")];
        state.selected_device_id = "d1".to_string();
        state.counter = Counter::new(9, 2);
        state.press_timer = Some(PressTimer::new(1, None));
        assert!(store.has_pending_press(&ctx));

        assert!(store.remove(&ctx));
        assert!(!store.contains(&ctx));
        assert_eq!(store.bearer_token(&ctx), "");
        assert!(store.devices(&ctx).is_empty());
        assert_eq!(store.selected_device_id(&ctx), "");
        assert_eq!(store.counter(&ctx), Counter::default());
        assert!(!store.has_pending_press(&ctx));
        assert!(!store.remove(&ctx));
    }

    #[test]
    fn test_contexts_are_independent() {
        let mut store = ContextStore::new();
        let a = ActionContext::from("a");
        let b = ActionContext::from("b");

        store.entry(&a, ActionKind::DeviceToggle).bearer_token = "token-a".to_string();
        store.entry(&b, ActionKind::DeviceToggle);

        assert_eq!(store.bearer_token(&a), "token-a");
        assert_eq!(store.bearer_token(&b), "");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_selected_device_lookup() {
        let mut state = ContextState::default();
        state.devices = vec![
            device("d1", "Lamp", 0, "https://x"),
            device("d2", "Fan", 1, "https://y"),
        ];
        assert!(state.selected_device().is_none());

        state.selected_device_id = "d2".to_string();
        assert_eq!(state.selected_device().map(|d| d.alias.as_str()), Some("Fan"));

        state.selected_device_id = "gone".to_string();
        assert!(state.selected_device().is_none());
    }

    #[test]
    fn test_wrap_step() {
        assert_eq!(wrap_step(1), 1);
        assert_eq!(wrap_step(2), 2);
        assert_eq!(wrap_step(3), 3);
        assert_eq!(wrap_step(4), 1);
        assert_eq!(wrap_step(0), 3);
        assert_eq!(wrap_step(-1), 2);
    }

    #[test]
    fn test_counter_clamps_at_zero() {
        let mut counter = Counter::new(2, 3);
        counter.advance(-1);
        assert_eq!(counter.value(), 0);

        counter.advance(2);
        assert_eq!(counter.value(), 6);

        counter.reset();
        assert_eq!(counter.value(), 0);
        assert_eq!(counter.step(), 3);

        assert_eq!(Counter::new(-5, 1).value(), 0);
    }
}
