//! Numeric counter behaviour

use super::Effect;
use crate::host::Outbound;
use crate::state::{ActionContext, Counter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CounterInput {
    ShortPress,
    LongPress,
    TouchTap,
    DialPress,
    DialRotate(i64),
}

pub(super) fn apply(counter: &mut Counter, input: CounterInput) {
    match input {
        CounterInput::ShortPress | CounterInput::TouchTap => counter.advance(1),
        CounterInput::DialRotate(ticks) => counter.advance(ticks),
        CounterInput::LongPress | CounterInput::DialPress => counter.reset(),
    }
}

/// Show the value as key title and dial feedback
pub(super) fn display(context: &ActionContext, counter: &Counter) -> Vec<Effect> {
    let value = counter.value().to_string();
    vec![
        Effect::Host(Outbound::set_title(context, value.clone())),
        Effect::Host(Outbound::SetFeedback {
            context: context.clone(),
            payload: serde_json::json!({ "value": value }),
        }),
    ]
}
