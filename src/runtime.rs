//! Plugin event loop
//!
//! A single task owns the [`ActionRouter`]. Host messages, timer expiries and
//! gateway completions are all fed through it in arrival order; gateway
//! calls run on spawned tasks and report back as events.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::actions::{ActionRouter, ActionUuids, Effect, Event};
use crate::config::PluginConfig;
use crate::host::{HostChannels, Outbound};
use crate::kasa::DeviceGateway;
use crate::state::{ActionContext, PressTimer, TimerScheduler};

/// Arms long-press timers as sleeping tasks that post back into the loop
pub struct TokioTimerScheduler {
    events: mpsc::UnboundedSender<Event>,
}

impl TokioTimerScheduler {
    pub fn new(events: mpsc::UnboundedSender<Event>) -> Self {
        Self { events }
    }
}

impl TimerScheduler for TokioTimerScheduler {
    fn schedule(&self, context: &ActionContext, generation: u64, delay: Duration) -> PressTimer {
        let events = self.events.clone();
        let context = context.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(Event::LongPressElapsed {
                context,
                generation,
            });
        })
        .abort_handle();

        PressTimer::new(generation, Some(handle))
    }
}

/// Run until the host closes the connection
pub async fn run<G: DeviceGateway>(gateway: Arc<G>, config: &PluginConfig, host: HostChannels) {
    let HostChannels {
        outbound,
        mut inbound,
    } = host;
    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<Event>();

    let mut router = ActionRouter::new(
        ActionUuids::from(config),
        TokioTimerScheduler::new(events_tx.clone()),
        Duration::from_millis(config.long_press_ms),
    );

    tracing::info!(
        "Plugin ready (long press after {}ms)",
        config.long_press_ms
    );

    loop {
        let event = tokio::select! {
            message = inbound.recv() => match message {
                Some(message) => match router.translate(message) {
                    Some(event) => event,
                    None => continue,
                },
                None => {
                    tracing::info!(
                        "Host connection closed, shutting down ({} actions visible)",
                        router.store().len()
                    );
                    break;
                }
            },
            Some(event) = events_rx.recv() => event,
        };

        for effect in router.handle(event) {
            execute(effect, &gateway, &outbound, &events_tx);
        }
    }
}

fn execute<G: DeviceGateway>(
    effect: Effect,
    gateway: &Arc<G>,
    outbound: &mpsc::UnboundedSender<Outbound>,
    events: &mpsc::UnboundedSender<Event>,
) {
    match effect {
        Effect::Host(command) => {
            if outbound.send(command).is_err() {
                tracing::warn!("Host writer stopped, dropping command");
            }
        }
        Effect::FetchDevices {
            context,
            bearer_token,
            reason,
        } => {
            let gateway = gateway.clone();
            let events = events.clone();
            tokio::spawn(async move {
                let result = gateway.list_devices(&bearer_token).await;
                let _ = events.send(Event::DevicesFetched {
                    context,
                    reason,
                    result,
                });
            });
        }
        Effect::ToggleDevice {
            context,
            bearer_token,
            device,
        } => {
            let gateway = gateway.clone();
            let events = events.clone();
            tokio::spawn(async move {
                let result = gateway.toggle_device(&device, &bearer_token).await;
                let _ = events.send(Event::ToggleFinished { context, result });
            });
        }
    }
}
