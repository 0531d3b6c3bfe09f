//! WebSocket link to the Stream Deck host

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::protocol::{InboundMessage, Outbound, Registration};
use crate::error::PluginError;

/// Channel ends of an established host connection
pub struct HostChannels {
    pub outbound: mpsc::UnboundedSender<Outbound>,
    pub inbound: mpsc::UnboundedReceiver<InboundMessage>,
}

/// Connect, register, and start the reader/writer tasks.
///
/// `inbound` closes when the host disconnects; dropping every `outbound`
/// sender closes the socket.
pub async fn connect(
    url: &str,
    register_event: &str,
    plugin_uuid: &str,
) -> Result<HostChannels, PluginError> {
    let (stream, _response) = connect_async(url).await?;
    tracing::info!("Connected to Stream Deck host at {}", url);

    let (mut sink, mut source) = stream.split();

    let registration = serde_json::to_string(&Registration {
        event: register_event.to_string(),
        uuid: plugin_uuid.to_string(),
    })?;
    sink.send(Message::Text(registration)).await?;
    tracing::debug!("Sent {} for {}", register_event, plugin_uuid);

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Outbound>();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<InboundMessage>();

    // Plugin -> host
    tokio::spawn(async move {
        while let Some(command) = outbound_rx.recv().await {
            let text = match serde_json::to_string(&command) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Failed to encode host command: {}", e);
                    continue;
                }
            };
            if let Err(e) = sink.send(Message::Text(text)).await {
                tracing::error!("Host send error: {}", e);
                break;
            }
        }
        let _ = sink.close().await;
    });

    // Host -> plugin
    tokio::spawn(async move {
        while let Some(frame) = source.next().await {
            match frame {
                Ok(Message::Text(text)) => match serde_json::from_str::<InboundMessage>(&text) {
                    Ok(message) => {
                        if inbound_tx.send(message).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Ignoring unparseable host message ({}): {}", e, text);
                    }
                },
                Ok(Message::Close(_)) => {
                    tracing::info!("Host closed the connection");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("Host read error: {}", e);
                    break;
                }
            }
        }
    });

    Ok(HostChannels {
        outbound: outbound_tx,
        inbound: inbound_rx,
    })
}
