//! Stream Deck host integration

mod connection;
mod protocol;

pub use self::connection::{connect, HostChannels};
pub use self::protocol::{InboundMessage, Outbound};

#[cfg(test)]
pub use self::protocol::TitlePayload;
