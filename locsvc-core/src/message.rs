//! Events carried by the bus

use locsvc_protocol::Line;

/// A single event, owned by exactly one party at a time
///
/// Producers move a `Message` into [`EventBus::put`](crate::EventBus::put)
/// and the consumer receives it by value from `get`, so a message cannot be
/// observed after it is handed on or queued twice. There is no `Clone`.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Message {
    /// One NMEA sentence, terminator stripped
    Gps(Line),
    /// Compass heading in whole degrees, `0..360`
    Heading(i16),
}

/// Tag of a [`Message`], for logging and dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageKind {
    Gps,
    Heading,
}

impl Message {
    /// Build a GPS message from a line's bytes
    ///
    /// Returns `None` if `bytes` does not fit in a [`Line`].
    pub fn gps(bytes: &[u8]) -> Option<Self> {
        Line::from_slice(bytes).ok().map(Message::Gps)
    }

    /// Tag of this message
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Gps(_) => MessageKind::Gps,
            Message::Heading(_) => MessageKind::Heading,
        }
    }
}
