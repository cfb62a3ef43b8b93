use super::RejectReason;
use crate::payload::Advert;

/// A group text ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Channel hash from the envelope
    pub channel_hash: u8,
    /// Name of the channel whose key matched
    pub channel_name: String,
    /// Sender taken from the `"name: body"` convention, if present
    pub sender: Option<String>,
    /// Message body
    pub text: String,
    /// Sender timestamp
    pub timestamp: u32,
    /// Whether the MAC matched a known key. Always true for delivered texts.
    pub verified: bool,
}

/// Destination for authenticated inbound content.
pub trait MessageSink {
    /// An authenticated, decrypted group text.
    fn deliver_text(&mut self, message: ChatMessage);

    /// A decoded advert, with the result of its signature check.
    fn deliver_advert(&mut self, advert: &Advert, verified: bool);

    /// A group text that could not be authenticated or decrypted.
    fn undeliverable(&mut self, channel_hash: u8, reason: RejectReason) {
        let _ = (channel_hash, reason);
    }
}

impl<T: MessageSink + ?Sized> MessageSink for &mut T {
    fn deliver_text(&mut self, message: ChatMessage) {
        (**self).deliver_text(message);
    }

    fn deliver_advert(&mut self, advert: &Advert, verified: bool) {
        (**self).deliver_advert(advert, verified);
    }

    fn undeliverable(&mut self, channel_hash: u8, reason: RejectReason) {
        (**self).undeliverable(channel_hash, reason);
    }
}
