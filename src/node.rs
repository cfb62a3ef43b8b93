//! A Meshcore chat node: radio, pipeline and outbound composition.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::auth::{
    ComposeError, InboundOutcome, InboundPipeline, MessageSink, seal_group_text, sign_advert,
};
use crate::config::{ConfigError, NodeConfig};
use crate::crypto::{AdvertSigner, CryptoSuite, Identity};
use crate::payload::{Advert, DeviceRole, GroupTextContent, PayloadCodec, Position};
use crate::protocol::metrics::{Metrics, PacketDirection};
use crate::protocol::{Message, RouteType};
use crate::radio::{Radio, RadioError, RadioSettings};

/// Error type for node operations.
#[derive(Error, Debug)]
pub enum NodeError {
    /// Radio failure
    #[error("radio error: {0}")]
    Radio(#[from] RadioError),
    /// Inbound frame could not be decoded
    #[error("malformed inbound frame: {0}")]
    Malformed(#[source] crate::protocol::Error),
    /// Outbound payload could not be built
    #[error("cannot compose packet: {0}")]
    Compose(#[from] ComposeError),
    /// Configuration could not be applied
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// No keyring entry at this index
    #[error("no channel at index {index}")]
    UnknownChannel {
        /// Requested keyring index
        index: usize,
    },
    /// Advert requested without a signing identity
    #[error("node has no identity to sign adverts with")]
    MissingIdentity,
}

impl From<crate::protocol::Error> for NodeError {
    fn from(err: crate::protocol::Error) -> Self {
        Self::Compose(ComposeError::Codec(err))
    }
}

/// Meshcore node.
///
/// Receiving is a single step: [`MeshNode::poll`] takes at most one frame
/// off the radio and runs it through the pipeline to completion.
pub struct MeshNode<R, S, C> {
    radio: R,
    pipeline: InboundPipeline<C, S>,
    nickname: String,
    identity: Option<Identity>,
}

impl<R: Radio, S: MessageSink, C: CryptoSuite> MeshNode<R, S, C> {
    /// Create a node around an already configured radio.
    pub fn new(radio: R, pipeline: InboundPipeline<C, S>, nickname: impl Into<String>) -> Self {
        Self {
            radio,
            pipeline,
            nickname: nickname.into(),
            identity: None,
        }
    }

    /// Attach a signing identity.
    #[must_use]
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Build a node from configuration and configure the radio.
    pub fn from_config(
        config: &NodeConfig,
        mut radio: R,
        crypto: C,
        sink: S,
    ) -> Result<Self, NodeError> {
        config.validate()?;
        radio.configure(&config.radio)?;
        info!(
            nickname = %config.nickname,
            channels = config.channels.len(),
            frequency_hz = config.radio.frequency_hz,
            "node configured"
        );

        let pipeline = InboundPipeline::new(config.keyring()?, crypto, sink);
        let mut node = Self::new(radio, pipeline, config.nickname.clone());
        node.identity = config.identity()?;
        Ok(node)
    }

    /// Reconfigure the radio.
    pub fn configure_radio(&mut self, settings: &RadioSettings) -> Result<(), NodeError> {
        self.radio.configure(settings)?;
        Ok(())
    }

    /// Nickname prefixed to outgoing texts.
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Signing identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Inbound pipeline.
    pub fn pipeline(&self) -> &InboundPipeline<C, S> {
        &self.pipeline
    }

    /// Mutable inbound pipeline.
    pub fn pipeline_mut(&mut self) -> &mut InboundPipeline<C, S> {
        &mut self.pipeline
    }

    /// Underlying radio.
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Mutable underlying radio.
    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    /// Wait up to `timeout` for one frame and process it.
    ///
    /// Returns `Ok(None)` when nothing arrived. A frame that does not decode
    /// is reported as [`NodeError::Malformed`] and leaves the node ready
    /// for the next one.
    #[instrument(level = "debug", skip(self))]
    pub fn poll(&mut self, timeout: Duration) -> Result<Option<InboundOutcome>, NodeError> {
        let Some(frame) = self.radio.receive(timeout)? else {
            return Ok(None);
        };
        let outcome = self
            .pipeline
            .process_bytes(frame)
            .map_err(NodeError::Malformed)?;
        debug!(?outcome, "frame processed");
        Ok(Some(outcome))
    }

    /// Send `"nickname: text"` on the channel at `channel_index`.
    #[instrument(level = "debug", skip(self, text), fields(len = text.len()))]
    pub fn send_group_text(
        &mut self,
        channel_index: usize,
        text: &str,
        timestamp: u32,
    ) -> Result<(), NodeError> {
        let key = self
            .pipeline
            .keyring()
            .get(channel_index)
            .ok_or(NodeError::UnknownChannel {
                index: channel_index,
            })?;
        let content = GroupTextContent::plain(timestamp, format!("{}: {text}", self.nickname));
        let sealed = seal_group_text(&content, key, self.pipeline.crypto())?;
        debug!(
            channel = key.name(),
            channel_hash = sealed.channel_hash,
            "sealed group text"
        );
        let message = sealed.to_message(RouteType::Flood)?;
        self.transmit(&message)
    }

    /// Sign and flood an advert for this node.
    #[instrument(level = "debug", skip(self, position))]
    pub fn send_advert(
        &mut self,
        timestamp: u32,
        name: Option<&str>,
        role: DeviceRole,
        position: Option<Position>,
    ) -> Result<(), NodeError> {
        let identity = self.identity.as_ref().ok_or(NodeError::MissingIdentity)?;
        let mut advert = Advert::new(identity.public_key(), timestamp);
        advert.role = role;
        advert.position = position;
        advert.name = name.map(str::to_string);
        sign_advert(&mut advert, identity)?;
        let message = advert.to_message(RouteType::Flood)?;
        self.transmit(&message)
    }

    fn transmit(&mut self, message: &Message) -> Result<(), NodeError> {
        let frame = message.encode_to_vec()?;
        self.radio.send(&frame)?;
        Metrics::record_packet(PacketDirection::Sent, message.payload_type());
        debug!(
            len = frame.len(),
            payload_type = %message.payload_type(),
            "frame sent"
        );
        Ok(())
    }
}

impl<R, S, C> std::fmt::Debug for MeshNode<R, S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshNode")
            .field("nickname", &self.nickname)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
