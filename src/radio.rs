//! Radio transceiver collaborator.
//!
//! The node only needs to configure the modem, push a frame out and wait
//! for the next one. [`MemoryRadio`] provides an in-process loopback pair.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::protocol::MAX_TRANS_UNIT;

/// Error type for radio operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RadioError {
    /// Send attempted before `configure`.
    #[error("radio not configured")]
    NotConfigured,
    /// Frame exceeds the radio MTU.
    #[error("frame of {len} bytes exceeds radio MTU of {max}")]
    FrameTooLarge {
        /// Frame length
        len: usize,
        /// MTU
        max: usize,
    },
    /// Settings rejected by the modem.
    #[error("invalid radio setting {field}: {reason}")]
    InvalidSetting {
        /// Offending setting
        field: &'static str,
        /// Why it was rejected
        reason: &'static str,
    },
    /// The link is no longer usable.
    #[error("radio link closed")]
    Closed,
}

/// LoRa modem parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioSettings {
    /// Carrier frequency in Hz
    pub frequency_hz: u32,
    /// Spreading factor (7..=12)
    pub spreading_factor: u8,
    /// Bandwidth in kHz
    pub bandwidth_khz: f32,
    /// Coding rate denominator (5..=8)
    pub coding_rate: u8,
    /// Transmit power in dBm
    pub power_dbm: i8,
}

impl Default for RadioSettings {
    fn default() -> Self {
        Self {
            frequency_hz: 869_618_000,
            spreading_factor: 8,
            bandwidth_khz: 62.5,
            coding_rate: 8,
            power_dbm: 22,
        }
    }
}

impl RadioSettings {
    /// Check the settings against what a LoRa modem accepts.
    pub fn validate(&self) -> Result<(), RadioError> {
        if !(7..=12).contains(&self.spreading_factor) {
            return Err(RadioError::InvalidSetting {
                field: "spreading_factor",
                reason: "must be between 7 and 12",
            });
        }
        if !(5..=8).contains(&self.coding_rate) {
            return Err(RadioError::InvalidSetting {
                field: "coding_rate",
                reason: "must be between 5 and 8",
            });
        }
        if !(self.bandwidth_khz.is_finite() && self.bandwidth_khz > 0.0) {
            return Err(RadioError::InvalidSetting {
                field: "bandwidth_khz",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

/// Send and receive primitives of a packet radio.
pub trait Radio {
    /// Apply modem settings. Must be called before `send`.
    fn configure(&mut self, settings: &RadioSettings) -> Result<(), RadioError>;

    /// Transmit one frame.
    fn send(&mut self, frame: &[u8]) -> Result<(), RadioError>;

    /// Wait up to `timeout` for the next frame; `None` on timeout.
    fn receive(&mut self, timeout: Duration) -> Result<Option<Bytes>, RadioError>;
}

#[derive(Default)]
struct Air {
    frames: Mutex<VecDeque<Bytes>>,
    ready: Condvar,
}

/// In-process radio: frames sent on one end arrive on the other.
pub struct MemoryRadio {
    inbox: Arc<Air>,
    outbox: Arc<Air>,
    settings: Option<RadioSettings>,
}

impl MemoryRadio {
    /// Two connected ends.
    #[must_use]
    pub fn pair() -> (Self, Self) {
        let a = Arc::new(Air::default());
        let b = Arc::new(Air::default());
        (
            Self {
                inbox: Arc::clone(&a),
                outbox: Arc::clone(&b),
                settings: None,
            },
            Self {
                inbox: b,
                outbox: a,
                settings: None,
            },
        )
    }

    /// Settings applied by the last `configure`.
    #[must_use]
    pub fn settings(&self) -> Option<&RadioSettings> {
        self.settings.as_ref()
    }

    /// Frames waiting to be received on this end.
    pub fn pending(&self) -> Result<usize, RadioError> {
        let frames = self.inbox.frames.lock().map_err(|_| RadioError::Closed)?;
        Ok(frames.len())
    }

    /// Queue a frame on this end as if it came over the air.
    pub fn inject(&self, frame: impl Into<Bytes>) -> Result<(), RadioError> {
        push(&self.inbox, frame.into())
    }
}

fn push(air: &Air, frame: Bytes) -> Result<(), RadioError> {
    let mut frames = air.frames.lock().map_err(|_| RadioError::Closed)?;
    frames.push_back(frame);
    air.ready.notify_one();
    Ok(())
}

impl Radio for MemoryRadio {
    fn configure(&mut self, settings: &RadioSettings) -> Result<(), RadioError> {
        settings.validate()?;
        self.settings = Some(*settings);
        Ok(())
    }

    fn send(&mut self, frame: &[u8]) -> Result<(), RadioError> {
        if self.settings.is_none() {
            return Err(RadioError::NotConfigured);
        }
        if frame.len() > MAX_TRANS_UNIT {
            return Err(RadioError::FrameTooLarge {
                len: frame.len(),
                max: MAX_TRANS_UNIT,
            });
        }
        trace!(len = frame.len(), "radio tx");
        push(&self.outbox, Bytes::copy_from_slice(frame))
    }

    fn receive(&mut self, timeout: Duration) -> Result<Option<Bytes>, RadioError> {
        let mut frames = self.inbox.frames.lock().map_err(|_| RadioError::Closed)?;
        // None when the deadline is past what Instant can hold: wait forever
        let deadline = Instant::now().checked_add(timeout);
        loop {
            if let Some(frame) = frames.pop_front() {
                trace!(len = frame.len(), "radio rx");
                return Ok(Some(frame));
            }
            frames = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(None);
                    }
                    self.inbox
                        .ready
                        .wait_timeout(frames, deadline - now)
                        .map_err(|_| RadioError::Closed)?
                        .0
                }
                None => self
                    .inbox
                    .ready
                    .wait(frames)
                    .map_err(|_| RadioError::Closed)?,
            };
        }
    }
}

impl std::fmt::Debug for MemoryRadio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRadio")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
