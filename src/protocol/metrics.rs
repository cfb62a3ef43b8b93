use std::sync::atomic::{AtomicU64, Ordering};

use super::PayloadType;

/// Track Meshcore traffic counters without external dependencies.
pub(crate) struct Metrics;

static RECEIVED_PACKETS: AtomicU64 = AtomicU64::new(0);
static SENT_PACKETS: AtomicU64 = AtomicU64::new(0);
static DECODE_ERRORS: AtomicU64 = AtomicU64::new(0);
static AUTH_FAILURES: AtomicU64 = AtomicU64::new(0);
static INVALID_SIGNATURES: AtomicU64 = AtomicU64::new(0);
static DELIVERED_MESSAGES: AtomicU64 = AtomicU64::new(0);

struct PayloadTypeCounters {
    ack: AtomicU64,
    advert: AtomicU64,
    group_text: AtomicU64,
    request: AtomicU64,
    other: AtomicU64,
}

static PAYLOAD_COUNTERS: PayloadTypeCounters = PayloadTypeCounters::new();

impl PayloadTypeCounters {
    const fn new() -> Self {
        Self {
            ack: AtomicU64::new(0),
            advert: AtomicU64::new(0),
            group_text: AtomicU64::new(0),
            request: AtomicU64::new(0),
            other: AtomicU64::new(0),
        }
    }

    fn increment(&self, payload_type: PayloadType) {
        let counter = match payload_type {
            PayloadType::Ack => &self.ack,
            PayloadType::Advert => &self.advert,
            PayloadType::GroupText => &self.group_text,
            PayloadType::Request => &self.request,
            _ => &self.other,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Direction of packet flow for counting.
#[derive(Clone, Copy)]
pub(crate) enum PacketDirection {
    Sent,
    Received,
}

impl Metrics {
    #[inline]
    pub(crate) fn record_packet(direction: PacketDirection, payload_type: PayloadType) {
        match direction {
            PacketDirection::Sent => {
                SENT_PACKETS.fetch_add(1, Ordering::Relaxed);
            }
            PacketDirection::Received => {
                RECEIVED_PACKETS.fetch_add(1, Ordering::Relaxed);
            }
        }
        PAYLOAD_COUNTERS.increment(payload_type);
    }

    #[inline]
    pub(crate) fn record_decode_error() {
        DECODE_ERRORS.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_auth_failure() {
        AUTH_FAILURES.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_invalid_signature() {
        INVALID_SIGNATURES.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_delivery() {
        DELIVERED_MESSAGES.fetch_add(1, Ordering::Relaxed);
    }
}

/// Read the process-wide counters.
#[must_use]
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        received_packets: RECEIVED_PACKETS.load(Ordering::Relaxed),
        sent_packets: SENT_PACKETS.load(Ordering::Relaxed),
        decode_errors: DECODE_ERRORS.load(Ordering::Relaxed),
        auth_failures: AUTH_FAILURES.load(Ordering::Relaxed),
        invalid_signatures: INVALID_SIGNATURES.load(Ordering::Relaxed),
        delivered_messages: DELIVERED_MESSAGES.load(Ordering::Relaxed),
        ack_packets: PAYLOAD_COUNTERS.ack.load(Ordering::Relaxed),
        advert_packets: PAYLOAD_COUNTERS.advert.load(Ordering::Relaxed),
        group_text_packets: PAYLOAD_COUNTERS.group_text.load(Ordering::Relaxed),
        request_packets: PAYLOAD_COUNTERS.request.load(Ordering::Relaxed),
        other_packets: PAYLOAD_COUNTERS.other.load(Ordering::Relaxed),
    }
}

/// Lightweight snapshot of traffic counters.
#[allow(missing_docs)]
#[derive(Default, Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub received_packets: u64,
    pub sent_packets: u64,
    pub decode_errors: u64,
    pub auth_failures: u64,
    pub invalid_signatures: u64,
    pub delivered_messages: u64,
    pub ack_packets: u64,
    pub advert_packets: u64,
    pub group_text_packets: u64,
    pub request_packets: u64,
    pub other_packets: u64,
}

impl MetricsSnapshot {
    /// Fraction of received packets that failed to decode.
    #[must_use]
    pub fn decode_error_ratio(&self) -> Option<f64> {
        let total = self.received_packets + self.decode_errors;
        if total == 0 {
            return None;
        }
        Some(self.decode_errors as f64 / total as f64)
    }
}
