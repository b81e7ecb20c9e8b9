//! The broadcaster seam.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::channel::Channel;
use crate::error::{BroadcastError, BroadcastResult};
use crate::event::RealtimeEvent;

/// Pushes events to subscribed clients.
///
/// Delivery is fire-and-forget: there is no acknowledgement and no retry.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Emit `event` to every connection in `channel`. Returns how many
    /// connections it was queued for.
    async fn emit(&self, channel: Channel, event: RealtimeEvent) -> BroadcastResult<usize>;

    /// Emit `event` to every connection.
    async fn emit_all(&self, event: RealtimeEvent) -> BroadcastResult<usize>;
}

/// One recorded call on a [`RecordingBroadcaster`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    /// Target room, or `None` for a global emit.
    pub channel: Option<Channel>,
    /// The emitted event.
    pub event: RealtimeEvent,
}

/// Records every emission instead of delivering it.
#[derive(Debug, Default)]
pub struct RecordingBroadcaster {
    emissions: Mutex<Vec<Emission>>,
    fail: bool,
}

impl RecordingBroadcaster {
    /// A recorder that accepts every emission.
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder that records calls but reports the broadcaster as down.
    pub fn failing() -> Self {
        Self {
            emissions: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Everything emitted so far, in order.
    pub fn emissions(&self) -> Vec<Emission> {
        self.emissions
            .lock()
            .map(|e| e.to_vec())
            .unwrap_or_default()
    }

    /// Number of emit calls so far.
    pub fn call_count(&self) -> usize {
        self.emissions.lock().map(|e| e.len()).unwrap_or_default()
    }

    /// Emissions addressed to one room.
    pub fn to_channel(&self, channel: Channel) -> Vec<RealtimeEvent> {
        self.emissions()
            .into_iter()
            .filter(|e| e.channel == Some(channel))
            .map(|e| e.event)
            .collect()
    }

    fn record(&self, channel: Option<Channel>, event: RealtimeEvent) -> BroadcastResult<usize> {
        if let Ok(mut emissions) = self.emissions.lock() {
            emissions.push(Emission { channel, event });
        }
        if self.fail {
            Err(BroadcastError::Unavailable("recording broadcaster set to fail".into()))
        } else {
            Ok(1)
        }
    }
}

#[async_trait]
impl Broadcaster for RecordingBroadcaster {
    async fn emit(&self, channel: Channel, event: RealtimeEvent) -> BroadcastResult<usize> {
        self.record(Some(channel), event)
    }

    async fn emit_all(&self, event: RealtimeEvent) -> BroadcastResult<usize> {
        self.record(None, event)
    }
}
