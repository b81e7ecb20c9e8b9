//! Realtime fan-out for the tabletop console.
//!
//! Clients subscribe to named rooms ([`Channel`]); the server pushes
//! [`RealtimeEvent`]s to every connection in a room through a
//! [`Broadcaster`]. [`RoomHub`] is the in-process implementation backing the
//! WebSocket endpoint, and [`RecordingBroadcaster`] captures emissions for
//! tests.

pub mod broadcaster;
pub mod channel;
pub mod error;
pub mod event;
pub mod hub;

pub use broadcaster::{Broadcaster, Emission, RecordingBroadcaster};
pub use channel::Channel;
pub use error::{BroadcastError, BroadcastResult};
pub use event::{Envelope, RealtimeEvent};
pub use hub::RoomHub;
