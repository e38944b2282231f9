//! # slothub-realtime
//!
//! Real-time event fan-out for SlotHub. Provides:
//!
//! - [`EventBroadcaster`], the [`EventSink`](slothub_core::traits::EventSink)
//!   that delivers every slot transition to all current subscribers
//! - bounded per-subscriber channels and callback handlers
//! - the JSON wire form of events for transport adapters
//! - delivery metrics
//!
//! Delivery is best-effort: nothing is persisted or replayed, and a slow
//! or dead subscriber only loses its own copy of an event.

pub mod broadcaster;
pub mod message;
pub mod metrics;
pub mod subscription;

pub use broadcaster::EventBroadcaster;
pub use message::{EventEnvelope, OutboundMessage};
pub use metrics::{BroadcastMetrics, MetricsSnapshot};
pub use subscription::{Subscription, SubscriberId};
