//! Event sink capability handed to the lease and booking components.

use crate::events::SlotEvent;

/// Destination for slot lifecycle events.
///
/// Implementations must return promptly: `publish` is called on the
/// request path, after the state mutation and outside every slot lock.
/// Delivery is best-effort.
pub trait EventSink: Send + Sync + std::fmt::Debug + 'static {
    /// Hand one event to every current observer.
    fn publish(&self, event: SlotEvent);
}

