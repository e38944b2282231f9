//! Event envelopes and their outbound wire form.

pub mod envelope;
pub mod types;

pub use envelope::EventEnvelope;
pub use types::OutboundMessage;
