//! Core traits defined in `slothub-core` and implemented by other crates.

pub mod event_sink;

pub use event_sink::EventSink;
