//! Slot entity types.

pub mod model;
pub mod status;
pub mod view;

pub use model::{NewSlot, SlotKey, SlotRow};
pub use status::SlotStatus;
pub use view::SlotView;
