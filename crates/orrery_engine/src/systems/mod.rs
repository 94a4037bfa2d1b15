//! Per-tick and event-driven systems operating on the scene graph
//!
//! - [`orbit_system`]: advances every orbit once per tick
//! - [`label_system`]: attaches labels and keeps them on their owners
//! - [`picking_system`]: pointer → ray → nearest entity, with selection state

pub mod orbit_system;
pub mod picking_system;
pub mod label_system;

pub use picking_system::{PickingSystem, Tooltip, pick};
pub use label_system::{LabelSystem, LabelStyle, LabelError, attach_label, sync_labels};
