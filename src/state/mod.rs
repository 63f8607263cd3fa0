//! Application store (pure).
//!
//! All state transitions are synchronous and testable without a terminal.
//! Side effects leave the store only through the [`Host`] trait, the
//! injected [`Callbacks`], and queued [`Command`]s.

pub mod app_state;
pub mod command;
pub mod effects;
pub mod field;
pub mod host;

// Re-export for convenience
pub use app_state::{SleuthState, StateOptions, cache_inspection_supported};
pub use command::{Command, Notification, NotificationLevel, normalize_cache_keys};
pub use effects::Effect;
pub use field::{Field, FieldSet};
pub use host::{Callbacks, Host, HostClass, IconName, NoopHost, Presentation, SharedHost};
