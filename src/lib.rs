//! Sleuth
//!
//! Terminal inspector for parsed diagnostic log files: level filters,
//! debounced search, date ranges, and a virtualised table over very large
//! files.
//!
//! The store ([`state::SleuthState`]) and the view-state computations are
//! pure; terminal I/O, the filesystem, and external tools live at the
//! edges ([`view`], [`source`], [`runtime`]).

pub mod config;
pub mod filter;
pub mod logging;
pub mod model;
pub mod prefs;
pub mod runtime;
pub mod source;
pub mod state;
pub mod view;
pub mod view_state;
