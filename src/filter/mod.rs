//! Filter bar: level toggles and debounced search.

pub mod controller;
pub mod debounce;

pub use controller::{FilterConsumer, FilterController, FilterView};
pub use debounce::{Debouncer, MIN_DEBOUNCE};
