//! Small view-model helpers for list items and date pickers.
//!
//! These derive display state only; rendering stays with the caller.

pub mod datepicker;
pub mod snapshot_item;
