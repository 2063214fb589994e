//! TUI widgets module.
//!
//! This module contains reusable widgets for the TUI.

pub mod dashboard;
pub mod detail_view;

pub use detail_view::DetailView;
