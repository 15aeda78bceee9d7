//! iris-tui: Terminal UI components
//!
//! Widgets and terminal plumbing for the Iris chat screen, built on ratatui
//! and crossterm. Nothing here knows about turn processing; the binary maps
//! its events onto these widgets.

pub mod app;
pub mod input;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use theme::{Theme, ThemeMode};
