//! BOOT.SYS - a retro boot menu for the terminal
//!
//! A keyboard-driven list of project links. Booting an entry plays a short
//! randomized sequence of status messages, then hands its URL to a
//! [`Navigator`](navigate::Navigator) or shows a completion dialog.

pub mod app;
pub mod config;
pub mod input;
pub mod menu;
pub mod navigate;
pub mod schedule;
pub mod status;
pub mod timeline;
pub mod ui;

pub use config::{BootConfig, BootEntry, ConfigError};
pub use input::Input;
pub use menu::{BootMenu, Dialog, DialogKind};
pub use navigate::{DeferredNavigator, Navigator, SystemOpener};
