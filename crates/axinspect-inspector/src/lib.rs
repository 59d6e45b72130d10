//! Inspection sessions for axinspect.
//!
//! [`Inspector`] ties the scanner, the favorite store, the filter engine and
//! the relatives queries into the command surface a front end drives:
//! scan a window, filter the list, list relatives, toggle favorites, and
//! import or export the favorite set.
//!
//! Scans run on a blocking task while a heartbeat task reports progress;
//! favorite tagging runs on another blocking task after each scan and is
//! joined by [`Inspector::wait_for_favorites`].

mod error;
mod inspector;
mod settings;
mod tasks;
mod view;

pub use error::{InspectError, PositionError};
pub use inspector::{ImportOutcome, Inspector, ToggleOutcome};
pub use settings::{SELF_APP_NAME, Settings};
pub use tasks::{TagOutcome, run_scan, spawn_tagging};
pub use view::{ListView, parse_position, position_message};

// Re-export progress updates for front ends
pub use axinspect_scan::ScanProgress;
