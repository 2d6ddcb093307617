//! Editing session for markmode
//!
//! This module holds the edit mode controller, the host widget boundary it
//! talks to, and link editing on the Document Tree.

mod controller;
mod host;
pub mod links;

pub use controller::{ChangeCallback, EditModeController, EditorState, ModeCallback};
pub use host::{DocumentHost, HostWidget};
pub use links::{apply_link, link_at, link_edit, LinkEdit, Selection};
