//! Settings and catalog core for a small-business management app.
//!
//! Two independent subsystems share the storage layer: the company
//! settings store, a singleton record with partial-update, reset and
//! logo-import operations that is rewritten to its storage slot on every
//! change, and the product editor session, a staged draft committed to
//! the catalog on save.

pub mod db;
pub mod models;
pub mod services;
pub mod utils;

pub use db::Database;
pub use services::editor::{EditorError, ProductEditor};
pub use services::image::{DataUriEncoder, ImageEncoder, ImageError};
pub use services::settings::{SettingsError, SettingsStore, SETTINGS_KEY};
