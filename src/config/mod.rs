// src/config/mod.rs

//! Configuration loading and validation for pmdwatch.
//!
//! Responsibilities:
//! - Define the optional TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Merge it with command-line flags into effective [`Settings`]
//!   (`settings.rs`).
//! - Reject settings that cannot start a watch session (`validate.rs`).

pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

pub use loader::{load_from_path, load_settings};
pub use model::{AnalysisSection, ConfigFile, WatchSection};
pub use settings::Settings;
pub use validate::validate_settings;
